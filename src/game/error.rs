//! Settlement Errors
//!
//! Every variant rejects the attempted operation as a whole. No partial
//! effects are ever persisted when one of these is returned.

use thiserror::Error;

use crate::game::state::{Amount, GameId, GameState};
use crate::host::ledger::LedgerError;

/// Errors returned by settlement operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Zero stake at creation, or attached funds differ from the game's stake.
    #[error("invalid stake: got {got}")]
    InvalidStake {
        /// Stake the game requires (`None` when opening a game).
        expected: Option<Amount>,
        /// Funds actually attached.
        got: Amount,
    },

    /// Commitment is zero or the slot is already filled.
    #[error("invalid commitment")]
    InvalidCommitment,

    /// Move code outside {Rock, Paper, Scissors}.
    #[error("invalid move code: {0}")]
    InvalidMove(u8),

    /// Caller may not perform this operation on this game.
    #[error("unauthorized")]
    Unauthorized,

    /// No game with this id.
    #[error("game {0} not found")]
    GameNotFound(GameId),

    /// Operation is not valid in the game's current state.
    #[error("wrong game state: {actual:?}")]
    WrongGameState {
        /// State the game was in.
        actual: GameState,
    },

    /// Caller already used their one reveal for this game.
    #[error("move already revealed")]
    AlreadyRevealed,

    /// Revealed (move, secret) does not hash to the stored commitment.
    #[error("revealed move does not match commitment")]
    CommitMismatch,

    /// Verifier rejected the proof, or the claimed winner is out of range.
    #[error("invalid proof: {0}")]
    InvalidProof(String),

    /// Timeout claimed before the deadline.
    #[error("timeout not reached: deadline {deadline}, now {now}")]
    TimeoutNotReached {
        /// First second at which the claim succeeds.
        deadline: u64,
        /// Time of the rejected claim.
        now: u64,
    },

    /// A payout transfer was refused; the whole operation was rolled back.
    #[error("payout failed: {0}")]
    Transfer(#[from] LedgerError),
}

impl GameError {
    /// Shorthand for a state rejection.
    pub(crate) fn wrong_state(actual: GameState) -> Self {
        Self::WrongGameState { actual }
    }
}
