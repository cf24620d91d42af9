//! Settlement Events
//!
//! One event per state transition. Each carries the game id and the parties
//! and amounts involved so an indexer can rebuild history without re-reading
//! full game state.

use serde::{Serialize, Deserialize};

use crate::game::moves::{Move, Outcome};
use crate::game::settlement::Transfer;
use crate::game::state::{amount_str, Address, Amount, Commitment, GameId};

/// Event payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEventData {
    /// A game was opened and funded by its creator.
    GameCreated {
        /// Party A.
        creator: Address,
        /// Invited opponent, `None` for an open game.
        opponent: Option<Address>,
        /// Per-side stake.
        #[serde(with = "amount_str")]
        stake: Amount,
        /// Party A's commitment.
        commitment: Commitment,
    },

    /// Party B joined, funded and committed.
    OpponentJoined {
        /// Party B.
        opponent: Address,
        /// Party B's commitment.
        commitment: Commitment,
        /// Pool after the deposit.
        #[serde(with = "amount_str")]
        pool: Amount,
    },

    /// A party disclosed its move.
    MoveRevealed {
        /// Who revealed.
        player: Address,
        /// The move.
        mv: Move,
    },

    /// Both moves are known and the winner was computed.
    WinnerResolved {
        /// Party A's move.
        move_a: Move,
        /// Party B's move.
        move_b: Move,
        /// Result.
        outcome: Outcome,
    },

    /// A verifier accepted a proof of the outcome.
    WinnerProven {
        /// Who submitted the proof.
        prover: Address,
        /// Result attested by the verified public inputs.
        outcome: Outcome,
    },

    /// A stalled game was resolved by deadline.
    TimeoutClaimed {
        /// Who claimed.
        claimant: Address,
        /// Result awarded.
        outcome: Outcome,
    },

    /// Funds were paid out and the game became terminal.
    GameCompleted {
        /// Final result.
        outcome: Outcome,
        /// Winning address, `None` on a draw.
        winner: Option<Address>,
        /// Every transfer made from the pool.
        payouts: Vec<Transfer>,
    },
}

/// A settlement event with timing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Game the event belongs to.
    pub game_id: GameId,

    /// When it happened (unix seconds).
    pub timestamp: u64,

    /// Event data.
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(game_id: GameId, timestamp: u64, data: GameEventData) -> Self {
        Self { game_id, timestamp, data }
    }

    /// Short name for log lines.
    pub fn name(&self) -> &'static str {
        match &self.data {
            GameEventData::GameCreated { .. } => "game_created",
            GameEventData::OpponentJoined { .. } => "opponent_joined",
            GameEventData::MoveRevealed { .. } => "move_revealed",
            GameEventData::WinnerResolved { .. } => "winner_resolved",
            GameEventData::WinnerProven { .. } => "winner_proven",
            GameEventData::TimeoutClaimed { .. } => "timeout_claimed",
            GameEventData::GameCompleted { .. } => "game_completed",
        }
    }

    /// Is this the terminal event of a game?
    pub fn is_terminal(&self) -> bool {
        matches!(self.data, GameEventData::GameCompleted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::COIN;

    #[test]
    fn test_event_json_shape() {
        let event = GameEvent::new(
            3,
            1_700_000_000,
            GameEventData::TimeoutClaimed {
                claimant: Address::new([1; 20]),
                outcome: Outcome::PartyA,
            },
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["game_id"], 3);
        assert_eq!(json["data"]["kind"], "timeout_claimed");
        assert_eq!(json["data"]["outcome"], "PartyA");

        let back: GameEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_amounts_as_strings() {
        let event = GameEvent::new(
            0,
            0,
            GameEventData::GameCreated {
                creator: Address::new([1; 20]),
                opponent: None,
                stake: 5 * COIN,
                commitment: Commitment::new([2; 32]),
            },
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["data"]["stake"], "5000000000000000000");

        let back: GameEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_terminal_event() {
        let completed = GameEvent::new(
            0,
            0,
            GameEventData::GameCompleted {
                outcome: Outcome::Draw,
                winner: None,
                payouts: vec![Transfer { to: Address::new([1; 20]), amount: COIN }],
            },
        );
        assert!(completed.is_terminal());
        assert_eq!(completed.name(), "game_completed");
    }
}
