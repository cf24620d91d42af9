//! Resolution Strategies
//!
//! The engine shares open/join/timeout/payout between flows and delegates
//! only the "who won" step to a [`ResolutionStrategy`]:
//!
//! - [`RevealResolution`]: both parties disclose; the winner is recomputed.
//! - [`ProofResolution`]: one party submits a claimed outcome plus a proof;
//!   the injected verifier's boolean is trusted.

use tracing::debug;

use crate::game::error::GameError;
use crate::game::events::GameEventData;
use crate::game::moves::{resolve, Move, Outcome};
use crate::game::state::{Commitment, Game, GameState, Party};
use crate::proof::commitment::{CommitmentScheme, FieldCommitment, Secret, Sha256Commitment};
use crate::proof::public_inputs::ProofPublicInputs;
use crate::proof::verify::ProofVerifier;

/// Flow-agnostic resolution input, as received from the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolutionCommand {
    /// Disclose a move.
    Reveal {
        /// Raw move code.
        move_code: u8,
        /// Blinding secret.
        secret: Secret,
    },
    /// Submit a winner proof.
    Proof {
        /// Raw outcome code.
        winner_code: u8,
        /// Opaque proof bytes.
        proof: Vec<u8>,
    },
}

/// What a submission did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Final outcome, once the game can be settled.
    pub outcome: Option<Outcome>,
    /// Events to publish for this step.
    pub events: Vec<GameEventData>,
}

/// A way of turning two commitments into a verified outcome.
pub trait ResolutionStrategy {
    /// Flow-specific submission.
    type Submission;

    /// Strategy name for log lines.
    fn name(&self) -> &'static str;

    /// State a game enters once both commitments are recorded.
    fn awaiting_state(&self) -> GameState;

    /// Whether this flow can ever resolve a game holding `commitment`.
    ///
    /// Checked at open and join, before any funds move.
    fn accepts_commitment(&self, _commitment: &Commitment) -> bool {
        true
    }

    /// Decode a wire command. `None` if this flow has no such operation.
    fn decode(&self, command: ResolutionCommand) -> Option<Result<Self::Submission, GameError>>;

    /// Apply a submission from `party` to a working copy of the game.
    ///
    /// On error the caller discards the copy, so implementations may mutate
    /// `game` before failing.
    fn submit(
        &self,
        game: &mut Game,
        party: Party,
        submission: Self::Submission,
        now: u64,
    ) -> Result<Resolution, GameError>;
}

// =============================================================================
// REVEAL
// =============================================================================

/// A disclosed move and its secret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealSubmission {
    /// The move.
    pub mv: Move,
    /// Secret that opens the caller's commitment.
    pub secret: Secret,
}

/// Commit-reveal resolution.
#[derive(Debug, Default, Clone)]
pub struct RevealResolution<S = Sha256Commitment> {
    scheme: S,
}

impl RevealResolution<Sha256Commitment> {
    /// Reveal flow over SHA-256 commitments.
    pub fn new() -> Self {
        Self { scheme: Sha256Commitment }
    }
}

impl<S: CommitmentScheme> RevealResolution<S> {
    /// Reveal flow over a custom commitment scheme.
    pub fn with_scheme(scheme: S) -> Self {
        Self { scheme }
    }

    /// The commitment scheme reveals are checked against.
    pub fn scheme(&self) -> &S {
        &self.scheme
    }
}

impl<S: CommitmentScheme> ResolutionStrategy for RevealResolution<S> {
    type Submission = RevealSubmission;

    fn name(&self) -> &'static str {
        "reveal"
    }

    fn awaiting_state(&self) -> GameState {
        GameState::AwaitingReveal
    }

    fn decode(&self, command: ResolutionCommand) -> Option<Result<RevealSubmission, GameError>> {
        match command {
            ResolutionCommand::Reveal { move_code, secret } => {
                Some(Move::from_code(move_code).map(|mv| RevealSubmission { mv, secret }))
            }
            ResolutionCommand::Proof { .. } => None,
        }
    }

    fn submit(
        &self,
        game: &mut Game,
        party: Party,
        submission: RevealSubmission,
        now: u64,
    ) -> Result<Resolution, GameError> {
        if game.state != GameState::AwaitingReveal {
            return Err(GameError::wrong_state(game.state));
        }
        if game.reveal_of(party).is_some() {
            return Err(GameError::AlreadyRevealed);
        }

        let commitment = game
            .commitment_of(party)
            .ok_or_else(|| GameError::wrong_state(game.state))?;
        if !self.scheme.verify_reveal(&commitment, submission.mv, &submission.secret) {
            return Err(GameError::CommitMismatch);
        }

        game.record_reveal(party, submission.mv, now)?;

        let player = game.address_of(party).ok_or(GameError::Unauthorized)?;
        let mut events = vec![GameEventData::MoveRevealed { player, mv: submission.mv }];

        let outcome = match (game.reveal_a, game.reveal_b) {
            (Some(a), Some(b)) => {
                let outcome = resolve(a.mv, b.mv);
                debug!(game_id = game.id, ?outcome, "Both moves revealed");
                events.push(GameEventData::WinnerResolved {
                    move_a: a.mv,
                    move_b: b.mv,
                    outcome,
                });
                Some(outcome)
            }
            _ => None,
        };

        Ok(Resolution { outcome, events })
    }
}

// =============================================================================
// PROOF
// =============================================================================

/// A claimed outcome with its proof.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofSubmission {
    /// Raw outcome code (0 = draw, 1 = party A, 2 = party B).
    pub winner_code: u8,
    /// Opaque proof bytes.
    pub proof: Vec<u8>,
}

/// Proof-based resolution with an injected verifier.
#[derive(Debug, Default, Clone)]
pub struct ProofResolution<V> {
    verifier: V,
}

impl<V: ProofVerifier> ProofResolution<V> {
    /// Resolve through `verifier`.
    pub fn new(verifier: V) -> Self {
        Self { verifier }
    }

    /// The injected verifier.
    pub fn verifier(&self) -> &V {
        &self.verifier
    }
}

impl<V: ProofVerifier> ResolutionStrategy for ProofResolution<V> {
    type Submission = ProofSubmission;

    fn name(&self) -> &'static str {
        "proof"
    }

    fn awaiting_state(&self) -> GameState {
        GameState::AwaitingResolution
    }

    fn accepts_commitment(&self, commitment: &Commitment) -> bool {
        FieldCommitment::is_well_formed(commitment)
    }

    fn decode(&self, command: ResolutionCommand) -> Option<Result<ProofSubmission, GameError>> {
        match command {
            ResolutionCommand::Proof { winner_code, proof } => {
                Some(Ok(ProofSubmission { winner_code, proof }))
            }
            ResolutionCommand::Reveal { .. } => None,
        }
    }

    fn submit(
        &self,
        game: &mut Game,
        party: Party,
        submission: ProofSubmission,
        now: u64,
    ) -> Result<Resolution, GameError> {
        if game.state != GameState::AwaitingResolution {
            return Err(GameError::wrong_state(game.state));
        }

        let claimed = Outcome::from_code(submission.winner_code).ok_or_else(|| {
            GameError::InvalidProof(format!("winner code {} out of range", submission.winner_code))
        })?;

        let commitment_b = game
            .commitment_b
            .ok_or_else(|| GameError::wrong_state(game.state))?;
        let inputs = ProofPublicInputs::new(&game.commitment_a, &commitment_b, claimed)
            .ok_or(GameError::InvalidCommitment)?;

        match self.verifier.verify_proof(&inputs, &submission.proof) {
            Ok(true) => {}
            Ok(false) => return Err(GameError::InvalidProof("rejected by verifier".to_string())),
            Err(e) => return Err(GameError::InvalidProof(e.to_string())),
        }

        // The verified public inputs are the only source of the winner.
        let outcome = inputs
            .outcome()
            .ok_or_else(|| GameError::InvalidProof("unreadable winner input".to_string()))?;

        game.last_action_at = now;
        let prover = game.address_of(party).ok_or(GameError::Unauthorized)?;

        Ok(Resolution {
            outcome: Some(outcome),
            events: vec![GameEventData::WinnerProven { prover, outcome }],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{Address, COIN};
    use crate::proof::verify::{RejectingVerifier, StubProofVerifier};

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn secret(s: &str) -> Secret {
        Secret::from_bytes(s.as_bytes())
    }

    fn game_with(a: Commitment, b: Commitment, state: GameState) -> Game {
        let mut game = Game::open(0, addr(1), Some(addr(2)), COIN, a, 0);
        game.set_commitment_b(b).unwrap();
        game.pool = 2 * COIN;
        game.advance(state).unwrap();
        game
    }

    #[test]
    fn test_reveal_pair_resolves() {
        let strategy = RevealResolution::new();
        let a = Sha256Commitment.commit(Move::Rock, &secret("s1"));
        let b = Sha256Commitment.commit(Move::Scissors, &secret("s2"));
        let mut game = game_with(a, b, GameState::AwaitingReveal);

        let first = strategy
            .submit(&mut game, Party::A, RevealSubmission { mv: Move::Rock, secret: secret("s1") }, 5)
            .unwrap();
        assert_eq!(first.outcome, None);
        assert_eq!(first.events.len(), 1);

        let second = strategy
            .submit(&mut game, Party::B, RevealSubmission { mv: Move::Scissors, secret: secret("s2") }, 6)
            .unwrap();
        assert_eq!(second.outcome, Some(Outcome::PartyA));
        assert!(matches!(
            second.events.last(),
            Some(GameEventData::WinnerResolved { outcome: Outcome::PartyA, .. })
        ));
    }

    #[test]
    fn test_reveal_mismatch_and_double_reveal() {
        let strategy = RevealResolution::new();
        let a = Sha256Commitment.commit(Move::Rock, &secret("s1"));
        let b = Sha256Commitment.commit(Move::Paper, &secret("s2"));
        let mut game = game_with(a, b, GameState::AwaitingReveal);

        let wrong = RevealSubmission { mv: Move::Paper, secret: secret("s1") };
        assert_eq!(strategy.submit(&mut game, Party::A, wrong, 1), Err(GameError::CommitMismatch));

        let right = RevealSubmission { mv: Move::Rock, secret: secret("s1") };
        strategy.submit(&mut game, Party::A, right.clone(), 1).unwrap();
        assert_eq!(strategy.submit(&mut game, Party::A, right, 2), Err(GameError::AlreadyRevealed));
    }

    #[test]
    fn test_reveal_decode() {
        let strategy = RevealResolution::new();
        assert_eq!(
            strategy.decode(ResolutionCommand::Reveal { move_code: 9, secret: secret("x") }),
            Some(Err(GameError::InvalidMove(9)))
        );
        assert!(strategy
            .decode(ResolutionCommand::Proof { winner_code: 1, proof: vec![1] })
            .is_none());
    }

    #[test]
    fn test_proof_out_of_range_winner() {
        let strategy = ProofResolution::new(StubProofVerifier);
        let mut game = game_with(
            FieldCommitment.commit(Move::Rock, &secret("a")),
            FieldCommitment.commit(Move::Rock, &secret("b")),
            GameState::AwaitingResolution,
        );

        let err = strategy
            .submit(&mut game, Party::A, ProofSubmission { winner_code: 3, proof: vec![1] }, 1)
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidProof(_)));
    }

    #[test]
    fn test_proof_rejected_by_verifier() {
        let strategy = ProofResolution::new(RejectingVerifier);
        let mut game = game_with(
            FieldCommitment.commit(Move::Rock, &secret("a")),
            FieldCommitment.commit(Move::Rock, &secret("b")),
            GameState::AwaitingResolution,
        );

        let err = strategy
            .submit(&mut game, Party::B, ProofSubmission { winner_code: 2, proof: vec![1] }, 1)
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidProof(_)));
    }

    #[test]
    fn test_proof_accepted() {
        let strategy = ProofResolution::new(StubProofVerifier);
        let mut game = game_with(
            FieldCommitment.commit(Move::Rock, &secret("a")),
            FieldCommitment.commit(Move::Paper, &secret("b")),
            GameState::AwaitingResolution,
        );

        let resolution = strategy
            .submit(&mut game, Party::B, ProofSubmission { winner_code: 2, proof: vec![1] }, 9)
            .unwrap();
        assert_eq!(resolution.outcome, Some(Outcome::PartyB));
        assert_eq!(game.last_action_at, 9);
    }

    #[test]
    fn test_commitment_admission() {
        let field = FieldCommitment.commit(Move::Rock, &secret("a"));
        let malformed = Commitment::new([0xFF; 32]);

        let proof = ProofResolution::new(StubProofVerifier);
        assert!(proof.accepts_commitment(&field));
        assert!(!proof.accepts_commitment(&malformed));

        assert!(RevealResolution::new().accepts_commitment(&malformed));
    }

    #[test]
    fn test_proof_malformed_commitment_on_record() {
        let strategy = ProofResolution::new(StubProofVerifier);
        let mut game = game_with(
            FieldCommitment.commit(Move::Rock, &secret("a")),
            Commitment::new([0xFF; 32]),
            GameState::AwaitingResolution,
        );
        assert_eq!(
            strategy.submit(&mut game, Party::A, ProofSubmission { winner_code: 1, proof: vec![1] }, 0),
            Err(GameError::InvalidCommitment)
        );
    }

    #[test]
    fn test_proof_wrong_state() {
        let strategy = ProofResolution::new(StubProofVerifier);
        let mut game = game_with(Commitment::new([1; 32]), Commitment::new([2; 32]), GameState::AwaitingReveal);
        assert_eq!(
            strategy.submit(&mut game, Party::A, ProofSubmission { winner_code: 1, proof: vec![1] }, 0),
            Err(GameError::WrongGameState { actual: GameState::AwaitingReveal })
        );
    }
}
