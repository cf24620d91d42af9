//! Command Wire Format
//!
//! JSON commands a transport hands to the engine. The sender and attached
//! funds travel outside the command, in a [`Call`].
//!
//! Move and winner codes stay raw here so out-of-range values reach the
//! engine and are rejected with the proper error kind.

use serde::{Serialize, Deserialize};

use crate::game::engine::{Call, SettlementEngine};
use crate::game::error::GameError;
use crate::game::moves::Outcome;
use crate::game::state::{Address, Commitment, GameId};
use crate::host::clock::Clock;
use crate::host::ledger::Ledger;
use crate::proof::commitment::Secret;
use crate::proof::resolution::{ResolutionCommand, ResolutionStrategy};

// =============================================================================
// CLIENT -> ENGINE
// =============================================================================

/// A state-changing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameCommand {
    /// Open a game, staking the call's value.
    OpenGame {
        /// Invited opponent; omit for an open game.
        #[serde(default)]
        opponent: Option<Address>,
        /// Creator's commitment.
        commitment: Commitment,
    },

    /// Join a game, matching its stake.
    JoinGame {
        /// Target game.
        game_id: GameId,
        /// Joiner's commitment.
        commitment: Commitment,
    },

    /// Disclose a move (reveal flow).
    RevealMove {
        /// Target game.
        game_id: GameId,
        /// Raw move code.
        #[serde(rename = "move")]
        move_code: u8,
        /// Hex-encoded secret.
        secret: Secret,
    },

    /// Submit a winner proof (proof flow).
    SubmitProof {
        /// Target game.
        game_id: GameId,
        /// Raw outcome code.
        winner: u8,
        /// Hex-encoded proof bytes.
        #[serde(with = "hex_bytes")]
        proof: Vec<u8>,
    },

    /// Force a stalled game to completion.
    ClaimTimeout {
        /// Target game.
        game_id: GameId,
    },
}

impl GameCommand {
    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Short name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            GameCommand::OpenGame { .. } => "open_game",
            GameCommand::JoinGame { .. } => "join_game",
            GameCommand::RevealMove { .. } => "reveal_move",
            GameCommand::SubmitProof { .. } => "submit_proof",
            GameCommand::ClaimTimeout { .. } => "claim_timeout",
        }
    }

    /// Target game, if the command addresses an existing one.
    pub fn game_id(&self) -> Option<GameId> {
        match self {
            GameCommand::OpenGame { .. } => None,
            GameCommand::JoinGame { game_id, .. }
            | GameCommand::RevealMove { game_id, .. }
            | GameCommand::SubmitProof { game_id, .. }
            | GameCommand::ClaimTimeout { game_id } => Some(*game_id),
        }
    }
}

// =============================================================================
// ENGINE -> CLIENT
// =============================================================================

/// What a successful command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// A game was opened.
    Opened {
        /// New game id.
        game_id: GameId,
    },
    /// The caller joined.
    Joined {
        /// Joined game.
        game_id: GameId,
    },
    /// Accepted; the game is waiting on the other party.
    Pending {
        /// Game.
        game_id: GameId,
    },
    /// The game was settled.
    Settled {
        /// Game.
        game_id: GameId,
        /// Final outcome.
        outcome: Outcome,
    },
}

/// Apply a command to an engine.
pub fn apply<R, L, C>(
    engine: &mut SettlementEngine<R, L, C>,
    call: Call,
    command: GameCommand,
) -> Result<CommandOutcome, GameError>
where
    R: ResolutionStrategy,
    L: Ledger,
    C: Clock,
{
    let resolved = |game_id: GameId, outcome: Option<Outcome>| match outcome {
        Some(outcome) => CommandOutcome::Settled { game_id, outcome },
        None => CommandOutcome::Pending { game_id },
    };

    match command {
        GameCommand::OpenGame { opponent, commitment } => engine
            .open_game(call, opponent, commitment)
            .map(|game_id| CommandOutcome::Opened { game_id }),

        GameCommand::JoinGame { game_id, commitment } => engine
            .join_game(call, game_id, commitment)
            .map(|()| CommandOutcome::Joined { game_id }),

        GameCommand::RevealMove { game_id, move_code, secret } => engine
            .submit(call, game_id, ResolutionCommand::Reveal { move_code, secret })
            .map(|outcome| resolved(game_id, outcome)),

        GameCommand::SubmitProof { game_id, winner, proof } => engine
            .submit(call, game_id, ResolutionCommand::Proof { winner_code: winner, proof })
            .map(|outcome| resolved(game_id, outcome)),

        GameCommand::ClaimTimeout { game_id } => engine
            .claim_timeout(call, game_id)
            .map(|outcome| CommandOutcome::Settled { game_id, outcome }),
    }
}

/// Hex string encoding for byte vectors.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::moves::Move;
    use crate::game::state::{GameState, COIN};
    use crate::host::clock::ManualClock;
    use crate::host::ledger::InMemoryLedger;
    use crate::proof::commitment::{CommitmentScheme, Sha256Commitment};
    use crate::proof::resolution::RevealResolution;

    fn alice() -> Address {
        Address::new([0xA1; 20])
    }

    fn bob() -> Address {
        Address::new([0xB0; 20])
    }

    #[test]
    fn test_parse_commands() {
        let json = r#"{"type":"reveal_move","game_id":4,"move":3,"secret":"0xdeadbeef"}"#;
        assert_eq!(
            GameCommand::from_json(json).unwrap(),
            GameCommand::RevealMove {
                game_id: 4,
                move_code: 3,
                secret: Secret::from_bytes(vec![0xde, 0xad, 0xbe, 0xef]),
            }
        );

        let open = format!(r#"{{"type":"open_game","commitment":"{}"}}"#, Commitment::new([7; 32]));
        let cmd = GameCommand::from_json(&open).unwrap();
        assert_eq!(cmd.name(), "open_game");
        assert_eq!(cmd.game_id(), None);

        let proof = GameCommand::from_json(r#"{"type":"submit_proof","game_id":1,"winner":2,"proof":"0102"}"#)
            .unwrap();
        assert_eq!(
            proof,
            GameCommand::SubmitProof { game_id: 1, winner: 2, proof: vec![1, 2] }
        );
        assert!(GameCommand::from_json(r#"{"type":"claim_timeout"}"#).is_err());
    }

    #[test]
    fn test_outcome_json() {
        let json = serde_json::to_value(CommandOutcome::Settled { game_id: 2, outcome: Outcome::Draw })
            .unwrap();
        assert_eq!(json["result"], "settled");
        assert_eq!(json["outcome"], "Draw");
    }

    #[test]
    fn test_apply_full_game() {
        let mut ledger = InMemoryLedger::new();
        ledger.fund(alice(), COIN);
        ledger.fund(bob(), COIN);
        let mut engine = SettlementEngine::new(RevealResolution::new(), ledger, ManualClock::new(0));

        let secret_a = Secret::from_bytes(b"a".to_vec());
        let secret_b = Secret::from_bytes(b"b".to_vec());

        let opened = apply(
            &mut engine,
            Call::new(alice(), COIN),
            GameCommand::OpenGame {
                opponent: None,
                commitment: Sha256Commitment.commit(Move::Paper, &secret_a),
            },
        );
        assert_eq!(opened, Ok(CommandOutcome::Opened { game_id: 0 }));

        let joined = apply(
            &mut engine,
            Call::new(bob(), COIN),
            GameCommand::JoinGame {
                game_id: 0,
                commitment: Sha256Commitment.commit(Move::Scissors, &secret_b),
            },
        );
        assert_eq!(joined, Ok(CommandOutcome::Joined { game_id: 0 }));

        assert_eq!(
            apply(
                &mut engine,
                Call::sender(alice()),
                GameCommand::RevealMove { game_id: 0, move_code: 0, secret: secret_a.clone() },
            ),
            Err(GameError::InvalidMove(0))
        );
        assert_eq!(
            apply(
                &mut engine,
                Call::sender(alice()),
                GameCommand::SubmitProof { game_id: 0, winner: 1, proof: vec![1] },
            ),
            Err(GameError::WrongGameState { actual: GameState::AwaitingReveal })
        );
        assert_eq!(
            apply(
                &mut engine,
                Call::sender(alice()),
                GameCommand::RevealMove { game_id: 0, move_code: 2, secret: secret_a },
            ),
            Ok(CommandOutcome::Pending { game_id: 0 })
        );
        assert_eq!(
            apply(
                &mut engine,
                Call::sender(bob()),
                GameCommand::RevealMove { game_id: 0, move_code: 3, secret: secret_b },
            ),
            Ok(CommandOutcome::Settled { game_id: 0, outcome: Outcome::PartyB })
        );
        assert_eq!(engine.ledger().balance_of(&bob()), 2 * COIN);
    }
}
