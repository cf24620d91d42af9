//! Timeout Adjudication
//!
//! Decides who may force a stalled game to completion and with what
//! outcome. Pure: reads the game, the claimant and the time, changes nothing.
//!
//! | State                | Claimant         | Outcome       | Window   |
//! |----------------------|------------------|---------------|----------|
//! | AwaitingOpponent     | creator          | Draw (refund) | lobby    |
//! | AwaitingReveal, 1/2  | the revealer     | revealer wins | reveal   |
//! | AwaitingReveal, 0/2  | either party     | Draw          | reveal   |
//! | AwaitingResolution   | either party     | Draw          | proof, if configured |

use crate::config::EngineConfig;
use crate::game::error::GameError;
use crate::game::moves::Outcome;
use crate::game::state::{Address, Game, GameState, Party};

/// An accepted timeout claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeoutRuling {
    /// Outcome to settle with.
    pub outcome: Outcome,
    /// Deadline that had passed.
    pub deadline: u64,
}

/// Judge a timeout claim.
///
/// Rejections are checked in order: state, then claimant, then deadline.
pub fn adjudicate(
    game: &Game,
    claimant: &Address,
    now: u64,
    config: &EngineConfig,
) -> Result<TimeoutRuling, GameError> {
    let (outcome, window) = match game.state {
        GameState::Completed => return Err(GameError::wrong_state(game.state)),

        GameState::AwaitingOpponent => {
            if *claimant != game.creator {
                return Err(GameError::Unauthorized);
            }
            (Outcome::Draw, config.lobby_timeout_secs)
        }

        GameState::AwaitingReveal => {
            let party = game.party_of(claimant).ok_or(GameError::Unauthorized)?;
            let outcome = match (game.reveal_a.is_some(), game.reveal_b.is_some()) {
                (false, false) => Outcome::Draw,
                (true, true) => return Err(GameError::wrong_state(game.state)),
                (a_revealed, _) => {
                    let revealer = if a_revealed { Party::A } else { Party::B };
                    // The silent party cannot profit from its own silence.
                    if party != revealer {
                        return Err(GameError::Unauthorized);
                    }
                    revealer.as_winner()
                }
            };
            (outcome, config.reveal_timeout_secs)
        }

        GameState::AwaitingResolution => {
            let window = config
                .proof_timeout_secs
                .ok_or_else(|| GameError::wrong_state(game.state))?;
            game.party_of(claimant).ok_or(GameError::Unauthorized)?;
            (Outcome::Draw, window)
        }
    };

    let deadline = game.last_action_at.saturating_add(window);
    if now < deadline {
        return Err(GameError::TimeoutNotReached { deadline, now });
    }

    Ok(TimeoutRuling { outcome, deadline })
}
