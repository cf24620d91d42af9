//! Game Logic Module
//!
//! The settlement record, its rules and the engine that drives it.
//!
//! ## Module Structure
//!
//! - `moves`: Move set, outcome codes and the winner table
//! - `state`: Game record, addresses, commitments, lifecycle states
//! - `error`: Rejection kinds
//! - `events`: Events emitted per transition
//! - `registry`: Id-addressed game storage
//! - `settlement`: Payout computation
//! - `timeout`: Deadline adjudication
//! - `engine`: The settlement engine

pub mod moves;
pub mod state;
pub mod error;
pub mod events;
pub mod registry;
pub mod settlement;
pub mod timeout;
pub mod engine;

// Re-export key types
pub use moves::{Move, Outcome, resolve};
pub use state::{Address, Amount, Commitment, Game, GameId, GameState, Party, Reveal, COIN};
pub use error::GameError;
pub use events::{GameEvent, GameEventData};
pub use registry::GameRegistry;
pub use settlement::{payouts, Transfer};
pub use timeout::{adjudicate, TimeoutRuling};
pub use engine::{Call, SettlementEngine};
