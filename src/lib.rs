//! # RPS Settlement
//!
//! Stake-based Rock-Paper-Scissors settlement between two parties who do
//! not trust each other.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    RPS SETTLEMENT                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Hashing primitives                        │
//! │  ├── hash.rs     - Domain-separated SHA-256                  │
//! │  └── field.rs    - BN254 Poseidon hash                       │
//! │                                                              │
//! │  game/           - Settlement rules                          │
//! │  ├── moves.rs    - Moves, outcomes, winner table             │
//! │  ├── state.rs    - Game record and lifecycle                 │
//! │  ├── registry.rs - Game storage                              │
//! │  ├── timeout.rs  - Deadline adjudication                     │
//! │  ├── settlement.rs - Payouts                                 │
//! │  └── engine.rs   - SettlementEngine                          │
//! │                                                              │
//! │  proof/          - Outcome resolution                        │
//! │  ├── commitment.rs - Move commitments                        │
//! │  ├── public_inputs.rs - BN254 proof inputs                   │
//! │  ├── verify.rs   - Verifier interface                        │
//! │  └── resolution.rs - Reveal and proof strategies             │
//! │                                                              │
//! │  host/           - Environment (non-deterministic)           │
//! │  ├── clock.rs    - Time source                               │
//! │  ├── ledger.rs   - Fund custody                              │
//! │  ├── command.rs  - JSON commands                             │
//! │  └── service.rs  - Async service + event broadcast           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! AwaitingOpponent ──join──▶ AwaitingReveal ─────reveal×2──▶ Completed
//!        │                   AwaitingResolution ──proof──▶ Completed
//!        └──────────────── timeout (any non-terminal) ──────▶ Completed
//! ```
//!
//! Every operation either applies fully or is rejected with no effect:
//! the game record, escrow and event log are untouched on error.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;
pub mod host;
pub mod proof;

// Re-export commonly used types
pub use config::{ConfigError, EngineConfig};
pub use game::engine::{Call, SettlementEngine};
pub use game::error::GameError;
pub use game::moves::{Move, Outcome};
pub use game::state::{Address, Amount, Commitment, Game, GameId, GameState, COIN};
pub use proof::commitment::{CommitmentScheme, FieldCommitment, Secret, Sha256Commitment};
pub use proof::resolution::{ProofResolution, RevealResolution};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
