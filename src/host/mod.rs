//! Host Integration
//!
//! What the engine needs from its environment and how callers reach it.
//! Nothing in here decides an outcome.
//!
//! - `clock`: Time source
//! - `ledger`: Fund custody
//! - `command`: JSON wire format
//! - `service`: Async single-writer front with event broadcast

pub mod clock;
pub mod ledger;
pub mod command;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ledger::{InMemoryLedger, Ledger, LedgerError};
pub use command::{CommandOutcome, GameCommand};
pub use service::GameService;
