//! Core deterministic primitives.
//!
//! Record hashing and the Poseidon field hash shared by the commitment
//! schemes and the proof public inputs. Nothing here touches time, I/O or
//! randomness.

pub mod hash;
pub mod field;

// Re-export core types
pub use hash::{Hash32, StateHasher};
pub use field::{Fp254, hash_many};
