//! Commitments and Winner Resolution
//!
//! Everything that decides an outcome without trusting either party:
//! - Move commitments (SHA-256 and Poseidon)
//! - BN254 public inputs for winner proofs
//! - The external verifier interface
//! - The reveal and proof resolution strategies
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    RESOLUTION                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  commitment.rs    - Commit / verify_reveal schemes          │
//! │  public_inputs.rs - BN254 field encoding for proofs         │
//! │  verify.rs        - ProofVerifier and local verifiers       │
//! │  resolution.rs    - Reveal and proof strategies             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod commitment;
pub mod public_inputs;
pub mod verify;
pub mod resolution;

// Re-export key types
pub use commitment::{CommitmentScheme, FieldCommitment, MoveOpening, Secret, Sha256Commitment};
pub use public_inputs::ProofPublicInputs;
pub use verify::{
    ProofVerifier, ProofVerificationError, ProofWitness,
    RejectingVerifier, ReplayProofVerifier, StubProofVerifier,
};
pub use resolution::{
    ProofResolution, ProofSubmission, Resolution, ResolutionCommand,
    ResolutionStrategy, RevealResolution, RevealSubmission,
};
