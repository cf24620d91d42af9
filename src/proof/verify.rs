//! Verification API
//!
//! Interface to the external winner-proof verifier.
//! The engine only ever sees the boolean answer; the proof system itself
//! lives outside this crate.

use std::sync::Arc;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::game::moves::resolve;
use crate::proof::commitment::{FieldCommitment, MoveOpening};
use crate::proof::public_inputs::ProofPublicInputs;

/// Interface for winner proof verification.
///
/// Implementations attest that the prover knows openings of both
/// commitments whose moves produce `public_inputs.winner`.
pub trait ProofVerifier {
    /// Verify a proof against public inputs.
    fn verify_proof(
        &self,
        public_inputs: &ProofPublicInputs,
        proof: &[u8],
    ) -> Result<bool, ProofVerificationError>;
}

impl<T: ProofVerifier + ?Sized> ProofVerifier for Box<T> {
    fn verify_proof(
        &self,
        public_inputs: &ProofPublicInputs,
        proof: &[u8],
    ) -> Result<bool, ProofVerificationError> {
        (**self).verify_proof(public_inputs, proof)
    }
}

impl<T: ProofVerifier + ?Sized> ProofVerifier for Arc<T> {
    fn verify_proof(
        &self,
        public_inputs: &ProofPublicInputs,
        proof: &[u8],
    ) -> Result<bool, ProofVerificationError> {
        (**self).verify_proof(public_inputs, proof)
    }
}

/// Errors during proof verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofVerificationError {
    /// Proof format is invalid.
    #[error("invalid proof format")]
    InvalidProofFormat,
    /// Public inputs don't match proof.
    #[error("public input mismatch")]
    PublicInputMismatch,
}

/// Stub verifier for testing (always returns true for valid format).
///
/// Accepts any non-empty proof.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubProofVerifier;

impl ProofVerifier for StubProofVerifier {
    fn verify_proof(
        &self,
        _public_inputs: &ProofPublicInputs,
        proof: &[u8],
    ) -> Result<bool, ProofVerificationError> {
        if proof.is_empty() {
            return Err(ProofVerificationError::InvalidProofFormat);
        }
        Ok(true)
    }
}

/// Verifier that rejects everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectingVerifier;

impl ProofVerifier for RejectingVerifier {
    fn verify_proof(
        &self,
        _public_inputs: &ProofPublicInputs,
        _proof: &[u8],
    ) -> Result<bool, ProofVerificationError> {
        Ok(false)
    }
}

// =============================================================================
// REPLAY VERIFIER
// =============================================================================

/// Both commitment openings, bincode-encoded as a development "proof".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofWitness {
    /// Party A's opening.
    pub opening_a: MoveOpening,
    /// Party B's opening.
    pub opening_b: MoveOpening,
}

impl ProofWitness {
    /// Create a witness.
    pub fn new(opening_a: MoveOpening, opening_b: MoveOpening) -> Self {
        Self { opening_a, opening_b }
    }

    /// Encode as proof bytes.
    pub fn to_proof_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }
}

/// Verification by replay.
///
/// Decodes a [`ProofWitness`], recomputes both field commitments and the
/// winner, and checks them against the public inputs. The witness reveals
/// both moves, so this is for local play and tests, not production privacy.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplayProofVerifier;

impl ProofVerifier for ReplayProofVerifier {
    fn verify_proof(
        &self,
        public_inputs: &ProofPublicInputs,
        proof: &[u8],
    ) -> Result<bool, ProofVerificationError> {
        let witness: ProofWitness = bincode::deserialize(proof)
            .map_err(|_| ProofVerificationError::InvalidProofFormat)?;

        let commitment_a = witness.opening_a.commitment(&FieldCommitment);
        let commitment_b = witness.opening_b.commitment(&FieldCommitment);
        if !public_inputs.binds(&commitment_a, &commitment_b) {
            return Ok(false);
        }

        let claimed = public_inputs
            .outcome()
            .ok_or(ProofVerificationError::PublicInputMismatch)?;

        Ok(resolve(witness.opening_a.mv, witness.opening_b.mv) == claimed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::moves::{Move, Outcome};
    use crate::proof::commitment::Secret;

    fn witness(a: Move, b: Move) -> ProofWitness {
        ProofWitness::new(
            MoveOpening { mv: a, secret: Secret::from_bytes(b"alice".to_vec()) },
            MoveOpening { mv: b, secret: Secret::from_bytes(b"bob".to_vec()) },
        )
    }

    fn inputs_for(w: &ProofWitness, outcome: Outcome) -> ProofPublicInputs {
        ProofPublicInputs::new(
            &w.opening_a.commitment(&FieldCommitment),
            &w.opening_b.commitment(&FieldCommitment),
            outcome,
        )
        .unwrap()
    }

    #[test]
    fn test_stub_verifier() {
        let verifier = StubProofVerifier;
        let inputs = ProofPublicInputs::default();

        assert_eq!(
            verifier.verify_proof(&inputs, &[]),
            Err(ProofVerificationError::InvalidProofFormat)
        );
        assert_eq!(verifier.verify_proof(&inputs, &[1, 2, 3]), Ok(true));
    }

    #[test]
    fn test_rejecting_verifier() {
        assert_eq!(RejectingVerifier.verify_proof(&ProofPublicInputs::default(), &[1]), Ok(false));
    }

    #[test]
    fn test_replay_accepts_correct_winner() {
        let w = witness(Move::Rock, Move::Scissors);
        let proof = w.to_proof_bytes().unwrap();
        assert_eq!(ReplayProofVerifier.verify_proof(&inputs_for(&w, Outcome::PartyA), &proof), Ok(true));
    }

    #[test]
    fn test_replay_rejects_wrong_winner() {
        let w = witness(Move::Rock, Move::Scissors);
        let proof = w.to_proof_bytes().unwrap();
        assert_eq!(ReplayProofVerifier.verify_proof(&inputs_for(&w, Outcome::PartyB), &proof), Ok(false));
        assert_eq!(ReplayProofVerifier.verify_proof(&inputs_for(&w, Outcome::Draw), &proof), Ok(false));
    }

    #[test]
    fn test_replay_rejects_foreign_commitments() {
        let w = witness(Move::Paper, Move::Paper);
        let other = witness(Move::Rock, Move::Rock);
        let proof = w.to_proof_bytes().unwrap();
        assert_eq!(
            ReplayProofVerifier.verify_proof(&inputs_for(&other, Outcome::Draw), &proof),
            Ok(false)
        );
    }

    #[test]
    fn test_replay_rejects_garbage() {
        assert_eq!(
            ReplayProofVerifier.verify_proof(&ProofPublicInputs::default(), &[0xFF]),
            Err(ProofVerificationError::InvalidProofFormat)
        );
    }

    #[test]
    fn test_boxed_verifier() {
        let boxed: Box<dyn ProofVerifier> = Box::new(RejectingVerifier);
        assert_eq!(boxed.verify_proof(&ProofPublicInputs::default(), &[1]), Ok(false));
    }
}
