//! Proof Public Inputs
//!
//! Encodes the on-record commitments and the claimed outcome as BN254 field
//! elements. This is everything a winner proof is checked against; the
//! moves themselves never appear.

use crate::core::field::{self, Fp254};
use crate::game::moves::Outcome;
use crate::game::state::Commitment;

/// Public inputs for winner proof verification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProofPublicInputs {
    /// Party A's commitment.
    pub commitment_a: Fp254,

    /// Party B's commitment.
    pub commitment_b: Fp254,

    /// Outcome code (0 = draw, 1 = party A, 2 = party B).
    pub winner: Fp254,
}

impl ProofPublicInputs {
    /// Build public inputs for a claimed outcome.
    ///
    /// `None` if either commitment is not a field element. The encoding is
    /// exact, so two different commitments never share public inputs.
    pub fn new(commitment_a: &Commitment, commitment_b: &Commitment, winner: Outcome) -> Option<Self> {
        Some(Self {
            commitment_a: field::from_bytes(commitment_a.as_bytes())?,
            commitment_b: field::from_bytes(commitment_b.as_bytes())?,
            winner: Fp254::from(winner.code() as u64),
        })
    }

    /// Outcome attested by these inputs.
    ///
    /// `None` if the winner element is not a valid outcome code.
    pub fn outcome(&self) -> Option<Outcome> {
        [Outcome::Draw, Outcome::PartyA, Outcome::PartyB]
            .into_iter()
            .find(|outcome| Fp254::from(outcome.code() as u64) == self.winner)
    }

    /// Check that these inputs commit to exactly the given pair.
    pub fn binds(&self, commitment_a: &Commitment, commitment_b: &Commitment) -> bool {
        field::from_bytes(commitment_a.as_bytes()) == Some(self.commitment_a)
            && field::from_bytes(commitment_b.as_bytes()) == Some(self.commitment_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::moves::Move;
    use crate::proof::commitment::{CommitmentScheme, FieldCommitment, Secret};

    fn pair() -> (Commitment, Commitment) {
        (
            FieldCommitment.commit(Move::Rock, &Secret::from_bytes(b"a".to_vec())),
            FieldCommitment.commit(Move::Paper, &Secret::from_bytes(b"b".to_vec())),
        )
    }

    #[test]
    fn test_outcome_readback() {
        let (a, b) = pair();
        assert_eq!(ProofPublicInputs::new(&a, &b, Outcome::PartyB).unwrap().outcome(), Some(Outcome::PartyB));
        assert_eq!(ProofPublicInputs::new(&a, &b, Outcome::Draw).unwrap().outcome(), Some(Outcome::Draw));

        let mut bogus = ProofPublicInputs::new(&a, &b, Outcome::PartyA).unwrap();
        bogus.winner = Fp254::from(3u64);
        assert_eq!(bogus.outcome(), None);
    }

    #[test]
    fn test_malformed_commitment_has_no_inputs() {
        let (a, _) = pair();
        assert_eq!(ProofPublicInputs::new(&a, &Commitment::new([0xFF; 32]), Outcome::Draw), None);
    }

    #[test]
    fn test_binds_exact_pair() {
        let (a, b) = pair();
        let inputs = ProofPublicInputs::new(&a, &b, Outcome::PartyB).unwrap();
        assert!(inputs.binds(&a, &b));
        assert!(!inputs.binds(&b, &a));

        // Flipping the top byte of a canonical value never aliases it.
        let mut other = b;
        other.0[31] ^= 0x80;
        assert!(!inputs.binds(&a, &other));
    }
}
