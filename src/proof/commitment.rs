//! Move Commitment Schemes
//!
//! Commit to a move before the opponent's move is known.
//! Reveal (or prove) and verify once both commitments are on record.

use std::fmt;

use rand::RngCore;
use serde::{Serialize, Deserialize, Serializer, Deserializer};
use sha2::{Sha256, Digest};

use crate::core::field::{self, Fp254};
use crate::game::error::GameError;
use crate::game::moves::Move;
use crate::game::state::Commitment;

/// Domain separator for reveal-flow commitments.
const REVEAL_COMMIT_DOMAIN: &[u8] = b"RPS_REVEAL_COMMIT_V1";

/// Domain tag absorbed first by proof-flow commitments ("RPS1").
const FIELD_COMMIT_TAG: u64 = 0x5250_5331;

/// Length of generated secrets.
pub const SECRET_LEN: usize = 32;

// =============================================================================
// SECRET
// =============================================================================

/// Blinding secret kept private until reveal.
///
/// `Debug` never prints the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Vec<u8>);

impl Secret {
    /// Wrap caller-supplied bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Draw a fresh 32-byte secret from the OS RNG.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; SECRET_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Hex encoding, for handing the secret back to its owner.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse a hex-encoded secret.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(s.trim_start_matches("0x")).map(Self)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(<{} bytes>)", self.0.len())
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Secret::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// SCHEMES
// =============================================================================

/// A deterministic, binding, hiding commitment to a move.
pub trait CommitmentScheme {
    /// Scheme name for log lines.
    fn name(&self) -> &'static str;

    /// Commit to `(mv, secret)`.
    fn commit(&self, mv: Move, secret: &Secret) -> Commitment;

    /// Commit to a raw move code, rejecting codes outside the move set
    /// before anything is hashed.
    fn commit_raw(&self, code: u8, secret: &Secret) -> Result<Commitment, GameError> {
        let mv = Move::from_code(code)?;
        Ok(self.commit(mv, secret))
    }

    /// Check a disclosed `(mv, secret)` against a published commitment.
    fn verify_reveal(&self, commitment: &Commitment, mv: Move, secret: &Secret) -> bool {
        self.commit(mv, secret) == *commitment
    }
}

/// SHA-256 commitments for the reveal flow.
///
/// `SHA256(domain || move_code || secret)`. The move code is one fixed-width
/// byte, so the encoding is unambiguous without a length prefix.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Commitment;

impl CommitmentScheme for Sha256Commitment {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn commit(&self, mv: Move, secret: &Secret) -> Commitment {
        let mut hasher = Sha256::new();
        hasher.update(REVEAL_COMMIT_DOMAIN);
        hasher.update([mv.code()]);
        hasher.update(secret.as_bytes());
        Commitment::new(hasher.finalize().into())
    }
}

/// Poseidon commitments over BN254 for the proof flow.
///
/// `Poseidon(tag, move_code, secret_len, secret limbs...)`, secret packed in
/// 31-byte limbs. The commitment is the canonical 32-byte encoding of one
/// field element, so it maps one-to-one onto a proof public input.
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldCommitment;

impl FieldCommitment {
    /// Whether `commitment` is the encoding of a field element at all.
    ///
    /// Anything else can never be produced by [`commit`](CommitmentScheme::commit)
    /// and has no public-input form.
    pub fn is_well_formed(commitment: &Commitment) -> bool {
        field::from_bytes(commitment.as_bytes()).is_some()
    }
}

impl CommitmentScheme for FieldCommitment {
    fn name(&self) -> &'static str {
        "poseidon-bn254"
    }

    fn commit(&self, mv: Move, secret: &Secret) -> Commitment {
        let bytes = secret.as_bytes();
        let mut inputs = Vec::with_capacity(3 + bytes.len() / field::BYTES_PER_LIMB + 1);
        inputs.push(Fp254::from(FIELD_COMMIT_TAG));
        inputs.push(Fp254::from(mv.code() as u64));
        inputs.push(Fp254::from(bytes.len() as u64));
        inputs.extend(field::pack_bytes(bytes));
        Commitment::new(field::to_bytes(&field::hash_many(&inputs)))
    }
}

/// A move together with the secret that opens its commitment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOpening {
    /// The move.
    pub mv: Move,
    /// Blinding secret.
    pub secret: Secret,
}

impl MoveOpening {
    /// Pair a move with a fresh random secret.
    pub fn generate(mv: Move) -> Self {
        Self { mv, secret: Secret::generate() }
    }

    /// Commitment under a scheme.
    pub fn commitment<S: CommitmentScheme + ?Sized>(&self, scheme: &S) -> Commitment {
        scheme.commit(self.mv, &self.secret)
    }
}
