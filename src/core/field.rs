//! Poseidon Hashing over BN254
//!
//! Native (non-circuit) Poseidon for proof-flow commitments. The same hash
//! is what a BN254 winner circuit recomputes, so a commitment on record can
//! be fed to the verifier as a single public field element.
//!
//! # Security Parameters
//!
//! - Field: BN254 scalar field (254-bit prime)
//! - Full rounds: 8
//! - Partial rounds: 57
//! - S-box: x^5
//! - Rate 2, capacity 1

use std::sync::OnceLock;

use ark_crypto_primitives::sponge::{
    CryptographicSponge,
    poseidon::{PoseidonConfig, PoseidonSponge, find_poseidon_ark_and_mds},
};
use ark_ff::{BigInt, BigInteger, PrimeField};

pub use ark_bn254::Fr as Fp254;

/// Bytes packed into one field element. 31 bytes always fit below the modulus.
pub const BYTES_PER_LIMB: usize = 31;

/// Cached Poseidon config, built once on first use.
static POSEIDON_CONFIG: OnceLock<PoseidonConfig<Fp254>> = OnceLock::new();

/// Poseidon config (8/57 rounds, alpha 5, rate 2, capacity 1).
pub fn poseidon_config() -> &'static PoseidonConfig<Fp254> {
    POSEIDON_CONFIG.get_or_init(|| {
        let (ark, mds) = find_poseidon_ark_and_mds::<Fp254>(254, 2, 8, 57, 0);
        PoseidonConfig::new(8, 57, 5, mds, ark, 2, 1)
    })
}

/// Hash a sequence of field elements to one element.
///
/// Elements are absorbed one at a time; callers that need variable-length
/// input must absorb the length themselves.
pub fn hash_many(inputs: &[Fp254]) -> Fp254 {
    let mut sponge = PoseidonSponge::<Fp254>::new(poseidon_config());
    for input in inputs {
        sponge.absorb(input);
    }
    // Squeezing n elements always yields exactly n.
    sponge.squeeze_field_elements::<Fp254>(1)[0]
}

// =============================================================================
// ENCODING
// =============================================================================

/// Pack a byte string into field elements, 31 bytes per limb (little-endian).
pub fn pack_bytes(bytes: &[u8]) -> Vec<Fp254> {
    bytes
        .chunks(BYTES_PER_LIMB)
        .map(Fp254::from_le_bytes_mod_order)
        .collect()
}

/// Encode a field element as 32 little-endian bytes.
pub fn to_bytes(value: &Fp254) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    for (dst, src) in bytes.iter_mut().zip(value.into_bigint().to_bytes_le()) {
        *dst = src;
    }
    bytes
}

/// Decode 32 little-endian bytes into a field element.
///
/// Returns `None` unless the value is below the modulus, so every field
/// element has exactly one byte encoding.
pub fn from_bytes(bytes: &[u8; 32]) -> Option<Fp254> {
    let mut limbs = [0u64; 4];
    for (limb, chunk) in limbs.iter_mut().zip(bytes.chunks_exact(8)) {
        *limb = u64::from_le_bytes(chunk.try_into().ok()?);
    }
    Fp254::from_bigint(BigInt::new(limbs))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let inputs = [Fp254::from(3u64), Fp254::from(4u64)];
        assert_eq!(hash_many(&inputs), hash_many(&inputs));
    }

    #[test]
    fn test_hash_order_and_arity_matter() {
        let (a, b) = (Fp254::from(3u64), Fp254::from(4u64));
        assert_ne!(hash_many(&[a, b]), hash_many(&[b, a]));
        assert_ne!(hash_many(&[a]), hash_many(&[a, Fp254::from(0u64)]));
        assert_ne!(hash_many(&[a]), hash_many(&[b]));
    }

    #[test]
    fn test_bytes_roundtrip() {
        let value = hash_many(&[Fp254::from(42u64)]);
        assert_eq!(from_bytes(&to_bytes(&value)), Some(value));
        assert_eq!(to_bytes(&Fp254::from(1u64))[0], 1);
    }

    #[test]
    fn test_non_canonical_bytes_rejected() {
        assert_eq!(from_bytes(&[0xFF; 32]), None);

        // modulus itself is the smallest non-canonical value
        let modulus = Fp254::MODULUS.to_bytes_le();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&modulus);
        assert_eq!(from_bytes(&bytes), None);
    }

    #[test]
    fn test_pack_bytes_limbs() {
        let limbs = pack_bytes(&[0xFF; 40]);
        assert_eq!(limbs.len(), 2);
        assert_eq!(limbs[1], Fp254::from_le_bytes_mod_order(&[0xFF; 9]));
        assert!(pack_bytes(&[]).is_empty());
    }
}
