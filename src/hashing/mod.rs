//! BLAKE3 helpers for cache keys and log fingerprints.

use blake3::Hasher;

use crate::model::ModelCandidate;

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Used for in-memory cache keys only. A collision costs a wrong cached corpus for one
/// candidate, never data loss, and at the cache sizes used here the probability is
/// negligible (`P ≈ n² / 2^65`).
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    finalize_u64(blake3::hash(data))
}

/// Hashes a candidate's id together with every corpus key the metadata scorer reads.
///
/// Fields are length-prefixed so `("ab", "c")` and `("a", "bc")` never collide.
pub fn hash_corpus_key(candidate: &ModelCandidate) -> u64 {
    let mut hasher = Hasher::new();
    update_field(&mut hasher, candidate.id.as_bytes());
    update_field(&mut hasher, candidate.name.as_bytes());
    update_field(&mut hasher, candidate.description.as_bytes());

    hasher.update(&(candidate.class_histogram.len() as u64).to_le_bytes());
    for entry in &candidate.class_histogram {
        update_field(&mut hasher, entry.name.as_bytes());
        hasher.update(&entry.count.to_le_bytes());
    }

    finalize_u64(hasher.finalize())
}

/// Short hex fingerprint of an image payload, for log correlation.
pub fn image_fingerprint(image: &[u8]) -> String {
    blake3::hash(image).to_hex()[..16].to_string()
}

#[inline]
fn update_field(hasher: &mut Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

#[inline]
fn finalize_u64(hash: blake3::Hash) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}
