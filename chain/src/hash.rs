//! SHA-256 hashing helpers.
//!
//! Deterministic across processes and platforms: the same byte sequence
//! always yields the same digest, feeding chunks into the hasher in order
//! rather than concatenating them first.

use sha2::{Digest, Sha256};

use crate::block::Block;

/// Feeds each chunk into SHA-256 in order and returns the 32-byte digest.
pub fn digest_chunks<'a, I>(chunks: I) -> [u8; 32]
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut hasher = Sha256::new();
    for chunk in chunks {
        hasher.update(chunk);
    }
    hasher.finalize().into()
}

/// Convenience wrapper for a single byte slice.
pub fn digest_bytes(bytes: &[u8]) -> [u8; 32] {
    digest_chunks(std::iter::once(bytes))
}

/// Serializes `block` canonically (including `prev_hash`) and hashes the
/// result. This is the block's content hash and the basis of chain
/// tamper-evidence: changing any field, including the back-reference,
/// changes the hash.
pub fn digest_block(block: &Block) -> [u8; 32] {
    digest_bytes(&block.canonical_bytes())
}
