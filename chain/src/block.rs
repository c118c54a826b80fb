//! Block type, strongly-typed hashes, and the canonical block encoding.

use std::fmt;

use crate::codec::{Cursor, write_bytes, write_string, write_u32, write_u8};
use crate::error::DecodeError;
use crate::hash::{digest_block, digest_bytes};

/// Maximum chunk size carried by a single block. Protocol-constant: every
/// implementation must agree on this value to compute identical file
/// hashes for the same underlying file.
pub const CHUNK_SIZE: usize = 500;

/// A 32-byte SHA-256 digest, rendered as 64 lowercase hex characters.
fn to_hex(bytes: &[u8; 32]) -> String {
    hex::encode(bytes)
}

fn from_hex(s: &str) -> Result<[u8; 32], DecodeError> {
    let bytes = hex::decode(s).map_err(|_| DecodeError::Malformed("hex hash"))?;
    bytes
        .try_into()
        .map_err(|_| DecodeError::Malformed("hash length"))
}

/// Content hash of a block's canonical encoding (including `prev_hash`).
/// Because `prev_hash` is part of the encoding, a `BlockHash` depends on
/// the entire history up to and including this block.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct BlockHash(pub [u8; 32]);

impl BlockHash {
    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, DecodeError> {
        Ok(Self(from_hex(s)?))
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", self.to_hex())
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// SHA-256 of a file's concatenated chunks. Shared by every block of that
/// file and used to name files in client commands.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct FileHash(pub [u8; 32]);

impl FileHash {
    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, DecodeError> {
        Ok(Self(from_hex(s)?))
    }
}

impl fmt::Debug for FileHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileHash({})", self.to_hex())
    }
}

impl fmt::Display for FileHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A slice of a file plus identifying metadata and a back-reference to the
/// previously inserted block in the whole chain. Immutable once
/// constructed.
///
/// Equality deliberately ignores `prev_hash`: identity of a block as "the
/// same datum" is `(file_hash, index_all, ordinal, chunk, filename)`. This
/// is what lets the chain tell a duplicate submission apart from a block
/// that is merely inserted at a different point in history.
#[derive(Clone, Debug)]
pub struct Block {
    pub file_hash: FileHash,
    pub index_all: u32,
    pub ordinal: u32,
    pub chunk: Vec<u8>,
    pub filename: String,
    pub prev_hash: Option<BlockHash>,
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.file_hash == other.file_hash
            && self.index_all == other.index_all
            && self.ordinal == other.ordinal
            && self.chunk == other.chunk
            && self.filename == other.filename
    }
}

impl Eq for Block {}

impl Block {
    /// Canonical, length-prefixed encoding: `file_hash`, `index_all`,
    /// `ordinal`, `filename`, `chunk`, `prev_hash` (sentinel encoded as a
    /// one-byte absent marker). This is used for both hashing and on-disk
    /// storage.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64 + self.chunk.len() + self.filename.len());
        buf.extend_from_slice(&self.file_hash.0);
        write_u32(&mut buf, self.index_all);
        write_u32(&mut buf, self.ordinal);
        write_string(&mut buf, &self.filename);
        write_bytes(&mut buf, &self.chunk);
        match &self.prev_hash {
            None => write_u8(&mut buf, 0),
            Some(h) => {
                write_u8(&mut buf, 1);
                buf.extend_from_slice(&h.0);
            }
        }
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut cur = Cursor::new(bytes);
        let file_hash = FileHash(cur.read_exact(32)?.try_into().unwrap());
        let index_all = cur.read_u32()?;
        let ordinal = cur.read_u32()?;
        let filename = cur.read_string()?;
        let chunk = cur.read_bytes()?;
        let prev_hash = match cur.read_u8()? {
            0 => None,
            1 => Some(BlockHash(cur.read_exact(32)?.try_into().unwrap())),
            _ => return Err(DecodeError::Malformed("prev_hash presence byte")),
        };
        cur.expect_exhausted()?;
        Ok(Block {
            file_hash,
            index_all,
            ordinal,
            chunk,
            filename,
            prev_hash,
        })
    }

    /// Content hash of this block, including `prev_hash`.
    pub fn hash(&self) -> BlockHash {
        BlockHash(digest_block(self))
    }
}

/// SHA-256 of `data`, the basis of a file's `FileHash`.
pub fn file_hash_of(data: &[u8]) -> FileHash {
    FileHash(digest_bytes(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block(ordinal: u32, prev: Option<BlockHash>) -> Block {
        Block {
            file_hash: FileHash([7u8; 32]),
            index_all: 3,
            ordinal,
            chunk: vec![1, 2, 3, 4],
            filename: "report.pdf".to_string(),
            prev_hash: prev,
        }
    }

    #[test]
    fn decode_encode_roundtrip() {
        let block = sample_block(1, Some(BlockHash([9u8; 32])));
        let bytes = block.canonical_bytes();
        let decoded = Block::decode(&bytes).unwrap();
        assert_eq!(decoded, block);
        assert_eq!(decoded.prev_hash, block.prev_hash);
    }

    #[test]
    fn decode_encode_roundtrip_no_prev() {
        let block = sample_block(0, None);
        let bytes = block.canonical_bytes();
        let decoded = Block::decode(&bytes).unwrap();
        assert_eq!(decoded, block);
        assert!(decoded.prev_hash.is_none());
    }

    #[test]
    fn equality_ignores_prev_hash() {
        let a = sample_block(0, None);
        let b = sample_block(0, Some(BlockHash([1u8; 32])));
        assert_eq!(a, b);
    }

    #[test]
    fn hash_depends_on_prev_hash() {
        let a = sample_block(0, None);
        let b = sample_block(0, Some(BlockHash([1u8; 32])));
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn hash_is_deterministic() {
        let a = sample_block(2, None);
        assert_eq!(a.hash(), a.hash());
    }

    #[test]
    fn decode_rejects_truncated_bytes() {
        let block = sample_block(0, None);
        let mut bytes = block.canonical_bytes();
        bytes.truncate(bytes.len() - 1);
        assert!(Block::decode(&bytes).is_err());
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        let block = sample_block(0, None);
        let mut bytes = block.canonical_bytes();
        bytes.push(0xff);
        assert!(matches!(
            Block::decode(&bytes),
            Err(DecodeError::TrailingBytes)
        ));
    }
}
