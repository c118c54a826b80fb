//! Error types shared by the block store and chain coordinator.

use std::fmt;
use std::io;

use crate::block::FileHash;

/// Failure to decode a canonical block, hash, or protocol payload.
#[derive(Debug)]
pub enum DecodeError {
    /// The byte slice ended before the expected field was fully read.
    UnexpectedEof,
    /// A length-prefixed string was not valid UTF-8.
    InvalidUtf8,
    /// Bytes remained after decoding every expected field.
    TrailingBytes,
    /// A tag byte did not match any known variant.
    Malformed(&'static str),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnexpectedEof => write!(f, "unexpected end of input"),
            DecodeError::InvalidUtf8 => write!(f, "invalid utf-8 in length-prefixed string"),
            DecodeError::TrailingBytes => write!(f, "trailing bytes after decoded value"),
            DecodeError::Malformed(what) => write!(f, "malformed {what}"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Failure in a `ChainStore` implementation.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying filesystem or network I/O failure.
    Io(io::Error),
    /// Stored bytes could not be decoded as a canonical block.
    Decode(DecodeError),
    /// The store observed state that should be impossible (e.g. a
    /// `prev_hash` pointing at a block that is not physically present).
    Corrupt(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "store i/o error: {e}"),
            StoreError::Decode(e) => write!(f, "store decode error: {e}"),
            StoreError::Corrupt(msg) => write!(f, "store corrupted: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<DecodeError> for StoreError {
    fn from(e: DecodeError) -> Self {
        StoreError::Decode(e)
    }
}

/// A block comparing equal ignoring `prev_hash` is already present
/// somewhere in the chain.
#[derive(Debug)]
pub struct DuplicateBlockError {
    pub file_hash: FileHash,
    pub ordinal: u32,
}

impl fmt::Display for DuplicateBlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "duplicate block: file_hash={} ordinal={}",
            self.file_hash, self.ordinal
        )
    }
}

impl std::error::Error for DuplicateBlockError {}

/// A collection of blocks disagrees on `file_hash`/`index_all`/`filename`,
/// contains duplicate ordinals, or is empty when one was required.
#[derive(Debug)]
pub struct SectionInconsistent {
    pub reason: &'static str,
}

impl fmt::Display for SectionInconsistent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inconsistent file section: {}", self.reason)
    }
}

impl std::error::Error for SectionInconsistent {}

/// Top-level error returned by `BlockChain` operations.
#[derive(Debug)]
pub enum ChainError {
    Duplicate(DuplicateBlockError),
    Section(SectionInconsistent),
    Store(StoreError),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::Duplicate(e) => write!(f, "{e}"),
            ChainError::Section(e) => write!(f, "{e}"),
            ChainError::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<StoreError> for ChainError {
    fn from(e: StoreError) -> Self {
        ChainError::Store(e)
    }
}

impl From<DuplicateBlockError> for ChainError {
    fn from(e: DuplicateBlockError) -> Self {
        ChainError::Duplicate(e)
    }
}

impl From<SectionInconsistent> for ChainError {
    fn from(e: SectionInconsistent) -> Self {
        ChainError::Section(e)
    }
}
