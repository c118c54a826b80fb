//! Concrete payload shapes for each `(direction, kind)` combination.
//! `Block`'s own canonical encoding is reused directly for `SEND_FILE`; the
//! shapes here cover the rest.

use crate::block::{Block, FileHash};
use crate::codec::{Cursor, write_bytes, write_string, write_u32, write_u8};
use crate::error::DecodeError;

/// Severity of a `LOG_TEXT` message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_u8(self) -> u8 {
        match self {
            LogLevel::Info => 0,
            LogLevel::Warn => 1,
            LogLevel::Error => 2,
        }
    }

    fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(LogLevel::Info),
            1 => Some(LogLevel::Warn),
            2 => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Payload of a `LOG_TEXT` package: a severity level and a message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogText {
    pub level: LogLevel,
    pub message: String,
}

impl LogText {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Info,
            message: message.into(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Warn,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Error,
            message: message.into(),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        write_u8(&mut buf, self.level.as_u8());
        write_string(&mut buf, &self.message);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut cur = Cursor::new(bytes);
        let level =
            LogLevel::from_u8(cur.read_u8()?).ok_or(DecodeError::Malformed("log level"))?;
        let message = cur.read_string()?;
        cur.expect_exhausted()?;
        Ok(Self { level, message })
    }
}

/// `HASH_CHECK` / `GET_FILE` payload: a bare file hash.
pub fn encode_file_hash(hash: &FileHash) -> Vec<u8> {
    hash.0.to_vec()
}

pub fn decode_file_hash(bytes: &[u8]) -> Result<FileHash, DecodeError> {
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| DecodeError::Malformed("file hash length"))?;
    Ok(FileHash(arr))
}

/// `FILE_CHECK` payload: a list of blocks, each individually
/// length-prefixed so the list can be walked without re-parsing from the
/// canonical block encoding's own internal structure.
pub fn encode_block_list(blocks: &[Block]) -> Vec<u8> {
    let mut buf = Vec::new();
    write_u32(&mut buf, blocks.len() as u32);
    for block in blocks {
        write_bytes(&mut buf, &block.canonical_bytes());
    }
    buf
}

pub fn decode_block_list(bytes: &[u8]) -> Result<Vec<Block>, DecodeError> {
    let mut cur = Cursor::new(bytes);
    let count = cur.read_u32()?;
    let mut blocks = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let block_bytes = cur.read_bytes()?;
        blocks.push(Block::decode(&block_bytes)?);
    }
    cur.expect_exhausted()?;
    Ok(blocks)
}
