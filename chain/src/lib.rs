//! Content-addressed, append-only block chain file store.
//!
//! This crate provides the core building blocks shared by the `server` and
//! `client` binaries:
//!
//! - strongly-typed blocks and hashes with a canonical wire/storage
//!   encoding (`block`, `hash`, `codec`),
//! - two `ChainStore` backends, in-memory and on-disk (`store`),
//! - the thread-safe `BlockChain` coordinator (`chainstate`),
//! - the length-prefixed, typed wire protocol (`protocol`).

pub mod block;
pub mod chainstate;
pub mod codec;
pub mod config;
pub mod error;
pub mod hash;
pub mod protocol;
pub mod store;

pub use block::{Block, BlockHash, CHUNK_SIZE, FileHash, file_hash_of};
pub use chainstate::{BlockChain, validate_file_section};
pub use config::StorageConfig;
pub use error::{ChainError, DecodeError, DuplicateBlockError, SectionInconsistent, StoreError};
pub use store::{ChainStore, FileStore, MemoryStore};

/// Splits `data` into `CHUNK_SIZE`-byte blocks for `filename`, with
/// `file_hash` computed over the whole of `data` and every block's
/// `prev_hash` left unset — the chain coordinator stamps that in on
/// `add`. Returns an empty vector for empty input (there is no file with
/// zero blocks to describe).
pub fn chunk_file(filename: &str, data: &[u8]) -> Vec<Block> {
    if data.is_empty() {
        return Vec::new();
    }
    let file_hash = file_hash_of(data);
    let chunks: Vec<&[u8]> = data.chunks(CHUNK_SIZE).collect();
    let index_all = chunks.len() as u32;
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| Block {
            file_hash,
            index_all,
            ordinal: i as u32,
            chunk: chunk.to_vec(),
            filename: filename.to_string(),
            prev_hash: None,
        })
        .collect()
}
