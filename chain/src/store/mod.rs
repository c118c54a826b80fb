//! Persistence abstraction keyed by block hash.
//!
//! Both implementations (`MemoryStore`, `FileStore`) are safe to share
//! across threads: blocks are immutable once written, so `get` never needs
//! to synchronize with a concurrent write to the same key, and each
//! implementation serializes its own head reads/writes internally.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::block::{Block, BlockHash};
use crate::error::StoreError;

/// Contract shared by every block store backend.
pub trait ChainStore: Send + Sync {
    /// Fetches a block by hash. `None` for a missing hash.
    fn get(&self, hash: &BlockHash) -> Result<Option<Block>, StoreError>;

    /// Stores `block` under its own content hash, returning that hash.
    /// Rewriting an existing hash is permitted by the store (the same
    /// bytes are simply overwritten); the chain coordinator is what
    /// prevents a duplicate block from ever reaching this call with an
    /// already-used hash for *different* content.
    fn add(&self, block: &Block) -> Result<BlockHash, StoreError>;

    /// Current chain head, or `None` for an empty chain.
    fn get_head(&self) -> Result<Option<BlockHash>, StoreError>;

    /// Updates the current chain head.
    fn set_head(&self, hash: BlockHash) -> Result<(), StoreError>;

    /// Number of blocks currently stored.
    fn size(&self) -> Result<usize, StoreError>;
}

impl ChainStore for Box<dyn ChainStore> {
    fn get(&self, hash: &BlockHash) -> Result<Option<Block>, StoreError> {
        (**self).get(hash)
    }

    fn add(&self, block: &Block) -> Result<BlockHash, StoreError> {
        (**self).add(block)
    }

    fn get_head(&self) -> Result<Option<BlockHash>, StoreError> {
        (**self).get_head()
    }

    fn set_head(&self, hash: BlockHash) -> Result<(), StoreError> {
        (**self).set_head(hash)
    }

    fn size(&self) -> Result<usize, StoreError> {
        (**self).size()
    }
}
