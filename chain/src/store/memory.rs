//! In-memory block store.
//!
//! Useful for unit tests, benchmarks, and servers that don't need
//! durability across restarts. Blocks live in a `HashMap` guarded by a
//! reader/writer lock; the head pointer has its own lock so readers of
//! the block map are never blocked by a head update and vice versa.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::block::{Block, BlockHash};
use crate::error::StoreError;
use crate::hash::digest_block;

use super::ChainStore;

#[derive(Default)]
pub struct MemoryStore {
    blocks: RwLock<HashMap<BlockHash, Block>>,
    head: RwLock<Option<BlockHash>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChainStore for MemoryStore {
    fn get(&self, hash: &BlockHash) -> Result<Option<Block>, StoreError> {
        let blocks = self.blocks.read().expect("memory store lock poisoned");
        Ok(blocks.get(hash).cloned())
    }

    fn add(&self, block: &Block) -> Result<BlockHash, StoreError> {
        let hash = BlockHash(digest_block(block));
        let mut blocks = self.blocks.write().expect("memory store lock poisoned");
        blocks.insert(hash, block.clone());
        Ok(hash)
    }

    fn get_head(&self) -> Result<Option<BlockHash>, StoreError> {
        Ok(*self.head.read().expect("memory store lock poisoned"))
    }

    fn set_head(&self, hash: BlockHash) -> Result<(), StoreError> {
        *self.head.write().expect("memory store lock poisoned") = Some(hash);
        Ok(())
    }

    fn size(&self) -> Result<usize, StoreError> {
        Ok(self.blocks.read().expect("memory store lock poisoned").len())
    }
}
