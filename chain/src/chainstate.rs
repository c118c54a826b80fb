//! `BlockChain`: the thread-safe coordinator clients of this library talk
//! to. Wraps a `ChainStore` and adds the invariants the store alone cannot
//! enforce: atomic append, duplicate rejection, and whole-chain
//! consistency checking.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::block::{Block, BlockHash, FileHash, file_hash_of};
use crate::error::{ChainError, DuplicateBlockError, SectionInconsistent, StoreError};
use crate::hash::digest_block;
use crate::store::ChainStore;

pub struct BlockChain<S: ChainStore> {
    store: S,
    /// Held across: read head -> walk for duplicates -> write block ->
    /// write head. Reads never need this lock because blocks are
    /// immutable once written and the store serializes its own head
    /// access.
    add_lock: Mutex<()>,
}

impl<S: ChainStore> BlockChain<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            add_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Appends `block` to the chain after stamping it with the current
    /// head as `prev_hash`. Fails with `ChainError::Duplicate` — without
    /// mutating anything — if a block equal to this one (per `Block`'s
    /// `prev_hash`-ignoring equality) is already reachable from the head.
    pub fn add(&self, block: Block) -> Result<BlockHash, ChainError> {
        let _guard = self.add_lock.lock().expect("chain lock poisoned");

        let head = self.store.get_head()?;
        let candidate = Block {
            prev_hash: head,
            ..block
        };

        let mut cursor = head;
        while let Some(h) = cursor {
            let existing = self
                .store
                .get(&h)?
                .ok_or_else(|| StoreError::Corrupt(format!("missing block referenced by {h}")))?;
            if existing == candidate {
                return Err(DuplicateBlockError {
                    file_hash: candidate.file_hash,
                    ordinal: candidate.ordinal,
                }
                .into());
            }
            cursor = existing.prev_hash;
        }

        let hash = self.store.add(&candidate)?;
        self.store.set_head(hash)?;
        Ok(hash)
    }

    /// Walks the chain from the current head, collecting blocks whose
    /// `file_hash` matches until either `index_all` of the first matching
    /// block has been collected, or the chain ends.
    fn collect_file_blocks(&self, file_hash: &FileHash) -> Result<Vec<Block>, ChainError> {
        let mut collected = Vec::new();
        let mut target: Option<u32> = None;
        let mut cursor = self.store.get_head()?;

        while let Some(h) = cursor {
            let block = self
                .store
                .get(&h)?
                .ok_or_else(|| StoreError::Corrupt(format!("missing block referenced by {h}")))?;
            let next = block.prev_hash;
            if block.file_hash == *file_hash {
                if target.is_none() {
                    target = Some(block.index_all);
                }
                collected.push(block);
                if Some(collected.len() as u32) == target {
                    break;
                }
            }
            cursor = next;
        }

        Ok(collected)
    }

    /// Reports whether a complete, consistent set of blocks for
    /// `file_hash` is present, and if so how many blocks compose it.
    pub fn check_hash(&self, file_hash: &FileHash) -> Result<(bool, usize), ChainError> {
        let blocks = self.collect_file_blocks(file_hash)?;
        if blocks.is_empty() {
            return Ok((false, 0));
        }
        match validate_file_section(&blocks) {
            Ok(computed) if computed == *file_hash => Ok((true, blocks.len())),
            _ => Ok((false, 0)),
        }
    }

    /// Returns every block belonging to `file_hash`, sorted by ordinal.
    /// Empty if the file is absent.
    pub fn get(&self, file_hash: &FileHash) -> Result<Vec<Block>, ChainError> {
        let mut blocks = self.collect_file_blocks(file_hash)?;
        blocks.sort_by_key(|b| b.ordinal);
        Ok(blocks)
    }

    /// Verifies the whole chain: every block's content hash must match the
    /// hash under which it is stored (tamper-evidence), the walk from head
    /// must terminate at the sentinel without a missing link, and every
    /// distinct file present must pass `check_hash`.
    pub fn check_chain(&self) -> Result<(bool, usize), ChainError> {
        let mut file_hashes = HashSet::new();
        let mut cursor = self.store.get_head()?;

        while let Some(h) = cursor {
            let block = match self.store.get(&h) {
                Ok(Some(block)) => block,
                Ok(None) | Err(_) => return Ok((false, 0)),
            };
            if BlockHash(digest_block(&block)) != h {
                return Ok((false, 0));
            }
            file_hashes.insert(block.file_hash);
            cursor = block.prev_hash;
        }

        for file_hash in &file_hashes {
            match self.check_hash(file_hash) {
                Ok((true, _)) => {}
                _ => return Ok((false, 0)),
            }
        }

        Ok((true, file_hashes.len()))
    }

    pub fn size(&self) -> Result<usize, ChainError> {
        Ok(self.store.size()?)
    }
}

/// Fails if `blocks` is empty, if any two share an ordinal, or if they
/// disagree on `file_hash`, `index_all`, or `filename`. Otherwise returns
/// the SHA-256 of the chunks concatenated in ordinal order (the caller
/// compares this against the claimed `file_hash`).
pub fn validate_file_section(blocks: &[Block]) -> Result<FileHash, SectionInconsistent> {
    let first = blocks.first().ok_or(SectionInconsistent { reason: "empty" })?;

    let mut seen_ordinals = HashSet::new();
    for block in blocks {
        if !seen_ordinals.insert(block.ordinal) {
            return Err(SectionInconsistent {
                reason: "duplicate ordinal",
            });
        }
        if block.file_hash != first.file_hash {
            return Err(SectionInconsistent {
                reason: "file_hash mismatch",
            });
        }
        if block.index_all != first.index_all {
            return Err(SectionInconsistent {
                reason: "index_all mismatch",
            });
        }
        if block.filename != first.filename {
            return Err(SectionInconsistent {
                reason: "filename mismatch",
            });
        }
    }

    let mut ordered: Vec<&Block> = blocks.iter().collect();
    ordered.sort_by_key(|b| b.ordinal);
    let mut hasher_input: Vec<u8> = Vec::new();
    for block in ordered {
        hasher_input.extend_from_slice(&block.chunk);
    }
    Ok(file_hash_of(&hasher_input))
}
