//! On-disk, two-level directory block store.
//!
//! A block whose hash is `ab<rest>` lives at `<root>/ab/<rest>` as
//! deflate-compressed canonical bytes. The head lives at `<root>/head` as
//! 64 hex characters with no trailing newline; an empty chain is
//! represented by the file's absence, not by a sentinel value written to
//! disk. Directory creation is idempotent. Head reads and writes are
//! serialized by a dedicated lock so they never interleave, independent of
//! however many block files are being read or written concurrently.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::block::{Block, BlockHash};
use crate::error::StoreError;
use crate::hash::digest_block;

use super::ChainStore;

const HEAD_FILE: &str = "head";

pub struct FileStore {
    root: PathBuf,
    head_lock: Mutex<()>,
}

impl FileStore {
    /// Opens (creating if necessary) a two-level directory store rooted at
    /// `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            head_lock: Mutex::new(()),
        })
    }

    /// Opens the conventional `./.blockchain` store.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open("./.blockchain")
    }

    fn block_path(&self, hash: &BlockHash) -> PathBuf {
        let hex = hash.to_hex();
        let (prefix, rest) = hex.split_at(2);
        self.root.join(prefix).join(rest)
    }

    fn head_path(&self) -> PathBuf {
        self.root.join(HEAD_FILE)
    }

    fn compress(bytes: &[u8]) -> Result<Vec<u8>, StoreError> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes)?;
        Ok(encoder.finish()?)
    }

    fn decompress(bytes: &[u8]) -> Result<Vec<u8>, StoreError> {
        let mut decoder = ZlibDecoder::new(bytes);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(out)
    }
}

fn read_if_present(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl ChainStore for FileStore {
    fn get(&self, hash: &BlockHash) -> Result<Option<Block>, StoreError> {
        let path = self.block_path(hash);
        match read_if_present(&path)? {
            None => Ok(None),
            Some(compressed) => {
                let bytes = Self::decompress(&compressed)?;
                Ok(Some(Block::decode(&bytes)?))
            }
        }
    }

    fn add(&self, block: &Block) -> Result<BlockHash, StoreError> {
        let hash = BlockHash(digest_block(block));
        let path = self.block_path(&hash);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let compressed = Self::compress(&block.canonical_bytes())?;
        fs::write(&path, compressed)?;
        Ok(hash)
    }

    fn get_head(&self) -> Result<Option<BlockHash>, StoreError> {
        let _guard = self.head_lock.lock().expect("head lock poisoned");
        match read_if_present(&self.head_path())? {
            None => Ok(None),
            Some(bytes) => {
                let text = String::from_utf8(bytes)
                    .map_err(|_| StoreError::Corrupt("head file is not valid utf-8".into()))?;
                let hash = BlockHash::from_hex(text.trim_end())
                    .map_err(|_| StoreError::Corrupt("head file is not a valid hash".into()))?;
                Ok(Some(hash))
            }
        }
    }

    fn set_head(&self, hash: BlockHash) -> Result<(), StoreError> {
        let _guard = self.head_lock.lock().expect("head lock poisoned");
        fs::write(self.head_path(), hash.to_hex())?;
        Ok(())
    }

    fn size(&self) -> Result<usize, StoreError> {
        let mut count = 0usize;
        for prefix_entry in fs::read_dir(&self.root)? {
            let prefix_entry = prefix_entry?;
            if !prefix_entry.file_type()?.is_dir() {
                continue;
            }
            for block_entry in fs::read_dir(prefix_entry.path())? {
                let block_entry = block_entry?;
                if block_entry.file_type()?.is_file() {
                    count += 1;
                }
            }
        }
        Ok(count)
    }
}
