//! Storage backend selection shared by `server` and `client` binaries that
//! embed this crate directly (mainly tests and tooling).

use std::path::PathBuf;

/// Which `ChainStore` backend to construct.
#[derive(Clone, Debug)]
pub enum StorageConfig {
    Memory,
    File { root: PathBuf },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Memory
    }
}

impl StorageConfig {
    pub fn file(root: impl Into<PathBuf>) -> Self {
        StorageConfig::File { root: root.into() }
    }
}
