//! Client-side `PackageHandler` registration.
//!
//! `LOG_TEXT` is emitted through `tracing`; `SEND_FILE` appends the
//! block's chunk to a local file named after `block.filename`. The first
//! chunk seen for a given filename in this session truncates any
//! pre-existing file of that name; later chunks append, relying on the
//! server to have sent them in ordinal order.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use chain::Block;
use chain::protocol::{LogLevel, LogText, PackageHandleError, PackageHandler, PackageKind, ClientBound};

/// Tracks which filenames have already received a chunk this session, so
/// the first write to each truncates rather than appends.
pub struct FileSink {
    output_dir: PathBuf,
    started: Mutex<HashSet<String>>,
}

impl FileSink {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            started: Mutex::new(HashSet::new()),
        }
    }

    fn append(&self, block: &Block) -> std::io::Result<()> {
        let path = self.output_dir.join(&block.filename);
        let mut started = self.started.lock().expect("file sink lock poisoned");
        let truncate = started.insert(block.filename.clone());

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(!truncate)
            .truncate(truncate)
            .open(&path)?;
        file.write_all(&block.chunk)
    }
}

pub fn build(sink: std::sync::Arc<FileSink>) -> PackageHandler<ClientBound> {
    let mut handler: PackageHandler<ClientBound> = PackageHandler::new();

    handler.register(PackageKind::LogText, |payload| {
        let log = LogText::decode(payload)?;
        match log.level {
            LogLevel::Info => tracing::info!("{}", log.message),
            LogLevel::Warn => tracing::warn!("{}", log.message),
            LogLevel::Error => tracing::error!("{}", log.message),
        }
        Ok(vec![])
    });

    handler.register(PackageKind::SendFile, move |payload| {
        let block = Block::decode(payload)?;
        sink.append(&block)
            .map_err(|e| PackageHandleError::Handler(format!("failed to write block: {e}")))?;
        Ok(vec![])
    });

    handler
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain::{FileHash, chunk_file};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn send_file_chunks_are_written_in_order() {
        let tmp = TempDir::new().unwrap();
        let sink = Arc::new(FileSink::new(tmp.path().to_path_buf()));
        let handler = build(sink);

        let data = b"hello world, this is a test file".to_vec();
        for block in chunk_file("greeting.txt", &data) {
            let mut raw = vec![chain::protocol::PackageKind::SendFile as u8];
            raw.extend_from_slice(&block.canonical_bytes());
            handler.handle(&raw).unwrap();
        }

        let written = std::fs::read(tmp.path().join("greeting.txt")).unwrap();
        assert_eq!(written, data);
    }

    #[test]
    fn unknown_hash_log_text_is_reported_without_panicking() {
        let tmp = TempDir::new().unwrap();
        let sink = Arc::new(FileSink::new(tmp.path().to_path_buf()));
        let handler = build(sink);

        let log = LogText::warn(format!("{} not stored", FileHash([0u8; 32])));
        let mut raw = vec![chain::protocol::PackageKind::LogText as u8];
        raw.extend_from_slice(&log.encode());
        handler.handle(&raw).unwrap();
    }
}
