//! Server-side `PackageHandler` registration.
//!
//! `FILE_CHECK` is a recognised `PackageKind` with a defined payload shape
//! but is not among the handlers the core names as server-registered; a
//! client that sends one gets `PackageHandleError::NoHandler`, which closes
//! the connection per the general error-propagation policy. No handler is
//! registered for it here to keep that boundary explicit.

use std::sync::Arc;

use chain::protocol::{
    ClientBound, LogText, PackageFactory, PackageHandleError, PackageHandler, PackageKind,
    ServerBound, decode_file_hash,
};
use chain::{Block, BlockChain, ChainError, ChainStore};

/// Builds the server-bound handler wired to `chain`, replying with
/// client-bound packages built from `reply_factory`.
pub fn build<S: ChainStore + 'static>(chain: Arc<BlockChain<S>>) -> PackageHandler<ServerBound> {
    let reply_factory: Arc<PackageFactory<ClientBound>> = Arc::new(PackageFactory::new());
    let mut handler: PackageHandler<ServerBound> = PackageHandler::new();

    {
        let chain = chain.clone();
        handler.register(PackageKind::SendFile, move |payload| {
            let block = Block::decode(payload)?;
            match chain.add(block) {
                Ok(hash) => {
                    tracing::info!(%hash, "stored block");
                }
                Err(ChainError::Duplicate(e)) => {
                    tracing::warn!(%e, "duplicate block rejected");
                }
                Err(other) => return Err(PackageHandleError::Handler(other.to_string())),
            }
            Ok(vec![])
        });
    }

    {
        let chain = chain.clone();
        let reply_factory = reply_factory.clone();
        handler.register(PackageKind::HashCheck, move |payload| {
            let file_hash = decode_file_hash(payload)?;
            let (present, count) = chain
                .check_hash(&file_hash)
                .map_err(|e| PackageHandleError::Handler(e.to_string()))?;
            let log = if present {
                LogText::info(format!("stored as {count} Block(s)"))
            } else {
                LogText::warn(format!("{file_hash} not stored"))
            };
            Ok(vec![reply_factory.from_object(PackageKind::LogText, log.encode())])
        });
    }

    {
        let chain = chain.clone();
        let reply_factory = reply_factory.clone();
        handler.register(PackageKind::GetFile, move |payload| {
            let file_hash = decode_file_hash(payload)?;
            let blocks = chain
                .get(&file_hash)
                .map_err(|e| PackageHandleError::Handler(e.to_string()))?;
            if blocks.is_empty() {
                let log = LogText::warn(format!("{file_hash} not stored"));
                return Ok(vec![reply_factory.from_object(PackageKind::LogText, log.encode())]);
            }
            Ok(blocks
                .into_iter()
                .map(|b| reply_factory.from_object(PackageKind::SendFile, b.canonical_bytes()))
                .collect())
        });
    }

    {
        let reply_factory = reply_factory.clone();
        handler.register(PackageKind::FullCheck, move |_payload| {
            let (valid, file_count) = chain
                .check_chain()
                .map_err(|e| PackageHandleError::Handler(e.to_string()))?;
            let log = if valid {
                LogText::info(format!("chain valid: {file_count} file(s)"))
            } else {
                LogText::error("chain check failed")
            };
            Ok(vec![reply_factory.from_object(PackageKind::LogText, log.encode())])
        });
    }

    // FILE_CHECK deliberately unregistered; see module doc comment.

    handler
}
