//! Accept loop, per-connection worker, and graceful shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};

use chain::protocol::{PackageHandler, ServerBound, read_frame, write_frame};

/// Runs the accept loop until `ctrl_c` fires. Returns once the listener is
/// closed and all in-flight workers have been spawned (it does not wait
/// for them to finish draining; they exit on their own once their
/// connection closes or the shutdown flag is observed).
pub async fn serve(
    listener: TcpListener,
    handler: Arc<PackageHandler<ServerBound>>,
) -> Result<(), String> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let local_addr = listener
        .local_addr()
        .map_err(|e| format!("failed to read listener address: {e}"))?;

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
            shutdown.store(true, Ordering::SeqCst);
            // Unblock `accept()`, which has no other way to observe the flag.
            let _ = TcpStream::connect(local_addr).await;
        });
    }

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(%e, "accept failed");
                continue;
            }
        };

        if shutdown.load(Ordering::SeqCst) {
            // This is either the self-dial wake-up or a straggler accepted
            // in the same instant; either way the server is shutting down.
            break;
        }

        let handler = handler.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tracing::info!(%peer, "connection accepted");
            if let Err(e) = handle_connection(stream, &handler, &shutdown).await {
                tracing::warn!(%peer, %e, "connection closed with error");
            } else {
                tracing::info!(%peer, "connection closed");
            }
        });
    }

    tracing::info!("accept loop exiting");
    Ok(())
}

async fn handle_connection<IO>(
    mut stream: IO,
    handler: &PackageHandler<ServerBound>,
    shutdown: &AtomicBool,
) -> Result<(), String>
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        if shutdown.load(Ordering::SeqCst) {
            return Ok(());
        }

        let raw = match read_frame(&mut stream).await {
            Ok(raw) => raw,
            Err(e) => return Err(format!("read failed: {e}")),
        };

        let replies = match handler.handle(&raw) {
            Ok(replies) => replies,
            Err(e) => return Err(format!("handler failed: {e}")),
        };

        for reply in replies {
            if let Err(e) = write_frame(&mut stream, &reply.to_bytes()).await {
                return Err(format!("write failed: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain::chunk_file;
    use chain::protocol::{Package, PackageFactory, PackageKind, encode_file_hash};
    use chain::{BlockChain, MemoryStore, file_hash_of};
    use tokio::io::duplex;

    #[tokio::test]
    async fn hash_check_round_trips_over_a_duplex_stream() {
        let chain = Arc::new(BlockChain::new(MemoryStore::new()));
        for block in chunk_file("greeting.txt", b"hello there") {
            chain.add(block).unwrap();
        }
        let handler = crate::handlers::build(chain);

        let (mut client_side, server_side) = duplex(4096);
        let shutdown = AtomicBool::new(false);
        let server_task =
            tokio::spawn(async move { handle_connection(server_side, &handler, &shutdown).await });

        let factory: PackageFactory<ServerBound> = PackageFactory::new();
        let file_hash = file_hash_of(b"hello there");
        let request =
            factory.from_object(PackageKind::HashCheck, encode_file_hash(&file_hash));
        write_frame(&mut client_side, &request.to_bytes()).await.unwrap();

        let reply_raw = read_frame(&mut client_side).await.unwrap();
        let reply = Package::from_bytes(&reply_raw).unwrap();
        assert_eq!(reply.kind(), PackageKind::LogText);

        drop(client_side);
        let _ = server_task.await;
    }
}
