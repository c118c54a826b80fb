// client/src/main.rs
//
// Interactive TCP client: connects to a server, runs a reader worker that
// dispatches incoming packages to client-side handlers, and drives a
// command loop over stdin for add/check/get/help/stop.

mod config;
mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use chain::protocol::{
    PackageFactory, PackageKind, ServerBound, encode_file_hash, read_frame, write_frame,
};
use chain::{FileHash, chunk_file, file_hash_of};
use config::ClientConfig;
use handlers::FileSink;
use tokio::io::{AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "client=info".to_string()))
        .init();

    let cfg = match ClientConfig::from_args(std::env::args().skip(1)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("argument error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cfg).await {
        eprintln!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: ClientConfig) -> Result<(), String> {
    let addr = format!("{}:{}", cfg.ip, cfg.port);
    let stream = TcpStream::connect(&addr)
        .await
        .map_err(|e| format!("failed to connect to {addr}: {e}"))?;
    tracing::info!(%addr, "connected");

    let (read_half, write_half) = tokio::io::split(stream);

    let sink = Arc::new(FileSink::new(PathBuf::from(".")));
    let handler = Arc::new(handlers::build(sink));
    let reader_task = tokio::spawn(reader_worker(read_half, handler));

    command_loop(write_half).await;

    // `stop` only closes our half; let the reader worker notice EOF and
    // exit before we tear down the process.
    let _ = reader_task.await;
    Ok(())
}

async fn reader_worker(
    mut read_half: ReadHalf<TcpStream>,
    handler: Arc<chain::protocol::PackageHandler<chain::protocol::ClientBound>>,
) {
    loop {
        let raw = match read_frame(&mut read_half).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::info!(%e, "connection closed");
                return;
            }
        };
        if let Err(e) = handler.handle(&raw) {
            tracing::warn!(%e, "failed to handle incoming package");
        }
    }
}

async fn command_loop(write_half: WriteHalf<TcpStream>) {
    let factory: PackageFactory<ServerBound> = PackageFactory::new();
    let (tx, mut rx) = mpsc::channel::<String>(16);

    tokio::task::spawn_blocking(move || {
        for line in std::io::stdin().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let mut write_half = write_half;
    while let Some(line) = rx.recv().await {
        let mut parts = line.trim().splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or("");
        let arg = parts.next().map(str::trim).unwrap_or("");

        match command {
            "" => continue,
            "stop" => {
                tracing::info!("closing connection");
                let _ = write_half.shutdown().await;
                break;
            }
            "help" => print_help(),
            "add" => send_add_file(&factory, &mut write_half, arg).await,
            "check" if arg.is_empty() => send_full_check(&factory, &mut write_half).await,
            "check" => send_check(&factory, &mut write_half, arg).await,
            "get" => send_get_file(&factory, &mut write_half, arg).await,
            other => tracing::warn!("unknown command: {other}"),
        }
    }
}

fn print_help() {
    println!("commands: add <path>, check <path-or-hash>, check, get <hash>, help, stop");
}

async fn send_add_file<W: AsyncWrite + Unpin>(
    factory: &PackageFactory<ServerBound>,
    write_half: &mut W,
    path: &str,
) {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(%path, %e, "failed to read file");
            return;
        }
    };
    let filename = PathBuf::from(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    for block in chunk_file(&filename, &data) {
        let package = factory.from_object(PackageKind::SendFile, block.canonical_bytes());
        if let Err(e) = write_frame(write_half, &package.to_bytes()).await {
            tracing::warn!(%e, "failed to send block");
            return;
        }
    }
    tracing::info!(%filename, "file sent");
}

async fn send_check<W: AsyncWrite + Unpin>(
    factory: &PackageFactory<ServerBound>,
    write_half: &mut W,
    arg: &str,
) {
    let file_hash = match FileHash::from_hex(arg) {
        Ok(h) => h,
        Err(_) => match std::fs::read(arg) {
            Ok(data) => file_hash_of(&data),
            Err(e) => {
                tracing::warn!(%arg, %e, "not a hash and not a readable file");
                return;
            }
        },
    };
    send_hash_check(factory, write_half, file_hash).await;
}

async fn send_hash_check<W: AsyncWrite + Unpin>(
    factory: &PackageFactory<ServerBound>,
    write_half: &mut W,
    file_hash: FileHash,
) {
    let package = factory.from_object(PackageKind::HashCheck, encode_file_hash(&file_hash));
    if let Err(e) = write_frame(write_half, &package.to_bytes()).await {
        tracing::warn!(%e, "failed to send hash check");
    }
}

async fn send_full_check<W: AsyncWrite + Unpin>(
    factory: &PackageFactory<ServerBound>,
    write_half: &mut W,
) {
    let package = factory.from_object(PackageKind::FullCheck, vec![]);
    if let Err(e) = write_frame(write_half, &package.to_bytes()).await {
        tracing::warn!(%e, "failed to send full check");
    }
}

async fn send_get_file<W: AsyncWrite + Unpin>(
    factory: &PackageFactory<ServerBound>,
    write_half: &mut W,
    arg: &str,
) {
    let file_hash = match FileHash::from_hex(arg) {
        Ok(h) => h,
        Err(_) => {
            tracing::warn!(%arg, "not a valid 64-hex file hash");
            return;
        }
    };
    let package = factory.from_object(PackageKind::GetFile, encode_file_hash(&file_hash));
    if let Err(e) = write_frame(write_half, &package.to_bytes()).await {
        tracing::warn!(%e, "failed to send get_file");
    }
}

