// server/src/main.rs
//
// TCP server exposing the block-chain file store: accepts connections,
// spawns one worker per connection, and dispatches framed packages
// against a single shared BlockChain until Ctrl-C triggers a graceful
// shutdown.

mod config;
mod handlers;
mod run;

use std::sync::Arc;

use chain::{BlockChain, ChainStore, FileStore, MemoryStore};
use config::ServerConfig;
use tokio::net::TcpListener;

fn main() {
    let cfg = match ServerConfig::from_args(std::env::args().skip(1)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("argument error: {e}");
            std::process::exit(1);
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(workers) = cfg.workers {
        builder.worker_threads(workers);
    }
    let runtime = match builder.build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to build tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "server=info,chain=info".to_string()))
        .init();

    if let Err(e) = runtime.block_on(run(cfg)) {
        eprintln!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: ServerConfig) -> Result<(), String> {
    let store: Box<dyn ChainStore> = if cfg.use_fs {
        Box::new(FileStore::open_default().map_err(|e| format!("failed to open FileStore: {e}"))?)
    } else {
        Box::new(MemoryStore::new())
    };
    let chain = Arc::new(BlockChain::new(store));
    let handler = Arc::new(handlers::build(chain));

    let addr = format!("{}:{}", cfg.ip, cfg.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("failed to bind {addr}: {e}"))?;
    tracing::info!(%addr, "listening");

    run::serve(listener, handler).await
}
