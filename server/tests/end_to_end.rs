//! Integration tests driving a real `TcpListener` against a real client
//! connection, covering the end-to-end scenarios the server needs to get
//! right: empty-chain lookups, round-tripping a file, duplicate submission,
//! unknown-hash lookups, a full chain check, and oversize frames.

use std::sync::Arc;

use chain::protocol::{Package, PackageFactory, PackageKind, ServerBound, read_frame, write_frame};
use chain::{BlockChain, FileHash, MemoryStore, chunk_file};
use tokio::net::{TcpListener, TcpStream};

#[path = "../src/handlers.rs"]
mod handlers;
#[path = "../src/run.rs"]
mod run;

async fn spawn_server() -> (std::net::SocketAddr, Arc<BlockChain<MemoryStore>>) {
    let chain = Arc::new(BlockChain::new(MemoryStore::new()));
    let handler = Arc::new(handlers::build(chain.clone()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = run::serve(listener, handler).await;
    });

    (addr, chain)
}

async fn request(
    stream: &mut TcpStream,
    factory: &PackageFactory<ServerBound>,
    kind: PackageKind,
    payload: Vec<u8>,
) -> Package {
    let package = factory.from_object(kind, payload);
    write_frame(stream, &package.to_bytes()).await.unwrap();
    let raw = read_frame(stream).await.unwrap();
    Package::from_bytes(&raw).unwrap()
}

#[tokio::test]
async fn empty_chain_reports_absent_and_size_zero() {
    let (addr, chain) = spawn_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let factory: PackageFactory<ServerBound> = PackageFactory::new();

    let unknown = FileHash([0u8; 32]);
    let reply = request(
        &mut stream,
        &factory,
        PackageKind::HashCheck,
        chain::protocol::encode_file_hash(&unknown),
    )
    .await;
    assert_eq!(reply.kind(), PackageKind::LogText);
    let log = chain::protocol::LogText::decode(reply.payload()).unwrap();
    assert_eq!(log.level, chain::protocol::LogLevel::Warn);

    assert_eq!(chain.size().unwrap(), 0);
    assert_eq!(chain.check_chain().unwrap(), (true, 0));
}

#[tokio::test]
async fn single_file_round_trip() {
    let (addr, _chain) = spawn_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let factory: PackageFactory<ServerBound> = PackageFactory::new();

    let data = vec![9u8; 2037]; // 4 full 500-byte blocks + one 37-byte tail = 5 blocks
    let blocks = chunk_file("report.bin", &data);
    assert_eq!(blocks.len(), 5);
    let file_hash = blocks[0].file_hash;

    for block in &blocks {
        let package = factory.from_object(PackageKind::SendFile, block.canonical_bytes());
        write_frame(&mut stream, &package.to_bytes()).await.unwrap();
    }

    let reply = request(
        &mut stream,
        &factory,
        PackageKind::HashCheck,
        chain::protocol::encode_file_hash(&file_hash),
    )
    .await;
    let log = chain::protocol::LogText::decode(reply.payload()).unwrap();
    assert_eq!(log.level, chain::protocol::LogLevel::Info);
    assert_eq!(log.message, "stored as 5 Block(s)");

    let get_package =
        factory.from_object(PackageKind::GetFile, chain::protocol::encode_file_hash(&file_hash));
    write_frame(&mut stream, &get_package.to_bytes()).await.unwrap();

    let mut reconstructed = Vec::new();
    for _ in 0..5 {
        let raw = read_frame(&mut stream).await.unwrap();
        let package = Package::from_bytes(&raw).unwrap();
        assert_eq!(package.kind(), PackageKind::SendFile);
        let block = chain::Block::decode(package.payload()).unwrap();
        reconstructed.extend_from_slice(&block.chunk);
    }
    assert_eq!(reconstructed, data);
}

#[tokio::test]
async fn duplicate_submission_does_not_grow_the_chain() {
    let (addr, chain) = spawn_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let factory: PackageFactory<ServerBound> = PackageFactory::new();

    let data = vec![3u8; 10];
    let block = chunk_file("a.bin", &data).into_iter().next().unwrap();
    let file_hash = block.file_hash;

    for _ in 0..3 {
        let package = factory.from_object(PackageKind::SendFile, block.canonical_bytes());
        write_frame(&mut stream, &package.to_bytes()).await.unwrap();
    }

    // SEND_FILE never replies, so synchronize on a HASH_CHECK round trip.
    let reply = request(
        &mut stream,
        &factory,
        PackageKind::HashCheck,
        chain::protocol::encode_file_hash(&file_hash),
    )
    .await;
    let log = chain::protocol::LogText::decode(reply.payload()).unwrap();
    assert_eq!(log.message, "stored as 1 Block(s)");
    assert_eq!(chain.size().unwrap(), 1);
}

#[tokio::test]
async fn unknown_hash_get_file_yields_a_single_warning() {
    let (addr, _chain) = spawn_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let factory: PackageFactory<ServerBound> = PackageFactory::new();

    let unknown = FileHash([0u8; 32]);
    let reply = request(
        &mut stream,
        &factory,
        PackageKind::GetFile,
        chain::protocol::encode_file_hash(&unknown),
    )
    .await;
    assert_eq!(reply.kind(), PackageKind::LogText);
    let log = chain::protocol::LogText::decode(reply.payload()).unwrap();
    assert_eq!(log.level, chain::protocol::LogLevel::Warn);
}

#[tokio::test]
async fn full_check_reports_valid_chain_after_disjoint_files() {
    let (addr, _chain) = spawn_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let factory: PackageFactory<ServerBound> = PackageFactory::new();

    for (name, size) in [("a.bin", 800usize), ("b.bin", 1200)] {
        for block in chunk_file(name, &vec![1u8; size]) {
            let package = factory.from_object(PackageKind::SendFile, block.canonical_bytes());
            write_frame(&mut stream, &package.to_bytes()).await.unwrap();
        }
    }

    let reply = request(&mut stream, &factory, PackageKind::FullCheck, vec![]).await;
    let log = chain::protocol::LogText::decode(reply.payload()).unwrap();
    assert_eq!(log.level, chain::protocol::LogLevel::Info);
    assert_eq!(log.message, "chain valid: 2 file(s)");
}

#[tokio::test]
async fn oversize_frame_is_rejected_and_connection_stays_usable() {
    let (addr, _chain) = spawn_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let factory: PackageFactory<ServerBound> = PackageFactory::new();

    let oversized = vec![0u8; chain::protocol::MAX_FRAME_LEN + 1];
    let result = write_frame(&mut stream, &oversized).await;
    assert!(result.is_err());

    // The connection itself is untouched by the rejected send.
    let reply = request(&mut stream, &factory, PackageKind::FullCheck, vec![]).await;
    assert_eq!(reply.kind(), PackageKind::LogText);
}
