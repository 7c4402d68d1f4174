//! Shared helpers for the in-process server tests.

#![allow(dead_code)]

use std::{future::Future, net::SocketAddr, path::PathBuf, time::Duration};

use palaver_server::{
    config::ServerConfig,
    ui::{Server, ServerHandle},
};
use tempfile::TempDir;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
};

pub const TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A running server plus the directory holding its transcript
pub struct TestServer {
    pub handle: ServerHandle,
    pub dir: TempDir,
}

impl TestServer {
    /// Start on an ephemeral port with a fresh transcript directory
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(configure: impl FnOnce(&mut ServerConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        Self::start_in(dir, configure).await
    }

    /// Start using an existing transcript directory
    pub async fn start_in(dir: TempDir, configure: impl FnOnce(&mut ServerConfig)) -> Self {
        let mut config = ServerConfig {
            port: 0,
            transcript_path: dir.path().join("history.txt"),
            shutdown_grace: Duration::from_secs(2),
            ..ServerConfig::default()
        };
        configure(&mut config);

        let handle = Server::new(config)
            .start()
            .await
            .expect("Failed to start server");
        Self { handle, dir }
    }

    pub fn addr(&self) -> SocketAddr {
        self.handle.local_addr()
    }

    pub fn transcript_path(&self) -> PathBuf {
        self.dir.path().join("history.txt")
    }

    pub fn transcript(&self) -> Vec<String> {
        read_transcript(&self.transcript_path())
    }

    /// Wait until `count` members are registered and all of them have a name
    pub async fn wait_for_named_members(&self, count: usize) {
        wait_until(|| async {
            let state = self.handle.session_state().await;
            state.members.len() == count && state.members.iter().all(|m| m.name.is_some())
        })
        .await;
    }

    pub async fn wait_for_member_count(&self, count: usize) {
        wait_until(|| async { self.handle.session_state().await.members.len() == count }).await;
    }

    pub async fn wait_for_history_len(&self, len: usize) {
        wait_until(|| async { self.handle.session_state().await.history_len == len }).await;
    }
}

pub fn read_transcript(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("Failed to read transcript")
        .lines()
        .map(str::to_string)
        .collect()
}

/// Poll `condition` until it holds, panicking after [`TIMEOUT`]
pub async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let polled = tokio::time::timeout(TIMEOUT, async {
        while !condition().await {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    })
    .await;
    assert!(polled.is_ok(), "condition not met within {:?}", TIMEOUT);
}

/// Raw line-protocol client
pub struct TestClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr)
            .await
            .expect("Failed to connect to server");
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    /// Connect and send `name` as the first line
    pub async fn join(addr: SocketAddr, name: &str) -> Self {
        let mut client = Self::connect(addr).await;
        client.send(name).await;
        client
    }

    pub async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .expect("Failed to write line");
    }

    /// Write raw bytes, bypassing the line framing
    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.writer
            .write_all(bytes)
            .await
            .expect("Failed to write bytes");
    }

    /// Next line from the server; panics on timeout or end of stream
    pub async fn recv(&mut self) -> String {
        self.try_recv()
            .await
            .expect("Connection closed while waiting for a line")
    }

    /// Next line, or `None` once the server closed the connection
    pub async fn try_recv(&mut self) -> Option<String> {
        tokio::time::timeout(TIMEOUT, self.lines.next_line())
            .await
            .expect("Timed out waiting for the server")
            .ok()
            .flatten()
    }

    /// Assert nothing arrives within `window`
    pub async fn expect_silence(&mut self, window: Duration) {
        if let Ok(line) = tokio::time::timeout(window, self.lines.next_line()).await {
            panic!("Expected no traffic, got {:?}", line);
        }
    }

    /// Close the write side, as a client hitting end-of-input would
    pub async fn finish(&mut self) {
        let _ = self.writer.shutdown().await;
    }
}
