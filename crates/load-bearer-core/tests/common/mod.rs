//! Test server running on its own thread and event loop, plus a minimal
//! HTTP/1.1 client.

use load_bearer_core::{Server, ServerConfig, Tracker};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

pub struct TestServer {
    pub addr: SocketAddr,
    pub tracker: Arc<Tracker>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Start a server on an ephemeral loopback port
    pub fn start() -> Self {
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread = std::thread::spawn(move || {
            let runtime = load_bearer_core::server::build_runtime().unwrap();
            runtime.block_on(async move {
                let config = ServerConfig {
                    listen_address: Ipv4Addr::LOCALHOST.into(),
                    listen_port: 0,
                };
                let server = Server::bind(&config).unwrap();
                ready_tx
                    .send((server.local_addr().unwrap(), server.tracker()))
                    .unwrap();

                server
                    .run_until(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .unwrap();
            });
        });

        let (addr, tracker) = ready_rx.recv().unwrap();
        Self {
            addr,
            tracker,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        }
    }

    /// Wait until every connection the server saw has been closed
    pub async fn wait_idle(&self) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while self.tracker.connections() > 0 && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Response as seen by the client
#[derive(Debug)]
pub struct ClientResponse {
    pub status: u16,
    pub body: String,
    pub elapsed: Duration,
    pub finished: Instant,
}

/// Send one request on a fresh connection and read the reply to EOF
pub async fn send(addr: SocketAddr, method: &str, target: &str) -> ClientResponse {
    let started = Instant::now();
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let request = format!(
        "{method} {target} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\nContent-Length: 0\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let finished = Instant::now();

    let text = String::from_utf8(raw).unwrap();
    let (head, body) = text.split_once("\r\n\r\n").unwrap();
    let status = head.split_whitespace().nth(1).unwrap().parse().unwrap();

    ClientResponse {
        status,
        body: body.to_string(),
        elapsed: finished - started,
        finished,
    }
}

pub async fn get(addr: SocketAddr, target: &str) -> ClientResponse {
    send(addr, "GET", target).await
}
