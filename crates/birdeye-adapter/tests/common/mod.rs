/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities: mock feed server, tracing setup
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for birdeye-adapter tests

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use birdeye_adapter::{Chain, FeedConfig};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use wiremock::MockServer;

#[allow(dead_code)]
pub const TEST_API_KEY: &str = "test-key";
#[allow(dead_code)]
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

pub const WELCOME_FRAME: &str = r#"{"type":"WELCOME","data":null}"#;

/// Install a test-writer subscriber once; later calls are no-ops.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Setup a mock HTTP server for testing
#[allow(dead_code)]
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Handshake details captured by the mock feed.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Handshake {
    pub uri: String,
    pub origin: Option<String>,
    pub protocol: Option<String>,
}

#[derive(Debug, Clone)]
enum Command {
    Push(String),
    Close(String),
}

#[derive(Default)]
struct FeedState {
    handshakes: Mutex<Vec<Handshake>>,
    frames: Mutex<Vec<String>>,
    connected_clients: AtomicU32,
}

/// In-process Birdeye-style feed.
///
/// Sends `WELCOME` on connect, answers `SUBSCRIBE_PRICE` with one
/// `PRICE_DATA` candle and echoes every other text frame back verbatim.
#[allow(dead_code)]
pub struct MockFeedServer {
    addr: SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
    command_tx: broadcast::Sender<Command>,
    handle: JoinHandle<()>,
    state: Arc<FeedState>,
}

#[allow(dead_code)]
impl MockFeedServer {
    /// Start a mock feed on a random available port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, _) = broadcast::channel(1);
        let (command_tx, _) = broadcast::channel(16);
        let state = Arc::new(FeedState::default());

        let handle = tokio::spawn(run_server(
            listener,
            shutdown_tx.subscribe(),
            command_tx.clone(),
            state.clone(),
        ));

        Self {
            addr,
            shutdown_tx,
            command_tx,
            handle,
            state,
        }
    }

    /// Base URL to put in [`FeedConfig::ws_base_url`].
    pub fn base_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig::new(TEST_API_KEY, Chain::Solana).with_ws_base_url(self.base_url())
    }

    pub fn connected_clients(&self) -> u32 {
        self.state.connected_clients.load(Ordering::SeqCst)
    }

    pub fn handshakes(&self) -> Vec<Handshake> {
        self.state.handshakes.lock().unwrap().clone()
    }

    /// Text frames received so far, in arrival order.
    pub fn received(&self) -> Vec<String> {
        self.state.frames.lock().unwrap().clone()
    }

    /// Poll until at least `count` frames arrived or a second passes.
    pub async fn wait_for_frames(&self, count: usize) -> Vec<String> {
        for _ in 0..100 {
            let frames = self.received();
            if frames.len() >= count {
                return frames;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.received()
    }

    /// Push a raw text frame to every connected client.
    pub fn push(&self, frame: &str) {
        let _ = self.command_tx.send(Command::Push(frame.to_string()));
    }

    /// Send a close frame with `reason` to every connected client.
    pub fn close_clients(&self, reason: &str) {
        let _ = self.command_tx.send(Command::Close(reason.to_string()));
    }

    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.handle.await;
    }
}

/// Candle pushed in reply to any `SUBSCRIBE_PRICE`.
pub fn price_data_frame() -> String {
    serde_json::json!({
        "type": "PRICE_DATA",
        "data": {
            "o": 100.1,
            "h": 101.0,
            "l": 99.5,
            "c": 100.5,
            "v": 1520.25,
            "eventType": "ohlcv",
            "type": "1m",
            "unixTime": 1_700_000_000,
            "symbol": "SOL",
            "address": SOL_MINT
        }
    })
    .to_string()
}

fn reply_for(frame: &str) -> String {
    let verb = serde_json::from_str::<Value>(frame)
        .ok()
        .and_then(|value| value.get("type").and_then(Value::as_str).map(str::to_string));
    match verb.as_deref() {
        Some("SUBSCRIBE_PRICE") => price_data_frame(),
        _ => frame.to_string(),
    }
}

async fn run_server(
    listener: TcpListener,
    mut shutdown_rx: broadcast::Receiver<()>,
    command_tx: broadcast::Sender<Command>,
    state: Arc<FeedState>,
) {
    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        let state = state.clone();
                        let command_rx = command_tx.subscribe();
                        let shutdown_rx = shutdown_rx.resubscribe();
                        tokio::spawn(async move {
                            handle_connection(stream, shutdown_rx, command_rx, state).await;
                        });
                    }
                    Err(e) => {
                        eprintln!("Accept error: {}", e);
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                break;
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    mut shutdown_rx: broadcast::Receiver<()>,
    mut command_rx: broadcast::Receiver<Command>,
    state: Arc<FeedState>,
) {
    let handshake_state = state.clone();
    let callback = move |req: &Request,
                         mut response: Response|
          -> Result<
        Response,
        tokio_tungstenite::tungstenite::http::Response<Option<String>>,
    > {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let protocol = header("Sec-WebSocket-Protocol");
        handshake_state.handshakes.lock().unwrap().push(Handshake {
            uri: req.uri().to_string(),
            origin: header("Origin"),
            protocol: protocol.clone(),
        });
        // The client refuses the upgrade unless the requested subprotocol is echoed.
        if let Some(protocol) = protocol {
            response
                .headers_mut()
                .insert("Sec-WebSocket-Protocol", protocol.parse().unwrap());
        }
        Ok(response)
    };

    let ws_stream = match tokio_tungstenite::accept_hdr_async(stream, callback).await {
        Ok(ws) => ws,
        Err(_) => return,
    };

    state.connected_clients.fetch_add(1, Ordering::SeqCst);
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    if ws_tx.send(Message::Text(WELCOME_FRAME.into())).await.is_ok() {
        loop {
            tokio::select! {
                msg = ws_rx.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            state.frames.lock().unwrap().push(text.to_string());
                            let reply = reply_for(text.as_str());
                            if ws_tx.send(Message::Text(reply.into())).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(_)) => break,
                        _ => {}
                    }
                }
                command = command_rx.recv() => {
                    match command {
                        Ok(Command::Push(frame)) => {
                            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                                break;
                            }
                        }
                        Ok(Command::Close(reason)) => {
                            let frame = CloseFrame {
                                code: CloseCode::Away,
                                reason: reason.into(),
                            };
                            let _ = ws_tx.send(Message::Close(Some(frame))).await;
                            break;
                        }
                        Err(_) => break,
                    }
                }
                _ = shutdown_rx.recv() => {
                    break;
                }
            }
        }
    }

    state.connected_clients.fetch_sub(1, Ordering::SeqCst);
}
