/*
[INPUT]:  Feed config (API key, chain), subscription values, raw frames
[OUTPUT]: Thread-safe send/read/subscribe over one live feed connection
[POS]:    WebSocket layer - connection manager
[UPDATE]: When changing connection lifecycle or locking discipline
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::FeedConfig;
use super::envelope::{InboundEnvelope, complex_payload, payload, unsubscribe_payload};
use super::subscription::{Subscription, SubscriptionKind};
use super::transport::{Dialer, Transport, TungsteniteDialer};
use crate::error::{BirdeyeError, Result};

const MESSAGE_SAMPLE_LIMIT: usize = 3;
const SUBSCRIPTION_LOG_LIMIT: usize = 10;
const RAW_LOG_MAX_BYTES: usize = 1024;

/// WebSocket client for the Birdeye push feed.
///
/// Owns at most one live connection. The handle sits behind a readers-writer
/// lock that is held only long enough to clone or swap it, never across I/O,
/// so a reader blocked in [`read`](Self::read) does not stop [`close`](Self::close).
/// Share it across tasks with `Arc<BirdeyeWebSocket>`.
pub struct BirdeyeWebSocket {
    config: FeedConfig,
    dialer: Arc<dyn Dialer>,
    conn: RwLock<Option<Arc<dyn Transport>>>,
    subscription_log_count: AtomicUsize,
    message_sample_count: AtomicUsize,
}

impl BirdeyeWebSocket {
    /// Create a disconnected client that dials with tokio-tungstenite.
    pub fn new(config: FeedConfig) -> Self {
        let dialer = TungsteniteDialer::new(config.origin.clone(), config.subprotocol.clone());
        Self::with_dialer(config, Arc::new(dialer))
    }

    pub fn with_dialer(config: FeedConfig, dialer: Arc<dyn Dialer>) -> Self {
        Self {
            config,
            dialer,
            conn: RwLock::new(None),
            subscription_log_count: AtomicUsize::new(0),
            message_sample_count: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Dial the feed, replacing any existing connection.
    ///
    /// Fails with [`BirdeyeError::Connection`] when the handshake fails, the
    /// configured timeout elapses, or `cancel` fires first.
    #[tracing::instrument(skip_all, fields(chain = %self.config.chain))]
    pub async fn connect(&self, cancel: &CancellationToken) -> Result<()> {
        let url = self.config.feed_url()?;
        let timeout = self.config.connect_timeout;
        info!(url = %self.config.redacted_url(), "connecting to feed");

        let transport = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(BirdeyeError::Connection("connect cancelled".to_string()));
            }
            dialed = tokio::time::timeout(timeout, self.dialer.dial(&url)) => match dialed {
                Ok(Ok(transport)) => transport,
                Ok(Err(BirdeyeError::Connection(reason))) => {
                    return Err(BirdeyeError::Connection(reason));
                }
                Ok(Err(err)) => return Err(BirdeyeError::Connection(err.to_string())),
                Err(_) => {
                    return Err(BirdeyeError::Connection(format!(
                        "handshake timed out after {}ms",
                        timeout.as_millis()
                    )));
                }
            },
        };

        let previous = self.conn.write().await.replace(transport);
        if let Some(previous) = previous {
            if let Err(err) = previous.close().await {
                debug!(error = %err, "closing replaced connection failed");
            }
        }

        info!("feed connected");
        Ok(())
    }

    /// Close the connection if there is one. Idempotent.
    ///
    /// In-flight `read`/`send` calls are not cancelled here; they fail when
    /// the transport tears down.
    pub async fn close(&self) -> Result<()> {
        let Some(conn) = self.conn.write().await.take() else {
            return Ok(());
        };
        conn.close().await?;
        info!("feed connection closed");
        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.conn.read().await.is_some()
    }

    async fn current(&self) -> Option<Arc<dyn Transport>> {
        self.conn.read().await.clone()
    }

    /// Forward one raw frame. Fails with [`BirdeyeError::NotConnected`] before `connect`.
    pub async fn send(&self, frame: Vec<u8>) -> Result<()> {
        let conn = self.current().await.ok_or(BirdeyeError::NotConnected)?;
        conn.send(frame).await
    }

    /// Wait for one inbound frame and unwrap its envelope.
    ///
    /// Without a connection this returns `Ok(None)` rather than an error, unlike
    /// [`send`](Self::send). Use [`is_connected`](Self::is_connected) to tell an
    /// idle client apart from a quiet feed.
    pub async fn read(&self) -> Result<Option<InboundEnvelope>> {
        let Some(conn) = self.current().await else {
            return Ok(None);
        };
        let frame = conn.receive().await?;
        let envelope = match InboundEnvelope::from_slice(&frame) {
            Ok(envelope) => envelope,
            Err(err) => {
                let text = String::from_utf8_lossy(&frame);
                warn!(
                    error = %err,
                    bytes = frame.len(),
                    message = %truncate_for_log(&text, RAW_LOG_MAX_BYTES),
                    "ws message parse failed"
                );
                return Err(err);
            }
        };
        self.log_message_sample(&envelope);
        Ok(Some(envelope))
    }

    /// Send an already-encoded subscribe frame.
    pub async fn subscribe(&self, payload: Vec<u8>) -> Result<()> {
        self.send(payload.clone()).await?;
        self.log_subscription_sent(&payload);
        Ok(())
    }

    /// Encode and send a simple-mode subscription.
    pub async fn subscribe_to<S: Subscription>(&self, subscription: &S) -> Result<()> {
        self.subscribe(payload(subscription)?).await
    }

    /// Encode and send a complex-mode batch of same-kind subscriptions.
    pub async fn subscribe_many<S: Subscription>(&self, subscriptions: &[S]) -> Result<()> {
        self.subscribe(complex_payload(subscriptions)?).await
    }

    /// Send `UNSUBSCRIBE_<kind>` carrying the subscription's filter or field map.
    pub async fn unsubscribe<S: Subscription>(
        &self,
        kind: SubscriptionKind,
        subscription: &S,
    ) -> Result<()> {
        let frame = unsubscribe_payload(kind, subscription)?;
        self.send(frame.clone()).await?;
        self.log_subscription_sent(&frame);
        Ok(())
    }

    fn log_subscription_sent(&self, frame: &[u8]) {
        let count = self.subscription_log_count.fetch_add(1, Ordering::Relaxed);
        if count >= SUBSCRIPTION_LOG_LIMIT {
            return;
        }

        match describe_subscription(frame) {
            Some((verb, query)) => info!(
                sample_index = count + 1,
                sample_limit = SUBSCRIPTION_LOG_LIMIT,
                verb = %verb,
                query = %truncate_for_log(&query, RAW_LOG_MAX_BYTES),
                "ws subscription sent"
            ),
            None => info!(
                sample_index = count + 1,
                sample_limit = SUBSCRIPTION_LOG_LIMIT,
                bytes = frame.len(),
                "ws subscription sent"
            ),
        }
    }

    fn log_message_sample(&self, envelope: &InboundEnvelope) {
        let count = self.message_sample_count.fetch_add(1, Ordering::Relaxed);
        if count >= MESSAGE_SAMPLE_LIMIT {
            return;
        }
        info!(
            sample_index = count + 1,
            sample_limit = MESSAGE_SAMPLE_LIMIT,
            kind = %envelope.kind(),
            bytes = envelope.raw_data().map_or(0, |raw| raw.get().len()),
            "ws message sample"
        );
    }
}

impl std::fmt::Debug for BirdeyeWebSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BirdeyeWebSocket")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Verb and filter (or field map) of an outbound envelope.
fn describe_subscription(frame: &[u8]) -> Option<(String, String)> {
    let value: Value = serde_json::from_slice(frame).ok()?;
    let verb = value.get("type")?.as_str()?.to_string();
    let data = value.get("data")?;
    let detail = match data.get("query").and_then(Value::as_str) {
        Some(query) => query.to_string(),
        None => data.to_string(),
    };
    Some((verb, detail))
}

fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut end = max_len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::with_capacity(end + 3);
    out.push_str(&value[..end]);
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChartInterval, Chain};
    use crate::ws::envelope::InboundKind;
    use crate::ws::subscription::{PriceSubscription, WalletTransactionsSubscription};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;
    use tokio::sync::{Mutex, mpsc};
    use url::Url;

    /// In-memory transport: records sent frames, replays queued inbound frames.
    struct MockTransport {
        sent: Mutex<Vec<Vec<u8>>>,
        inbound: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
        closed: AtomicBool,
    }

    impl MockTransport {
        fn new() -> (Arc<Self>, mpsc::UnboundedSender<Vec<u8>>) {
            let (tx, rx) = mpsc::unbounded_channel();
            let transport = Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                inbound: Mutex::new(rx),
                closed: AtomicBool::new(false),
            });
            (transport, tx)
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, frame: Vec<u8>) -> Result<()> {
            self.sent.lock().await.push(frame);
            Ok(())
        }

        async fn receive(&self) -> Result<Vec<u8>> {
            self.inbound
                .lock()
                .await
                .recv()
                .await
                .ok_or_else(|| BirdeyeError::ConnectionClosed {
                    reason: "mock closed".to_string(),
                })
        }

        async fn close(&self) -> Result<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Hands out queued transports in order; records dialed URLs.
    struct MockDialer {
        transports: Mutex<Vec<Arc<MockTransport>>>,
        urls: Mutex<Vec<String>>,
    }

    impl MockDialer {
        fn new(transports: Vec<Arc<MockTransport>>) -> Arc<Self> {
            Arc::new(Self {
                transports: Mutex::new(transports),
                urls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Dialer for MockDialer {
        async fn dial(&self, url: &Url) -> Result<Arc<dyn Transport>> {
            self.urls.lock().await.push(url.to_string());
            let mut transports = self.transports.lock().await;
            if transports.is_empty() {
                return Err(BirdeyeError::Connection("refused".to_string()));
            }
            let transport: Arc<dyn Transport> = transports.remove(0);
            Ok(transport)
        }
    }

    /// Never completes the handshake.
    struct StallingDialer;

    #[async_trait]
    impl Dialer for StallingDialer {
        async fn dial(&self, _url: &Url) -> Result<Arc<dyn Transport>> {
            std::future::pending().await
        }
    }

    /// Fails with a non-connection error.
    struct MisconfiguredDialer;

    #[async_trait]
    impl Dialer for MisconfiguredDialer {
        async fn dial(&self, _url: &Url) -> Result<Arc<dyn Transport>> {
            Err(BirdeyeError::Config("bad header".to_string()))
        }
    }

    fn test_config() -> FeedConfig {
        FeedConfig::new("test-key", Chain::Solana)
    }

    #[tokio::test]
    async fn test_send_without_connection_fails() {
        let ws = BirdeyeWebSocket::new(test_config());
        let err = ws.send(b"{}".to_vec()).await.unwrap_err();
        assert!(matches!(err, BirdeyeError::NotConnected));
        assert!(err.to_string().contains("conn is nil"));

        let sub = PriceSubscription::new("tok");
        assert!(matches!(
            ws.subscribe_to(&sub).await.unwrap_err(),
            BirdeyeError::NotConnected
        ));
        assert!(matches!(
            ws.unsubscribe(SubscriptionKind::Price, &sub).await.unwrap_err(),
            BirdeyeError::NotConnected
        ));
    }

    #[tokio::test]
    async fn test_read_without_connection_is_empty() {
        let ws = BirdeyeWebSocket::new(test_config());
        assert!(ws.read().await.unwrap().is_none());
        assert!(!ws.is_connected().await);
    }

    #[tokio::test]
    async fn test_close_without_connection_is_ok() {
        let ws = BirdeyeWebSocket::new(test_config());
        assert!(ws.close().await.is_ok());
        assert!(ws.close().await.is_ok());
    }

    #[tokio::test]
    async fn test_connect_send_read_close() {
        let (transport, inbound) = MockTransport::new();
        let dialer = MockDialer::new(vec![transport.clone()]);
        let ws = BirdeyeWebSocket::with_dialer(test_config(), dialer.clone());

        ws.connect(&CancellationToken::new()).await.unwrap();
        assert!(ws.is_connected().await);
        assert_eq!(
            dialer.urls.lock().await.as_slice(),
            ["wss://public-api.birdeye.so/socket/solana?x-api-key=test-key"]
        );

        let sub = PriceSubscription::new("tok").with_chart_type(ChartInterval::OneMinute);
        ws.subscribe_to(&sub).await.unwrap();
        ws.unsubscribe(SubscriptionKind::Price, &sub).await.unwrap();

        let sent = transport.sent.lock().await.clone();
        assert_eq!(sent.len(), 2);
        let first: Value = serde_json::from_slice(&sent[0]).unwrap();
        let second: Value = serde_json::from_slice(&sent[1]).unwrap();
        assert_eq!(first["type"], "SUBSCRIBE_PRICE");
        assert_eq!(second["type"], "UNSUBSCRIBE_PRICE");
        assert_eq!(second["data"]["query"], "(address=tok AND chartType=1m)");

        inbound
            .send(br#"{"type":"WELCOME","data":null}"#.to_vec())
            .unwrap();
        let envelope = ws.read().await.unwrap().unwrap();
        assert_eq!(envelope.kind(), &InboundKind::Welcome);

        ws.close().await.unwrap();
        assert!(transport.closed.load(Ordering::SeqCst));
        assert!(!ws.is_connected().await);
        assert!(ws.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_malformed_frame_is_decode_error() {
        let (transport, inbound) = MockTransport::new();
        let ws = BirdeyeWebSocket::with_dialer(test_config(), MockDialer::new(vec![transport]));
        ws.connect(&CancellationToken::new()).await.unwrap();

        inbound.send(b"{\"type\":".to_vec()).unwrap();
        let err = ws.read().await.unwrap_err();
        assert!(matches!(err, BirdeyeError::Decode(_)));
    }

    #[tokio::test]
    async fn test_read_surfaces_transport_close() {
        let (transport, inbound) = MockTransport::new();
        let ws = BirdeyeWebSocket::with_dialer(test_config(), MockDialer::new(vec![transport]));
        ws.connect(&CancellationToken::new()).await.unwrap();

        drop(inbound);
        let err = ws.read().await.unwrap_err();
        assert!(matches!(err, BirdeyeError::ConnectionClosed { .. }));
    }

    #[tokio::test]
    async fn test_reconnect_replaces_and_closes_previous() {
        let (first, _first_inbound) = MockTransport::new();
        let (second, _second_inbound) = MockTransport::new();
        let dialer = MockDialer::new(vec![first.clone(), second.clone()]);
        let ws = BirdeyeWebSocket::with_dialer(test_config(), dialer);

        ws.connect(&CancellationToken::new()).await.unwrap();
        ws.connect(&CancellationToken::new()).await.unwrap();
        assert!(first.closed.load(Ordering::SeqCst));
        assert!(!second.closed.load(Ordering::SeqCst));

        let wallet = WalletTransactionsSubscription::new("w1");
        ws.subscribe_to(&wallet).await.unwrap();
        assert!(first.sent.lock().await.is_empty());
        assert_eq!(second.sent.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_stays_disconnected() {
        let ws = BirdeyeWebSocket::with_dialer(test_config(), MockDialer::new(Vec::new()));
        let err = ws.connect(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, BirdeyeError::Connection(_)));
        assert!(!ws.is_connected().await);
    }

    #[tokio::test]
    async fn test_connect_wraps_other_dial_errors() {
        let ws = BirdeyeWebSocket::with_dialer(test_config(), Arc::new(MisconfiguredDialer));
        let err = ws.connect(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, BirdeyeError::Connection(_)));
    }

    #[tokio::test]
    async fn test_connect_cancelled() {
        let ws = BirdeyeWebSocket::with_dialer(test_config(), Arc::new(StallingDialer));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = ws.connect(&cancel).await.unwrap_err();
        assert!(matches!(
            err,
            BirdeyeError::Connection(ref reason) if reason.contains("cancelled")
        ));
        assert!(!ws.is_connected().await);
    }

    #[tokio::test]
    async fn test_connect_times_out() {
        let config = test_config().with_connect_timeout(Duration::from_millis(20));
        let ws = BirdeyeWebSocket::with_dialer(config, Arc::new(StallingDialer));

        let err = ws.connect(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(
            err,
            BirdeyeError::Connection(ref reason) if reason.contains("timed out")
        ));
    }

    #[tokio::test]
    async fn test_connect_requires_api_key() {
        let ws = BirdeyeWebSocket::with_dialer(FeedConfig::default(), MockDialer::new(Vec::new()));
        let err = ws.connect(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, BirdeyeError::Config(_)));
    }

    #[tokio::test]
    async fn test_close_does_not_wait_for_blocked_read() {
        let (transport, _inbound) = MockTransport::new();
        let ws = Arc::new(BirdeyeWebSocket::with_dialer(
            test_config(),
            MockDialer::new(vec![transport.clone()]),
        ));
        ws.connect(&CancellationToken::new()).await.unwrap();

        let reader = {
            let ws = ws.clone();
            tokio::spawn(async move { ws.read().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(Duration::from_secs(1), ws.close())
            .await
            .expect("close should not block on an in-flight read")
            .unwrap();
        assert!(transport.closed.load(Ordering::SeqCst));
        reader.abort();
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 10), "short");
        assert_eq!(truncate_for_log("abcdef", 3), "abc...");
        assert_eq!(truncate_for_log("héllo", 2), "h...");
    }

    #[test]
    fn test_describe_subscription() {
        let frame = br#"{"type":"SUBSCRIBE_WALLET_TXS","data":{"address":"w1"}}"#;
        let (verb, detail) = describe_subscription(frame).unwrap();
        assert_eq!(verb, "SUBSCRIBE_WALLET_TXS");
        assert_eq!(detail, r#"{"address":"w1"}"#);
        assert!(describe_subscription(b"nope").is_none());
    }
}
