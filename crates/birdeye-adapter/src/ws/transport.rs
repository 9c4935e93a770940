/*
[INPUT]:  Feed URL and handshake headers; outbound frames
[OUTPUT]: A duplex message channel (send / receive / close)
[POS]:    WebSocket layer - transport boundary used by the connection manager
[UPDATE]: When swapping the socket library or changing handshake headers
*/

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;
use url::Url;

use crate::error::{BirdeyeError, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A message-framed duplex connection.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, frame: Vec<u8>) -> Result<()>;

    /// Wait for the next data frame. Control frames never surface here.
    async fn receive(&self) -> Result<Vec<u8>>;

    async fn close(&self) -> Result<()>;
}

/// Opens transports; the only place a handshake happens.
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn dial(&self, url: &Url) -> Result<Arc<dyn Transport>>;
}

/// Dials with tokio-tungstenite, adding the feed's `Origin` and subprotocol headers.
#[derive(Debug, Clone)]
pub struct TungsteniteDialer {
    origin: String,
    subprotocol: Option<String>,
}

impl TungsteniteDialer {
    pub fn new(origin: impl Into<String>, subprotocol: Option<String>) -> Self {
        Self {
            origin: origin.into(),
            subprotocol,
        }
    }
}

fn header(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|err| BirdeyeError::Config(format!("invalid header value {value:?}: {err}")))
}

#[async_trait]
impl Dialer for TungsteniteDialer {
    async fn dial(&self, url: &Url) -> Result<Arc<dyn Transport>> {
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|err| BirdeyeError::Connection(err.to_string()))?;
        let headers = request.headers_mut();
        headers.insert("Origin", header(&self.origin)?);
        if let Some(subprotocol) = &self.subprotocol {
            headers.insert("Sec-WebSocket-Protocol", header(subprotocol)?);
        }

        let (ws_stream, response) = connect_async(request)
            .await
            .map_err(|err| BirdeyeError::Connection(err.to_string()))?;
        debug!(status = %response.status(), "ws handshake complete");

        Ok(Arc::new(TungsteniteTransport::new(ws_stream)))
    }
}

/// Split socket: reads and writes lock independently, writes are serialized.
pub struct TungsteniteTransport {
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl TungsteniteTransport {
    pub fn new(ws_stream: WsStream) -> Self {
        let (sink, stream) = ws_stream.split();
        Self {
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        }
    }
}

#[async_trait]
impl Transport for TungsteniteTransport {
    async fn send(&self, frame: Vec<u8>) -> Result<()> {
        let message = match String::from_utf8(frame) {
            Ok(text) => Message::Text(text.into()),
            Err(err) => Message::Binary(err.into_bytes().into()),
        };
        let mut sink = self.sink.lock().await;
        sink.send(message).await?;
        Ok(())
    }

    async fn receive(&self) -> Result<Vec<u8>> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text.as_bytes().to_vec()),
                Some(Ok(Message::Binary(bytes))) => return Ok(bytes.to_vec()),
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| f.reason.to_string())
                        .filter(|reason| !reason.is_empty())
                        .unwrap_or_else(|| "server closed connection".to_string());
                    return Err(BirdeyeError::ConnectionClosed { reason });
                }
                Some(Err(err)) => return Err(err.into()),
                None => {
                    return Err(BirdeyeError::ConnectionClosed {
                        reason: "stream ended".to_string(),
                    });
                }
            }
        }
    }

    async fn close(&self) -> Result<()> {
        let mut sink = self.sink.lock().await;
        match sink.close().await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
