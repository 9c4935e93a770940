/*
[INPUT]:  API key, chain, endpoint overrides
[OUTPUT]: Feed configuration and the per-chain socket URL
[POS]:    WebSocket layer - connection parameters
[UPDATE]: When adding connection options or changing the endpoint layout
*/

use std::time::Duration;

use url::Url;

use crate::error::{BirdeyeError, Result};
use crate::types::Chain;

pub const DEFAULT_WS_BASE_URL: &str = "wss://public-api.birdeye.so";
pub const DEFAULT_ORIGIN: &str = "ws://public-api.birdeye.so";
pub const DEFAULT_SUBPROTOCOL: &str = "echo-protocol";
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

#[derive(Clone)]
pub struct FeedConfig {
    pub api_key: String,
    pub chain: Chain,
    pub ws_base_url: String,
    pub origin: String,
    pub subprotocol: Option<String>,
    pub connect_timeout: Duration,
}

impl FeedConfig {
    pub fn new(api_key: impl Into<String>, chain: Chain) -> Self {
        Self {
            api_key: api_key.into(),
            chain,
            ..Self::default()
        }
    }

    pub fn with_ws_base_url(mut self, url: impl Into<String>) -> Self {
        self.ws_base_url = url.into();
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_subprotocol(mut self, subprotocol: Option<String>) -> Self {
        self.subprotocol = subprotocol;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// `{ws_base_url}/socket/{chain}?x-api-key={api_key}`
    pub fn feed_url(&self) -> Result<Url> {
        if self.api_key.is_empty() {
            return Err(BirdeyeError::Config("api key is empty".to_string()));
        }
        let base = self.ws_base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/socket/{}", self.chain))?;
        url.query_pairs_mut().append_pair("x-api-key", &self.api_key);
        Ok(url)
    }

    /// The feed URL with the key masked, for logs.
    pub fn redacted_url(&self) -> String {
        let base = self.ws_base_url.trim_end_matches('/');
        format!("{base}/socket/{}?x-api-key=***", self.chain)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            chain: Chain::Solana,
            ws_base_url: DEFAULT_WS_BASE_URL.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            subprotocol: Some(DEFAULT_SUBPROTOCOL.to_string()),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }
}

impl std::fmt::Debug for FeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedConfig")
            .field("api_key", &"***")
            .field("chain", &self.chain)
            .field("ws_base_url", &self.ws_base_url)
            .field("origin", &self.origin)
            .field("subprotocol", &self.subprotocol)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}
