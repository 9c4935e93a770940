/*
[INPUT]:  HTTP configuration (base URL, timeouts, API key, chain)
[OUTPUT]: Configured reqwest client ready for API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use crate::error::{BirdeyeError, Result};
use crate::types::{ApiResponse, Chain, QueryParams};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Base URL for the Birdeye public API
pub const DEFAULT_BASE_URL: &str = "https://public-api.birdeye.so";

const API_KEY_HEADER: &str = "X-API-KEY";
const CHAIN_HEADER: &str = "x-chain";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// REST client for the Birdeye public API
pub struct BirdeyeClient {
    http_client: Client,
    base_url: Url,
    api_key: String,
    chain: Chain,
}

impl BirdeyeClient {
    /// Create a new client with default configuration
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(api_key: impl Into<String>, config: ClientConfig) -> Result<Self> {
        Self::with_config_and_base_url(api_key, config, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL (tests, proxies)
    pub fn with_config_and_base_url(
        api_key: impl Into<String>,
        config: ClientConfig,
        base_url: &str,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(BirdeyeError::Config("api key is empty".to_string()));
        }

        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(base_url)?,
            api_key,
            chain: Chain::default(),
        })
    }

    /// Select the chain sent in the `x-chain` header
    pub fn with_chain(mut self, chain: Chain) -> Self {
        self.chain = chain;
        self
    }

    pub fn set_chain(&mut self, chain: Chain) {
        self.chain = chain;
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&self.api_key)
            .map_err(|err| BirdeyeError::Config(format!("invalid api key: {err}")))?;
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(CHAIN_HEADER, HeaderValue::from_static(self.chain.as_str()));
        headers.insert("accept", HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Build a request with auth headers and the given query parameters
    pub(crate) fn request<P: QueryParams>(
        &self,
        method: Method,
        endpoint: &str,
        params: &P,
    ) -> Result<RequestBuilder> {
        let url = self.base_url.join(endpoint)?;
        Ok(self
            .http_client
            .request(method, url)
            .headers(self.headers()?)
            .query(&params.query_params()))
    }

    /// Send a request and unwrap the `{"success", "data"}` wrapper
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "birdeye response");

        if !status.is_success() {
            let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
                .ok()
                .and_then(|resp| resp.message)
                .unwrap_or(body);
            return Err(BirdeyeError::api_error(status, message));
        }

        let wrapped: ApiResponse<T> = serde_json::from_str(&body)?;
        if !wrapped.success {
            return Err(BirdeyeError::api_error(
                status,
                wrapped.message.unwrap_or_else(|| "request unsuccessful".to_string()),
            ));
        }
        wrapped.data.ok_or_else(|| BirdeyeError::Api {
            code: i32::from(status.as_u16()),
            message: "response has no data".to_string(),
        })
    }
}

impl std::fmt::Debug for BirdeyeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BirdeyeClient")
            .field("base_url", &self.base_url.as_str())
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}
