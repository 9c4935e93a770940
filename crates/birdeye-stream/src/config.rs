/*
[INPUT]:  YAML configuration file, BIRDEYE_API_KEY environment variable
[OUTPUT]: Parsed stream configuration and feed settings
[POS]:    Configuration layer - feed and subscription setup
[UPDATE]: When adding new configuration options or subscription kinds
*/

use std::time::Duration;

use anyhow::{Context, Result, bail};
use birdeye_adapter::ws::{
    BaseQuotePriceSubscription, LargeTradeSubscription, NewPairSubscription, PriceSubscription,
    TokenNewListingSubscription, TokenStatsSubscription, TransactionsSubscription,
    WalletTransactionsSubscription,
};
use birdeye_adapter::{Chain, FeedConfig};
use serde::{Deserialize, Serialize};

/// Environment variable consulted when the file has no `api_key`
pub const API_KEY_ENV: &str = "BIRDEYE_API_KEY";

/// Top-level configuration for the stream runner
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StreamConfig {
    /// Birdeye API key; falls back to `BIRDEYE_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub chain: Chain,
    /// Override for the feed host, e.g. a local mock
    #[serde(default)]
    pub ws_base_url: Option<String>,
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    #[serde(default)]
    pub subscriptions: SubscriptionsConfig,
}

/// Subscriptions to send after connecting, grouped by kind
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubscriptionsConfig {
    /// Send each filter kind with several entries as one complex query
    #[serde(default)]
    pub complex: bool,
    #[serde(default)]
    pub price: Vec<PriceSubscription>,
    #[serde(default)]
    pub transactions: Vec<TransactionsSubscription>,
    #[serde(default)]
    pub base_quote_price: Vec<BaseQuotePriceSubscription>,
    #[serde(default)]
    pub large_trade: Vec<LargeTradeSubscription>,
    #[serde(default)]
    pub token_new_listing: Vec<TokenNewListingSubscription>,
    #[serde(default)]
    pub new_pair: Vec<NewPairSubscription>,
    #[serde(default)]
    pub wallet: Vec<WalletTransactionsSubscription>,
    #[serde(default)]
    pub token_stats: Vec<TokenStatsSubscription>,
}

impl SubscriptionsConfig {
    /// Number of configured subscription entries
    pub fn len(&self) -> usize {
        self.price.len()
            + self.transactions.len()
            + self.base_quote_price.len()
            + self.large_trade.len()
            + self.token_new_listing.len()
            + self.new_pair.len()
            + self.wallet.len()
            + self.token_stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StreamConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("read config file {path}"))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("parse config yaml")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.subscriptions.is_empty() {
            bail!("config has no subscriptions");
        }
        if self.connect_timeout_ms == Some(0) {
            bail!("connect_timeout_ms must be positive");
        }
        Ok(())
    }

    /// API key from the file, else from the environment
    pub fn api_key(&self) -> Result<String> {
        resolve_api_key(self.api_key.as_deref(), std::env::var(API_KEY_ENV).ok())
    }

    /// Feed connection settings with the resolved API key
    pub fn feed_config(&self) -> Result<FeedConfig> {
        let mut feed = FeedConfig::new(self.api_key()?, self.chain);
        if let Some(url) = &self.ws_base_url {
            feed = feed.with_ws_base_url(url.clone());
        }
        if let Some(timeout_ms) = self.connect_timeout_ms {
            feed = feed.with_connect_timeout(Duration::from_millis(timeout_ms));
        }
        Ok(feed)
    }
}

fn resolve_api_key(configured: Option<&str>, from_env: Option<String>) -> Result<String> {
    let key = configured
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .or_else(|| from_env.filter(|key| !key.trim().is_empty()));
    key.with_context(|| format!("api_key missing from config and {API_KEY_ENV} is unset"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use birdeye_adapter::{ChartInterval, Currency};
    use rstest::rstest;

    const SAMPLE: &str = r#"
chain: base
ws_base_url: ws://127.0.0.1:9000
connect_timeout_ms: 2500
subscriptions:
  complex: true
  price:
    - address: tok1
      chartType: 1m
      currency: usd
    - address: tok2
  wallet:
    - address: wallet1
  token_stats:
    - address: tok1
      select:
        price: true
"#;

    #[test]
    fn test_parse_sample() {
        let config = StreamConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.chain, Chain::Base);
        assert!(config.subscriptions.complex);
        assert_eq!(config.subscriptions.len(), 4);

        let first = &config.subscriptions.price[0];
        assert_eq!(first.address.as_deref(), Some("tok1"));
        assert_eq!(first.chart_type, Some(ChartInterval::OneMinute));
        assert_eq!(first.currency, Some(Currency::Usd));
        assert_eq!(config.subscriptions.price[1].chart_type, None);

        let select = config.subscriptions.token_stats[0].select.as_ref().unwrap();
        assert_eq!(select.price, Some(true));
        assert_eq!(select.liquidity, None);
    }

    #[test]
    fn test_feed_config_overrides() {
        let mut config = StreamConfig::from_yaml_str(SAMPLE).unwrap();
        config.api_key = Some("file-key".to_string());

        let feed = config.feed_config().unwrap();
        assert_eq!(feed.api_key, "file-key");
        assert_eq!(feed.chain, Chain::Base);
        assert_eq!(feed.connect_timeout, Duration::from_millis(2500));
        assert_eq!(
            feed.feed_url().unwrap().as_str(),
            "ws://127.0.0.1:9000/socket/base?x-api-key=file-key"
        );
    }

    #[test]
    fn test_empty_subscriptions_rejected() {
        let err = StreamConfig::from_yaml_str("chain: solana\n").unwrap_err();
        assert!(err.to_string().contains("no subscriptions"));
    }

    #[test]
    fn test_unknown_chain_rejected() {
        let yaml = "chain: dogechain\nsubscriptions:\n  wallet:\n    - address: w\n";
        assert!(StreamConfig::from_yaml_str(yaml).is_err());
    }

    #[rstest]
    #[case(Some("file"), Some("env"), Some("file"))]
    #[case(None, Some("env"), Some("env"))]
    #[case(Some("  "), Some("env"), Some("env"))]
    #[case(None, Some(""), None)]
    #[case(None, None, None)]
    fn test_resolve_api_key(
        #[case] configured: Option<&str>,
        #[case] env: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let resolved = resolve_api_key(configured, env.map(str::to_string)).ok();
        assert_eq!(resolved.as_deref(), expected);
    }
}
