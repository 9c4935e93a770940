/*
[INPUT]:  Caller-chosen stream kind and filter fields
[OUTPUT]: Subscription values that render their own filter or field map
[POS]:    WebSocket layer - subscription request catalog
[UPDATE]: When the feed adds a stream kind or a filter field
*/

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::query::FilterExpression;
use crate::error::{BirdeyeError, Result};
use crate::types::{ChartInterval, Currency, QueryType};

/// Streams the feed can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionKind {
    Price,
    Transactions,
    BaseQuotePrice,
    TokenNewListing,
    NewPair,
    LargeTrade,
    WalletTransactions,
    TokenStats,
}

impl SubscriptionKind {
    pub const ALL: [SubscriptionKind; 8] = [
        SubscriptionKind::Price,
        SubscriptionKind::Transactions,
        SubscriptionKind::BaseQuotePrice,
        SubscriptionKind::TokenNewListing,
        SubscriptionKind::NewPair,
        SubscriptionKind::LargeTrade,
        SubscriptionKind::WalletTransactions,
        SubscriptionKind::TokenStats,
    ];

    pub fn subscribe_verb(&self) -> &'static str {
        match self {
            SubscriptionKind::Price => "SUBSCRIBE_PRICE",
            SubscriptionKind::Transactions => "SUBSCRIBE_TXS",
            SubscriptionKind::BaseQuotePrice => "SUBSCRIBE_BASE_QUOTE_PRICE",
            SubscriptionKind::TokenNewListing => "SUBSCRIBE_TOKEN_NEW_LISTING",
            SubscriptionKind::NewPair => "SUBSCRIBE_NEW_PAIR",
            SubscriptionKind::LargeTrade => "SUBSCRIBE_LARGE_TRADE_TXS",
            SubscriptionKind::WalletTransactions => "SUBSCRIBE_WALLET_TXS",
            SubscriptionKind::TokenStats => "SUBSCRIBE_TOKEN_STATS",
        }
    }

    pub fn unsubscribe_verb(&self) -> &'static str {
        match self {
            SubscriptionKind::Price => "UNSUBSCRIBE_PRICE",
            SubscriptionKind::Transactions => "UNSUBSCRIBE_TXS",
            SubscriptionKind::BaseQuotePrice => "UNSUBSCRIBE_BASE_QUOTE_PRICE",
            SubscriptionKind::TokenNewListing => "UNSUBSCRIBE_TOKEN_NEW_LISTING",
            SubscriptionKind::NewPair => "UNSUBSCRIBE_NEW_PAIR",
            SubscriptionKind::LargeTrade => "UNSUBSCRIBE_LARGE_TRADE_TXS",
            SubscriptionKind::WalletTransactions => "UNSUBSCRIBE_WALLET_TXS",
            SubscriptionKind::TokenStats => "UNSUBSCRIBE_TOKEN_STATS",
        }
    }

    /// Whether `data` carries a filter expression rather than a flat field map.
    pub fn uses_filter(&self) -> bool {
        matches!(
            self,
            SubscriptionKind::Price
                | SubscriptionKind::Transactions
                | SubscriptionKind::BaseQuotePrice
                | SubscriptionKind::LargeTrade
        )
    }
}

impl fmt::Display for SubscriptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subscribe_verb())
    }
}

/// A request describing what to watch.
///
/// Filter kinds implement [`Subscription::query`] and inherit the default
/// `data`, which wraps the filter as `{"query": ...}`. Field-map kinds leave
/// `query` empty and override `data` with their present fields.
pub trait Subscription {
    fn kind(&self) -> SubscriptionKind;

    /// Simple-mode filter group; `""` when no field is present.
    fn query(&self) -> String {
        String::new()
    }

    /// Body of the envelope's `data` object.
    fn data(&self) -> Result<Map<String, Value>> {
        let mut data = Map::new();
        data.insert("query".to_string(), Value::String(self.query()));
        Ok(data)
    }
}

/// Serialize a field-map subscription; absent fields are skipped by serde.
fn field_map<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(BirdeyeError::Serialization(format!(
            "expected an object, got {other}"
        ))),
        Err(err) => Err(BirdeyeError::Serialization(err.to_string())),
    }
}

/// OHLCV price ticks for a token or pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSubscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<ChartInterval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_type: Option<QueryType>,
}

impl PriceSubscription {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::default()
        }
    }

    pub fn with_chart_type(mut self, chart_type: ChartInterval) -> Self {
        self.chart_type = Some(chart_type);
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    pub fn with_query_type(mut self, query_type: QueryType) -> Self {
        self.query_type = Some(query_type);
        self
    }
}

impl Subscription for PriceSubscription {
    fn kind(&self) -> SubscriptionKind {
        SubscriptionKind::Price
    }

    fn query(&self) -> String {
        FilterExpression::new()
            .atom_opt("address", self.address.as_deref())
            .atom_opt("chartType", self.chart_type)
            .atom_opt("currency", self.currency)
            .atom_opt("queryType", self.query_type)
            .build()
    }
}

/// Swaps touching a token or a pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsSubscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_type: Option<QueryType>,
}

impl TransactionsSubscription {
    pub fn for_token(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::default()
        }
    }

    pub fn for_pair(pair_address: impl Into<String>) -> Self {
        Self {
            pair_address: Some(pair_address.into()),
            ..Self::default()
        }
    }

    pub fn with_query_type(mut self, query_type: QueryType) -> Self {
        self.query_type = Some(query_type);
        self
    }
}

impl Subscription for TransactionsSubscription {
    fn kind(&self) -> SubscriptionKind {
        SubscriptionKind::Transactions
    }

    fn query(&self) -> String {
        FilterExpression::new()
            .atom_opt("address", self.address.as_deref())
            .atom_opt("pairAddress", self.pair_address.as_deref())
            .atom_opt("queryType", self.query_type)
            .build()
    }
}

/// Price of a base token quoted in an arbitrary quote token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseQuotePriceSubscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<ChartInterval>,
}

impl BaseQuotePriceSubscription {
    pub fn new(base_address: impl Into<String>, quote_address: impl Into<String>) -> Self {
        Self {
            base_address: Some(base_address.into()),
            quote_address: Some(quote_address.into()),
            chart_type: None,
        }
    }

    pub fn with_chart_type(mut self, chart_type: ChartInterval) -> Self {
        self.chart_type = Some(chart_type);
        self
    }
}

impl Subscription for BaseQuotePriceSubscription {
    fn kind(&self) -> SubscriptionKind {
        SubscriptionKind::BaseQuotePrice
    }

    fn query(&self) -> String {
        FilterExpression::new()
            .atom_opt("baseAddress", self.base_address.as_deref())
            .atom_opt("quoteAddress", self.quote_address.as_deref())
            .atom_opt("chartType", self.chart_type)
            .build()
    }
}

/// Trades above a USD volume threshold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LargeTradeSubscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_volume: Option<f64>,
}

impl LargeTradeSubscription {
    pub fn with_min_volume(mut self, volume: f64) -> Self {
        self.min_volume = Some(volume);
        self
    }

    pub fn with_max_volume(mut self, volume: f64) -> Self {
        self.max_volume = Some(volume);
        self
    }
}

impl Subscription for LargeTradeSubscription {
    fn kind(&self) -> SubscriptionKind {
        SubscriptionKind::LargeTrade
    }

    fn query(&self) -> String {
        FilterExpression::new()
            .atom_opt("min_volume", self.min_volume)
            .atom_opt("max_volume", self.max_volume)
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenNewListingSubscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meme_platform_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_liquidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_liquidity: Option<f64>,
}

impl Subscription for TokenNewListingSubscription {
    fn kind(&self) -> SubscriptionKind {
        SubscriptionKind::TokenNewListing
    }

    fn data(&self) -> Result<Map<String, Value>> {
        field_map(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPairSubscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_liquidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_liquidity: Option<f64>,
}

impl Subscription for NewPairSubscription {
    fn kind(&self) -> SubscriptionKind {
        SubscriptionKind::NewPair
    }

    fn data(&self) -> Result<Map<String, Value>> {
        field_map(self)
    }
}

/// Activity of a single wallet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletTransactionsSubscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl WalletTransactionsSubscription {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
        }
    }
}

impl Subscription for WalletTransactionsSubscription {
    fn kind(&self) -> SubscriptionKind {
        SubscriptionKind::WalletTransactions
    }

    fn data(&self) -> Result<Map<String, Value>> {
        field_map(self)
    }
}

/// Which statistic groups a token-stats subscription should push.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStatsSelect {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_data_intraday: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fdv: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketcap: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_trade: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenStatsSubscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<TokenStatsSelect>,
}

impl TokenStatsSubscription {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            select: None,
        }
    }

    pub fn with_select(mut self, select: TokenStatsSelect) -> Self {
        self.select = Some(select);
        self
    }
}

impl Subscription for TokenStatsSubscription {
    fn kind(&self) -> SubscriptionKind {
        SubscriptionKind::TokenStats
    }

    fn data(&self) -> Result<Map<String, Value>> {
        field_map(self)
    }
}
