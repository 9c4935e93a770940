/*
[INPUT]:  Subscription values (outbound) and raw feed frames (inbound)
[OUTPUT]: `{"type", "data"}` envelopes; inbound kind + undecoded payload
[POS]:    WebSocket layer - envelope protocol encode/decode
[UPDATE]: When adding new push kinds or changing the envelope shape
*/

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::{Map, Value};

use super::query::complex_query;
use super::subscription::{Subscription, SubscriptionKind};
use crate::error::{BirdeyeError, Result};
use crate::types::{ErrorData, QueryType};

#[derive(Serialize)]
struct OutboundEnvelope<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    data: &'a Map<String, Value>,
}

fn encode(verb: &str, data: &Map<String, Value>) -> Result<Vec<u8>> {
    serde_json::to_vec(&OutboundEnvelope { kind: verb, data })
        .map_err(|err| BirdeyeError::Serialization(err.to_string()))
}

/// `{"type": <subscribe verb>, "data": <filter or field map>}`
pub fn payload<S: Subscription>(subscription: &S) -> Result<Vec<u8>> {
    let data = subscription.data()?;
    encode(subscription.kind().subscribe_verb(), &data)
}

/// Batch subscribe: `{"type": <verb>, "data": {"queryType": "complex", "query": <OR filter>}}`
pub fn complex_payload<S: Subscription>(subscriptions: &[S]) -> Result<Vec<u8>> {
    let Some(first) = subscriptions.first() else {
        return Err(BirdeyeError::Serialization(
            "complex subscription needs at least one request".to_string(),
        ));
    };
    let kind = first.kind();
    if !kind.uses_filter() {
        return Err(BirdeyeError::Serialization(format!(
            "{kind} does not accept a filter query"
        )));
    }

    let mut data = Map::new();
    data.insert(
        "queryType".to_string(),
        Value::String(QueryType::Complex.to_string()),
    );
    data.insert(
        "query".to_string(),
        Value::String(complex_query(subscriptions)),
    );
    encode(kind.subscribe_verb(), &data)
}

/// `{"type": <unsubscribe verb for kind>, "data": <subscription data>}`
pub fn unsubscribe_payload<S: Subscription>(
    kind: SubscriptionKind,
    subscription: &S,
) -> Result<Vec<u8>> {
    let data = subscription.data()?;
    encode(kind.unsubscribe_verb(), &data)
}

/// Push message kinds sent by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InboundKind {
    Welcome,
    PriceData,
    TxsData,
    BaseQuotePriceData,
    TokenNewListingData,
    NewPairData,
    LargeTradeData,
    WalletTxsData,
    TokenStatsData,
    Error,
    Other(String),
}

impl InboundKind {
    pub fn from_wire(kind: &str) -> Self {
        match kind {
            "WELCOME" => InboundKind::Welcome,
            "PRICE_DATA" => InboundKind::PriceData,
            "TXS_DATA" => InboundKind::TxsData,
            "BASE_QUOTE_PRICE_DATA" => InboundKind::BaseQuotePriceData,
            "TOKEN_NEW_LISTING_DATA" => InboundKind::TokenNewListingData,
            "NEW_PAIR_DATA" => InboundKind::NewPairData,
            "TXS_LARGE_TRADE_DATA" => InboundKind::LargeTradeData,
            "WALLET_TXS_DATA" => InboundKind::WalletTxsData,
            "TOKEN_STATS_DATA" => InboundKind::TokenStatsData,
            "ERROR" => InboundKind::Error,
            other => InboundKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InboundKind::Welcome => "WELCOME",
            InboundKind::PriceData => "PRICE_DATA",
            InboundKind::TxsData => "TXS_DATA",
            InboundKind::BaseQuotePriceData => "BASE_QUOTE_PRICE_DATA",
            InboundKind::TokenNewListingData => "TOKEN_NEW_LISTING_DATA",
            InboundKind::NewPairData => "NEW_PAIR_DATA",
            InboundKind::LargeTradeData => "TXS_LARGE_TRADE_DATA",
            InboundKind::WalletTxsData => "WALLET_TXS_DATA",
            InboundKind::TokenStatsData => "TOKEN_STATS_DATA",
            InboundKind::Error => "ERROR",
            InboundKind::Other(kind) => kind,
        }
    }
}

impl fmt::Display for InboundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<Box<RawValue>>,
}

/// An inbound frame whose `data` stays undecoded until the caller picks a shape.
#[derive(Debug, Clone)]
pub struct InboundEnvelope {
    kind: InboundKind,
    data: Option<Box<RawValue>>,
}

impl InboundEnvelope {
    /// Parse the envelope only; `data` is kept as raw JSON.
    pub fn from_slice(frame: &[u8]) -> Result<Self> {
        let raw: RawEnvelope = serde_json::from_slice(frame)?;
        Ok(Self {
            kind: InboundKind::from_wire(&raw.kind),
            data: raw.data,
        })
    }

    pub fn kind(&self) -> &InboundKind {
        &self.kind
    }

    /// Raw `data` JSON; `None` when absent or `null`.
    pub fn raw_data(&self) -> Option<&RawValue> {
        self.data.as_deref()
    }

    /// Decode `data` into the shape matching [`Self::kind`].
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let raw = self.data.as_deref().map(RawValue::get).unwrap_or("null");
        Ok(serde_json::from_str(raw)?)
    }

    /// Payload of an `ERROR` frame, if this is one.
    pub fn decode_error(&self) -> Option<ErrorData> {
        if self.kind != InboundKind::Error {
            return None;
        }
        if let Ok(error) = self.decode::<ErrorData>() {
            return Some(error);
        }
        // Some errors arrive as a bare string payload.
        let message = match self.decode::<String>() {
            Ok(message) => Some(message),
            Err(_) => self.data.as_deref().map(|raw| raw.get().to_string()),
        };
        Some(ErrorData {
            message,
            code: None,
        })
    }
}
