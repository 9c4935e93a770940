/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs for push payloads and REST responses
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::TradeSide;

/// `PRICE_DATA` payload: one OHLCV candle update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceUpdate {
    pub o: Decimal,
    pub h: Decimal,
    pub l: Decimal,
    pub c: Decimal,
    #[serde(default)]
    pub v: Decimal,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(rename = "type", default)]
    pub chart_type: Option<String>,
    pub unix_time: i64,
    #[serde(default)]
    pub symbol: Option<String>,
    pub address: String,
}

/// `BASE_QUOTE_PRICE_DATA` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseQuotePriceUpdate {
    pub o: Decimal,
    pub h: Decimal,
    pub l: Decimal,
    pub c: Decimal,
    #[serde(default)]
    pub v: Decimal,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(rename = "type", default)]
    pub chart_type: Option<String>,
    pub unix_time: i64,
    pub base_address: String,
    pub quote_address: String,
}

/// One side of a swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapLeg {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decimals: Option<u8>,
    pub address: String,
    #[serde(default)]
    pub ui_amount: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub nearest_price: Option<Decimal>,
}

/// `TXS_DATA` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub block_unix_time: i64,
    pub owner: String,
    #[serde(default)]
    pub source: Option<String>,
    pub tx_hash: String,
    #[serde(default)]
    pub side: Option<TradeSide>,
    #[serde(default)]
    pub token_address: Option<String>,
    #[serde(default)]
    pub pool_id: Option<String>,
    #[serde(rename = "volumeUSD", default)]
    pub volume_usd: Option<Decimal>,
    pub from: SwapLeg,
    pub to: SwapLeg,
}

/// `TXS_LARGE_TRADE_DATA` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LargeTradeUpdate {
    pub block_unix_time: i64,
    #[serde(default)]
    pub block_human_time: Option<String>,
    pub owner: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub pool_address: Option<String>,
    pub tx_hash: String,
    #[serde(rename = "volumeUSD")]
    pub volume_usd: Decimal,
    #[serde(default)]
    pub network: Option<String>,
    pub from: SwapLeg,
    pub to: SwapLeg,
}

/// `TOKEN_NEW_LISTING_DATA` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenNewListing {
    pub address: String,
    #[serde(default)]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub liquidity: Option<Decimal>,
    #[serde(default)]
    pub liquidity_added_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairToken {
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decimals: Option<u8>,
}

/// `NEW_PAIR_DATA` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPair {
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    pub base: PairToken,
    pub quote: PairToken,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub block_time: Option<i64>,
}

/// `WALLET_TXS_DATA` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    #[serde(rename = "type", default)]
    pub tx_type: Option<String>,
    pub block_unix_time: i64,
    pub owner: String,
    #[serde(default)]
    pub source: Option<String>,
    pub tx_hash: String,
    #[serde(rename = "volumeUSD", default)]
    pub volume_usd: Option<Decimal>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub base: Option<SwapLeg>,
    #[serde(default)]
    pub quote: Option<SwapLeg>,
}

/// `TOKEN_STATS_DATA` payload; only the selected groups are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenStats {
    pub address: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub fdv: Option<Decimal>,
    #[serde(default)]
    pub marketcap: Option<Decimal>,
    #[serde(default)]
    pub liquidity: Option<Decimal>,
    #[serde(default)]
    pub total_supply: Option<Decimal>,
    #[serde(default)]
    pub circulating_supply: Option<Decimal>,
    #[serde(default)]
    pub last_trade_unix_time: Option<i64>,
    #[serde(default)]
    pub volume_24h_usd: Option<Decimal>,
}

/// `ERROR` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorData {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
}

/// REST response wrapper: `{"success": bool, "data": T}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /defi/price`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrice {
    pub value: Decimal,
    pub update_unix_time: i64,
    #[serde(default)]
    pub update_human_time: Option<String>,
    #[serde(default)]
    pub liquidity: Option<Decimal>,
    #[serde(rename = "priceChange24h", default)]
    pub price_change_24h: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPricePoint {
    #[serde(default)]
    pub address: Option<String>,
    pub unix_time: i64,
    pub value: Decimal,
}

/// `GET /defi/history_price`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPrice {
    pub items: Vec<HistoryPricePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OhlcvCandle {
    pub o: Decimal,
    pub h: Decimal,
    pub l: Decimal,
    pub c: Decimal,
    pub v: Decimal,
    pub unix_time: i64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(rename = "type", default)]
    pub chart_type: Option<String>,
}

/// `GET /defi/ohlcv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    pub items: Vec<OhlcvCandle>,
}
