/*
[INPUT]:  REST option structs with explicit defaults
[OUTPUT]: Ordered query parameter lists
[POS]:    Data layer - request option catalog
[UPDATE]: When an endpoint gains a parameter or a default changes
*/

use super::enums::{AddressType, ChartInterval, Currency};

/// Flatten an option struct into `key=value` query parameters.
///
/// Implementations emit required parameters always and optional ones only
/// when set; defaults are applied by the constructors, not here.
pub trait QueryParams {
    fn query_params(&self) -> Vec<(&'static str, String)>;
}

/// Options for `GET /defi/price`
#[derive(Debug, Clone, PartialEq)]
pub struct PriceParams {
    pub address: String,
    pub check_liquidity: Option<f64>,
    pub include_liquidity: bool,
}

impl PriceParams {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            check_liquidity: None,
            include_liquidity: false,
        }
    }

    pub fn with_check_liquidity(mut self, min_liquidity: f64) -> Self {
        self.check_liquidity = Some(min_liquidity);
        self
    }

    pub fn with_include_liquidity(mut self, include: bool) -> Self {
        self.include_liquidity = include;
        self
    }
}

impl QueryParams for PriceParams {
    fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("address", self.address.clone())];
        if let Some(min_liquidity) = self.check_liquidity {
            params.push(("check_liquidity", min_liquidity.to_string()));
        }
        params.push(("include_liquidity", self.include_liquidity.to_string()));
        params
    }
}

/// Options for `GET /defi/history_price`
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPriceParams {
    pub address: String,
    pub address_type: AddressType,
    pub interval: ChartInterval,
    pub time_from: i64,
    pub time_to: i64,
}

impl HistoryPriceParams {
    /// Defaults: token address, 15m interval.
    pub fn new(address: impl Into<String>, time_from: i64, time_to: i64) -> Self {
        Self {
            address: address.into(),
            address_type: AddressType::Token,
            interval: ChartInterval::FifteenMinutes,
            time_from,
            time_to,
        }
    }

    pub fn with_address_type(mut self, address_type: AddressType) -> Self {
        self.address_type = address_type;
        self
    }

    pub fn with_interval(mut self, interval: ChartInterval) -> Self {
        self.interval = interval;
        self
    }
}

impl QueryParams for HistoryPriceParams {
    fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("address", self.address.clone()),
            ("address_type", self.address_type.to_string()),
            ("type", self.interval.to_string()),
            ("time_from", self.time_from.to_string()),
            ("time_to", self.time_to.to_string()),
        ]
    }
}

/// Options for `GET /defi/ohlcv`
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvParams {
    pub address: String,
    pub interval: ChartInterval,
    pub currency: Currency,
    pub time_from: i64,
    pub time_to: i64,
}

impl OhlcvParams {
    /// Defaults: 15m interval, USD.
    pub fn new(address: impl Into<String>, time_from: i64, time_to: i64) -> Self {
        Self {
            address: address.into(),
            interval: ChartInterval::FifteenMinutes,
            currency: Currency::Usd,
            time_from,
            time_to,
        }
    }

    pub fn with_interval(mut self, interval: ChartInterval) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }
}

impl QueryParams for OhlcvParams {
    fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("address", self.address.clone()),
            ("type", self.interval.to_string()),
            ("currency", self.currency.to_string()),
            ("time_from", self.time_from.to_string()),
            ("time_to", self.time_to.to_string()),
        ]
    }
}
