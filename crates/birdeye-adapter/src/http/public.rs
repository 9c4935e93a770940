/*
[INPUT]:  Token addresses and query options
[OUTPUT]: Market data (spot price, price history, OHLCV candles)
[POS]:    HTTP layer - public market data endpoints (API key only)
[UPDATE]: When adding new public endpoints or changing response format
*/

use crate::error::Result;
use crate::http::BirdeyeClient;
use crate::types::{HistoryPrice, HistoryPriceParams, Ohlcv, OhlcvParams, PriceParams, TokenPrice};
use reqwest::Method;

impl BirdeyeClient {
    /// Query the current price of a token
    ///
    /// GET /defi/price?address={address}&include_liquidity={bool}
    pub async fn get_price(&self, params: &PriceParams) -> Result<TokenPrice> {
        let builder = self.request(Method::GET, "/defi/price", params)?;
        self.send_json(builder).await
    }

    /// Query historical price points
    ///
    /// GET /defi/history_price?address=..&address_type=..&type=..&time_from=..&time_to=..
    pub async fn get_history_price(&self, params: &HistoryPriceParams) -> Result<HistoryPrice> {
        let builder = self.request(Method::GET, "/defi/history_price", params)?;
        self.send_json(builder).await
    }

    /// Query OHLCV candles
    ///
    /// GET /defi/ohlcv?address=..&type=..&currency=..&time_from=..&time_to=..
    pub async fn get_ohlcv(&self, params: &OhlcvParams) -> Result<Ohlcv> {
        let builder = self.request(Method::GET, "/defi/ohlcv", params)?;
        self.send_json(builder).await
    }
}
