/*
[INPUT]:  BIRDEYE_API_KEY environment variable, token address
[OUTPUT]: Spot price, price history and OHLCV candles
[POS]:    Examples - public market data queries
[UPDATE]: When adding new market data endpoints
*/

use birdeye_adapter::*;

/// Example: query REST market data for SOL
#[tokio::main]
async fn main() {
    println!("=== Birdeye Market Data Example ===\n");

    let api_key = std::env::var("BIRDEYE_API_KEY").unwrap_or_default();
    let client = match BirdeyeClient::new(api_key) {
        Ok(c) => c.with_chain(Chain::Solana),
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    println!("✓ HTTP client created\n");

    let address = "So11111111111111111111111111111111111111112";
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();

    println!("Querying price for {}...", address);
    match client
        .get_price(&PriceParams::new(address).with_include_liquidity(true))
        .await
    {
        Ok(price) => println!("✓ Price: {} (liquidity {:?})", price.value, price.liquidity),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying hourly price history for the last day...");
    let history = HistoryPriceParams::new(address, now - 86_400, now)
        .with_interval(ChartInterval::OneHour);
    match client.get_history_price(&history).await {
        Ok(history) => println!("✓ {} points", history.items.len()),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying 15m OHLCV for the last 6 hours...");
    match client.get_ohlcv(&OhlcvParams::new(address, now - 6 * 3_600, now)).await {
        Ok(ohlcv) => {
            for candle in ohlcv.items.iter().take(5) {
                println!(
                    "  {} o={} h={} l={} c={} v={}",
                    candle.unix_time, candle.o, candle.h, candle.l, candle.c, candle.v
                );
            }
        }
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\n✓ Market data example complete");
}
