/*
[INPUT]:  BIRDEYE_API_KEY environment variable
[OUTPUT]: Live SOL price candles printed to stdout
[POS]:    Examples - WebSocket stream handling
[UPDATE]: When WebSocket API changes
*/

use birdeye_adapter::ws::PriceSubscription;
use birdeye_adapter::*;
use tokio::time::{Duration, timeout};
use tokio_util::sync::CancellationToken;

const SOL: &str = "So11111111111111111111111111111111111111112";

/// Example: subscribe to one-minute SOL/USD candles
///
/// The feed pushes `WELCOME` first, then `PRICE_DATA` for every candle update.
#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Birdeye WebSocket Example ===\n");

    let api_key = std::env::var("BIRDEYE_API_KEY").unwrap_or_default();
    let ws = BirdeyeWebSocket::new(FeedConfig::new(api_key, Chain::Solana));

    ws.connect(&CancellationToken::new()).await?;
    println!("✓ Connected to {}", ws.config().redacted_url());

    let sub = PriceSubscription::new(SOL)
        .with_chart_type(ChartInterval::OneMinute)
        .with_currency(Currency::Usd)
        .with_query_type(QueryType::Simple);
    ws.subscribe_to(&sub).await?;
    println!("✓ Subscribed to {SOL} 1m candles\n");

    for _ in 0..5 {
        let Ok(next) = timeout(Duration::from_secs(30), ws.read()).await else {
            println!("no message within 30s");
            break;
        };
        let Some(envelope) = next? else {
            break;
        };
        match envelope.kind() {
            InboundKind::PriceData => {
                let candle: PriceUpdate = envelope.decode()?;
                println!(
                    "candle @{}: o={} h={} l={} c={}",
                    candle.unix_time, candle.o, candle.h, candle.l, candle.c
                );
            }
            InboundKind::Error => println!("feed error: {:?}", envelope.decode_error()),
            other => println!("{other}"),
        }
    }

    ws.unsubscribe(SubscriptionKind::Price, &sub).await?;
    ws.close().await?;
    println!("\n✓ WebSocket example complete");
    Ok(())
}
