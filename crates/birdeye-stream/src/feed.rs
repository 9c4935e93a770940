/*
[INPUT]:  Connected feed client, configured subscriptions, shutdown token
[OUTPUT]: Decoded push messages logged via tracing; per-kind counters
[POS]:    Runtime layer - subscribe and consume the push feed
[UPDATE]: When adding push kinds or changing shutdown semantics
*/

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use birdeye_adapter::ws::{complex_payload, payload, unsubscribe_payload};
use birdeye_adapter::{
    BaseQuotePriceUpdate, BirdeyeWebSocket, InboundEnvelope, InboundKind, LargeTradeUpdate,
    NewPair, PriceUpdate, Subscription, TokenNewListing, TokenStats, TransactionUpdate,
    WalletTransaction,
};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SubscriptionsConfig;

/// Counters collected while streaming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub messages: u64,
    pub decode_errors: u64,
    pub feed_errors: u64,
    pub by_kind: BTreeMap<String, u64>,
}

impl FeedStats {
    fn record(&mut self, kind: &InboundKind) {
        self.messages += 1;
        *self.by_kind.entry(kind.to_string()).or_default() += 1;
    }

    pub fn count(&self, kind: &InboundKind) -> u64 {
        self.by_kind.get(kind.as_str()).copied().unwrap_or_default()
    }
}

/// Why the stream loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamExit {
    Shutdown,
    MessageLimit,
}

fn push_frames<S: Subscription>(
    frames: &mut Vec<Vec<u8>>,
    items: &[S],
    complex: bool,
) -> birdeye_adapter::Result<()> {
    let Some(first) = items.first() else {
        return Ok(());
    };
    if complex && items.len() > 1 && first.kind().uses_filter() {
        frames.push(complex_payload(items)?);
        return Ok(());
    }
    for item in items {
        frames.push(payload(item)?);
    }
    Ok(())
}

fn push_unsubscribe_frames<S: Subscription>(
    frames: &mut Vec<Vec<u8>>,
    items: &[S],
) -> birdeye_adapter::Result<()> {
    for item in items {
        frames.push(unsubscribe_payload(item.kind(), item)?);
    }
    Ok(())
}

/// Encoded subscribe frames in a stable kind order.
pub fn subscribe_frames(subs: &SubscriptionsConfig) -> birdeye_adapter::Result<Vec<Vec<u8>>> {
    let mut frames = Vec::with_capacity(subs.len());
    push_frames(&mut frames, &subs.price, subs.complex)?;
    push_frames(&mut frames, &subs.transactions, subs.complex)?;
    push_frames(&mut frames, &subs.base_quote_price, subs.complex)?;
    push_frames(&mut frames, &subs.large_trade, subs.complex)?;
    push_frames(&mut frames, &subs.token_new_listing, subs.complex)?;
    push_frames(&mut frames, &subs.new_pair, subs.complex)?;
    push_frames(&mut frames, &subs.wallet, subs.complex)?;
    push_frames(&mut frames, &subs.token_stats, subs.complex)?;
    Ok(frames)
}

/// One unsubscribe frame per configured entry.
pub fn unsubscribe_frames(subs: &SubscriptionsConfig) -> birdeye_adapter::Result<Vec<Vec<u8>>> {
    let mut frames = Vec::with_capacity(subs.len());
    push_unsubscribe_frames(&mut frames, &subs.price)?;
    push_unsubscribe_frames(&mut frames, &subs.transactions)?;
    push_unsubscribe_frames(&mut frames, &subs.base_quote_price)?;
    push_unsubscribe_frames(&mut frames, &subs.large_trade)?;
    push_unsubscribe_frames(&mut frames, &subs.token_new_listing)?;
    push_unsubscribe_frames(&mut frames, &subs.new_pair)?;
    push_unsubscribe_frames(&mut frames, &subs.wallet)?;
    push_unsubscribe_frames(&mut frames, &subs.token_stats)?;
    Ok(frames)
}

/// Connects once, subscribes, and logs push messages until shutdown.
///
/// There is no reconnect: a dropped feed ends [`FeedRunner::run`] with an error.
pub struct FeedRunner {
    ws: Arc<BirdeyeWebSocket>,
    subscriptions: SubscriptionsConfig,
    shutdown: CancellationToken,
    max_messages: Option<u64>,
}

impl FeedRunner {
    pub fn new(
        ws: Arc<BirdeyeWebSocket>,
        subscriptions: SubscriptionsConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            ws,
            subscriptions,
            shutdown,
            max_messages: None,
        }
    }

    /// Stop after this many inbound messages.
    pub fn with_max_messages(mut self, limit: Option<u64>) -> Self {
        self.max_messages = limit;
        self
    }

    pub async fn run(&self) -> Result<(StreamExit, FeedStats)> {
        let frames = subscribe_frames(&self.subscriptions).context("encode subscriptions")?;

        self.ws
            .connect(&self.shutdown)
            .await
            .context("connect feed")?;

        for frame in frames.iter().cloned() {
            self.ws.subscribe(frame).await.context("send subscription")?;
        }
        info!(
            entries = self.subscriptions.len(),
            frames = frames.len(),
            "subscriptions sent"
        );

        let mut stats = FeedStats::default();
        let outcome = self.stream_loop(&mut stats).await;

        if outcome.is_ok() {
            self.unsubscribe_all().await;
        }
        if let Err(err) = self.ws.close().await {
            debug!(error = %err, "feed close failed");
        }

        info!(
            messages = stats.messages,
            decode_errors = stats.decode_errors,
            feed_errors = stats.feed_errors,
            "feed stopped"
        );
        outcome.map(|exit| (exit, stats))
    }

    async fn stream_loop(&self, stats: &mut FeedStats) -> Result<StreamExit> {
        loop {
            if self.max_messages.is_some_and(|limit| stats.messages >= limit) {
                return Ok(StreamExit::MessageLimit);
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!("feed shutdown requested");
                    return Ok(StreamExit::Shutdown);
                }
                next = self.ws.read() => {
                    match next {
                        Ok(Some(envelope)) => handle_envelope(&envelope, stats),
                        Ok(None) => return Err(anyhow!("feed is not connected")),
                        Err(err) if err.is_connection_error() => {
                            warn!(error = %err, "feed connection lost");
                            return Err(err).context("read feed");
                        }
                        Err(err) => {
                            stats.decode_errors += 1;
                            warn!(error = %err, "skipping unreadable frame");
                        }
                    }
                }
            }
        }
    }

    async fn unsubscribe_all(&self) {
        let frames = match unsubscribe_frames(&self.subscriptions) {
            Ok(frames) => frames,
            Err(err) => {
                warn!(error = %err, "encode unsubscriptions failed");
                return;
            }
        };
        for frame in frames {
            if let Err(err) = self.ws.send(frame).await {
                debug!(error = %err, "unsubscribe failed");
                return;
            }
        }
    }
}

fn decode_or_count<T: DeserializeOwned>(
    envelope: &InboundEnvelope,
    stats: &mut FeedStats,
) -> Option<T> {
    match envelope.decode() {
        Ok(value) => Some(value),
        Err(err) => {
            stats.decode_errors += 1;
            warn!(kind = %envelope.kind(), error = %err, "payload decode failed");
            None
        }
    }
}

/// Decode one push message into its concrete shape and log it.
pub fn handle_envelope(envelope: &InboundEnvelope, stats: &mut FeedStats) {
    stats.record(envelope.kind());

    match envelope.kind() {
        InboundKind::Welcome => info!("feed welcome received"),
        InboundKind::PriceData => {
            if let Some(p) = decode_or_count::<PriceUpdate>(envelope, stats) {
                info!(
                    address = %p.address,
                    chart_type = p.chart_type.as_deref().unwrap_or("-"),
                    o = %p.o, h = %p.h, l = %p.l, c = %p.c, v = %p.v,
                    unix_time = p.unix_time,
                    "price"
                );
            }
        }
        InboundKind::BaseQuotePriceData => {
            if let Some(p) = decode_or_count::<BaseQuotePriceUpdate>(envelope, stats) {
                info!(
                    base = %p.base_address,
                    quote = %p.quote_address,
                    c = %p.c,
                    unix_time = p.unix_time,
                    "base/quote price"
                );
            }
        }
        InboundKind::TxsData => {
            if let Some(tx) = decode_or_count::<TransactionUpdate>(envelope, stats) {
                info!(
                    tx_hash = %tx.tx_hash,
                    side = ?tx.side,
                    from = %tx.from.address,
                    to = %tx.to.address,
                    volume_usd = ?tx.volume_usd,
                    "transaction"
                );
            }
        }
        InboundKind::LargeTradeData => {
            if let Some(tx) = decode_or_count::<LargeTradeUpdate>(envelope, stats) {
                info!(
                    tx_hash = %tx.tx_hash,
                    volume_usd = %tx.volume_usd,
                    owner = %tx.owner,
                    "large trade"
                );
            }
        }
        InboundKind::TokenNewListingData => {
            if let Some(token) = decode_or_count::<TokenNewListing>(envelope, stats) {
                info!(
                    address = %token.address,
                    symbol = ?token.symbol,
                    liquidity = ?token.liquidity,
                    "new listing"
                );
            }
        }
        InboundKind::NewPairData => {
            if let Some(pair) = decode_or_count::<NewPair>(envelope, stats) {
                info!(
                    address = %pair.address,
                    base = %pair.base.address,
                    quote = %pair.quote.address,
                    source = ?pair.source,
                    "new pair"
                );
            }
        }
        InboundKind::WalletTxsData => {
            if let Some(tx) = decode_or_count::<WalletTransaction>(envelope, stats) {
                info!(
                    owner = %tx.owner,
                    tx_hash = %tx.tx_hash,
                    tx_type = ?tx.tx_type,
                    "wallet transaction"
                );
            }
        }
        InboundKind::TokenStatsData => {
            if let Some(s) = decode_or_count::<TokenStats>(envelope, stats) {
                info!(
                    address = %s.address,
                    price = ?s.price,
                    liquidity = ?s.liquidity,
                    "token stats"
                );
            }
        }
        InboundKind::Error => {
            stats.feed_errors += 1;
            let error = envelope.decode_error().unwrap_or_default();
            warn!(code = ?error.code, message = ?error.message, "feed error");
        }
        InboundKind::Other(kind) => debug!(%kind, "unhandled message kind"),
    }
}
