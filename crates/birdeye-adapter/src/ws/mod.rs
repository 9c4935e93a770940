/*
[INPUT]:  Feed configuration and subscription requests
[OUTPUT]: Live market-data push messages
[POS]:    WebSocket layer - real-time data streams
[UPDATE]: When adding new subscription kinds or changing connection logic
*/

pub mod client;
pub mod config;
pub mod envelope;
pub mod query;
pub mod subscription;
pub mod transport;

pub use client::BirdeyeWebSocket;
pub use config::FeedConfig;
pub use envelope::{InboundEnvelope, InboundKind, complex_payload, payload, unsubscribe_payload};
pub use query::{FilterExpression, complex_query, simple_query};
pub use subscription::{
    BaseQuotePriceSubscription, LargeTradeSubscription, NewPairSubscription, PriceSubscription,
    Subscription, SubscriptionKind, TokenNewListingSubscription, TokenStatsSelect,
    TokenStatsSubscription, TransactionsSubscription, WalletTransactionsSubscription,
};
pub use transport::{Dialer, Transport, TungsteniteDialer, TungsteniteTransport};
