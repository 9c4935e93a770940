/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Birdeye adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod error;
pub mod http;
pub mod types;
pub mod ws;

pub use error::{BirdeyeError, Result};

// Re-export commonly used types from http
pub use http::{BirdeyeClient, ClientConfig};

// Re-export all types
pub use types::*;

// Re-export commonly used types from ws
pub use ws::{
    BirdeyeWebSocket,
    FeedConfig,
    InboundEnvelope,
    InboundKind,
    Subscription,
    SubscriptionKind,
};
