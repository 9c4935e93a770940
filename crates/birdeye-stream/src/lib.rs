/*
[INPUT]:  Public API exports for birdeye-stream crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod feed;

// Re-export main types for convenience
pub use config::{StreamConfig, SubscriptionsConfig};
pub use feed::{FeedRunner, FeedStats, StreamExit};
