/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: Logged Birdeye push messages with graceful shutdown
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use birdeye_adapter::BirdeyeWebSocket;
use birdeye_stream::feed::subscribe_frames;
use birdeye_stream::{FeedRunner, StreamConfig};

#[derive(Parser, Debug)]
#[command(name = "birdeye-stream", version, about = "Birdeye WebSocket feed subscriber")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: PathBuf,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    /// Validate the config and print subscribe frames without connecting
    #[arg(long = "dry-run")]
    dry_run: bool,
    /// Exit after this many inbound messages
    #[arg(long = "max-messages", value_name = "N")]
    max_messages: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    info!(
        config_path = %args.config_path.display(),
        dry_run = args.dry_run,
        "starting birdeye-stream"
    );

    let config = load_config(&args.config_path)?;
    info!(
        chain = %config.chain,
        subscriptions = config.subscriptions.len(),
        "configuration loaded"
    );

    if args.dry_run {
        let frames = subscribe_frames(&config.subscriptions).context("encode subscriptions")?;
        for frame in &frames {
            println!("{}", String::from_utf8_lossy(frame));
        }
        info!(frames = frames.len(), "dry-run requested; configuration validated");
        return Ok(());
    }

    let feed = config.feed_config().context("build feed config")?;
    let ws = Arc::new(BirdeyeWebSocket::new(feed));

    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    let runner = FeedRunner::new(ws, config.subscriptions, shutdown)
        .with_max_messages(args.max_messages);
    let (exit, stats) = runner.run().await.context("run feed")?;

    info!(?exit, messages = stats.messages, "shutdown complete");
    for (kind, count) in &stats.by_kind {
        info!(%kind, count, "messages by kind");
    }

    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(path: &PathBuf) -> Result<StreamConfig> {
    let path_str = path
        .to_str()
        .context("config path must be valid utf-8")?;
    StreamConfig::from_file(path_str).context("load config")
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
