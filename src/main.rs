use btcbot::api::{AlpacaClient, FearGreedClient, NewsClient};
use btcbot::context::ContextAggregator;
use btcbot::journal::TradeJournal;
use btcbot::oracle::OpenAiOracle;
use btcbot::trader::Trader;
use btcbot::{Config, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};

#[derive(Parser, Debug)]
#[command(name = "btcbot", about = "AI-driven Bitcoin trading loop")]
struct Args {
    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Seconds between cycles
    #[arg(long, default_value_t = 600)]
    interval_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let args = Args::parse();
    let config = Config::from_env()?;

    tracing::info!("🚀 btcbot starting ({})", config.symbol);

    let broker = AlpacaClient::new(config.alpaca.clone(), config.symbol.clone());
    let aggregator = ContextAggregator::new(
        broker.clone(),
        FearGreedClient::new(),
        NewsClient::new(config.serpapi_api_key.clone()),
    );
    let oracle = Arc::new(OpenAiOracle::new(config.openai_api_key.clone()));
    let journal = TradeJournal::open(&config.database_path).await?;

    let trader = Trader::new(broker, aggregator, oracle, journal);

    if args.once {
        trader.run_cycle().await?;
        return Ok(());
    }

    tracing::info!(
        "Running every {}s, press Ctrl+C to stop",
        args.interval_secs
    );

    // One cycle at a time: the ticker body awaits the full pipeline, and a
    // missed tick is skipped rather than queued
    let mut ticker = interval(Duration::from_secs(args.interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = trader.run_cycle().await {
                    tracing::warn!("Cycle failed: {}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("⚠️  Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    tracing::info!("👋 btcbot stopped");
    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "btcbot=info".into()),
        )
        .init();
}
