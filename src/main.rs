use clap::Parser;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use trendcheck::analysis::{analyze_batch, BatchRequest};
use trendcheck::api::ipify::{fetch_public_ip, IPIFY_URL};
use trendcheck::models::Granularity;
use trendcheck::report::render_report;
use trendcheck::settings::AppConfig;
use trendcheck::strategy::TrendStrategy;
use trendcheck::Result;

/// Trend, signal and TP/SL levels for up to 10 futures symbols
#[derive(Debug, Parser)]
#[command(name = "trendcheck", version, about)]
struct Cli {
    /// Comma-separated symbols, e.g. "BTCUSDT, ETHUSDT"
    #[arg(short, long)]
    symbols: Option<String>,

    /// Candle interval (4h or 1d), defaults to the configured interval
    #[arg(short, long)]
    interval: Option<Granularity>,

    /// Candles fetched per symbol
    #[arg(short, long)]
    window: Option<usize>,

    /// Delay between symbols in milliseconds
    #[arg(long)]
    pacing_ms: Option<u64>,

    /// Minimum candles before a symbol is analyzed
    #[arg(long)]
    min_candles: Option<usize>,

    /// Print this machine's public IP (for API key whitelisting) and continue
    #[arg(long)]
    show_ip: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let config = apply_overrides(AppConfig::load()?, &cli);

    if cli.show_ip {
        print_public_ip().await;
    }

    let Some(input) = cli.symbols.as_deref() else {
        if cli.show_ip {
            return Ok(());
        }
        eprintln!("❌ No symbols given, use --symbols \"BTCUSDT, ETHUSDT\"");
        std::process::exit(2);
    };

    let request = match batch_from_input(input, config.interval) {
        Ok(request) => request,
        Err(message) => {
            eprintln!("❌ {}", message);
            std::process::exit(2);
        }
    };

    tracing::info!(
        "🔍 Analyzing {} on {} candles",
        request.symbols().join(", "),
        request.granularity()
    );

    let provider = Arc::new(config.binance_client()?);
    let strategy = Arc::new(TrendStrategy::new(config.signal_config()));

    let mut stream = analyze_batch(provider, strategy, request, config.batch_options());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut delivered = 0usize;

    loop {
        tokio::select! {
            next = stream.next() => match next {
                Some(report) => {
                    delivered += 1;
                    println!("{}", render_report(&report));
                }
                None => break,
            },
            _ = &mut ctrl_c => {
                tracing::info!("⚠️  Received Ctrl+C, stopping after the current symbol");
                stream.cancel();
                break;
            }
        }
    }

    tracing::info!("✅ Batch {} finished: {} symbol(s) reported", stream.batch_id(), delivered);

    Ok(())
}

fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trendcheck=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Validate the symbol list, returning a message fit for the terminal
fn batch_from_input(input: &str, interval: Granularity) -> std::result::Result<BatchRequest, String> {
    BatchRequest::parse(input, interval).map_err(|e| format!("Invalid symbol list: {}", e))
}

fn apply_overrides(mut config: AppConfig, cli: &Cli) -> AppConfig {
    if let Some(interval) = cli.interval {
        config.interval = interval;
    }
    if let Some(window) = cli.window {
        config.window_size = window;
    }
    if let Some(pacing_ms) = cli.pacing_ms {
        config.pacing_ms = pacing_ms;
    }
    if let Some(min_candles) = cli.min_candles {
        config.min_candles = min_candles;
    }
    config
}

async fn print_public_ip() {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Could not build HTTP client for IP lookup: {}", e);
            return;
        }
    };

    match fetch_public_ip(&client, IPIFY_URL).await {
        Ok(ip) => println!("Public IP address: {}", ip),
        Err(e) => {
            tracing::warn!("IP lookup failed: {:#}", e);
            println!("Could not determine public IP address. Please check your network connection.");
        }
    }
}
