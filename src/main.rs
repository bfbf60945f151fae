//! Momentum Scanner - Main Entry Point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use momentum_scanner::config::{Config, ProviderKind};
use momentum_scanner::market::{CsvBarProvider, MarketDataProvider, YahooChartProvider};
use momentum_scanner::server::ScanServer;
use momentum_scanner::signals::StrategyKind;
use momentum_scanner::strategy::{build_watchlist, MarketScanner};
use momentum_scanner::utils::round_display;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Momentum Scanner CLI
#[derive(Parser)]
#[command(name = "momentum-scanner")]
#[command(version, about = "Streaming momentum scanner with swappable signal strategies")]
struct Cli {
    /// Write log lines as JSON objects
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve scan cycles to WebSocket clients (default)
    Serve,

    /// Scan the universe once and print the strongest movers
    Watchlist {
        /// Number of symbols to show (default: config `watchlist_size`)
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// List registered strategies with their default parameters
    Strategies,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Strategies) = cli.command {
        return print_strategies();
    }

    init_logging(cli.log_json)?;

    let config = Config::load()?;
    log_config(&config);
    let provider = build_provider(&config)?;

    match cli.command {
        Some(Commands::Watchlist { top }) => {
            let size = top.unwrap_or(config.watchlist_size);
            run_watchlist(&config, provider.as_ref(), size).await
        }
        _ => run_server(config, provider).await,
    }
}

async fn run_server(config: Config, provider: Arc<dyn MarketDataProvider>) -> Result<()> {
    info!("╔════════════════════════════════════════════════════════════╗");
    info!(
        "║            Momentum Scanner v{} - Live Scan               ║",
        env!("CARGO_PKG_VERSION")
    );
    info!("╚════════════════════════════════════════════════════════════╝");

    let server = ScanServer::new(config, provider);
    let listener = server.bind().await?;

    server
        .serve(listener, async {
            tokio::signal::ctrl_c().await.ok();
            info!("🛑 Shutdown signal received");
        })
        .await?;

    info!("👋 Scanner stopped");
    Ok(())
}

async fn run_watchlist(
    config: &Config,
    provider: &dyn MarketDataProvider,
    size: usize,
) -> Result<()> {
    let scanner = MarketScanner::new(config.scanner.clone());
    let watchlist = build_watchlist(provider, &scanner, &config.universe, size).await;

    println!(
        "{:<8} {:>10} {:>9} {:>8} {:>14}  HEADLINE",
        "SYMBOL", "PRICE", "CHANGE%", "RVOL", "FLOAT"
    );
    for result in &watchlist {
        let float = result
            .float_shares
            .map(|f| format!("{}M", (f / Decimal::from(1_000_000)).round_dp(1)))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:>10} {:>9} {:>8} {:>14}  {}",
            result.symbol,
            round_display(result.price),
            round_display(result.pct_change),
            round_display(result.rvol),
            float,
            result.headline.as_deref().unwrap_or("-"),
        );
    }

    if watchlist.is_empty() {
        println!("No symbols qualified.");
    }

    Ok(())
}

fn print_strategies() -> Result<()> {
    let registry: serde_json::Map<String, serde_json::Value> = StrategyKind::ALL
        .iter()
        .map(|kind| (kind.name().to_string(), kind.default_parameters()))
        .collect();
    let json = serde_json::to_string_pretty(&registry).context("Failed to render registry")?;
    println!("{json}");
    Ok(())
}

fn build_provider(config: &Config) -> Result<Arc<dyn MarketDataProvider>> {
    let provider: Arc<dyn MarketDataProvider> = match config.provider.kind {
        ProviderKind::Yahoo => {
            let history = config.scanner.history_days;
            let news = config.provider.news;
            let client = match &config.provider.base_url {
                Some(url) => YahooChartProvider::with_base_url(url, history, news)?,
                None => YahooChartProvider::new(history, news)?,
            };
            let range = config.provider.chart_range(history);
            Arc::new(
                client
                    .with_interval(&config.provider.interval, &range)
                    .with_float_lookup(config.provider.float_lookup),
            )
        }
        ProviderKind::Csv => Arc::new(CsvBarProvider::new(&config.provider.csv_dir)),
    };

    info!(provider = provider.name(), "Market data provider ready");
    Ok(provider)
}

/// Initialize logging with both console and file output.
fn init_logging(json: bool) -> Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    std::fs::create_dir_all("logs")?;

    let file_appender = tracing_appender::rolling::hourly("logs", "momentum-scanner.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the writer alive for the whole process
    Box::leak(Box::new(guard));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("momentum_scanner=debug".parse()?)
                .add_directive(Level::INFO.into()),
        )
        .with_writer(std::io::stdout.and(file_writer))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE);

    if json {
        builder.with_ansi(false).json().init();
    } else {
        builder.with_ansi(true).init();
    }

    Ok(())
}

/// Log configuration on startup.
fn log_config(config: &Config) {
    info!("📋 Configuration:");
    info!("   Universe: {} symbols", config.universe.len());
    info!(
        "   Thresholds: gain >= {}%, RVOL >= {}x, lookback {} bars",
        config.scanner.min_gain_pct, config.scanner.min_rvol, config.scanner.min_lookback_days
    );
    if config.scanner.min_price.is_some() || config.scanner.max_price.is_some() {
        info!(
            "   Price band: {:?} - {:?}",
            config.scanner.min_price, config.scanner.max_price
        );
    }
    info!(
        "   Capital: ${} across up to {} positions (${} - ${} per trade)",
        config.capital.total_capital,
        config.capital.max_positions,
        config.capital.min_trade_value,
        config.capital.max_trade_value
    );
    info!(
        "   Strategy: {} {}",
        config.strategy.name, config.strategy.params
    );
    info!(
        "   Bars: {} over {}{}",
        config.provider.interval,
        config.provider.chart_range(config.scanner.history_days),
        config
            .scanner
            .max_float
            .map(|f| format!(", float <= {}", f))
            .unwrap_or_default()
    );
    if let Ok(kind) = StrategyKind::from_name(&config.strategy.name) {
        if kind.needs_intraday_bars()
            && config.provider.kind == ProviderKind::Yahoo
            && !config.provider.is_intraday()
        {
            warn!(
                "⚠️  Strategy {} needs intraday bars but interval is {}; set provider.interval (e.g. 5m)",
                kind, config.provider.interval
            );
        }
    }
    info!(
        "   Pacing: {}ms per symbol, {}s between cycles",
        config.server.symbol_delay_ms, config.server.cycle_cooldown_secs
    );
}
