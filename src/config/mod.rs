//! Configuration management for the momentum scanner.
//!
//! Loads settings from an optional `config` file and `MS__`-prefixed
//! environment variables. Everything here is static for the process lifetime.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// WebSocket server and cycle pacing
    #[serde(default)]
    pub server: ServerConfig,
    /// Baseline qualification filters
    #[serde(default)]
    pub scanner: ScannerConfig,
    /// Capital allocation settings
    #[serde(default)]
    pub capital: CapitalConfig,
    /// Strategy active when a connection opens
    #[serde(default)]
    pub strategy: StrategyConfig,
    /// Best-effort alerting
    #[serde(default)]
    pub alerts: AlertConfig,
    /// Market data source
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Symbols scanned each cycle, in order
    #[serde(default)]
    pub universe: Vec<String>,
    /// JSON array of symbols, used when `universe` is empty
    #[serde(default)]
    pub universe_file: Option<PathBuf>,
    /// Rows printed by the `watchlist` command
    #[serde(default = "default_watchlist_size")]
    pub watchlist_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// WebSocket path clients connect to
    #[serde(default = "default_ws_path")]
    pub path: String,
    /// Delay between symbols, bounds provider request rate
    #[serde(default = "default_symbol_delay_ms")]
    pub symbol_delay_ms: u64,
    /// Pause between full universe passes
    #[serde(default = "default_cycle_cooldown_secs")]
    pub cycle_cooldown_secs: u64,
    /// Outbound event queue depth per connection
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Minimum day-over-day gain in percent (10 = 10%)
    #[serde(default = "default_min_gain_pct")]
    pub min_gain_pct: Decimal,
    /// Minimum relative volume
    #[serde(default = "default_min_rvol")]
    pub min_rvol: Decimal,
    /// Symbols with fewer bars are skipped for the cycle
    #[serde(default = "default_min_lookback_days")]
    pub min_lookback_days: usize,
    /// Bars preceding the latest one averaged for relative volume
    #[serde(default = "default_rvol_window")]
    pub rvol_window: usize,
    /// Bars of history requested from the provider
    #[serde(default = "default_history_days")]
    pub history_days: u32,
    /// Optional tradable price band
    #[serde(default)]
    pub min_price: Option<Decimal>,
    #[serde(default)]
    pub max_price: Option<Decimal>,
    /// Symbols with a known float above this are not baseline BUYs
    #[serde(default)]
    pub max_float: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalConfig {
    /// Capital budget split across one cycle's BUY candidates
    #[serde(default = "default_total_capital")]
    pub total_capital: Decimal,
    /// Maximum allocations per cycle
    #[serde(default = "default_max_positions")]
    pub max_positions: usize,
    /// Per-trade capital ceiling
    #[serde(default = "default_max_trade_value")]
    pub max_trade_value: Decimal,
    /// Per-trade capital floor (still bounded by the ceiling and the budget)
    #[serde(default = "default_min_trade_value")]
    pub min_trade_value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Registry name
    #[serde(default = "default_strategy_name")]
    pub name: String,
    /// Strategy parameters; missing keys take the strategy's defaults
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_alerts_enabled")]
    pub enabled: bool,
    /// Minimum seconds between alerts for the same symbol
    #[serde(default = "default_alert_cooldown_secs")]
    pub cooldown_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Yahoo,
    Csv,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_kind")]
    pub kind: ProviderKind,
    /// Override for the HTTP provider's base URL
    #[serde(default)]
    pub base_url: Option<String>,
    /// Directory of `{SYMBOL}.csv` files for the CSV provider
    #[serde(default = "default_csv_dir")]
    pub csv_dir: PathBuf,
    /// Look up headlines for qualifying symbols
    #[serde(default = "default_news")]
    pub news: bool,
    /// Look up float / shares outstanding with each fetch
    #[serde(default = "default_float_lookup")]
    pub float_lookup: bool,
    /// Chart bar interval (`1d` for daily, `5m` for intraday setups)
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Chart range; defaults to `{scanner.history_days}d`
    #[serde(default)]
    pub range: Option<String>,
}

/// Bar intervals accepted by the chart endpoint.
pub const CHART_INTERVALS: &[&str] = &[
    "1m", "2m", "5m", "15m", "30m", "60m", "90m", "1h", "1d", "5d", "1wk", "1mo", "3mo",
];

impl ProviderConfig {
    /// Whether bars are shorter than one session.
    pub fn is_intraday(&self) -> bool {
        self.interval.ends_with('m') || self.interval == "1h"
    }

    /// Range requested from the chart endpoint.
    pub fn chart_range(&self, history_days: u32) -> String {
        self.range
            .clone()
            .unwrap_or_else(|| format!("{history_days}d"))
    }
}

// Default value functions
fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_ws_path() -> String {
    "/ws/scan".to_string()
}

fn default_symbol_delay_ms() -> u64 {
    150
}

fn default_cycle_cooldown_secs() -> u64 {
    10
}

fn default_event_buffer() -> usize {
    256
}

fn default_min_gain_pct() -> Decimal {
    Decimal::new(10, 0) // 10%
}

fn default_min_rvol() -> Decimal {
    Decimal::new(5, 0) // 5x
}

fn default_min_lookback_days() -> usize {
    5
}

fn default_rvol_window() -> usize {
    10
}

fn default_history_days() -> u32 {
    15
}

fn default_total_capital() -> Decimal {
    Decimal::new(10_000, 0)
}

fn default_max_positions() -> usize {
    3
}

fn default_max_trade_value() -> Decimal {
    Decimal::new(5_000, 0)
}

fn default_min_trade_value() -> Decimal {
    Decimal::new(500, 0)
}

fn default_strategy_name() -> String {
    "bull_flag".to_string()
}

fn default_alerts_enabled() -> bool {
    true
}

fn default_alert_cooldown_secs() -> u64 {
    300
}

fn default_provider_kind() -> ProviderKind {
    ProviderKind::Yahoo
}

fn default_csv_dir() -> PathBuf {
    PathBuf::from("data/bars")
}

fn default_news() -> bool {
    true
}

fn default_float_lookup() -> bool {
    true
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_watchlist_size() -> usize {
    10
}

impl Config {
    /// Load configuration from environment variables and config files.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .prefix("MS")
                    .list_separator(",")
                    .with_list_parse_key("universe")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let mut config: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.resolve_universe()?;
        config.validate()?;
        Ok(config)
    }

    /// Fill `universe` from `universe_file` when no inline list was given.
    pub fn resolve_universe(&mut self) -> Result<()> {
        if !self.universe.is_empty() {
            return Ok(());
        }
        if let Some(path) = &self.universe_file {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read universe file: {}", path.display()))?;
            self.universe = serde_json::from_str(&content)
                .with_context(|| format!("Universe file is not a JSON array: {}", path.display()))?;
        }
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.universe.is_empty(), "universe must list at least one symbol");

        anyhow::ensure!(
            self.scanner.min_lookback_days >= 2,
            "min_lookback_days must be >= 2 (needs a previous close)"
        );

        anyhow::ensure!(self.scanner.rvol_window >= 1, "rvol_window must be >= 1");

        if let (Some(min), Some(max)) = (self.scanner.min_price, self.scanner.max_price) {
            anyhow::ensure!(min <= max, "min_price must be <= max_price");
        }

        anyhow::ensure!(
            self.capital.total_capital > Decimal::ZERO,
            "total_capital must be positive"
        );

        anyhow::ensure!(self.capital.max_positions >= 1, "max_positions must be >= 1");

        anyhow::ensure!(
            self.capital.min_trade_value >= Decimal::ZERO
                && self.capital.min_trade_value <= self.capital.max_trade_value,
            "min_trade_value must be between 0 and max_trade_value"
        );

        anyhow::ensure!(self.server.event_buffer >= 1, "event_buffer must be >= 1");

        anyhow::ensure!(
            CHART_INTERVALS.contains(&self.provider.interval.as_str()),
            "unsupported chart interval: {}",
            self.provider.interval
        );

        if let Some(max_float) = self.scanner.max_float {
            anyhow::ensure!(max_float > Decimal::ZERO, "max_float must be positive");
        }

        crate::signals::create_strategy(&self.strategy.name, &self.strategy.params)
            .context("Invalid default strategy")?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            scanner: ScannerConfig::default(),
            capital: CapitalConfig::default(),
            strategy: StrategyConfig::default(),
            alerts: AlertConfig::default(),
            provider: ProviderConfig::default(),
            universe: Vec::new(),
            universe_file: None,
            watchlist_size: default_watchlist_size(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            path: default_ws_path(),
            symbol_delay_ms: default_symbol_delay_ms(),
            cycle_cooldown_secs: default_cycle_cooldown_secs(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            min_gain_pct: default_min_gain_pct(),
            min_rvol: default_min_rvol(),
            min_lookback_days: default_min_lookback_days(),
            rvol_window: default_rvol_window(),
            history_days: default_history_days(),
            min_price: None,
            max_price: None,
            max_float: None,
        }
    }
}

impl Default for CapitalConfig {
    fn default() -> Self {
        Self {
            total_capital: default_total_capital(),
            max_positions: default_max_positions(),
            max_trade_value: default_max_trade_value(),
            min_trade_value: default_min_trade_value(),
        }
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            name: default_strategy_name(),
            params: serde_json::Value::Null,
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: default_alerts_enabled(),
            cooldown_secs: default_alert_cooldown_secs(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            base_url: None,
            csv_dir: default_csv_dir(),
            news: default_news(),
            float_lookup: default_float_lookup(),
            interval: default_interval(),
            range: None,
        }
    }
}
