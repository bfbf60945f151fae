//! Local CSV bar files, one per symbol.
//!
//! Expected format of `{dir}/{SYMBOL}.csv`:
//! ```csv
//! timestamp,open,high,low,close,volume
//! 2024-01-02T14:30:00Z,10.00,10.50,9.90,10.40,125000
//! 2024-01-03,10.40,11.20,10.30,11.10,310000
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, instrument};

use super::traits::MarketDataProvider;
use super::types::{Bar, BarSeries, MarketSnapshot};
use crate::error::ProviderError;

/// Reads bar history from a directory of CSV files.
#[derive(Debug, Clone)]
pub struct CsvBarProvider {
    dir: PathBuf,
}

impl CsvBarProvider {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

/// Parse CSV content into bars. Header and blank lines are skipped.
pub fn parse_bars(content: &str) -> Result<Vec<Bar>, ProviderError> {
    let mut bars = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        if line_num == 0 && line.starts_with("timestamp") {
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        let bar = parse_row(line).map_err(|reason| {
            ProviderError::Payload(format!("line {}: {}", line_num + 1, reason))
        })?;
        bars.push(bar);
    }

    Ok(bars)
}

fn parse_row(line: &str) -> Result<Bar, String> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() != 6 {
        return Err(format!("expected 6 columns, got {}", parts.len()));
    }

    let number = |s: &str, field: &str| {
        Decimal::from_str(s).map_err(|e| format!("invalid {field} '{s}': {e}"))
    };

    Ok(Bar {
        timestamp: parse_timestamp(parts[0])?,
        open: number(parts[1], "open")?,
        high: number(parts[2], "high")?,
        low: number(parts[3], "low")?,
        close: number(parts[4], "close")?,
        volume: number(parts[5], "volume")?,
    })
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid timestamp '{s}'"))
}

#[async_trait]
impl MarketDataProvider for CsvBarProvider {
    fn name(&self) -> &str {
        "csv"
    }

    #[instrument(skip(self), name = "csv_fetch")]
    async fn fetch(&self, symbol: &str) -> Result<MarketSnapshot, ProviderError> {
        let path = self.path_for(symbol);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProviderError::UnknownSymbol(symbol.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let bars = parse_bars(&content)?;
        debug!(symbol, bars = bars.len(), path = %path.display(), "Loaded bars from CSV");

        Ok(MarketSnapshot::new(BarSeries::new(symbol, bars)))
    }
}
