//! Yahoo Finance public chart API client.
//!
//! Read-only access to OHLCV history (daily by default, intraday on request),
//! float / shares outstanding and recent news headlines.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use super::traits::MarketDataProvider;
use super::types::{Bar, BarSeries, MarketSnapshot};
use crate::error::ProviderError;

/// Base URL for the public Yahoo Finance API.
pub const YAHOO_API_URL: &str = "https://query1.finance.yahoo.com";

/// Headlines longer than this are truncated with an ellipsis.
const HEADLINE_MAX_CHARS: usize = 50;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    #[serde(default)]
    default_key_statistics: Option<KeyStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    #[serde(default)]
    float_shares: Option<RawValue>,
    #[serde(default)]
    shares_outstanding: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

impl KeyStatistics {
    /// Float when reported, else shares outstanding.
    fn float_or_outstanding(&self) -> Option<Decimal> {
        [&self.float_shares, &self.shares_outstanding]
            .into_iter()
            .filter_map(|v| v.as_ref()?.raw)
            .find(|raw| *raw > 0.0)
            .and_then(Decimal::from_f64)
            .map(|d| d.round())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    title: String,
}

/// Yahoo Finance client for bar history and instrument metadata.
#[derive(Debug, Clone)]
pub struct YahooChartProvider {
    client: Client,
    base_url: String,
    interval: String,
    range: String,
    news: bool,
    float_lookup: bool,
}

impl YahooChartProvider {
    /// Create a client against the public endpoint.
    pub fn new(history_days: u32, news: bool) -> Result<Self> {
        Self::with_base_url(YAHOO_API_URL, history_days, news)
    }

    /// Create a client with a custom base URL.
    pub fn with_base_url(base_url: &str, history_days: u32, news: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("momentum-scanner/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            interval: "1d".to_string(),
            range: format!("{history_days}d"),
            news,
            float_lookup: false,
        })
    }

    /// Request bars at `interval` over `range` (e.g. `5m` over `2d`).
    pub fn with_interval(mut self, interval: &str, range: &str) -> Self {
        self.interval = interval.to_string();
        self.range = range.to_string();
        self
    }

    /// Attach float / shares outstanding to every fetched snapshot.
    pub fn with_float_lookup(mut self, enabled: bool) -> Self {
        self.float_lookup = enabled;
        self
    }

    async fn float_shares(&self, symbol: &str) -> Result<Option<Decimal>, ProviderError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol);
        let query = [("modules", "defaultKeyStatistics".to_string())];

        let data: QuoteSummaryResponse = self.get_json(&url, &query).await?;
        Ok(data
            .quote_summary
            .result
            .and_then(|r| r.into_iter().next())
            .and_then(|r| r.default_key_statistics)
            .and_then(|stats| stats.float_or_outstanding()))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Payload(e.to_string()))
    }
}

/// Zip the column-oriented chart payload into bars, dropping incomplete rows.
fn bars_from_chart(result: ChartResult) -> Vec<Bar> {
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let column = |values: &[Option<f64>], i: usize| {
        values
            .get(i)
            .copied()
            .flatten()
            .and_then(Decimal::from_f64)
            .map(|d| d.round_dp(4))
    };

    result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            Some(Bar {
                timestamp: Utc.timestamp_opt(*ts, 0).single()?,
                open: column(&quote.open, i)?,
                high: column(&quote.high, i)?,
                low: column(&quote.low, i)?,
                close: column(&quote.close, i)?,
                volume: column(&quote.volume, i)?,
            })
        })
        .collect()
}

fn truncate_headline(title: &str) -> String {
    if title.chars().count() <= HEADLINE_MAX_CHARS {
        title.to_string()
    } else {
        let cut: String = title.chars().take(HEADLINE_MAX_CHARS).collect();
        format!("{cut}...")
    }
}

#[async_trait]
impl MarketDataProvider for YahooChartProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    #[instrument(skip(self), name = "yahoo_fetch")]
    async fn fetch(&self, symbol: &str) -> Result<MarketSnapshot, ProviderError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let query = [
            ("range", self.range.clone()),
            ("interval", self.interval.clone()),
        ];

        let data: ChartResponse = self.get_json(&url, &query).await?;

        if let Some(err) = data.chart.error {
            return Err(if err.code == "Not Found" {
                ProviderError::UnknownSymbol(symbol.to_string())
            } else {
                ProviderError::Payload(format!("{}: {}", err.code, err.description))
            });
        }

        let result = data
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| ProviderError::UnknownSymbol(symbol.to_string()))?;

        let bars = bars_from_chart(result);
        debug!(symbol, bars = bars.len(), interval = %self.interval, "Fetched chart history");

        let mut snapshot = MarketSnapshot::new(BarSeries::new(symbol, bars));
        if self.float_lookup {
            // Metadata is optional; a failed lookup leaves the float unknown.
            match self.float_shares(symbol).await {
                Ok(Some(float)) => snapshot = snapshot.with_float(float),
                Ok(None) => {}
                Err(e) => debug!(symbol, error = %e, "Float lookup failed"),
            }
        }

        Ok(snapshot)
    }

    #[instrument(skip(self), name = "yahoo_headline")]
    async fn latest_headline(&self, symbol: &str) -> Result<Option<String>, ProviderError> {
        if !self.news {
            return Ok(None);
        }

        let url = format!("{}/v1/finance/search", self.base_url);
        let query = [
            ("q", symbol.to_string()),
            ("newsCount", "1".to_string()),
            ("quotesCount", "0".to_string()),
        ];

        let data: SearchResponse = self.get_json(&url, &query).await?;
        Ok(data.news.first().map(|n| truncate_headline(&n.title)))
    }
}
