// =============================================================================
// Yahoo Finance Chart API Client
// =============================================================================
//
// GET {base}/v8/finance/chart/{TICKER}?range={range}&interval=1d
//
// The ticker is validated and pushed as one encoded path segment; it never
// alters the path or query.
//
// Response shape (abridged):
//   { "chart": { "result": [ { "meta": { "gmtoffset": -14400, ... },
//                              "timestamp": [..],
//                              "indicators": { "quote": [ { "close": [..],
//                                                           "volume": [..] } ] } } ],
//                "error": null } }
//
// Closes may be null on sessions with no print; those sessions are skipped.
// An unknown symbol comes back as a "Not Found" chart error and is mapped to
// an empty series so the engine reports "no data found".
// =============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::PriceSource;
use crate::types::{normalize_ticker, PeriodLabel, PricePoint, PriceSeries};

/// Chart API client.
#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    /// Create a client against `base_url` with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (compatible; trend-insight/1.0)"),
        );

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "YahooClient initialised");

        Ok(Self { base_url, client })
    }

    /// Range parameter understood by the chart API.
    pub fn range_param(period: PeriodLabel) -> &'static str {
        match period {
            PeriodLabel::OneMonth => "1mo",
            PeriodLabel::ThreeMonths => "3mo",
            PeriodLabel::SixMonths => "6mo",
            PeriodLabel::OneYear => "1y",
            PeriodLabel::TwoYears => "2y",
            PeriodLabel::FiveYears => "5y",
            PeriodLabel::Max => "max",
        }
    }

    /// Chart URL for an already-normalised `symbol`. The symbol is pushed as a
    /// single percent-encoded path segment.
    pub fn chart_url(&self, symbol: &str, period: PeriodLabel) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("invalid chart API base URL {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("chart API base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart"])
            .push(symbol);
        url.query_pairs_mut()
            .clear()
            .append_pair("range", Self::range_param(period))
            .append_pair("interval", "1d");
        Ok(url)
    }

    /// GET the daily chart for `ticker`.
    #[instrument(skip(self), name = "yahoo::get_chart")]
    pub async fn get_chart(&self, ticker: &str, period: PeriodLabel) -> Result<PriceSeries> {
        let symbol = normalize_ticker(ticker)?;
        let url = self.chart_url(&symbol, period)?;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET chart for {symbol} request failed"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .with_context(|| format!("failed to read chart response for {symbol}"))?;

        let body = match serde_json::from_str::<Value>(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                anyhow::bail!("chart API returned {} for {}: {}", status, symbol, snippet(&text));
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to parse chart response for {symbol}"));
            }
        };

        if !status.is_success() && body.pointer("/chart/error").map_or(true, Value::is_null) {
            anyhow::bail!("chart API returned {} for {}: {}", status, symbol, snippet(&text));
        }

        let series = parse_chart_response(&body)?;
        debug!(symbol = %symbol, period = %period, count = series.len(), "chart fetched");
        Ok(series)
    }
}

/// First line of an error body, capped for logs.
fn snippet(text: &str) -> &str {
    let line = text.lines().next().unwrap_or("").trim();
    match line.char_indices().nth(200) {
        Some((i, _)) => &line[..i],
        None => line,
    }
}

#[async_trait]
impl PriceSource for YahooClient {
    async fn fetch(&self, ticker: &str, period: PeriodLabel) -> Result<PriceSeries> {
        self.get_chart(ticker, period).await
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}

/// Convert a chart API body into a validated series.
///
/// Dates are taken in the exchange's local time (`meta.gmtoffset`). When two
/// timestamps fall on the same local date the later one wins.
pub fn parse_chart_response(body: &Value) -> Result<PriceSeries> {
    if let Some(err) = body.pointer("/chart/error").filter(|e| !e.is_null()) {
        let code = err.get("code").and_then(Value::as_str).unwrap_or("");
        if code.eq_ignore_ascii_case("not found") {
            return Ok(PriceSeries::default());
        }
        let description = err.get("description").and_then(Value::as_str).unwrap_or("");
        anyhow::bail!("chart API error {code}: {description}");
    }

    let Some(result) = body.pointer("/chart/result/0") else {
        return Ok(PriceSeries::default());
    };

    let offset = result
        .pointer("/meta/gmtoffset")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    let timestamps = match result.get("timestamp") {
        Some(Value::Array(ts)) => ts.as_slice(),
        _ => return Ok(PriceSeries::default()),
    };
    let quote = result
        .pointer("/indicators/quote/0")
        .context("chart result has no quote block")?;
    let closes = quote
        .get("close")
        .and_then(Value::as_array)
        .context("quote block has no close array")?;
    let volumes = quote.get("volume").and_then(Value::as_array);

    let mut by_date: BTreeMap<NaiveDate, PricePoint> = BTreeMap::new();
    let mut skipped = 0usize;

    for (i, ts) in timestamps.iter().enumerate() {
        let (Some(ts), Some(close)) = (ts.as_i64(), closes.get(i).and_then(Value::as_f64)) else {
            skipped += 1;
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive()) else {
            skipped += 1;
            continue;
        };
        let volume = volumes.and_then(|v| v.get(i)).and_then(Value::as_f64);
        by_date.insert(
            date,
            PricePoint {
                date,
                close,
                volume,
            },
        );
    }

    if skipped > 0 {
        warn!(skipped, "skipped chart entries without a close");
    }

    PriceSeries::new(by_date.into_values().collect()).context("chart data failed validation")
}
