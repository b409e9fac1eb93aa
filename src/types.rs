// =============================================================================
// Shared types used across the Trend Insight engine
// =============================================================================
//
// `PriceSeries` is the only input to the indicator engine. It is validated
// once on construction and never mutated afterwards; a new fetch produces a
// new series.
// =============================================================================

use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

// =============================================================================
// PricePoint / PriceSeries
// =============================================================================

/// One daily observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
    /// Traded volume for the session, when the data source reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close,
            volume: None,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }
}

/// Ordered, gap-tolerant sequence of daily closes with strictly increasing
/// dates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<PricePoint>", into = "Vec<PricePoint>")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Validate and wrap `points`.
    ///
    /// Rejects a date that does not strictly increase and a close that is
    /// non-finite or negative. Invalid volumes are dropped rather than
    /// rejected since the engine only uses them for an advisory insight.
    pub fn new(mut points: Vec<PricePoint>) -> Result<Self> {
        for (index, point) in points.iter_mut().enumerate() {
            if !point.close.is_finite() || point.close < 0.0 {
                return Err(AnalysisError::InvalidClose {
                    index,
                    value: point.close,
                });
            }
            if matches!(point.volume, Some(v) if !v.is_finite() || v < 0.0) {
                point.volume = None;
            }
        }

        if let Some(index) = points
            .windows(2)
            .position(|w| w[1].date <= w[0].date)
            .map(|i| i + 1)
        {
            return Err(AnalysisError::UnorderedTimestamps {
                index,
                date: points[index].date,
            });
        }

        Ok(Self { points })
    }

    /// Build a series with one point per consecutive calendar day starting at
    /// `start`.
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Result<Self> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint::new(start + Duration::days(i as i64), close))
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Closing prices in series order.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Close recorded on exactly `date`, if the series has a point there.
    pub fn close_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by(|p| p.date.cmp(&date))
            .ok()
            .map(|i| self.points[i].close)
    }
}

impl TryFrom<Vec<PricePoint>> for PriceSeries {
    type Error = AnalysisError;

    fn try_from(points: Vec<PricePoint>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<PriceSeries> for Vec<PricePoint> {
    fn from(series: PriceSeries) -> Self {
        series.points
    }
}

// =============================================================================
// PeriodLabel
// =============================================================================

/// Look-back window requested from the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PeriodLabel {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    Max,
}

impl Default for PeriodLabel {
    fn default() -> Self {
        Self::OneYear
    }
}

impl PeriodLabel {
    pub const ALL: [PeriodLabel; 7] = [
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
        Self::TwoYears,
        Self::FiveYears,
        Self::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneMonth => "1m",
            Self::ThreeMonths => "3m",
            Self::SixMonths => "6m",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
            Self::Max => "max",
        }
    }
}

impl std::fmt::Display for PeriodLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodLabel {
    type Err = AnalysisError;

    /// Case-insensitive. An empty label means the default one-year window.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().to_ascii_lowercase();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == trimmed)
            .ok_or_else(|| AnalysisError::UnknownPeriod(s.trim().to_string()))
    }
}

impl TryFrom<String> for PeriodLabel {
    type Error = AnalysisError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<PeriodLabel> for String {
    fn from(p: PeriodLabel) -> Self {
        p.as_str().to_string()
    }
}

// =============================================================================
// Ticker symbols
// =============================================================================

/// Longest symbol accepted, exchange suffix included.
pub const MAX_TICKER_LEN: usize = 20;

/// Trim and upper-case `raw`, accepting only exchange-style symbols:
/// ASCII letters and digits plus `.`, `-`, `^` and `=` (`BRK-B`, `^GSPC`,
/// `EURUSD=X`), with at least one letter or digit.
pub fn normalize_ticker(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_ascii_uppercase();
    let valid = symbol.len() <= MAX_TICKER_LEN
        && symbol.chars().any(|c| c.is_ascii_alphanumeric())
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));

    if valid {
        Ok(symbol)
    } else {
        Err(AnalysisError::InvalidTicker(raw.trim().to_string()))
    }
}

// =============================================================================
// Signal labels
// =============================================================================

/// Discrete trade recommendation derived from the daily percentage change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

/// Momentum bucket for the latest RSI reading. `Unknown` means no RSI could be
/// computed and must not be read as neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RsiStatus {
    Overbought,
    Oversold,
    Neutral,
    Unknown,
}

impl std::fmt::Display for RsiStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overbought => write!(f, "Overbought"),
            Self::Oversold => write!(f, "Oversold"),
            Self::Neutral => write!(f, "Neutral"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A value aligned to a series date; `None` marks insufficient history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatedValue {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn series_accepts_empty() {
        let s = PriceSeries::new(Vec::new()).unwrap();
        assert!(s.is_empty());
        assert!(s.last().is_none());
    }

    #[test]
    fn series_rejects_duplicate_dates() {
        let err = PriceSeries::new(vec![
            PricePoint::new(day(1), 10.0),
            PricePoint::new(day(2), 11.0),
            PricePoint::new(day(2), 12.0),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::UnorderedTimestamps {
                index: 2,
                date: day(2)
            }
        );
    }

    #[test]
    fn series_rejects_out_of_order_dates() {
        let err = PriceSeries::new(vec![
            PricePoint::new(day(3), 10.0),
            PricePoint::new(day(1), 11.0),
        ])
        .unwrap_err();
        assert!(matches!(err, AnalysisError::UnorderedTimestamps { index: 1, .. }));
    }

    #[test]
    fn series_rejects_nan_close() {
        let err = PriceSeries::new(vec![PricePoint::new(day(1), f64::NAN)]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidClose { index: 0, .. }));
    }

    #[test]
    fn series_drops_invalid_volume() {
        let s = PriceSeries::new(vec![PricePoint::new(day(1), 10.0).with_volume(-5.0)]).unwrap();
        assert_eq!(s.points()[0].volume, None);
    }

    #[test]
    fn gaps_are_tolerated() {
        let s = PriceSeries::new(vec![
            PricePoint::new(day(1), 10.0),
            PricePoint::new(day(5), 11.0),
        ])
        .unwrap();
        assert_eq!(s.close_on(day(5)), Some(11.0));
        assert_eq!(s.close_on(day(3)), None);
    }

    #[test]
    fn from_closes_uses_consecutive_days() {
        let s = PriceSeries::from_closes(day(1), &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(s.points()[2].date, day(3));
        assert_eq!(s.closes(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn deserialise_validates() {
        let bad = r#"[{"date":"2024-01-02","close":1.0},{"date":"2024-01-01","close":2.0}]"#;
        assert!(serde_json::from_str::<PriceSeries>(bad).is_err());

        let good = r#"[
            {"date":"2024-01-01","close":1.0},
            {"date":"2024-01-02","close":2.0,"volume":500}
        ]"#;
        let s: PriceSeries = serde_json::from_str(good).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.points()[1].volume, Some(500.0));
    }

    #[test]
    fn period_label_parsing() {
        assert_eq!("1Y".parse::<PeriodLabel>().unwrap(), PeriodLabel::OneYear);
        assert_eq!("max".parse::<PeriodLabel>().unwrap(), PeriodLabel::Max);
        assert_eq!("".parse::<PeriodLabel>().unwrap(), PeriodLabel::OneYear);
        assert!(matches!(
            "7d".parse::<PeriodLabel>(),
            Err(AnalysisError::UnknownPeriod(_))
        ));
    }

    #[test]
    fn ticker_normalisation() {
        assert_eq!(normalize_ticker(" aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_ticker("brk-b").unwrap(), "BRK-B");
        assert_eq!(normalize_ticker("^gspc").unwrap(), "^GSPC");
        assert_eq!(normalize_ticker("eurusd=x").unwrap(), "EURUSD=X");
    }

    #[test]
    fn ticker_rejects_path_and_query_characters() {
        for raw in ["", "..", "../../admin", "aapl?range=max&x=", "a/b", "aapl#frag", "a b"] {
            assert!(
                matches!(normalize_ticker(raw), Err(AnalysisError::InvalidTicker(_))),
                "{raw:?} accepted"
            );
        }
        assert!(normalize_ticker(&"A".repeat(MAX_TICKER_LEN + 1)).is_err());
    }

    #[test]
    fn period_label_serde_uses_short_form() {
        let json = serde_json::to_string(&PeriodLabel::SixMonths).unwrap();
        assert_eq!(json, "\"6m\"");
        let p: PeriodLabel = serde_json::from_str("\"2y\"").unwrap();
        assert_eq!(p, PeriodLabel::TwoYears);
    }

    #[test]
    fn labels_display() {
        assert_eq!(Recommendation::Buy.to_string(), "BUY");
        assert_eq!(RsiStatus::Oversold.to_string(), "Oversold");
        assert_eq!(
            serde_json::to_string(&RsiStatus::Unknown).unwrap(),
            "\"UNKNOWN\""
        );
    }
}
