// =============================================================================
// Analysis Report — single-pass assembly of every indicator for one series
// =============================================================================
//
// `analyze` is the engine's only entry point for collaborators. It runs the
// moving averages, the RSI, the classifiers, and the supplementary insights
// over an already-fetched series and returns an immutable report. Each call
// recomputes from scratch.
//
// Degenerate inputs:
//   - empty series           => AnalysisError::EmptySeries
//   - single point           => previous_close = current_price, change 0
//   - previous_close == 0    => percent_change None, recommendation HOLD
// =============================================================================

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::indicators::levels::{price_levels, LevelProximity, PriceLevels, LEVEL_LOOKBACK};
use crate::indicators::volume::{volume_activity, VolumeActivity, VolumeLevel};
use crate::indicators::{
    calculate_rsi, moving_average, price_change, trailing_changes, RsiResult, TrailingChange,
    WindowResult, DEFAULT_RSI_PERIOD, RSI_OVERBOUGHT, RSI_OVERSOLD,
};
use crate::signals::{detect_cross, recommendation, rsi_status, CrossKind, MaCross};
use crate::types::{PeriodLabel, PricePoint, PriceSeries, Recommendation, RsiStatus};

// =============================================================================
// Parameters
// =============================================================================

fn default_ma_windows() -> Vec<usize> {
    vec![50, 200]
}

fn default_rsi_period() -> usize {
    DEFAULT_RSI_PERIOD
}

/// Indicator look-backs used by [`analyze`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisParams {
    #[serde(default = "default_ma_windows")]
    pub ma_windows: Vec<usize>,
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            ma_windows: default_ma_windows(),
            rsi_period: default_rsi_period(),
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// Observations beyond the core signals. Each part is present only when the
/// series carries enough data for it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketInsights {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma_cross: Option<MaCross>,
    pub trailing_changes: Vec<TrailingChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<PriceLevels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<VolumeActivity>,
}

/// Immutable result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub ticker: String,
    pub period: PeriodLabel,
    /// Date of the latest price point.
    pub as_of: NaiveDate,
    pub current_price: f64,
    pub previous_close: f64,
    pub absolute_change: f64,
    pub percent_change: Option<f64>,
    /// One entry per distinct requested window, ascending.
    pub ma_results: Vec<WindowResult>,
    pub rsi: RsiResult,
    pub recommendation: Recommendation,
    pub rsi_status: RsiStatus,
    pub insights: MarketInsights,
}

/// Run the full indicator pipeline over `series`.
pub fn analyze(
    ticker: &str,
    period: PeriodLabel,
    series: &PriceSeries,
    params: &AnalysisParams,
) -> Result<AnalysisReport> {
    let ticker = ticker.trim().to_uppercase();
    let Some(last) = series.last() else {
        return Err(AnalysisError::EmptySeries { ticker });
    };

    let closes = series.closes();
    let current_price = last.close;
    let previous_close = if closes.len() >= 2 {
        closes[closes.len() - 2]
    } else {
        current_price
    };

    let change = price_change(previous_close, current_price);

    let windows: BTreeSet<usize> = params.ma_windows.iter().copied().filter(|&w| w > 0).collect();
    let ma_results: Vec<WindowResult> = windows
        .iter()
        .map(|&w| moving_average(series, w))
        .collect();

    let rsi = calculate_rsi(series, params.rsi_period);

    let recommendation = change
        .percent
        .map(recommendation)
        .unwrap_or(Recommendation::Hold);
    let rsi_status = rsi_status(rsi.last);

    let ma_cross = match (ma_results.first(), ma_results.last()) {
        (Some(short), Some(long)) if ma_results.len() >= 2 => detect_cross(short, long),
        _ => None,
    };

    let insights = MarketInsights {
        ma_cross,
        trailing_changes: trailing_changes(series),
        levels: price_levels(&closes, LEVEL_LOOKBACK),
        volume: volume_activity(series),
    };

    debug!(
        ticker = %ticker,
        period = %period,
        points = series.len(),
        current_price,
        percent_change = ?change.percent,
        rsi = ?rsi.last,
        recommendation = %recommendation,
        "analysis complete"
    );

    Ok(AnalysisReport {
        ticker,
        period,
        as_of: last.date,
        current_price,
        previous_close,
        absolute_change: change.absolute,
        percent_change: change.percent,
        ma_results,
        rsi,
        recommendation,
        rsi_status,
        insights,
    })
}

// =============================================================================
// Text rendering
// =============================================================================

fn signed(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.2}")
    } else {
        format!("{value:.2}")
    }
}

/// Format a non-negative quantity with thousands separators, no decimals.
fn grouped(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0.0 {
        out.insert(0, '-');
    }
    out
}

impl AnalysisReport {
    /// Canonical four-line block: price, daily change, section header, RSI.
    pub fn summary(&self) -> String {
        let pct = match self.percent_change {
            Some(p) => format!("{}%", signed(p)),
            None => "n/a".to_string(),
        };
        let rsi = match self.rsi.last {
            Some(v) => format!("{v:.2}"),
            None => "n/a".to_string(),
        };

        [
            format!("Current Price: ${:.2}", self.current_price),
            format!("Daily Change: {} ({})", signed(self.absolute_change), pct),
            "Technical Indicators:".to_string(),
            format!("RSI ({}): {} - {}", self.rsi.period, rsi, self.rsi_status),
        ]
        .join("\n")
    }

    /// Summary followed by the recommendation and every available insight.
    pub fn narrative(&self) -> String {
        let mut out = self.summary();
        out.push_str(&format!("\nRecommendation: {}", self.recommendation));

        let averages: Vec<String> = self
            .ma_results
            .iter()
            .filter_map(|ma| {
                ma.last()
                    .map(|v| format!("{}-day Average: ${v:.2}", ma.window_length))
            })
            .collect();
        if !averages.is_empty() {
            out.push_str("\n\n");
            out.push_str(&averages.join("\n"));
        }

        if let Some(cross) = &self.insights.ma_cross {
            let (name, direction, tone, trend) = match cross.kind {
                CrossKind::Golden => ("Golden", "above", "bullish", "upward"),
                CrossKind::Death => ("Death", "below", "bearish", "downward"),
            };
            out.push_str(&format!(
                "\n\n{name} Cross detected: the {}-day average crossed {direction} the \
                 {}-day average, a {tone} signal that often precedes a {trend} trend.",
                cross.short_window, cross.long_window
            ));
        }

        if !self.insights.trailing_changes.is_empty() {
            out.push('\n');
            for tc in &self.insights.trailing_changes {
                out.push_str(&format!("\n{} change: {}%", tc.label, signed(tc.percent)));
            }
        }

        if let Some(levels) = &self.insights.levels {
            out.push_str(&format!(
                "\n\nRecent Support (low): ${:.2}\nRecent Resistance (high): ${:.2}",
                levels.support, levels.resistance
            ));
            match levels.proximity {
                Some(LevelProximity::NearResistance) => out.push_str(
                    "\n\nNote: The price is near resistance. \
                     This might be a challenging level to break through.",
                ),
                Some(LevelProximity::NearSupport) => out.push_str(
                    "\n\nNote: The price is near support. \
                     This might be a level where the price finds buyers.",
                ),
                None => {}
            }
        }

        if let Some(vol) = &self.insights.volume {
            out.push_str(&format!(
                "\n\nRecent Trading Volume: {} shares\nAverage Volume: {} shares",
                grouped(vol.recent),
                grouped(vol.average)
            ));
            match vol.level {
                VolumeLevel::High => out.push_str(
                    "\n\nHigher than average volume recently. \
                     Significant volume can confirm price movements.",
                ),
                VolumeLevel::Low => out.push_str(
                    "\n\nLower than average volume recently. \
                     Low volume might mean less conviction in the current price movement.",
                ),
                VolumeLevel::Normal => {}
            }
        }

        out
    }
}

// =============================================================================
// Chart payload
// =============================================================================

/// Everything a chart renderer needs: raw prices, MA overlays, and the
/// oscillator with its fixed reference lines.
#[derive(Debug, Clone, Serialize)]
pub struct ChartData<'a> {
    pub ticker: &'a str,
    pub prices: &'a [PricePoint],
    pub moving_averages: &'a [WindowResult],
    pub rsi: &'a RsiResult,
    pub reference_lines: [f64; 2],
}

impl<'a> ChartData<'a> {
    pub fn from_report(series: &'a PriceSeries, report: &'a AnalysisReport) -> Self {
        Self {
            ticker: &report.ticker,
            prices: series.points(),
            moving_averages: &report.ma_results,
            rsi: &report.rsi,
            reference_lines: [RSI_OVERBOUGHT, RSI_OVERSOLD],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PricePoint;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes(start(), closes).unwrap()
    }

    #[test]
    fn end_to_end_buy() {
        let s = series(&[100.0, 102.0, 101.0, 105.0, 110.0]);
        let r = analyze("aapl", PeriodLabel::OneYear, &s, &AnalysisParams::default()).unwrap();
        assert_eq!(r.ticker, "AAPL");
        assert_eq!(r.previous_close, 105.0);
        assert_eq!(r.current_price, 110.0);
        assert!((r.absolute_change - 5.0).abs() < 1e-10);
        assert!((r.percent_change.unwrap() - 4.76).abs() < 0.01);
        assert_eq!(r.recommendation, Recommendation::Buy);
        assert_eq!(r.rsi_status, RsiStatus::Unknown);
        assert_eq!(r.as_of, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn empty_series_is_an_error() {
        let err = analyze(
            "msft",
            PeriodLabel::OneMonth,
            &PriceSeries::default(),
            &AnalysisParams::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::EmptySeries {
                ticker: "MSFT".into()
            }
        );
    }

    #[test]
    fn single_point_has_zero_change() {
        let params = AnalysisParams::default();
        let r = analyze("x", PeriodLabel::Max, &series(&[42.0]), &params).unwrap();
        assert_eq!(r.previous_close, 42.0);
        assert_eq!(r.absolute_change, 0.0);
        assert_eq!(r.percent_change, Some(0.0));
        assert_eq!(r.recommendation, Recommendation::Hold);
    }

    #[test]
    fn zero_previous_close_defaults_to_hold() {
        let r = analyze("x", PeriodLabel::OneYear, &series(&[0.0, 5.0]), &AnalysisParams::default())
            .unwrap();
        assert_eq!(r.percent_change, None);
        assert_eq!(r.recommendation, Recommendation::Hold);
        assert!(r.summary().contains("Daily Change: +5.00 (n/a)"));
    }

    #[test]
    fn windows_are_sorted_and_deduplicated() {
        let params = AnalysisParams {
            ma_windows: vec![5, 2, 5, 0],
            rsi_period: 3,
        };
        let s = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let r = analyze("x", PeriodLabel::OneYear, &s, &params).unwrap();
        let lens: Vec<usize> = r.ma_results.iter().map(|m| m.window_length).collect();
        assert_eq!(lens, vec![2, 5]);
        assert!(r.ma_results.iter().all(|m| m.values.len() == 6));
        assert_eq!(r.rsi.period, 3);
        assert_eq!(r.rsi.last, Some(100.0));
        assert_eq!(r.rsi_status, RsiStatus::Overbought);
    }

    #[test]
    fn summary_line_order() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let r = analyze("t", PeriodLabel::OneYear, &series(&closes), &AnalysisParams::default())
            .unwrap();
        let summary = r.summary();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Current Price: $20.00",
                "Daily Change: +1.00 (+5.26%)",
                "Technical Indicators:",
                "RSI (14): 100.00 - Overbought",
            ]
        );
    }

    #[test]
    fn summary_negative_change_and_unknown_rsi() {
        let params = AnalysisParams::default();
        let r = analyze("t", PeriodLabel::OneYear, &series(&[10.0, 8.0]), &params).unwrap();
        let summary = r.summary();
        assert!(summary.contains("Daily Change: -2.00 (-20.00%)"));
        assert!(summary.ends_with("RSI (14): n/a - Unknown"));
        assert_eq!(r.recommendation, Recommendation::Sell);
    }

    #[test]
    fn narrative_includes_insights() {
        let points: Vec<PricePoint> = (0..30)
            .map(|i| {
                PricePoint::new(start() + chrono::Duration::days(i), 100.0 + i as f64)
                    .with_volume(if i == 29 { 5_000_000.0 } else { 1_000_000.0 })
            })
            .collect();
        let s = PriceSeries::new(points).unwrap();
        let params = AnalysisParams {
            ma_windows: vec![5, 10],
            rsi_period: 14,
        };
        let r = analyze("t", PeriodLabel::ThreeMonths, &s, &params).unwrap();
        let text = r.narrative();

        assert!(text.starts_with(&r.summary()));
        assert!(text.contains("Recommendation: HOLD"));
        assert!(text.contains("5-day Average: $127.00"));
        assert!(text.contains("10-day Average: $124.50"));
        assert!(text.contains("1-week change: +5.74%"));
        assert!(text.contains("Recent Support (low): $110.00"));
        assert!(text.contains("near resistance"));
        assert!(text.contains("Recent Trading Volume: 5,000,000 shares"));
        assert!(text.contains("Higher than average volume"));
    }

    #[test]
    fn narrative_reports_golden_cross() {
        let params = AnalysisParams {
            ma_windows: vec![4, 2],
            rsi_period: 14,
        };
        let s = series(&[10.0, 10.0, 10.0, 10.0, 20.0]);
        let r = analyze("t", PeriodLabel::OneMonth, &s, &params).unwrap();
        assert_eq!(r.insights.ma_cross.map(|c| c.kind), Some(CrossKind::Golden));
        assert!(r.narrative().contains(
            "Golden Cross detected: the 2-day average crossed above the 4-day average, \
             a bullish signal that often precedes an upward trend."
        ));
    }

    #[test]
    fn narrative_reports_death_cross() {
        let params = AnalysisParams {
            ma_windows: vec![2, 4],
            rsi_period: 14,
        };
        let s = series(&[10.0, 10.0, 10.0, 10.0, 0.0]);
        let r = analyze("t", PeriodLabel::OneMonth, &s, &params).unwrap();
        let text = r.narrative();
        assert!(text.contains(
            "Death Cross detected: the 2-day average crossed below the 4-day average, \
             a bearish signal that often precedes a downward trend."
        ));
        assert!(!text.contains("Golden Cross"));
    }

    #[test]
    fn narrative_reports_one_year_change() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let s = PriceSeries::new(vec![
            PricePoint::new(d(2023, 1, 9), 80.0),
            PricePoint::new(d(2024, 1, 2), 95.0),
            PricePoint::new(d(2024, 1, 9), 100.0),
        ])
        .unwrap();
        let r = analyze("t", PeriodLabel::OneYear, &s, &AnalysisParams::default()).unwrap();
        let labels: Vec<&str> = r
            .insights
            .trailing_changes
            .iter()
            .map(|t| t.label.as_str())
            .collect();
        assert_eq!(labels, vec!["1-week", "1-year"]);

        let text = r.narrative();
        assert!(text.contains("1-week change: +5.26%"));
        assert!(text.contains("1-year change: +25.00%"));
        assert!(!text.contains("1-month change"));
    }

    #[test]
    fn grouped_formatting() {
        assert_eq!(grouped(0.0), "0");
        assert_eq!(grouped(999.0), "999");
        assert_eq!(grouped(1000.0), "1,000");
        assert_eq!(grouped(1234567.4), "1,234,567");
    }

    #[test]
    fn chart_data_carries_reference_lines() {
        let s = series(&[1.0, 2.0, 3.0]);
        let r = analyze("t", PeriodLabel::OneYear, &s, &AnalysisParams::default()).unwrap();
        let chart = ChartData::from_report(&s, &r);
        assert_eq!(chart.reference_lines, [70.0, 30.0]);
        assert_eq!(chart.prices.len(), 3);
        assert_eq!(chart.moving_averages.len(), 2);
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["ticker"], "T");
    }
}
