// =============================================================================
// Period-over-period Price Change
// =============================================================================
//
//   absolute = current - reference
//   percent  = absolute / reference * 100
//
// A zero reference makes the percentage undefined rather than infinite.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::PriceSeries;

/// Absolute and relative change between two closes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceChange {
    pub absolute: f64,
    pub percent: Option<f64>,
}

/// Change from `reference` to `current`.
pub fn price_change(reference: f64, current: f64) -> PriceChange {
    let absolute = current - reference;
    let percent = if reference == 0.0 {
        None
    } else {
        Some(absolute / reference * 100.0).filter(|p| p.is_finite())
    };
    PriceChange { absolute, percent }
}

/// Percent change over a fixed calendar look-back ending at the last point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailingChange {
    /// Human label, e.g. `1-week`.
    pub label: String,
    pub lookback_days: i64,
    pub percent: f64,
}

/// Calendar look-backs reported alongside the daily change.
pub const TRAILING_LOOKBACKS: [(&str, i64); 3] =
    [("1-week", 7), ("1-month", 30), ("1-year", 365)];

/// Percent changes for every entry of [`TRAILING_LOOKBACKS`] whose reference
/// date is present in the series.
///
/// The reference close must sit on exactly `last_date - lookback`; weekends
/// and holidays therefore skip an entry instead of snapping to a nearby day.
pub fn trailing_changes(series: &PriceSeries) -> Vec<TrailingChange> {
    let Some(last) = series.last() else {
        return Vec::new();
    };

    TRAILING_LOOKBACKS
        .iter()
        .filter_map(|&(label, days)| {
            let reference = series.close_on(last.date - Duration::days(days))?;
            let percent = price_change(reference, last.close).percent?;
            Some(TrailingChange {
                label: label.to_string(),
                lookback_days: days,
                percent,
            })
        })
        .collect()
}
