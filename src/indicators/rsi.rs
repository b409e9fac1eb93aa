// =============================================================================
// Relative Strength Index (RSI) — rolling simple-mean formulation
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Split deltas into gains (positive part) and losses (negative part,
//          stored as a positive number).
// Step 3 — At every position with `period` trailing deltas, average gain and
//          average loss are the SIMPLE mean of those `period` values.
//          This is not Wilder's exponential smoothing; the rolling mean is
//          kept for compatibility with the established 14-day readings.
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Degenerate windows:
//   avg_gain == 0 && avg_loss == 0  => undefined (flat run, no movement)
//   avg_loss == 0 && avg_gain  > 0  => 100
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::{DatedValue, PriceSeries};

/// Classical look-back for the daily RSI.
pub const DEFAULT_RSI_PERIOD: usize = 14;
/// Chart reference line and classification boundary.
pub const RSI_OVERBOUGHT: f64 = 70.0;
/// Chart reference line and classification boundary.
pub const RSI_OVERSOLD: f64 = 30.0;

/// RSI series aligned with the input plus the reading at the final position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiResult {
    pub period: usize,
    pub values: Vec<DatedValue>,
    pub last: Option<f64>,
}

/// Slice-level RSI, one entry per close.
///
/// # Edge cases
/// - `period == 0` => every position is `None`
/// - positions `i < period` => `None` (need `period` deltas)
/// - flat window => `None`
pub fn rsi_values(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return result;
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let delta = w[1] - w[0];
            (delta.max(0.0), (-delta).max(0.0))
        })
        .unzip();

    let period_f = period as f64;
    for (offset, (g, l)) in gains.windows(period).zip(losses.windows(period)).enumerate() {
        let avg_gain = g.iter().sum::<f64>() / period_f;
        let avg_loss = l.iter().sum::<f64>() / period_f;
        // Delta k sits between close k and close k + 1.
        result[offset + period] = rsi_from_averages(avg_gain, avg_loss);
    }

    result
}

/// Compute the RSI of `series` over `period`.
pub fn calculate_rsi(series: &PriceSeries, period: usize) -> RsiResult {
    let values: Vec<DatedValue> = series
        .points()
        .iter()
        .zip(rsi_values(&series.closes(), period))
        .map(|(p, value)| DatedValue {
            date: p.date,
            value,
        })
        .collect();

    let last = values.last().and_then(|v| v.value);

    RsiResult {
        period,
        values,
        last,
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// Returns `None` for a flat window and for any non-finite result.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        return None;
    }

    let rsi = if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    if rsi.is_finite() {
        Some(rsi.clamp(0.0, 100.0))
    } else {
        None
    }
}
