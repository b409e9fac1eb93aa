// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Unweighted mean of the trailing `window` closes:
//   SMA_i = (close_{i-window+1} + ... + close_i) / window
//
// The output is aligned one-to-one with the input. Positions with fewer than
// `window` observations are `None`, never zero or extrapolated.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::{DatedValue, PriceSeries};

/// Moving average over one window length, aligned to the input series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowResult {
    pub window_length: usize,
    pub values: Vec<DatedValue>,
}

impl WindowResult {
    /// Value at the final series position.
    pub fn last(&self) -> Option<f64> {
        self.values.last().and_then(|v| v.value)
    }

    /// Value at the second-to-last series position.
    pub fn previous(&self) -> Option<f64> {
        let n = self.values.len();
        if n < 2 {
            return None;
        }
        self.values[n - 2].value
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.value.is_some()).count()
    }
}

/// Slice-level SMA, one entry per close.
///
/// # Edge cases
/// - `window == 0` => every position is `None`
/// - `closes.len() < window` => every position is `None`
pub fn sma_values(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if window == 0 || closes.len() < window {
        return result;
    }

    let divisor = window as f64;
    for (offset, w) in closes.windows(window).enumerate() {
        let mean = w.iter().sum::<f64>() / divisor;
        if mean.is_finite() {
            result[offset + window - 1] = Some(mean);
        }
    }
    result
}

/// Compute the simple moving average of `series` over `window_length`.
pub fn moving_average(series: &PriceSeries, window_length: usize) -> WindowResult {
    let values = sma_values(&series.closes(), window_length);

    WindowResult {
        window_length,
        values: series
            .points()
            .iter()
            .zip(values)
            .map(|(p, value)| DatedValue {
                date: p.date,
                value,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), closes).unwrap()
    }

    #[test]
    fn sma_short_series_is_all_undefined() {
        let r = moving_average(&series(&[1.0, 2.0, 3.0]), 5);
        assert_eq!(r.values.len(), 3);
        assert!(r.values.iter().all(|v| v.value.is_none()));
        assert_eq!(r.last(), None);
    }

    #[test]
    fn sma_exact_window_is_series_mean() {
        let r = moving_average(&series(&[2.0, 4.0, 6.0, 8.0]), 4);
        assert_eq!(r.defined_count(), 1);
        assert!((r.last().unwrap() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn sma_alignment() {
        let r = moving_average(&series(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3);
        let vals: Vec<Option<f64>> = r.values.iter().map(|v| v.value).collect();
        assert_eq!(vals[0], None);
        assert_eq!(vals[1], None);
        assert!((vals[2].unwrap() - 2.0).abs() < 1e-10);
        assert!((vals[3].unwrap() - 3.0).abs() < 1e-10);
        assert!((vals[4].unwrap() - 4.0).abs() < 1e-10);
        assert!((r.previous().unwrap() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn sma_zero_window() {
        assert!(sma_values(&[1.0, 2.0], 0).iter().all(Option::is_none));
    }

    #[test]
    fn sma_window_of_one_is_identity() {
        let vals = sma_values(&[3.0, 7.0], 1);
        assert_eq!(vals, vec![Some(3.0), Some(7.0)]);
    }

    #[test]
    fn sma_empty_input() {
        let r = moving_average(&PriceSeries::default(), 50);
        assert!(r.values.is_empty());
    }
}
