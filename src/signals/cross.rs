// =============================================================================
// Moving-Average Cross Detection
// =============================================================================
//
// Golden cross: the short MA moves above the long MA on the latest bar.
// Death cross:  the short MA moves below the long MA on the latest bar.

use serde::{Deserialize, Serialize};

use crate::indicators::sma::WindowResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossKind {
    Golden,
    Death,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaCross {
    pub kind: CrossKind,
    pub short_window: usize,
    pub long_window: usize,
}

/// Detect a cross between `short` and `long` on the final position.
///
/// Both averages must be defined at the last two positions; otherwise there
/// is nothing to compare and `None` is returned.
pub fn detect_cross(short: &WindowResult, long: &WindowResult) -> Option<MaCross> {
    let (s_now, s_prev) = (short.last()?, short.previous()?);
    let (l_now, l_prev) = (long.last()?, long.previous()?);

    let kind = if s_now > l_now && s_prev <= l_prev {
        CrossKind::Golden
    } else if s_now < l_now && s_prev >= l_prev {
        CrossKind::Death
    } else {
        return None;
    };

    Some(MaCross {
        kind,
        short_window: short.window_length,
        long_window: long.window_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::sma::moving_average;
    use crate::types::PriceSeries;
    use chrono::NaiveDate;

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), closes).unwrap()
    }

    #[test]
    fn golden_cross_on_last_bar() {
        // SMA2 vs SMA4. Before the last bar: sma2 = 10, sma4 = 10.
        // Last bar jumps: sma2 = 15, sma4 = 12.5.
        let s = series(&[10.0, 10.0, 10.0, 10.0, 20.0]);
        let c = detect_cross(&moving_average(&s, 2), &moving_average(&s, 4)).unwrap();
        assert_eq!(c.kind, CrossKind::Golden);
        assert_eq!((c.short_window, c.long_window), (2, 4));
    }

    #[test]
    fn death_cross_on_last_bar() {
        let s = series(&[10.0, 10.0, 10.0, 10.0, 0.0]);
        let c = detect_cross(&moving_average(&s, 2), &moving_average(&s, 4)).unwrap();
        assert_eq!(c.kind, CrossKind::Death);
    }

    #[test]
    fn no_cross_when_already_above() {
        let s = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert!(detect_cross(&moving_average(&s, 2), &moving_average(&s, 4)).is_none());
    }

    #[test]
    fn no_cross_without_history() {
        let s = series(&[1.0, 2.0, 3.0, 4.0]);
        // Long SMA is defined only on the last bar.
        assert!(detect_cross(&moving_average(&s, 2), &moving_average(&s, 4)).is_none());
    }
}
