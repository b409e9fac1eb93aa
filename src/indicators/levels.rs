// =============================================================================
// Recent Support / Resistance
// =============================================================================
//
// Support is the lowest and resistance the highest close of the last
// `lookback` sessions. A price within 2 % of either level is flagged.

use serde::{Deserialize, Serialize};

/// Sessions considered for the recent range.
pub const LEVEL_LOOKBACK: usize = 20;
/// Fraction of the level within which the price counts as "near".
pub const LEVEL_PROXIMITY: f64 = 0.02;

/// Where the latest close sits relative to the recent range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelProximity {
    NearResistance,
    NearSupport,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevels {
    pub support: f64,
    pub resistance: f64,
    pub proximity: Option<LevelProximity>,
}

/// Compute the recent range of `closes` over `lookback` sessions.
///
/// Returns `None` when fewer than `lookback` closes exist or `lookback == 0`.
/// Resistance proximity is checked first, so a very tight range reports
/// `NearResistance`.
pub fn price_levels(closes: &[f64], lookback: usize) -> Option<PriceLevels> {
    if lookback == 0 || closes.len() < lookback {
        return None;
    }

    let window = &closes[closes.len() - lookback..];
    let support = window.iter().copied().fold(f64::INFINITY, f64::min);
    let resistance = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let current = *closes.last()?;

    let proximity = if current >= resistance * (1.0 - LEVEL_PROXIMITY) {
        Some(LevelProximity::NearResistance)
    } else if current <= support * (1.0 + LEVEL_PROXIMITY) {
        Some(LevelProximity::NearSupport)
    } else {
        None
    };

    Some(PriceLevels {
        support,
        resistance,
        proximity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_insufficient_data() {
        assert!(price_levels(&[1.0; 19], LEVEL_LOOKBACK).is_none());
    }

    #[test]
    fn levels_use_only_recent_window() {
        let mut closes = vec![1.0, 500.0];
        closes.extend((0..20).map(|i| 100.0 + i as f64));
        let lv = price_levels(&closes, 20).unwrap();
        assert_eq!(lv.support, 100.0);
        assert_eq!(lv.resistance, 119.0);
        assert_eq!(lv.proximity, Some(LevelProximity::NearResistance));
    }

    #[test]
    fn levels_near_support() {
        let mut closes: Vec<f64> = (0..19).map(|i| 120.0 - i as f64).collect();
        closes.push(100.0);
        let lv = price_levels(&closes, 20).unwrap();
        assert_eq!(lv.support, 100.0);
        assert_eq!(lv.proximity, Some(LevelProximity::NearSupport));
    }

    #[test]
    fn levels_mid_range() {
        let mut closes = vec![100.0, 150.0];
        closes.extend(std::iter::repeat(125.0).take(18));
        let lv = price_levels(&closes, 20).unwrap();
        assert_eq!(lv.proximity, None);
    }
}
