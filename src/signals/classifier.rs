// =============================================================================
// Signal Classifier
// =============================================================================
//
// Maps raw numbers to discrete labels with fixed thresholds:
//
//   daily % change   >  1.5  => BUY
//                    < -1.5  => SELL
//                    otherwise HOLD   (boundaries are HOLD)
//
//   RSI              >  70   => Overbought
//                    <  30   => Oversold
//                    otherwise Neutral (boundaries are Neutral)
//                    missing => Unknown
// =============================================================================

use crate::indicators::rsi::{RSI_OVERBOUGHT, RSI_OVERSOLD};
use crate::types::{Recommendation, RsiStatus};

/// Percentage move beyond which the daily change becomes actionable.
pub const RECOMMENDATION_THRESHOLD_PCT: f64 = 1.5;

/// Classify a daily percentage change. NaN is treated as no signal.
pub fn recommendation(percent_change: f64) -> Recommendation {
    if percent_change > RECOMMENDATION_THRESHOLD_PCT {
        Recommendation::Buy
    } else if percent_change < -RECOMMENDATION_THRESHOLD_PCT {
        Recommendation::Sell
    } else {
        Recommendation::Hold
    }
}

/// Classify an RSI reading. A missing or non-finite reading is `Unknown`.
pub fn rsi_status(rsi: Option<f64>) -> RsiStatus {
    match rsi {
        Some(v) if !v.is_finite() => RsiStatus::Unknown,
        Some(v) if v > RSI_OVERBOUGHT => RsiStatus::Overbought,
        Some(v) if v < RSI_OVERSOLD => RsiStatus::Oversold,
        Some(_) => RsiStatus::Neutral,
        None => RsiStatus::Unknown,
    }
}
