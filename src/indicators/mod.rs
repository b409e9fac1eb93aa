// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator computations over a `PriceSeries`.
// Insufficient history is represented as `None`, so callers are forced to
// make an explicit presence check instead of plotting or reporting zeros.

pub mod change;
pub mod levels;
pub mod rsi;
pub mod sma;
pub mod volume;

pub use change::{price_change, trailing_changes, PriceChange, TrailingChange};
pub use levels::{price_levels, LevelProximity, PriceLevels};
pub use rsi::{calculate_rsi, RsiResult, DEFAULT_RSI_PERIOD, RSI_OVERBOUGHT, RSI_OVERSOLD};
pub use sma::{moving_average, WindowResult};
pub use volume::{volume_activity, VolumeActivity, VolumeLevel};
