// =============================================================================
// Signals Module
// =============================================================================
//
// Turns indicator numbers into discrete, reportable signals:
// - BUY/SELL/HOLD recommendation and RSI status labels
// - Golden / death moving-average cross detection

pub mod classifier;
pub mod cross;

pub use classifier::{recommendation, rsi_status};
pub use cross::{detect_cross, CrossKind, MaCross};
