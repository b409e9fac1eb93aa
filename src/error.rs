// =============================================================================
// Engine Errors
// =============================================================================
//
// Only conditions that make an analysis impossible are errors. Insufficient
// history is never an error: it shows up as `None` values inside the
// indicator results.
// =============================================================================

use chrono::NaiveDate;
use thiserror::Error;

/// Errors produced by the indicator engine and the price-series model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The series handed to `analyze` contains no price points.
    #[error("no data found for {ticker}")]
    EmptySeries { ticker: String },

    /// A point's date is not strictly after the previous point's date.
    #[error("price point {index} dated {date} is not after the previous point")]
    UnorderedTimestamps { index: usize, date: NaiveDate },

    /// A close that is NaN, infinite, or negative.
    #[error("price point {index} has an invalid close {value}")]
    InvalidClose { index: usize, value: f64 },

    /// A period label outside `1m, 3m, 6m, 1y, 2y, 5y, max`.
    #[error("unknown period label '{0}' (expected one of 1m, 3m, 6m, 1y, 2y, 5y, max)")]
    UnknownPeriod(String),

    /// A ticker that is empty, too long, or uses characters no exchange
    /// symbol carries.
    #[error("invalid ticker symbol '{0}'")]
    InvalidTicker(String),
}

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_message_names_ticker() {
        let err = AnalysisError::EmptySeries {
            ticker: "MSFT".into(),
        };
        assert_eq!(err.to_string(), "no data found for MSFT");
    }

    #[test]
    fn invalid_ticker_message() {
        let err = AnalysisError::InvalidTicker("../x".into());
        assert_eq!(err.to_string(), "invalid ticker symbol '../x'");
    }

    #[test]
    fn unknown_period_message() {
        let err = AnalysisError::UnknownPeriod("10y".into());
        assert!(err.to_string().starts_with("unknown period label '10y'"));
    }
}
