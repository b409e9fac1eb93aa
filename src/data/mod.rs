// =============================================================================
// Price Data Sources
// =============================================================================
//
// The engine never fetches anything itself. A `PriceSource` hands it a fully
// materialised, validated `PriceSeries`; retrieval failures surface here as
// errors, and "no data" surfaces as an empty series.

pub mod static_source;
pub mod yahoo;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{PeriodLabel, PriceSeries};

pub use static_source::StaticSource;
pub use yahoo::YahooClient;

/// Supplier of daily price series.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the daily closes of `ticker` over `period`.
    async fn fetch(&self, ticker: &str, period: PeriodLabel) -> Result<PriceSeries>;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}
