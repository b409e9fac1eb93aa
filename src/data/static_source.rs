use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;

use super::PriceSource;
use crate::types::{PeriodLabel, PriceSeries};

/// In-memory source keyed by upper-case ticker. Unknown tickers yield an
/// empty series, the same shape a real source gives for an invalid symbol.
/// The period is ignored.
#[derive(Default)]
pub struct StaticSource {
    series: RwLock<HashMap<String, PriceSeries>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, ticker: &str, series: PriceSeries) {
        self.series
            .write()
            .insert(ticker.trim().to_uppercase(), series);
    }

    pub fn with(self, ticker: &str, series: PriceSeries) -> Self {
        self.insert(ticker, series);
        self
    }
}

#[async_trait]
impl PriceSource for StaticSource {
    async fn fetch(&self, ticker: &str, _period: PeriodLabel) -> Result<PriceSeries> {
        Ok(self
            .series
            .read()
            .get(&ticker.trim().to_uppercase())
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
