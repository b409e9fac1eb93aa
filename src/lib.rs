// =============================================================================
// Trend Insight — technical indicator engine and analysis service
// =============================================================================
//
// Engine (pure):    types, indicators, signals, report
// Collaborators:    data (price retrieval), reporting (report writing)
// Service shell:    runtime_config, app_state, api
// =============================================================================

pub mod api;
pub mod app_state;
pub mod data;
pub mod error;
pub mod indicators;
pub mod report;
pub mod reporting;
pub mod runtime_config;
pub mod signals;
pub mod types;

pub use error::AnalysisError;
pub use report::{analyze, AnalysisParams, AnalysisReport, ChartData, MarketInsights};
pub use types::{PeriodLabel, PricePoint, PriceSeries, Recommendation, RsiStatus};
