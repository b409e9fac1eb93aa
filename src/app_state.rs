// =============================================================================
// Central Application State — Trend Insight service
// =============================================================================
//
// Shared across request handlers via `Arc<AppState>`. The indicator engine is
// stateless; what lives here is configuration, the injected collaborators,
// and operational bookkeeping for the health and error endpoints.
//
// Thread safety:
//   - Atomic counter for served analyses.
//   - parking_lot::RwLock for the config and the error ring buffer.
// =============================================================================

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;

use crate::data::PriceSource;
use crate::report::AnalysisParams;
use crate::reporting::Reporter;
use crate::runtime_config::AnalyzerConfig;

// =============================================================================
// Error Record
// =============================================================================

/// A recorded error event for the error log endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    /// Human-readable error message.
    pub message: String,
    /// Ticker the failing request was about, if any.
    pub ticker: Option<String>,
    /// ISO 8601 timestamp.
    pub at: String,
}

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

// =============================================================================
// AppState
// =============================================================================

pub struct AppState {
    pub config: RwLock<AnalyzerConfig>,
    pub source: Arc<dyn PriceSource>,
    pub reporter: Reporter,
    /// Bearer token for the authenticated endpoints. `None` rejects them all.
    pub admin_token: Option<String>,
    /// Where config updates are persisted. `None` keeps them in memory only.
    pub config_path: Option<PathBuf>,

    /// Number of successful analyses served since start-up.
    pub analyses_served: AtomicU64,
    pub recent_errors: RwLock<Vec<ErrorRecord>>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: AnalyzerConfig, source: Arc<dyn PriceSource>, reporter: Reporter) -> Self {
        Self {
            config: RwLock::new(config),
            source,
            reporter,
            admin_token: None,
            config_path: None,
            analyses_served: AtomicU64::new(0),
            recent_errors: RwLock::new(Vec::new()),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn with_admin_token(mut self, token: Option<String>) -> Self {
        self.admin_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn analysis_params(&self) -> AnalysisParams {
        self.config.read().analysis_params()
    }

    pub fn record_analysis(&self) -> u64 {
        self.analyses_served.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn analyses_served(&self) -> u64 {
        self.analyses_served.load(Ordering::SeqCst)
    }

    /// Record an error. The ring buffer is capped at [`MAX_RECENT_ERRORS`];
    /// oldest entries are evicted when the limit is reached.
    pub fn push_error(&self, message: String, ticker: Option<String>) {
        let record = ErrorRecord {
            message,
            ticker,
            at: Utc::now().to_rfc3339(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        while errors.len() > MAX_RECENT_ERRORS {
            errors.remove(0);
        }
    }
}
