// =============================================================================
// Runtime Configuration — analyzer settings with atomic save
// =============================================================================
//
// Central configuration for the analysis service: indicator look-backs, data
// source endpoint, HTTP bind address, and the optional report directory.
// Leaving `report_dir` unset means the report-writing capability is absent;
// nothing else in the process consults a global flag for it.
//
// All fields carry `#[serde(default)]` so that adding new fields never breaks
// loading an older config file.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::indicators::DEFAULT_RSI_PERIOD;
use crate::report::AnalysisParams;
use crate::types::PeriodLabel;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_ma_windows() -> Vec<usize> {
    vec![50, 200]
}

fn default_rsi_period() -> usize {
    DEFAULT_RSI_PERIOD
}

fn default_data_source_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

// =============================================================================
// AnalyzerConfig
// =============================================================================

/// Top-level configuration for the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    // --- Indicators ---------------------------------------------------------

    /// Moving-average window lengths in sessions.
    #[serde(default = "default_ma_windows")]
    pub ma_windows: Vec<usize>,

    /// RSI look-back in sessions.
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Period used when a request does not name one.
    #[serde(default)]
    pub default_period: PeriodLabel,

    // --- Data source ----------------------------------------------------------

    /// Base URL of the chart API.
    #[serde(default = "default_data_source_url")]
    pub data_source_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    // --- Service --------------------------------------------------------------

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Directory for written reports. `None` disables report writing.
    #[serde(default)]
    pub report_dir: Option<PathBuf>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            ma_windows: default_ma_windows(),
            rsi_period: default_rsi_period(),
            default_period: PeriodLabel::default(),
            data_source_url: default_data_source_url(),
            request_timeout_secs: default_request_timeout_secs(),
            bind_addr: default_bind_addr(),
            report_dir: None,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read analyzer config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse analyzer config from {}", path.display()))?;

        info!(
            path = %path.display(),
            ma_windows = ?config.ma_windows,
            rsi_period = config.rsi_period,
            "analyzer config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write (write to
    /// `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise analyzer config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "analyzer config saved (atomic)");
        Ok(())
    }

    /// Apply overrides from a variable lookup (normally `std::env::var`).
    ///
    /// Recognised: `TREND_BIND_ADDR`, `TREND_REPORT_DIR`, `TREND_MA_WINDOWS`
    /// (comma list), `TREND_DATA_SOURCE_URL`. Unparseable window lists are
    /// ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("TREND_BIND_ADDR").filter(|s| !s.trim().is_empty()) {
            self.bind_addr = addr.trim().to_string();
        }
        if let Some(dir) = lookup("TREND_REPORT_DIR").filter(|s| !s.trim().is_empty()) {
            self.report_dir = Some(PathBuf::from(dir.trim()));
        }
        if let Some(url) = lookup("TREND_DATA_SOURCE_URL").filter(|s| !s.trim().is_empty()) {
            self.data_source_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(list) = lookup("TREND_MA_WINDOWS") {
            let parsed: std::result::Result<Vec<usize>, _> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse)
                .collect();
            match parsed {
                Ok(windows) if !windows.is_empty() => self.ma_windows = windows,
                _ => tracing::warn!(value = %list, "ignoring invalid TREND_MA_WINDOWS"),
            }
        }
    }

    /// Indicator parameters for the engine.
    pub fn analysis_params(&self) -> AnalysisParams {
        AnalysisParams {
            ma_windows: self.ma_windows.clone(),
            rsi_period: self.rsi_period,
        }
    }

    pub fn reports_enabled(&self) -> bool {
        self.report_dir.is_some()
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = AnalyzerConfig::default();
        assert_eq!(cfg.ma_windows, vec![50, 200]);
        assert_eq!(cfg.rsi_period, 14);
        assert_eq!(cfg.default_period, PeriodLabel::OneYear);
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
        assert!(!cfg.reports_enabled());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: AnalyzerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, AnalyzerConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json =
            r#"{ "ma_windows": [20], "default_period": "6m", "report_dir": "/tmp/reports" }"#;
        let cfg: AnalyzerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.ma_windows, vec![20]);
        assert_eq!(cfg.default_period, PeriodLabel::SixMonths);
        assert!(cfg.reports_enabled());
        assert_eq!(cfg.rsi_period, 14);
    }

    #[test]
    fn unknown_period_is_rejected() {
        assert!(serde_json::from_str::<AnalyzerConfig>(r#"{ "default_period": "9y" }"#).is_err());
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("trend_cfg_{}.json", std::process::id()));
        let mut cfg = AnalyzerConfig::default();
        cfg.rsi_period = 21;
        cfg.save(&path).unwrap();
        let loaded = AnalyzerConfig::load(&path).unwrap();
        assert_eq!(loaded.rsi_period, 21);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_missing_file_errors() {
        assert!(AnalyzerConfig::load("/definitely/not/here.json").is_err());
    }

    #[test]
    fn overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("TREND_BIND_ADDR", "127.0.0.1:8080"),
            ("TREND_REPORT_DIR", "reports"),
            ("TREND_MA_WINDOWS", "20, 50 ,100"),
            ("TREND_DATA_SOURCE_URL", "http://localhost:9000/"),
        ]
        .into_iter()
        .collect();
        let mut cfg = AnalyzerConfig::default();
        cfg.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.report_dir, Some(PathBuf::from("reports")));
        assert_eq!(cfg.ma_windows, vec![20, 50, 100]);
        assert_eq!(cfg.data_source_url, "http://localhost:9000");
        assert_eq!(cfg.analysis_params().ma_windows, vec![20, 50, 100]);
    }

    #[test]
    fn invalid_window_override_is_ignored() {
        let mut cfg = AnalyzerConfig::default();
        cfg.apply_overrides(|k| (k == "TREND_MA_WINDOWS").then(|| "ten,20".to_string()));
        assert_eq!(cfg.ma_windows, vec![50, 200]);
    }
}
