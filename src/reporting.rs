// =============================================================================
// Report Writer — optional capability injected at construction
// =============================================================================
//
// Whether reports can be written is decided once, when the `Reporter` is
// built from configuration. A `Reporter` without a sink is a valid, fully
// functional value whose `publish` is a no-op.
// =============================================================================

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::report::AnalysisReport;

/// Destination for rendered reports.
pub trait ReportSink: Send + Sync {
    /// Persist `body` for `report`, returning where it went.
    fn write(&self, report: &AnalysisReport, body: &str) -> Result<PathBuf>;
}

/// Writes one plain-text file per report into a directory.
#[derive(Debug, Clone)]
pub struct TextFileSink {
    dir: PathBuf,
}

impl TextFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `{TICKER}_{period}_{as_of}.txt`
    pub fn file_name(report: &AnalysisReport) -> String {
        let ticker: String = report
            .ticker
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
            .collect();
        format!("{}_{}_{}.txt", ticker, report.period, report.as_of)
    }
}

impl ReportSink for TextFileSink {
    fn write(&self, report: &AnalysisReport, body: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create report dir {}", self.dir.display()))?;

        let path = self.dir.join(Self::file_name(report));
        std::fs::write(&path, body)
            .with_context(|| format!("failed to write report to {}", path.display()))?;

        Ok(path)
    }
}

/// Report-writing collaborator.
#[derive(Clone, Default)]
pub struct Reporter {
    sink: Option<Arc<dyn ReportSink>>,
}

impl Reporter {
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn with_sink(sink: Arc<dyn ReportSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Build from an optional report directory.
    pub fn from_dir(dir: Option<&Path>) -> Self {
        match dir {
            Some(d) => Self::with_sink(Arc::new(TextFileSink::new(d))),
            None => Self::disabled(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Full text written for `report`.
    pub fn render(report: &AnalysisReport) -> String {
        let title = format!(
            "Stock Analysis Summary: {} ({}, as of {})",
            report.ticker, report.period, report.as_of
        );
        format!(
            "{title}\n{}\n\n{}\n",
            "-".repeat(title.len()),
            report.narrative()
        )
    }

    /// Write `report` through the sink. `Ok(None)` when no sink is configured.
    pub fn publish(&self, report: &AnalysisReport) -> Result<Option<PathBuf>> {
        let Some(sink) = &self.sink else {
            debug!(ticker = %report.ticker, "report writing disabled, skipping");
            return Ok(None);
        };

        let path = sink.write(report, &Self::render(report))?;
        info!(ticker = %report.ticker, path = %path.display(), "report written");
        Ok(Some(path))
    }
}
