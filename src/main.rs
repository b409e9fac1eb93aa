// =============================================================================
// Trend Insight — Main Entry Point
// =============================================================================
//
//   trend-insight                   serve the REST API until Ctrl+C
//   trend-insight <TICKER> [PERIOD] analyse once, print the narrative, exit
// =============================================================================

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use trend_insight::api;
use trend_insight::app_state::AppState;
use trend_insight::data::{PriceSource, YahooClient};
use trend_insight::report::analyze;
use trend_insight::reporting::Reporter;
use trend_insight::runtime_config::AnalyzerConfig;
use trend_insight::types::PeriodLabel;

const CONFIG_PATH: &str = "analyzer_config.json";

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = AnalyzerConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AnalyzerConfig::default()
    });
    config.apply_overrides(|key| std::env::var(key).ok());

    info!(
        ma_windows = ?config.ma_windows,
        rsi_period = config.rsi_period,
        reports_enabled = config.reports_enabled(),
        "Configuration resolved"
    );

    // ── 2. Collaborators ─────────────────────────────────────────────────
    let source = YahooClient::new(
        config.data_source_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let reporter = Reporter::from_dir(config.report_dir.as_deref());

    // ── 3. One-shot mode ─────────────────────────────────────────────────
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(ticker) = args.first() {
        let period = match args.get(1) {
            Some(p) => p.parse::<PeriodLabel>()?,
            None => config.default_period,
        };
        return run_once(&source, &reporter, &config, ticker, period).await;
    }

    // ── 4. Serve ─────────────────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let admin_token = std::env::var("TREND_ADMIN_TOKEN").ok();
    if admin_token.is_none() {
        warn!("TREND_ADMIN_TOKEN not set — authenticated endpoints are disabled");
    }

    let state = Arc::new(
        AppState::new(config, Arc::new(source), reporter)
            .with_admin_token(admin_token)
            .with_config_path(PathBuf::from(CONFIG_PATH)),
    );
    let app = api::router(state.clone());

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    info!(served = state.analyses_served(), "Trend Insight shut down complete.");
    Ok(())
}

/// Fetch, analyse, print, and optionally write a report for one ticker.
async fn run_once(
    source: &dyn PriceSource,
    reporter: &Reporter,
    config: &AnalyzerConfig,
    ticker: &str,
    period: PeriodLabel,
) -> Result<()> {
    info!(ticker, period = %period, "Fetching data and analyzing trends");

    let series = source
        .fetch(ticker, period)
        .await
        .with_context(|| format!("failed to fetch price data for {ticker}"))?;
    let report = analyze(ticker, period, &series, &config.analysis_params())?;

    println!("Stock Analysis Summary: {} ({})", report.ticker, report.period);
    println!("-----------------------");
    println!("{}", report.narrative());

    if let Some(path) = reporter.publish(&report)? {
        println!("\nReport saved to {}", path.display());
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    warn!("Shutdown signal received — stopping gracefully");
}
