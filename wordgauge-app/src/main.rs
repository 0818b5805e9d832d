//! `wordgauge` binary: run one vocabulary-test session end to end.
//!
//! Usage: `wordgauge [config.yaml]` (defaults to `wordgauge.yaml` in the
//! working directory). Requires a Chromedriver instance listening at the
//! configured WebDriver URL.

use anyhow::{Context, Result};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use wordgauge_common::observability::{init_logging, LogConfig};
use wordgauge_common::records::SessionResult;
use wordgauge_config::{GaugeConfig, GaugeConfigLoader};
use wordgauge_driver::gauge_browser::driver::{BrowserOptions, GaugeDriver};
use wordgauge_harness::gate::{GateSettings, StdinPrompt};
use wordgauge_harness::live::{bootstrap, BootstrapSpec, LiveSurface};
use wordgauge_harness::record::Recorder;
use wordgauge_harness::session::{run_session, SessionPlan};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "wordgauge.yaml".to_string());

    let cfg = GaugeConfigLoader::new()
        .with_file(&config_path)
        .load()
        .with_context(|| format!("loading configuration from {config_path}"))?;

    let log_path = init_logging(LogConfig {
        emit_stderr: true,
        ..LogConfig::default()
    })?;
    info!(config = %config_path, log = %log_path.display(), "wordgauge starting");

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let driver = GaugeDriver::new(&BrowserOptions {
        webdriver_url: cfg.browser.webdriver_url.clone(),
        headless: cfg.browser.headless,
        page_timeout: Duration::from_secs(cfg.browser.page_timeout_secs),
        ..BrowserOptions::default()
    })
    .await
    .context("connecting to the WebDriver service")?;

    // The browser session must be torn down regardless of how the run went.
    let outcome = drive(&driver, &cfg, &cancel).await;
    if let Err(err) = driver.close().await {
        warn!(error = %err, "browser session did not close cleanly");
    }

    let result = outcome?;
    report(&result);

    let recorder = Recorder::new(&cfg.results_dir);
    match recorder.write(&result) {
        Ok(path) => info!(path = %path.display(), "result saved"),
        Err(err) => error!(error = %err, "failed to persist the result"),
    }

    Ok(())
}

/// Everything that needs the live browser, separated so the caller can
/// close the session on any exit path.
async fn drive(
    driver: &GaugeDriver,
    cfg: &GaugeConfig,
    cancel: &CancellationToken,
) -> Result<SessionResult> {
    let page = bootstrap(
        driver,
        &BootstrapSpec {
            target_url: cfg.target.url.clone(),
            cookie_domain: cfg.target.cookie_domain.clone(),
            cookies: cfg.cookie_pairs(),
            page_timeout: Duration::from_secs(cfg.browser.page_timeout_secs),
        },
    )
    .await?;

    let surface = LiveSurface::new(page, cfg.target.path_marker.clone());
    let plan = SessionPlan {
        click_counts: cfg.rounds.click_counts(),
        gate: GateSettings {
            ceiling: Duration::from_secs(cfg.gate.verify_timeout_secs),
            poll_interval: Duration::from_secs(cfg.gate.poll_interval_secs),
            confirm_threshold: cfg.gate.confirm_threshold,
        },
    };

    let result = run_session(&surface, &StdinPrompt, cancel, &plan).await?;
    Ok(result)
}

/// Operator-facing run summary on stdout.
fn report(result: &SessionResult) {
    println!();
    println!("=== Vocabulary test session ===");
    if let Some(size) = &result.final_vocab_size {
        println!("Estimated vocabulary size: {size}");
    } else {
        println!("Session incomplete: no final estimate was extracted.");
    }
    println!(
        "Rounds: {}  Words seen: {}  Marked known: {}",
        result.summary.total_rounds, result.summary.total_words, result.summary.total_clicked
    );
    for round in &result.rounds {
        println!(
            "  Round {}: marked {} of {} words",
            round.round, round.clicked_count, round.total_count
        );
        let known: Vec<&str> = round
            .words
            .iter()
            .filter(|w| w.known)
            .take(5)
            .map(|w| w.word.as_str())
            .collect();
        if !known.is_empty() {
            println!("    known sample: {}", known.join(", "));
        }
    }
    println!();
}
