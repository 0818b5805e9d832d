//! The fantoccini-backed [`VocabSurface`] plus session bootstrap.
//!
//! All the page-specific selectors live here. The widget container class
//! string is matched exactly first because the page renders several
//! near-identical layout grids; the relaxed fallback only fires when the
//! exact signature has drifted.

use crate::surface::{Activation, GateSignals, VocabSurface, WordEntry};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::Locator;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;
use wordgauge_driver::gauge_browser::{driver::GaugeDriver, page::GaugePage};

/// Markers whose presence means a verification challenge is in front of us.
const CHALLENGE_MARKERS: [&str; 8] = [
    "//title[contains(text(), 'Just a moment')]",
    "//div[contains(@class, 'cf-browser-verification')]",
    "//div[contains(@class, 'cf-checking-browser')]",
    "//*[contains(text(), 'Checking your browser')]",
    "//*[contains(text(), 'Please wait')]",
    "//div[@id='cf-challenge']",
    "//div[contains(@class, 'cf-wrapper')]",
    "//*[contains(text(), 'Verify you are human')]",
];

/// Markers whose presence means the vocabulary-test page has rendered.
const TARGET_MARKERS: [&str; 4] = [
    "//div[contains(@class, 'LayoutGap__FdLKD')]",
    "//h1[contains(text(), 'Test your vocabulary')]",
    "//div[contains(text(), 'vocabulary test')]",
    "//button[contains(text(), 'Start test')]",
];

/// Title fragments that indicate the challenge interstitial.
const CHALLENGE_TITLES: [&str; 4] = [
    "Just a moment",
    "Checking",
    "Please wait",
    "Verify you are human",
];

/// Body fragments that indicate the target content is loaded.
const BODY_KEYWORDS: [&str; 2] = ["vocabulary test", "preply"];

/// Exact class signature of the word-grid container.
const WIDGET_CONTAINER_CLASS: &str = "LayoutGrid__-dslt LayoutGap__FdLKD LayoutGap--gap-24__naegM LayoutPadding__MyMdq LayoutPadding--padding-top-none__EDOlv LayoutPadding--padding-right-none__l2yuQ LayoutPadding--padding-bottom-none__y-IEv LayoutPadding--padding-left-none__3-vQ1 LayoutHide__Q53jS LayoutRelative__PQtO7 LayoutGrid--columns__kFwZC";

/// Relaxed container match for when the hashed class suffixes rotate.
const WIDGET_CONTAINER_FALLBACK: &str =
    "//div[contains(@class, 'LayoutGrid__-dslt') and contains(@class, 'LayoutGrid--columns__kFwZC')]";

const WORD_LABELS: &str = ".//label[starts-with(@for, 'word_')]";
const LABEL_CHECKBOX: &str = ".//input[@type='checkbox']";
const LABEL_TEXT: &str = ".//span";

const CONTINUE_BUTTON: &str =
    "//button[@data-preply-ds-component='Button' and .//span[text()='Continue']]";

/// Exact heading signature on the results view.
const RESULT_HEADING: &str = "//h3[@class='preply-ds-heading Heading__Lv13n Heading--variant-huge__uNKwX TextCentered__7KaTF TextCentered--centered__4f-qW TextAccent__AfPNQ TextAccent--accent-default__rjbSO Color__vfkGX' and @data-preply-ds-component='Heading']";

/// Relaxed heading match for class-hash drift.
const RESULT_HEADING_RELAXED: &str =
    "//h3[contains(@class, 'preply-ds-heading') and contains(@class, 'Heading--variant-huge')]";

/// Settle between scrolling the continue control into view and clicking it.
const PRE_CLICK_SETTLE: Duration = Duration::from_millis(500);

/// Pause after the warm-up navigation, before cookies are injected.
const WARMUP_SETTLE: Duration = Duration::from_secs(2);

/// Pause after reaching the target URL, for client-side rendering.
const DYNAMIC_CONTENT_SETTLE: Duration = Duration::from_secs(3);

/// Live browser-backed surface.
///
/// Holds the DOM handles from the most recent enumeration in an internal
/// arena; session logic addresses entries by index only.
pub struct LiveSurface {
    page: GaugePage,
    path_marker: String,
    handles: Mutex<Vec<Element>>,
}

impl LiveSurface {
    pub fn new(page: GaugePage, path_marker: impl Into<String>) -> Self {
        Self {
            page,
            path_marker: path_marker.into(),
            handles: Mutex::new(Vec::new()),
        }
    }

    async fn find_container(&self) -> Result<Option<Element>> {
        let exact = format!("//div[@class='{WIDGET_CONTAINER_CLASS}']");
        let found = self.page.find_all(&exact).await?;
        if let Some(container) = found.into_iter().next() {
            return Ok(Some(container));
        }
        debug!("exact container signature missed; trying relaxed match");
        let found = self.page.find_all(WIDGET_CONTAINER_FALLBACK).await?;
        Ok(found.into_iter().next())
    }

    async fn resolve_handle(&self, index: usize) -> Result<Element> {
        let handles = self.handles.lock().await;
        handles
            .get(index)
            .cloned()
            .with_context(|| format!("no enumerated entry at index {index}"))
    }
}

#[async_trait]
impl VocabSurface for LiveSurface {
    async fn gate_signals(&self) -> Result<GateSignals> {
        let title = self.page.title().await?;
        let current_url = self.page.current_url().await?;

        let challenge_present = self.page.any_present(&CHALLENGE_MARKERS).await;
        let challenge_visible = if challenge_present {
            self.page.any_visible(&CHALLENGE_MARKERS).await
        } else {
            false
        };

        let title_clear = !CHALLENGE_TITLES
            .iter()
            .any(|fragment| title.contains(fragment));
        let target_markers_present = self.page.any_present(&TARGET_MARKERS).await;
        let on_target_path = current_url.contains(&self.path_marker);

        let body_mentions_target = match self.page.source().await {
            Ok(source) => {
                let lower = source.to_lowercase();
                BODY_KEYWORDS.iter().any(|kw| lower.contains(kw))
            }
            Err(err) => {
                debug!(error = %err, "page source probe failed");
                false
            }
        };

        Ok(GateSignals {
            challenge_present,
            challenge_visible,
            title_clear,
            target_markers_present,
            on_target_path,
            body_mentions_target,
            current_url,
        })
    }

    async fn settle_ready(&self, budget: Duration) -> Result<bool> {
        Ok(self.page.wait_ready(budget).await)
    }

    async fn enumerate_entries(&self) -> Result<Vec<WordEntry>> {
        let container = match self.find_container().await? {
            Some(container) => container,
            None => {
                warn!("word-grid container not found");
                return Ok(Vec::new());
            }
        };

        let labels = container.find_all(Locator::XPath(WORD_LABELS)).await?;
        let mut entries = Vec::with_capacity(labels.len());
        let mut handles = self.handles.lock().await;
        handles.clear();

        for label in labels {
            let anchor = match label.attr("for").await? {
                Some(anchor) if !anchor.is_empty() => anchor,
                _ => continue,
            };
            let word = match label.find_all(Locator::XPath(LABEL_TEXT)).await?.first() {
                Some(span) => span.text().await?.trim().to_string(),
                None => continue,
            };
            if word.is_empty() {
                continue;
            }
            entries.push(WordEntry {
                index: handles.len(),
                word,
                anchor,
            });
            handles.push(label);
        }

        debug!(count = entries.len(), "word entries enumerated");
        Ok(entries)
    }

    async fn scroll_entry_into_view(&self, index: usize) -> Result<()> {
        let label = self.resolve_handle(index).await?;
        self.page.scroll_into_view(&label).await
    }

    async fn activate_entry(&self, index: usize, how: Activation) -> Result<()> {
        let label = self.resolve_handle(index).await?;
        match how {
            Activation::Checkbox => {
                let checkbox = label
                    .find(Locator::XPath(LABEL_CHECKBOX))
                    .await
                    .context("checkbox not found inside label")?;
                checkbox.click().await.context("checkbox click rejected")
            }
            Activation::Text => {
                let span = label
                    .find(Locator::XPath(LABEL_TEXT))
                    .await
                    .context("text span not found inside label")?;
                span.click().await.context("text span click rejected")
            }
            Activation::ForcedClick => self.page.script_click(&label).await,
        }
    }

    async fn click_continue(&self) -> Result<bool> {
        let buttons = self.page.find_all(CONTINUE_BUTTON).await?;
        let button = match buttons.into_iter().next() {
            Some(button) => button,
            None => return Ok(false),
        };
        if let Err(err) = self.page.scroll_into_view(&button).await {
            debug!(error = %err, "continue scroll failed");
        }
        self.page.pacing().settle(PRE_CLICK_SETTLE).await;
        // No retry or forced fallback here: a rejected continue click ends
        // the round sequence, matching the caller's truncation policy.
        button.click().await.context("continue click rejected")?;
        Ok(true)
    }

    async fn read_final_size(&self) -> Result<Option<String>> {
        for xpath in [RESULT_HEADING, RESULT_HEADING_RELAXED] {
            let headings = self.page.find_all(xpath).await?;
            if let Some(heading) = headings.into_iter().next() {
                let text = heading.text().await?.trim().to_string();
                if !text.is_empty() {
                    return Ok(Some(text));
                }
            }
        }
        Ok(None)
    }
}

/// What the bootstrap needs to get a session onto the target page.
#[derive(Debug, Clone)]
pub struct BootstrapSpec {
    pub target_url: String,
    pub cookie_domain: String,
    /// Session cookies carried over from a previously verified browser.
    pub cookies: Vec<(String, String)>,
    pub page_timeout: Duration,
}

/// Navigate a fresh driver to the target page with cookies installed.
///
/// Cookies can only be set against a matching origin, so the sequence is
/// warm-up navigation to the site origin, cookie injection, then the real
/// navigation to the target URL.
pub async fn bootstrap(driver: &GaugeDriver, spec: &BootstrapSpec) -> Result<GaugePage> {
    let page = driver.page();

    let origin = origin_of(&spec.target_url)?;
    info!(%origin, "warming up on the site origin");
    page.goto(&origin).await?;
    sleep(WARMUP_SETTLE).await;

    for (name, value) in &spec.cookies {
        if let Err(err) = driver.inject_cookie(&spec.cookie_domain, name, value).await {
            warn!(cookie = %name, error = %err, "cookie injection failed; continuing without it");
        }
    }

    info!(url = %spec.target_url, "navigating to the vocabulary test");
    page.goto(&spec.target_url).await?;
    if !page.wait_ready(spec.page_timeout).await {
        warn!("page did not report ready within the load budget");
    }
    sleep(DYNAMIC_CONTENT_SETTLE).await;

    Ok(page)
}

fn origin_of(target_url: &str) -> Result<String> {
    let url = Url::parse(target_url)
        .with_context(|| format!("invalid target url {target_url}"))?;
    Ok(url.origin().ascii_serialization())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_strips_path_and_query() {
        let origin = origin_of("https://preply.com/en/learn/english/test-your-vocab?x=1").unwrap();
        assert_eq!(origin, "https://preply.com");
    }

    #[test]
    fn bad_target_url_is_rejected() {
        assert!(origin_of("not a url").is_err());
    }
}
