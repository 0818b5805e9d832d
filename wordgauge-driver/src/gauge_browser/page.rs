use crate::gauge_browser::{pacing::Pacing, stealth::NavigatorOverrides};
use anyhow::Result;
use fantoccini::{elements::Element, Client, Locator};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// High-level page wrapper providing the structural queries and interaction
/// primitives the harness relies on.
pub struct GaugePage {
    client: Client,
    pacing: Pacing,
    page_timeout: Duration,
}

impl GaugePage {
    /// Construct a page wrapper around an existing WebDriver client.
    pub fn new(client: Client, page_timeout: Duration) -> Self {
        Self {
            client,
            pacing: Pacing::new(),
            page_timeout,
        }
    }

    /// Navigate to `url` and re-apply the navigator-level overrides.
    ///
    /// Overrides are script-applied and therefore lost on every navigation,
    /// so they ride along with `goto` rather than session construction.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.pacing.random_delay(300, 1200).await;
        self.client.goto(url).await?;
        self.client
            .execute(NavigatorOverrides::script(), vec![])
            .await?;
        Ok(())
    }

    /// Return the page title.
    pub async fn title(&self) -> Result<String> {
        self.client.title().await.map_err(anyhow::Error::from)
    }

    /// Return the current page URL.
    pub async fn current_url(&self) -> Result<String> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(anyhow::Error::from)
    }

    /// Return the full page HTML source.
    pub async fn source(&self) -> Result<String> {
        self.client.source().await.map_err(anyhow::Error::from)
    }

    /// Find zero or more elements by XPath.
    pub async fn find_all(&self, xpath: &str) -> Result<Vec<Element>> {
        self.client
            .find_all(Locator::XPath(xpath))
            .await
            .map_err(anyhow::Error::from)
    }

    /// True if any of the given XPath locators matches at least one element.
    pub async fn any_present(&self, xpaths: &[&str]) -> bool {
        for xpath in xpaths {
            match self.find_all(xpath).await {
                Ok(found) if !found.is_empty() => return true,
                Ok(_) => {}
                Err(err) => debug!(%xpath, error = %err, "presence probe failed"),
            }
        }
        false
    }

    /// True if any of the given XPath locators matches a *visible* element.
    pub async fn any_visible(&self, xpaths: &[&str]) -> bool {
        for xpath in xpaths {
            let found = match self.find_all(xpath).await {
                Ok(found) => found,
                Err(err) => {
                    debug!(%xpath, error = %err, "visibility probe failed");
                    continue;
                }
            };
            for element in found {
                if element.is_displayed().await.unwrap_or(false) {
                    return true;
                }
            }
        }
        false
    }

    /// Center the element in the viewport.
    pub async fn scroll_into_view(&self, element: &Element) -> Result<()> {
        let arg = serde_json::to_value(element)?;
        self.client
            .execute("arguments[0].scrollIntoView({block: 'center'});", vec![arg])
            .await?;
        Ok(())
    }

    /// Force-activate an element via a script-driven click, bypassing
    /// normal interactability checks.
    pub async fn script_click(&self, element: &Element) -> Result<()> {
        let arg = serde_json::to_value(element)?;
        self.client
            .execute("arguments[0].click();", vec![arg])
            .await?;
        Ok(())
    }

    /// One-shot readiness probe.
    pub async fn ready_state_complete(&self) -> Result<bool> {
        let state = self
            .client
            .execute("return document.readyState;", vec![])
            .await?;
        Ok(state.as_str() == Some("complete"))
    }

    /// Poll `document.readyState` until complete or the budget runs out.
    /// Returns whether the page reported complete; callers treat a miss as
    /// best-effort, not a hard precondition.
    pub async fn wait_ready(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            match self.ready_state_complete().await {
                Ok(true) => return true,
                Ok(false) => {}
                Err(err) => debug!(error = %err, "readiness probe failed"),
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(READY_POLL_INTERVAL).await;
        }
    }

    /// Poll readiness with the session-wide page-load budget.
    pub async fn wait_ready_default(&self) -> bool {
        self.wait_ready(self.page_timeout).await
    }

    /// Shared pacing engine for interaction delays.
    pub fn pacing(&self) -> &Pacing {
        &self.pacing
    }
}
