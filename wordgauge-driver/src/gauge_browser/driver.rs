use crate::gauge_browser::{page::GaugePage, stealth::chrome_arguments};
use anyhow::Result;
use fantoccini::cookies::Cookie;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use webdriver::capabilities::Capabilities;

/// Options for constructing a browser session.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Address of a running WebDriver service (Chromedriver).
    pub webdriver_url: String,
    pub headless: bool,
    /// Page-load readiness budget applied at session start. This is the
    /// only implicit per-action timeout the harness carries.
    pub page_timeout: Duration,
    pub window: (u32, u32),
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: false,
            page_timeout: Duration::from_secs(30),
            window: (1920, 1080),
        }
    }
}

/// Thin wrapper around a `fantoccini` WebDriver client.
///
/// The driver is exclusively owned by one harness session for its entire
/// lifetime; callers must route every exit path through [`GaugeDriver::close`].
pub struct GaugeDriver {
    client: Client,
    page_timeout: Duration,
}

impl GaugeDriver {
    /// Create a new driver connected to a running WebDriver service.
    ///
    /// Construction failure is fatal for the session: there is nothing to
    /// degrade to without a browser.
    pub async fn new(opts: &BrowserOptions) -> Result<Self> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();
        chrome_opts.insert(
            "args".to_string(),
            json!(chrome_arguments(opts.headless, opts.window)),
        );
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&opts.webdriver_url)
            .await?;

        Ok(Self {
            client,
            page_timeout: opts.page_timeout,
        })
    }

    /// Hand out a page wrapper sharing this driver's session.
    pub fn page(&self) -> GaugePage {
        GaugePage::new(self.client.clone(), self.page_timeout)
    }

    /// Install a single cookie against `domain`. The current page must
    /// already be on a matching domain context or the WebDriver rejects it.
    pub async fn inject_cookie(&self, domain: &str, name: &str, value: &str) -> Result<()> {
        let mut cookie = Cookie::new(name.to_string(), value.to_string());
        cookie.set_domain(domain.to_string());
        cookie.set_path("/".to_string());
        self.client.add_cookie(cookie).await?;
        debug!(cookie = %name, "cookie injected");
        Ok(())
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}
