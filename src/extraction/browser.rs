//! Rendered-page extraction strategy.
//!
//! Loads the URL in a headless Chromium context via chromiumoxide (CDP),
//! waits out anti-bot interstitials, and returns the rendered HTML for
//! readability extraction. Only compiled with the `browser` feature.

#![cfg(feature = "browser")]

use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::static_fetch::FetchError;
use super::user_agent::random_user_agent;

/// Page titles shown by common anti-bot interstitials. When the rendered
/// title matches, the page is given extra settle rounds to clear.
const INTERSTITIAL_TITLES: &[&str] = &[
    "just a moment",
    "checking your browser",
    "attention required",
    "access denied",
    "cloudflare",
    "verify you are human",
    "one more step",
];

/// Maximum settle rounds spent waiting for an interstitial to clear.
const MAX_INTERSTITIAL_ROUNDS: u32 = 5;

/// Configuration for the rendered-page fetcher.
#[derive(Debug, Clone)]
pub struct BrowserFetcherConfig {
    /// Page navigation timeout.
    pub page_timeout: Duration,
    /// Fixed delay after load before reading content, letting client-side
    /// rendering finish.
    pub settle_delay: Duration,
    /// Path to a Chrome/Chromium executable; autodetected when unset.
    pub chrome_path: Option<String>,
}

impl Default for BrowserFetcherConfig {
    fn default() -> Self {
        Self {
            page_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_millis(2000),
            chrome_path: None,
        }
    }
}

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

/// Headless-browser page fetcher. The browser launches lazily on first
/// use and is reused for the fetcher's lifetime.
pub struct BrowserFetcher {
    config: BrowserFetcherConfig,
    browser: Mutex<Option<Arc<Browser>>>,
}

impl BrowserFetcher {
    pub fn new(config: BrowserFetcherConfig) -> Self {
        Self {
            config,
            browser: Mutex::new(None),
        }
    }

    fn find_chrome(&self) -> Option<String> {
        if let Some(ref path) = self.config.chrome_path {
            return Some(path.clone());
        }
        CHROME_PATHS
            .iter()
            .find(|p| std::path::Path::new(p).exists())
            .map(|p| p.to_string())
    }

    async fn ensure_browser(&self) -> Result<Arc<Browser>, FetchError> {
        let mut guard = self.browser.lock().await;
        if let Some(ref browser) = *guard {
            return Ok(browser.clone());
        }

        let chrome = self
            .find_chrome()
            .ok_or_else(|| FetchError::Browser("no Chrome executable found".to_string()))?;

        info!("Launching headless browser at {}", chrome);
        let browser_config = BrowserConfig::builder()
            .chrome_executable(&chrome)
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--user-agent={}", random_user_agent()))
            .build()
            .map_err(FetchError::Browser)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        // Drive the CDP event loop for the browser's lifetime.
        tokio::spawn(async move { while handler.next().await.is_some() {} });

        let browser = Arc::new(browser);
        *guard = Some(browser.clone());
        Ok(browser)
    }

    /// Load a URL and return the fully rendered HTML.
    pub async fn fetch_rendered_html(&self, url: &str) -> Result<String, FetchError> {
        let browser = self.ensure_browser().await?;

        let navigate = async {
            let page = browser
                .new_page(url)
                .await
                .map_err(|e| FetchError::Browser(e.to_string()))?;
            page.wait_for_navigation()
                .await
                .map_err(|e| FetchError::Browser(e.to_string()))?;
            Ok::<_, FetchError>(page)
        };

        let page = tokio::time::timeout(self.config.page_timeout, navigate)
            .await
            .map_err(|_| {
                FetchError::Browser(format!(
                    "page load timed out after {:?}",
                    self.config.page_timeout
                ))
            })??;

        // Settle, then wait out anti-bot interstitials by title heuristics.
        tokio::time::sleep(self.config.settle_delay).await;
        for round in 0..MAX_INTERSTITIAL_ROUNDS {
            let title = page
                .get_title()
                .await
                .ok()
                .flatten()
                .unwrap_or_default()
                .to_lowercase();
            if !INTERSTITIAL_TITLES.iter().any(|t| title.contains(t)) {
                break;
            }
            debug!(
                "Interstitial detected on {} ({:?}), waiting (round {})",
                url, title, round + 1
            );
            tokio::time::sleep(self.config.settle_delay).await;
        }

        let html = page
            .content()
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        if let Err(e) = page.close().await {
            warn!("Failed to close page for {}: {}", url, e);
        }

        Ok(html)
    }

    /// Shut down the browser if one was launched.
    pub async fn close(&self) {
        let mut guard = self.browser.lock().await;
        *guard = None;
    }
}
