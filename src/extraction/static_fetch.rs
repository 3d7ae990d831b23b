//! Static-fetch extraction strategy: plain HTTP GET, offline parsing.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::rate_limit::RateLimiter;
use super::user_agent::random_user_agent;

/// Errors internal to the fetch strategies. These never escape the
/// extraction engine; the fallback chain converts them into a degraded
/// placeholder result.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("unsupported content type: {0}")]
    ContentType(String),

    #[cfg(feature = "browser")]
    #[error("browser error: {0}")]
    Browser(String),
}

/// HTTP fetcher with a browser-like user agent and shared rate limiting.
#[derive(Clone)]
pub struct StaticFetcher {
    client: Client,
    rate_limiter: RateLimiter,
}

impl StaticFetcher {
    pub fn new(timeout: Duration, rate_limiter: RateLimiter) -> Self {
        let client = Client::builder()
            .user_agent(random_user_agent())
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            rate_limiter,
        }
    }

    /// Fetch a page and return its HTML.
    pub async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let domain = self.rate_limiter.acquire(url).await;

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                if let Some(ref d) = domain {
                    if e.is_timeout() || e.is_connect() {
                        self.rate_limiter.report_server_error(d).await;
                    }
                }
                return Err(FetchError::Request(e.to_string()));
            }
        };

        let status = response.status().as_u16();
        if let Some(ref d) = domain {
            if status == 429 || status == 503 {
                self.rate_limiter.report_rate_limit(d, status).await;
            } else if status >= 500 {
                self.rate_limiter.report_server_error(d).await;
            } else if response.status().is_success() {
                self.rate_limiter.report_success(d).await;
            }
        }

        if !response.status().is_success() {
            return Err(FetchError::Status(status));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.is_empty()
            && !content_type.contains("html")
            && !content_type.contains("xml")
            && !content_type.contains("text/plain")
        {
            return Err(FetchError::ContentType(content_type));
        }

        debug!("Fetched {} (HTTP {})", url, status);
        response
            .text()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))
    }
}
