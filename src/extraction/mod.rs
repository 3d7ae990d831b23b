//! Content extraction engine.
//!
//! Pulls clean article text out of arbitrary web pages through an ordered
//! fallback chain: rendered-page (headless browser), static HTTP fetch,
//! and finally a synthesized placeholder. `extract` never fails; total
//! failure degrades to a low-quality placeholder so the orchestrator's
//! state machine always has something to transition on.

#[cfg(feature = "browser")]
mod browser;
mod images;
mod language;
mod quality;
mod rate_limit;
mod readability;
mod static_fetch;
mod user_agent;

#[cfg(feature = "browser")]
pub use browser::{BrowserFetcher, BrowserFetcherConfig};
pub use images::{filter_image_urls, MAX_IMAGES};
pub use language::{detect_language, DetectedLanguage};
pub use quality::score_extraction;
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use readability::{extract_readable, ReadableDocument};
pub use static_fetch::{FetchError, StaticFetcher};
pub use user_agent::random_user_agent;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::models::{ExtractedContent, ExtractedMetadata, ExtractionStrategy};

/// Extraction engine options.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Minimum body length (chars) for a strategy result to be accepted.
    pub min_body_chars: usize,
    /// HTTP and page-load timeout.
    pub timeout: Duration,
    /// Post-load settle delay for the rendered strategy.
    pub settle_delay: Duration,
    /// Skip the browser strategy even when compiled in.
    pub disable_browser: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_body_chars: 50,
            timeout: Duration::from_secs(30),
            settle_delay: Duration::from_millis(2000),
            disable_browser: false,
        }
    }
}

/// Interface the orchestrator crawls through. Infallible by contract:
/// implementations degrade instead of erroring.
#[async_trait]
pub trait ArticleExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> ExtractedContent;
}

/// Production extractor running the layered fallback chain.
pub struct ContentExtractor {
    config: ExtractionConfig,
    static_fetcher: StaticFetcher,
    #[cfg(feature = "browser")]
    browser: BrowserFetcher,
}

impl ContentExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        let rate_limiter = RateLimiter::new();
        let static_fetcher = StaticFetcher::new(config.timeout, rate_limiter);
        #[cfg(feature = "browser")]
        let browser = BrowserFetcher::new(BrowserFetcherConfig {
            page_timeout: config.timeout,
            settle_delay: config.settle_delay,
            chrome_path: None,
        });

        Self {
            config,
            static_fetcher,
            #[cfg(feature = "browser")]
            browser,
        }
    }

    /// Run the fallback chain for one URL.
    async fn extract_inner(&self, url: &str) -> ExtractedContent {
        let mut last_error: Option<String> = None;

        #[cfg(feature = "browser")]
        if !self.config.disable_browser {
            match self.browser.fetch_rendered_html(url).await {
                Ok(html) => {
                    let content = self.build_content(url, &html, ExtractionStrategy::Rendered);
                    if content.is_usable(self.config.min_body_chars) {
                        debug!("Rendered strategy succeeded for {}", url);
                        return content;
                    }
                    last_error = Some("rendered page produced too little text".to_string());
                }
                Err(e) => {
                    warn!("Rendered strategy failed for {}: {}", url, e);
                    last_error = Some(e.to_string());
                }
            }
        }

        match self.static_fetcher.fetch_html(url).await {
            Ok(html) => {
                let content = self.build_content(url, &html, ExtractionStrategy::Static);
                if content.is_usable(self.config.min_body_chars) {
                    debug!("Static strategy succeeded for {}", url);
                    return content;
                }
                last_error = Some("static fetch produced too little text".to_string());
            }
            Err(e) => {
                warn!("Static strategy failed for {}: {}", url, e);
                last_error = Some(e.to_string());
            }
        }

        info!("All strategies failed for {}, synthesizing placeholder", url);
        fallback_content(url, last_error.as_deref())
    }

    /// Assemble an `ExtractedContent` from raw HTML.
    fn build_content(
        &self,
        url: &str,
        html: &str,
        strategy: ExtractionStrategy,
    ) -> ExtractedContent {
        let readable = extract_readable(html);
        let domain = domain_of(url);
        let detected =
            detect_language(&readable.body, &domain, readable.html_lang.as_deref());
        let image_urls = filter_image_urls(&readable.image_urls, url);
        let quality_score = score_extraction(
            &readable.title,
            &readable.body,
            &domain,
            detected.confidence,
        );
        let word_count = readable.body.split_whitespace().count() as u32;

        ExtractedContent {
            source_url: url.to_string(),
            title: readable.title,
            body: readable.body,
            excerpt: readable.excerpt,
            metadata: ExtractedMetadata {
                description: readable.description,
                author: readable.author,
                published_at: readable.published_at,
                image_urls,
                language: detected.code,
                domain,
                word_count,
            },
            quality_score,
            strategy,
            extracted_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ArticleExtractor for ContentExtractor {
    async fn extract(&self, url: &str) -> ExtractedContent {
        self.extract_inner(url).await
    }
}

/// Quality assigned to synthesized placeholder results. Results at or
/// below this band signal total extraction failure to the orchestrator.
pub const PLACEHOLDER_QUALITY: u8 = 10;

/// Synthesize a minimal placeholder from the domain name after every
/// strategy failed.
pub fn fallback_content(url: &str, error: Option<&str>) -> ExtractedContent {
    let domain = domain_of(url);
    let title = if domain.is_empty() {
        "Unknown source".to_string()
    } else {
        domain.clone()
    };
    let body = match error {
        Some(e) => format!("Content could not be extracted from this page: {}", e),
        None => "Content could not be extracted from this page.".to_string(),
    };

    ExtractedContent {
        source_url: url.to_string(),
        title,
        excerpt: body.clone(),
        metadata: ExtractedMetadata {
            description: None,
            author: None,
            published_at: None,
            image_urls: Vec::new(),
            language: "en".to_string(),
            domain,
            word_count: body.split_whitespace().count() as u32,
        },
        body,
        quality_score: PLACEHOLDER_QUALITY,
        strategy: ExtractionStrategy::Fallback,
        extracted_at: Utc::now(),
    }
}

fn domain_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_string()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_content_is_degraded_but_complete() {
        let content = fallback_content("https://unreachable.example.net/post", Some("dns failure"));
        assert_eq!(content.quality_score, PLACEHOLDER_QUALITY);
        assert_eq!(content.strategy, ExtractionStrategy::Fallback);
        assert_eq!(content.title, "unreachable.example.net");
        assert!(content.body.contains("dns failure"));
        assert_eq!(content.metadata.domain, "unreachable.example.net");
    }

    #[test]
    fn test_fallback_handles_unparseable_url() {
        let content = fallback_content("not a url at all", None);
        assert_eq!(content.title, "Unknown source");
        assert_eq!(content.quality_score, PLACEHOLDER_QUALITY);
    }

    #[tokio::test]
    async fn test_extract_never_errors_on_dead_url() {
        let extractor = ContentExtractor::new(ExtractionConfig {
            timeout: Duration::from_millis(500),
            disable_browser: true,
            ..Default::default()
        });
        // Reserved TLD guarantees resolution failure without touching a real site.
        let content = extractor.extract("https://no-such-host.invalid/article").await;
        assert!(content.quality_score <= PLACEHOLDER_QUALITY);
        assert_eq!(content.strategy, ExtractionStrategy::Fallback);
        assert!(!content.body.is_empty());
    }

    #[test]
    fn test_build_content_from_real_html() {
        let extractor = ContentExtractor::new(ExtractionConfig::default());
        let html = r#"<html lang="en"><head><title>Battery Storage Comes of Age | Grid News</title>
            <meta name="description" content="Utility-scale batteries are reshaping the grid.">
            </head><body><article>
            <p>Utility-scale battery installations doubled again last year as prices kept falling.</p>
            <p>Grid operators now count on four-hour storage to shave evening demand peaks.</p>
            <p>Analysts expect the trend to accelerate as interconnection queues clear.</p>
            </article></body></html>"#;
        let content = extractor.build_content(
            "https://gridnews.org/batteries",
            html,
            ExtractionStrategy::Static,
        );
        assert_eq!(content.title, "Battery Storage Comes of Age");
        assert_eq!(content.metadata.domain, "gridnews.org");
        assert_eq!(content.metadata.language, "en");
        assert!(content.quality_score > PLACEHOLDER_QUALITY);
        assert!(content.is_usable(50));
    }
}
