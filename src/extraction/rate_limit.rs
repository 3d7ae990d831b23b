//! Adaptive per-domain rate limiter for crawl traffic.
//!
//! Tracks request timing per domain and adapts delays based on responses.
//! Backs off on 429/503, mildly on other 5xx, and gradually recovers after
//! consecutive successes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

/// Tuning knobs for the limiter.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub base_delay: Duration,
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub recovery_multiplier: f64,
    /// Consecutive successes before a backed-off delay shrinks.
    pub recovery_threshold: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(500),
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            recovery_multiplier: 0.5,
            recovery_threshold: 3,
        }
    }
}

#[derive(Debug)]
struct DomainState {
    current_delay: Duration,
    last_request: Option<Instant>,
    in_backoff: bool,
    consecutive_successes: u32,
    total_requests: u64,
    rate_limit_hits: u64,
}

impl DomainState {
    fn new(base_delay: Duration) -> Self {
        Self {
            current_delay: base_delay,
            last_request: None,
            in_backoff: false,
            consecutive_successes: 0,
            total_requests: 0,
            rate_limit_hits: 0,
        }
    }

    fn time_until_ready(&self) -> Duration {
        match self.last_request {
            Some(last) => self.current_delay.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }
}

/// Per-domain request statistics snapshot.
#[derive(Debug, Clone)]
pub struct DomainStats {
    pub current_delay: Duration,
    pub in_backoff: bool,
    pub total_requests: u64,
    pub rate_limit_hits: u64,
}

/// Adaptive rate limiter shared by the crawl fetchers.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    domains: Arc<RwLock<HashMap<String, DomainState>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_config(RateLimitConfig::default())
    }

    pub fn with_config(config: RateLimitConfig) -> Self {
        Self {
            config,
            domains: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Extract the host of a URL.
    pub fn extract_domain(url: &str) -> Option<String> {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|s| s.to_string()))
    }

    /// Wait until the domain is ready, then mark a request as started.
    pub async fn acquire(&self, url: &str) -> Option<String> {
        let domain = Self::extract_domain(url)?;

        let wait_time = {
            let domains = self.domains.read().await;
            domains
                .get(&domain)
                .map(|s| s.time_until_ready())
                .unwrap_or(Duration::ZERO)
        };

        if wait_time > Duration::ZERO {
            debug!("Rate limiting {}: waiting {:?}", domain, wait_time);
            tokio::time::sleep(wait_time).await;
        }

        {
            let mut domains = self.domains.write().await;
            let state = domains
                .entry(domain.clone())
                .or_insert_with(|| DomainState::new(self.config.base_delay));
            state.last_request = Some(Instant::now());
            state.total_requests += 1;
        }

        Some(domain)
    }

    /// Report a successful response; may shrink a backed-off delay.
    pub async fn report_success(&self, domain: &str) {
        let mut domains = self.domains.write().await;
        if let Some(state) = domains.get_mut(domain) {
            state.consecutive_successes += 1;

            if state.in_backoff && state.consecutive_successes >= self.config.recovery_threshold {
                let new_delay = Duration::from_secs_f64(
                    state.current_delay.as_secs_f64() * self.config.recovery_multiplier,
                );
                state.current_delay = new_delay.max(self.config.min_delay);

                if state.current_delay <= self.config.base_delay {
                    state.in_backoff = false;
                    state.current_delay = self.config.base_delay;
                    debug!("Domain {} recovered from backoff", domain);
                }
                state.consecutive_successes = 0;
            }
        }
    }

    /// Report a definite rate limit (429 or 503); increases the delay.
    pub async fn report_rate_limit(&self, domain: &str, status_code: u16) {
        let mut domains = self.domains.write().await;
        if let Some(state) = domains.get_mut(domain) {
            state.rate_limit_hits += 1;
            state.consecutive_successes = 0;
            state.in_backoff = true;

            let new_delay = Duration::from_secs_f64(
                state.current_delay.as_secs_f64() * self.config.backoff_multiplier,
            );
            state.current_delay = new_delay.min(self.config.max_delay);

            warn!(
                "Rate limited by {} (HTTP {}), backing off to {:?}",
                domain, status_code, state.current_delay
            );
        }
    }

    /// Report a server error (5xx other than 503); mild backoff.
    pub async fn report_server_error(&self, domain: &str) {
        let mut domains = self.domains.write().await;
        if let Some(state) = domains.get_mut(domain) {
            let new_delay = Duration::from_secs_f64(state.current_delay.as_secs_f64() * 1.5);
            state.current_delay = new_delay.min(self.config.max_delay);
            debug!(
                "Server error for {}, delay increased to {:?}",
                domain, state.current_delay
            );
        }
    }

    /// Get statistics for all tracked domains.
    pub async fn stats(&self) -> HashMap<String, DomainStats> {
        let domains = self.domains.read().await;
        domains
            .iter()
            .map(|(k, v)| {
                (
                    k.clone(),
                    DomainStats {
                        current_delay: v.current_delay,
                        in_backoff: v.in_backoff,
                        total_requests: v.total_requests,
                        rate_limit_hits: v.rate_limit_hits,
                    },
                )
            })
            .collect()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            RateLimiter::extract_domain("https://blog.example.com/post/1"),
            Some("blog.example.com".to_string())
        );
        assert_eq!(RateLimiter::extract_domain("not a url"), None);
    }

    #[tokio::test]
    async fn test_backoff_on_rate_limit() {
        let limiter = RateLimiter::with_config(RateLimitConfig {
            base_delay: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            ..Default::default()
        });

        limiter.acquire("https://example.com/1").await;
        limiter.report_rate_limit("example.com", 429).await;

        let stats = limiter.stats().await;
        let domain_stats = stats.get("example.com").unwrap();
        assert!(domain_stats.current_delay >= Duration::from_millis(200));
        assert!(domain_stats.in_backoff);
        assert_eq!(domain_stats.rate_limit_hits, 1);
    }

    #[tokio::test]
    async fn test_recovery_after_consecutive_successes() {
        let limiter = RateLimiter::with_config(RateLimitConfig {
            base_delay: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            recovery_multiplier: 0.25,
            recovery_threshold: 2,
            ..Default::default()
        });

        limiter.acquire("https://example.com/1").await;
        limiter.report_rate_limit("example.com", 503).await;
        limiter.report_success("example.com").await;
        limiter.report_success("example.com").await;

        let stats = limiter.stats().await;
        let domain_stats = stats.get("example.com").unwrap();
        assert!(!domain_stats.in_backoff);
        assert_eq!(domain_stats.current_delay, Duration::from_millis(100));
    }
}
