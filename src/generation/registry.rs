//! Provider registry and per-provider running statistics.
//!
//! The registry is constructed once from configuration and injected into
//! the generation engine; there is no process-wide singleton. Statistics
//! are updated after every attempt and feed the auto-selection heuristic.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::info;

use super::providers::{
    AnthropicProvider, OllamaProvider, OpenAiProvider, ProviderKind, TextProvider,
};
use crate::config::ProvidersConfig;

/// Running statistics for one provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub total_cost_usd: f64,
    pub avg_response_time_ms: f64,
    pub last_used: Option<DateTime<Utc>>,
}

impl ProviderStats {
    fn record(&mut self, success: bool, cost_usd: f64, elapsed: Duration) {
        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }
        self.total_cost_usd += cost_usd;

        // Running average over all attempts.
        let elapsed_ms = elapsed.as_millis() as f64;
        let n = self.total_requests as f64;
        self.avg_response_time_ms += (elapsed_ms - self.avg_response_time_ms) / n;
        self.last_used = Some(Utc::now());
    }
}

/// Holds the configured provider clients and their statistics.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn TextProvider>>,
    stats: RwLock<HashMap<ProviderKind, ProviderStats>>,
}

impl ProviderRegistry {
    /// Build a registry from configuration. Providers without credentials
    /// (or, for Ollama, without an endpoint) are simply not registered.
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let mut providers: Vec<Arc<dyn TextProvider>> = Vec::new();

        if let Some(ref openai) = config.openai {
            providers.push(Arc::new(OpenAiProvider::new(
                openai.api_key.clone(),
                openai.endpoint.clone(),
                openai.model.clone(),
            )));
        }
        if let Some(ref anthropic) = config.anthropic {
            providers.push(Arc::new(AnthropicProvider::new(
                anthropic.api_key.clone(),
                anthropic.endpoint.clone(),
                anthropic.model.clone(),
            )));
        }
        if let Some(ref ollama) = config.ollama {
            providers.push(Arc::new(OllamaProvider::new(
                Some(ollama.endpoint.clone()),
                ollama.model.clone(),
            )));
        }

        info!(
            "Provider registry initialized with {} provider(s): [{}]",
            providers.len(),
            providers
                .iter()
                .map(|p| p.kind().as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Self::new(providers)
    }

    /// Build a registry from explicit provider instances (tests inject
    /// mocks this way).
    pub fn new(providers: Vec<Arc<dyn TextProvider>>) -> Self {
        let stats = providers
            .iter()
            .map(|p| (p.kind(), ProviderStats::default()))
            .collect();
        Self {
            providers,
            stats: RwLock::new(stats),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn TextProvider>> {
        self.providers.iter().find(|p| p.kind() == kind).cloned()
    }

    pub fn configured(&self) -> Vec<Arc<dyn TextProvider>> {
        self.providers.clone()
    }

    pub fn configured_kinds(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    /// Record the terminal outcome of one attempt.
    pub async fn record_attempt(
        &self,
        kind: ProviderKind,
        success: bool,
        cost_usd: f64,
        elapsed: Duration,
    ) {
        let mut stats = self.stats.write().await;
        stats
            .entry(kind)
            .or_default()
            .record(success, cost_usd, elapsed);
    }

    pub async fn stats(&self, kind: ProviderKind) -> Option<ProviderStats> {
        self.stats.read().await.get(&kind).cloned()
    }

    pub async fn all_stats(&self) -> HashMap<ProviderKind, ProviderStats> {
        self.stats.read().await.clone()
    }
}
