//! Multi-provider content generation engine.
//!
//! Single entry point: [`GenerationEngine::generate`]. Provider selection
//! and one cross-provider fallback attempt happen internally; callers see
//! either a finished [`GeneratedContent`] or a terminal error naming
//! every attempted provider.

mod parser;
mod prompt;
pub mod providers;
mod registry;
mod scoring;
mod selection;
pub mod testing;

pub use parser::{parse_html_document, parse_plain_text, parse_response, parse_structured, ParsedContent};
pub use prompt::{build_prompt, has_instruction_block, INSTRUCTION_MARKER};
pub use providers::{CompletionParams, CompletionResponse, ProviderKind, TextProvider};
pub use registry::{ProviderRegistry, ProviderStats};
pub use scoring::{engagement_score, readability_score, seo_score};
pub use selection::{complexity_score, fallback_provider, select_provider, Selection};

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::error::{GenerationError, ProviderAttempt, ProviderError};
use crate::models::{GeneratedContent, GenerationMetadata, GenerationRequest};

/// Selection reason recorded when a fallback provider produced the
/// accepted response.
pub const REASON_FALLBACK: &str = "fallback_after_error";

/// Interface the orchestrator generates through.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedContent, GenerationError>;

    /// Names of the configured backends, for health reporting.
    fn configured_providers(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Engine options.
#[derive(Debug, Clone)]
pub struct GenerationEngineConfig {
    /// Complexity score at which auto-selection escalates to the most
    /// capable provider.
    pub complexity_threshold: u8,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationEngineConfig {
    fn default() -> Self {
        Self {
            complexity_threshold: 60,
            max_tokens: 2048,
            temperature: 0.7,
        }
    }
}

/// Production generation engine over an injected provider registry.
pub struct GenerationEngine {
    registry: Arc<ProviderRegistry>,
    config: GenerationEngineConfig,
}

impl GenerationEngine {
    pub fn new(registry: Arc<ProviderRegistry>, config: GenerationEngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Run one provider attempt and convert the completion into content.
    async fn attempt(
        &self,
        provider: &Arc<dyn TextProvider>,
        request: &GenerationRequest,
        prompt: &str,
        selection_reason: &str,
        original_error: Option<String>,
    ) -> Result<GeneratedContent, ProviderError> {
        let params = CompletionParams {
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let start = Instant::now();
        let result = provider.complete(prompt, &params).await;
        let elapsed = start.elapsed();

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                self.registry
                    .record_attempt(provider.kind(), false, 0.0, elapsed)
                    .await;
                return Err(e);
            }
        };

        let token_count = response.token_count(prompt);
        let cost_usd = f64::from(token_count) / 1000.0 * provider.cost_per_1k_tokens();
        self.registry
            .record_attempt(provider.kind(), true, cost_usd, elapsed)
            .await;

        let html_expected = prompt.to_lowercase().contains("html");
        let parsed = parse_response(&response.text, html_expected).ok_or_else(|| {
            ProviderError::Parse("could not recover title and body from response".to_string())
        })?;

        let word_count = parsed.body.split_whitespace().count() as u32;
        Ok(GeneratedContent {
            metadata: GenerationMetadata {
                provider: provider.kind().as_str().to_string(),
                model: provider.model().to_string(),
                cost_usd,
                generated_at: Utc::now(),
                word_count,
                seo_score: seo_score(&parsed.title, &parsed.body, &request.keywords),
                readability_score: readability_score(&parsed.body),
                engagement_score: engagement_score(&parsed.body),
                token_count,
                selection_reason: selection_reason.to_string(),
                response_time_ms: elapsed.as_millis() as u64,
                original_error,
            },
            title: parsed.title,
            body: parsed.body,
            excerpt: parsed.excerpt,
            content_type: request.content_type,
            status: "draft".to_string(),
        })
    }
}

#[async_trait]
impl ContentGenerator for GenerationEngine {
    fn configured_providers(&self) -> Vec<String> {
        self.registry
            .configured_kinds()
            .iter()
            .map(|k| k.as_str().to_string())
            .collect()
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedContent, GenerationError> {
        let prompt = build_prompt(request);
        let selection = select_provider(request, &self.registry, self.config.complexity_threshold)?;
        let primary = selection.provider;

        info!(
            "Generating {} via {} ({})",
            request.content_type.as_str(),
            primary.kind(),
            selection.reason
        );

        let primary_error = match self
            .attempt(&primary, request, &prompt, selection.reason, None)
            .await
        {
            Ok(content) => return Ok(content),
            Err(e) => e,
        };

        let mut attempts = vec![ProviderAttempt {
            provider: primary.kind().as_str().to_string(),
            message: primary_error.to_string(),
        }];

        if primary_error.is_retryable() {
            if let Some(alternative) = fallback_provider(&self.registry, primary.kind()) {
                warn!(
                    "Provider {} failed ({}), retrying with {}",
                    primary.kind(),
                    primary_error,
                    alternative.kind()
                );
                match self
                    .attempt(
                        &alternative,
                        request,
                        &prompt,
                        REASON_FALLBACK,
                        Some(primary_error.to_string()),
                    )
                    .await
                {
                    Ok(content) => return Ok(content),
                    Err(e) => attempts.push(ProviderAttempt {
                        provider: alternative.kind().as_str().to_string(),
                        message: e.to_string(),
                    }),
                }
            }
        }

        Err(GenerationError::AllProvidersFailed { attempts })
    }
}
