//! AI text-generation provider clients.
//!
//! Each provider is an opaque completion capability behind the
//! [`TextProvider`] trait. The engine owns selection and retry; clients
//! only translate one prompt into one completion over their wire format.

mod anthropic;
mod ollama;
mod openai;

pub use anthropic::AnthropicProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Identity of a configured provider backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Ollama,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Ollama => "ollama",
        }
    }

    /// Fixed fallback priority order used when auto-selection finds no
    /// better candidate.
    pub const PRIORITY_ORDER: [ProviderKind; 3] =
        [ProviderKind::OpenAi, ProviderKind::Anthropic, ProviderKind::Ollama];
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sampling parameters passed to a completion call.
#[derive(Debug, Clone)]
pub struct CompletionParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.7,
        }
    }
}

/// Raw completion returned by a provider.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    /// Total tokens as reported by the provider, when available.
    pub tokens_used: Option<u32>,
}

impl CompletionResponse {
    /// Token count, estimated from word count when the provider did not
    /// report usage (~0.75 words per token for English-like text).
    pub fn token_count(&self, prompt: &str) -> u32 {
        self.tokens_used.unwrap_or_else(|| {
            let words = prompt.split_whitespace().count() + self.text.split_whitespace().count();
            (words as f64 / 0.75).round() as u32
        })
    }
}

/// An interchangeable AI text-generation backend.
#[async_trait]
pub trait TextProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn model(&self) -> &str;

    /// Blended cost estimate in USD per 1k tokens.
    fn cost_per_1k_tokens(&self) -> f64;

    /// Relative capability rank; auto-selection escalates complex
    /// requests to the highest-ranked configured provider.
    fn capability(&self) -> u8;

    async fn complete(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> Result<CompletionResponse, ProviderError>;
}

/// Map an HTTP error status from a provider API to a `ProviderError`.
pub(crate) fn status_to_error(status: u16, body: String) -> ProviderError {
    if status == 429 {
        ProviderError::RateLimited(status)
    } else {
        ProviderError::Api {
            status,
            message: body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order_is_stable() {
        assert_eq!(
            ProviderKind::PRIORITY_ORDER,
            [ProviderKind::OpenAi, ProviderKind::Anthropic, ProviderKind::Ollama]
        );
    }

    #[test]
    fn test_token_estimate_from_words() {
        let resp = CompletionResponse {
            text: "six words of generated output text".to_string(),
            tokens_used: None,
        };
        // 3 prompt words + 6 completion words at 0.75 words/token.
        assert_eq!(resp.token_count("three word prompt"), 12);

        let reported = CompletionResponse {
            text: "anything".to_string(),
            tokens_used: Some(500),
        };
        assert_eq!(reported.token_count("ignored"), 500);
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_to_error(429, "slow".into()),
            ProviderError::RateLimited(429)
        ));
        assert!(matches!(
            status_to_error(500, "oops".into()),
            ProviderError::Api { status: 500, .. }
        ));
    }
}
