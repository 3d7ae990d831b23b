//! Test doubles for the generation engine.
//!
//! Used by this crate's unit tests and by downstream integration tests to
//! exercise selection and retry policy without network access.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::providers::{CompletionParams, CompletionResponse, ProviderKind, TextProvider};
use crate::error::ProviderError;

/// One scripted completion outcome.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Succeed(String),
    FailApi(u16, String),
    FailTimeout,
    FailConnection(String),
}

impl MockOutcome {
    fn into_result(self) -> Result<CompletionResponse, ProviderError> {
        match self {
            Self::Succeed(text) => Ok(CompletionResponse {
                text,
                tokens_used: Some(100),
            }),
            Self::FailApi(status, message) => Err(ProviderError::Api { status, message }),
            Self::FailTimeout => Err(ProviderError::Timeout(30)),
            Self::FailConnection(message) => Err(ProviderError::Connection(message)),
        }
    }
}

/// Scripted provider: plays back a queue of outcomes, then repeats the
/// final configured default.
pub struct MockProvider {
    kind: ProviderKind,
    model: String,
    cost_per_1k: f64,
    capability: u8,
    script: Mutex<VecDeque<MockOutcome>>,
    default: MockOutcome,
    calls: AtomicU32,
}

impl MockProvider {
    pub fn new(kind: ProviderKind, default: MockOutcome) -> Self {
        Self {
            kind,
            model: format!("mock-{}", kind.as_str()),
            cost_per_1k: match kind {
                ProviderKind::OpenAi => 0.0006,
                ProviderKind::Anthropic => 0.009,
                ProviderKind::Ollama => 0.0,
            },
            capability: match kind {
                ProviderKind::Anthropic => 3,
                ProviderKind::OpenAi => 2,
                ProviderKind::Ollama => 1,
            },
            script: Mutex::new(VecDeque::new()),
            default,
            calls: AtomicU32::new(0),
        }
    }

    /// Provider that always returns `text`.
    pub fn succeeding(kind: ProviderKind, text: &str) -> Self {
        Self::new(kind, MockOutcome::Succeed(text.to_string()))
    }

    /// Provider that always fails with the given HTTP status.
    pub fn failing_api(kind: ProviderKind, status: u16, message: &str) -> Self {
        Self::new(kind, MockOutcome::FailApi(status, message.to_string()))
    }

    /// Queue outcomes to play back before the default kicks in.
    pub fn with_script(self, outcomes: Vec<MockOutcome>) -> Self {
        *self.script.lock().unwrap() = outcomes.into();
        self
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TextProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn cost_per_1k_tokens(&self) -> f64 {
        self.cost_per_1k
    }

    fn capability(&self) -> u8 {
        self.capability
    }

    async fn complete(
        &self,
        _prompt: &str,
        _params: &CompletionParams,
    ) -> Result<CompletionResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default.clone());
        outcome.into_result()
    }
}
