//! Error taxonomy shared across the orchestrator and engines.

use thiserror::Error;

/// Errors surfaced by orchestrator operations.
///
/// Validation errors are returned immediately and never retried.
/// Extraction failures never appear here: the extraction engine degrades
/// to a placeholder result instead of erroring.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("batch job not found: {0}")]
    JobNotFound(String),

    #[error("workflow item not found: {0}")]
    ItemNotFound(String),

    #[error("job {0} is already processing")]
    JobAlreadyProcessing(String),

    #[error("no items ready for generation in job {0}")]
    NoItemsReady(String),

    #[error("item {0} is not ready for approval (status: {1})")]
    NotReadyForApproval(String, String),

    #[error("item {0} has no extracted content to regenerate from")]
    MissingExtractedContent(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// A single failed provider attempt, kept for composite error reporting.
#[derive(Debug, Clone)]
pub struct ProviderAttempt {
    pub provider: String,
    pub message: String,
}

/// Terminal errors from the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no AI providers are configured")]
    NoProvidersConfigured,

    #[error("all providers failed: {}", format_attempts(.attempts))]
    AllProvidersFailed { attempts: Vec<ProviderAttempt> },

    #[error("provider returned an empty response")]
    EmptyResponse,
}

fn format_attempts(attempts: &[ProviderAttempt]) -> String {
    attempts
        .iter()
        .map(|a| format!("{}: {}", a.provider, a.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error from a single provider attempt, classified for retry policy.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("rate limited (HTTP {0})")]
    RateLimited(u16),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse provider response: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Whether a cross-provider fallback attempt is worthwhile.
    ///
    /// Timeouts, connection failures, rate limits, and server-side errors
    /// are transient from the caller's perspective; parse failures and
    /// client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Connection(_) | Self::RateLimited(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Parse(_) => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(0)
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::Connection(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ProviderError::Timeout(30).is_retryable());
        assert!(ProviderError::Connection("refused".into()).is_retryable());
        assert!(ProviderError::RateLimited(429).is_retryable());
        assert!(ProviderError::Api {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());
        assert!(ProviderError::Api {
            status: 429,
            message: "slow down".into()
        }
        .is_retryable());
        assert!(!ProviderError::Api {
            status: 401,
            message: "bad key".into()
        }
        .is_retryable());
        assert!(!ProviderError::Parse("garbage".into()).is_retryable());
    }

    #[test]
    fn test_composite_error_names_all_attempts() {
        let err = GenerationError::AllProvidersFailed {
            attempts: vec![
                ProviderAttempt {
                    provider: "openai".into(),
                    message: "HTTP 503".into(),
                },
                ProviderAttempt {
                    provider: "anthropic".into(),
                    message: "timeout".into(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("openai: HTTP 503"));
        assert!(msg.contains("anthropic: timeout"));
    }
}
