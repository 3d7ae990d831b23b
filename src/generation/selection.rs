//! Provider selection policy.
//!
//! A named, configured provider is always honored. Otherwise the engine
//! prefers the cheapest configured provider, escalating to the most
//! capable one when a composite complexity score crosses the threshold.

use std::sync::Arc;

use tracing::debug;

use super::providers::{ProviderKind, TextProvider};
use super::registry::ProviderRegistry;
use crate::error::GenerationError;
use crate::models::{ContentType, GenerationRequest, LengthTarget, ProviderChoice, VocabularyLevel};

/// Context longer than this suggests the caller supplied substantial
/// source material, which favors a more capable model.
const LONG_CONTEXT_CHARS: usize = 1500;

/// A provider picked for a request, with the reason recorded in metadata.
pub struct Selection {
    pub provider: Arc<dyn TextProvider>,
    pub reason: &'static str,
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("provider", &self.provider.kind())
            .field("model", &self.provider.model())
            .field("reason", &self.reason)
            .finish()
    }
}

/// Composite request complexity in [0, 100].
pub fn complexity_score(request: &GenerationRequest) -> u8 {
    let mut score: u32 = match request.content_type {
        ContentType::BlogPost => 30,
        ContentType::NewsletterSection => 20,
        ContentType::ProductDescription => 15,
        ContentType::SocialPost => 10,
    };

    score += match request.brand_voice.vocabulary {
        VocabularyLevel::Expert => 25,
        VocabularyLevel::Technical => 20,
        VocabularyLevel::Professional => 10,
        VocabularyLevel::Simple => 0,
    };

    score += match request.brand_voice.length {
        LengthTarget::Long => 20,
        LengthTarget::Medium => 10,
        LengthTarget::Short => 0,
    };

    if request.context.len() > LONG_CONTEXT_CHARS {
        score += 25;
    }

    score.min(100) as u8
}

/// Pick a provider for the request.
///
/// An unconfigured preference falls back to auto-selection rather than
/// failing; an empty registry is the only hard error here.
pub fn select_provider(
    request: &GenerationRequest,
    registry: &ProviderRegistry,
    complexity_threshold: u8,
) -> Result<Selection, GenerationError> {
    if registry.is_empty() {
        return Err(GenerationError::NoProvidersConfigured);
    }

    if let Some(kind) = preferred_kind(request.preferred_provider) {
        if let Some(provider) = registry.get(kind) {
            return Ok(Selection {
                provider,
                reason: "preferred",
            });
        }
        debug!(
            "Preferred provider {} not configured, using auto-selection",
            kind
        );
    }

    let complexity = complexity_score(request);
    if complexity >= complexity_threshold {
        // Escalate to the most capable configured provider.
        if let Some(provider) = registry
            .configured()
            .into_iter()
            .max_by_key(|p| p.capability())
        {
            debug!(
                "Complexity {} >= {}, escalating to {}",
                complexity,
                complexity_threshold,
                provider.kind()
            );
            return Ok(Selection {
                provider,
                reason: "auto_complexity_escalation",
            });
        }
    }

    // Cheapest configured provider wins for ordinary requests. Ties go to
    // the earlier entry in the fixed priority order.
    let cheapest = registry.configured().into_iter().min_by(|a, b| {
        a.cost_per_1k_tokens()
            .partial_cmp(&b.cost_per_1k_tokens())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| priority_rank(a.kind()).cmp(&priority_rank(b.kind())))
    });

    match cheapest {
        Some(provider) => Ok(Selection {
            provider,
            reason: "auto_cheapest",
        }),
        None => Err(GenerationError::NoProvidersConfigured),
    }
}

/// Pick an alternative provider for one fallback attempt after `failed`
/// errored, following the fixed priority order.
pub fn fallback_provider(
    registry: &ProviderRegistry,
    failed: ProviderKind,
) -> Option<Arc<dyn TextProvider>> {
    ProviderKind::PRIORITY_ORDER
        .iter()
        .filter(|k| **k != failed)
        .find_map(|k| registry.get(*k))
}

fn preferred_kind(choice: ProviderChoice) -> Option<ProviderKind> {
    match choice {
        ProviderChoice::Auto => None,
        ProviderChoice::OpenAi => Some(ProviderKind::OpenAi),
        ProviderChoice::Anthropic => Some(ProviderKind::Anthropic),
        ProviderChoice::Ollama => Some(ProviderKind::Ollama),
    }
}

fn priority_rank(kind: ProviderKind) -> usize {
    ProviderKind::PRIORITY_ORDER
        .iter()
        .position(|k| *k == kind)
        .unwrap_or(usize::MAX)
}
