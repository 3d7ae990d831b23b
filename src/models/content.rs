//! Content artifacts: extraction results, generation requests and outputs.
//!
//! `ExtractedContent` and `GeneratedContent` are immutable once produced.
//! Re-crawling or regenerating an item replaces the artifact wholesale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of marketing content to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    BlogPost,
    SocialPost,
    ProductDescription,
    NewsletterSection,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlogPost => "blog_post",
            Self::SocialPost => "social_post",
            Self::ProductDescription => "product_description",
            Self::NewsletterSection => "newsletter_section",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "blog_post" => Some(Self::BlogPost),
            "social_post" => Some(Self::SocialPost),
            "product_description" => Some(Self::ProductDescription),
            "newsletter_section" => Some(Self::NewsletterSection),
            _ => None,
        }
    }
}

/// Vocabulary level requested for generated copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VocabularyLevel {
    Simple,
    #[default]
    Professional,
    Technical,
    Expert,
}

/// Target length for generated copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LengthTarget {
    Short,
    #[default]
    Medium,
    Long,
}

impl LengthTarget {
    /// Approximate word-count target used in prompt construction.
    pub fn word_target(&self) -> u32 {
        match self {
            Self::Short => 150,
            Self::Medium => 600,
            Self::Long => 1200,
        }
    }
}

/// Brand voice descriptor applied to every generated piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandVoice {
    /// Tone of voice (e.g. "friendly", "authoritative").
    #[serde(default = "default_tone")]
    pub tone: String,
    /// Writing style (e.g. "conversational", "journalistic").
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default)]
    pub vocabulary: VocabularyLevel,
    #[serde(default)]
    pub length: LengthTarget,
    /// Brand name to weave into the copy, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
}

fn default_tone() -> String {
    "friendly".to_string()
}

fn default_style() -> String {
    "conversational".to_string()
}

impl Default for BrandVoice {
    fn default() -> Self {
        Self {
            tone: default_tone(),
            style: default_style(),
            vocabulary: VocabularyLevel::default(),
            length: LengthTarget::default(),
            brand_name: None,
        }
    }
}

/// Provider preference carried on a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderChoice {
    /// Let the engine pick based on cost and complexity.
    #[default]
    Auto,
    OpenAi,
    Anthropic,
    Ollama,
}

impl ProviderChoice {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "openai" => Some(Self::OpenAi),
            "anthropic" | "claude" => Some(Self::Anthropic),
            "ollama" | "local" => Some(Self::Ollama),
            _ => None,
        }
    }
}

/// Which layer of the extraction fallback chain produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Headless-browser page load with in-page readability extraction.
    Rendered,
    /// Plain HTTP GET parsed offline.
    Static,
    /// Placeholder synthesized from the domain name after total failure.
    Fallback,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rendered => "rendered",
            Self::Static => "static",
            Self::Fallback => "fallback",
        }
    }
}

/// Structured metadata scraped alongside the article body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Publish date as reported by the page, unparsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    /// Content-area image URLs, filtered and capped.
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Detected ISO 639-1 language code.
    pub language: String,
    /// Host of the source URL.
    pub domain: String,
    pub word_count: u32,
}

/// Cleaned article content pulled from a source URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedContent {
    pub source_url: String,
    pub title: String,
    pub body: String,
    pub excerpt: String,
    pub metadata: ExtractedMetadata,
    /// Heuristic usefulness score in [0, 100].
    pub quality_score: u8,
    pub strategy: ExtractionStrategy,
    pub extracted_at: DateTime<Utc>,
}

impl ExtractedContent {
    /// Whether the body clears the minimum-length bar for a usable result.
    pub fn is_usable(&self, min_body_chars: usize) -> bool {
        self.body.trim().len() > min_body_chars
    }
}

/// Input to the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub content_type: ContentType,
    pub topic: String,
    /// Free-text context. May embed a fully-specified instruction block
    /// which overrides default prompt construction.
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub brand_voice: BrandVoice,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub include_images: bool,
    #[serde(default)]
    pub preferred_provider: ProviderChoice,
}

fn default_language() -> String {
    "en".to_string()
}

/// Metadata recorded with every generated piece.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Provider that produced the accepted response.
    pub provider: String,
    pub model: String,
    /// Monetary cost estimate in USD.
    pub cost_usd: f64,
    pub generated_at: DateTime<Utc>,
    pub word_count: u32,
    pub seo_score: u8,
    pub readability_score: u8,
    pub engagement_score: u8,
    pub token_count: u32,
    /// Why this provider produced the content ("preferred",
    /// "auto_cheapest", "fallback_after_error", ...).
    pub selection_reason: String,
    pub response_time_ms: u64,
    /// Error from the primary provider when a fallback occurred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_error: Option<String>,
}

/// A rewritten piece of marketing content, always created as a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub title: String,
    pub body: String,
    pub excerpt: String,
    pub content_type: ContentType,
    /// Always "draft"; publishing state is owned by the publishing target.
    pub status: String,
    pub metadata: GenerationMetadata,
}
