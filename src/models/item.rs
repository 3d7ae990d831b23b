//! Per-URL workflow item state machine.
//!
//! Transitions are strictly forward except regeneration, which re-enters
//! `Generating` from any state that already holds extracted content:
//!
//! `pending -> crawling -> {crawled | failed} -> generating ->
//! {generated | failed} -> approved`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::{ExtractedContent, GeneratedContent};

/// Workflow state of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Crawling,
    Crawled,
    Generating,
    Generated,
    Approved,
    Failed,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Crawling => "crawling",
            Self::Crawled => "crawled",
            Self::Generating => "generating",
            Self::Generated => "generated",
            Self::Approved => "approved",
            Self::Failed => "failed",
        }
    }

    /// Terminal for the crawl phase (a later generation phase may still run).
    pub fn is_crawl_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Crawling)
    }
}

/// One URL's journey through crawl, generation, and approval.
///
/// Items belong to exactly one batch job and are mutated in place by
/// orchestrator operations. Invariants: `Generated`/`Approved` implies
/// generated content is present, `Failed` implies an error message is
/// present, and any post-crawl state implies extracted content is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentWorkflowItem {
    pub id: String,
    pub source_url: String,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted: Option<ExtractedContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<GeneratedContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentWorkflowItem {
    pub fn new(source_url: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_url,
            status: ItemStatus::Pending,
            extracted: None,
            generated: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mark_crawling(&mut self) {
        self.status = ItemStatus::Crawling;
        self.touch();
    }

    /// Record a successful extraction and move to `Crawled`.
    pub fn set_extracted(&mut self, content: ExtractedContent) {
        self.extracted = Some(content);
        self.error_message = None;
        self.status = ItemStatus::Crawled;
        self.touch();
    }

    pub fn mark_generating(&mut self) {
        self.status = ItemStatus::Generating;
        self.touch();
    }

    /// Record generated content and move to `Generated`. Replaces any
    /// previous generated content (regeneration).
    pub fn set_generated(&mut self, content: GeneratedContent) {
        self.generated = Some(content);
        self.error_message = None;
        self.status = ItemStatus::Generated;
        self.touch();
    }

    pub fn approve(&mut self) {
        self.status = ItemStatus::Approved;
        self.touch();
    }

    /// Record a failure with its message and move to `Failed`.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
        self.status = ItemStatus::Failed;
        self.touch();
    }

    /// Whether this item can (re-)enter the generation phase.
    pub fn can_generate(&self) -> bool {
        self.extracted.is_some()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
