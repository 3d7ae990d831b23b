//! Batch job model and progress accounting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::{BrandVoice, ContentType, ProviderChoice};
use super::item::{ContentWorkflowItem, ItemStatus};

/// Lifecycle status of a batch job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Aggregate progress counters, always derived from item statuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProgress {
    pub total: u32,
    pub crawled: u32,
    pub generated: u32,
    pub failed: u32,
}

/// Settings applied to every item in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSettings {
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub brand_voice: BrandVoice,
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub preferred_provider: ProviderChoice,
    #[serde(default)]
    pub include_images: bool,
    /// Override the detected source language, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

fn default_audience() -> String {
    "general readers".to_string()
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            content_type: ContentType::default(),
            brand_voice: BrandVoice::default(),
            audience: default_audience(),
            keywords: Vec::new(),
            preferred_provider: ProviderChoice::default(),
            include_images: false,
            language: None,
        }
    }
}

/// A batch of source URLs moving through crawl, generation, and approval.
///
/// Owned exclusively by the orchestrator; all mutation goes through
/// orchestrator methods. Progress counters always equal the aggregate
/// counts of item statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchJob {
    pub id: String,
    pub project_id: String,
    pub status: JobStatus,
    pub progress: JobProgress,
    pub settings: JobSettings,
    pub items: Vec<ContentWorkflowItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BatchJob {
    /// Create a job with one pending item per URL.
    pub fn new(project_id: String, urls: Vec<String>, settings: JobSettings) -> Self {
        let now = Utc::now();
        let items: Vec<ContentWorkflowItem> =
            urls.into_iter().map(ContentWorkflowItem::new).collect();
        let total = items.len() as u32;
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id,
            status: JobStatus::Pending,
            progress: JobProgress {
                total,
                ..JobProgress::default()
            },
            settings,
            items,
            created_at: now,
            updated_at: now,
        }
    }

    /// Recompute progress counters from item statuses.
    pub fn recompute_progress(&mut self) {
        let mut progress = JobProgress {
            total: self.items.len() as u32,
            ..JobProgress::default()
        };
        for item in &self.items {
            match item.status {
                ItemStatus::Crawled => progress.crawled += 1,
                ItemStatus::Generating | ItemStatus::Generated | ItemStatus::Approved => {
                    // These items necessarily crawled successfully first.
                    progress.crawled += 1;
                    if matches!(item.status, ItemStatus::Generated | ItemStatus::Approved) {
                        progress.generated += 1;
                    }
                }
                ItemStatus::Failed => progress.failed += 1,
                ItemStatus::Pending | ItemStatus::Crawling => {}
            }
        }
        self.progress = progress;
        self.updated_at = Utc::now();
    }

    pub fn item(&self, item_id: &str) -> Option<&ContentWorkflowItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut ContentWorkflowItem> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }

    /// Whether every item is terminal for the crawl phase.
    pub fn crawl_finished(&self) -> bool {
        self.items.iter().all(|i| i.status.is_crawl_terminal())
    }

    /// Lightweight status snapshot for polling callers.
    pub fn summary(&self) -> BatchJobSummary {
        BatchJobSummary {
            id: self.id.clone(),
            project_id: self.project_id.clone(),
            status: self.status,
            progress: self.progress,
            item_statuses: self
                .items
                .iter()
                .map(|i| (i.id.clone(), i.status))
                .collect(),
            updated_at: self.updated_at,
        }
    }
}

/// Point-in-time summary of a job, stable across repeated polls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchJobSummary {
    pub id: String,
    pub project_id: String,
    pub status: JobStatus,
    pub progress: JobProgress,
    pub item_statuses: Vec<(String, ItemStatus)>,
    pub updated_at: DateTime<Utc>,
}
