//! Batch content workflow orchestrator.
//!
//! Drives N per-URL state machines through crawl, generation, and
//! approval. Concurrency is deliberately capped and staggered: items run
//! in fixed-size groups with an inter-group delay, because the downstream
//! collaborators are third-party HTTP endpoints with informal rate
//! limits. One item's failure never blocks the rest; partial failure is
//! the expected steady state for a batch of heterogeneous URLs.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::WorkflowError;
use crate::extraction::{ArticleExtractor, PLACEHOLDER_QUALITY};
use crate::generation::ContentGenerator;
use crate::models::{
    BatchJob, BatchJobSummary, ContentWorkflowItem, ExtractedContent, GenerationRequest,
    ItemStatus, JobSettings, JobStatus,
};
use crate::repository::JobRepository;

/// Maximum characters of extracted body forwarded as generation context.
const MAX_CONTEXT_CHARS: usize = 12000;

/// Orchestrator tuning.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Items crawled fully in parallel before the next group starts.
    pub crawl_group_size: usize,
    pub crawl_group_delay: Duration,
    /// Generation groups are smaller: provider rate limits are tighter
    /// than target-site limits.
    pub generation_group_size: usize,
    pub generation_group_delay: Duration,
    /// Extraction quality at or below this marks the item failed.
    pub min_quality: u8,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            crawl_group_size: 3,
            crawl_group_delay: Duration::from_secs(2),
            generation_group_size: 2,
            generation_group_delay: Duration::from_secs(3),
            min_quality: PLACEHOLDER_QUALITY,
        }
    }
}

/// Health snapshot for the inbound API layer.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthReport {
    pub providers: Vec<String>,
    pub browser_compiled: bool,
    pub jobs_stored: usize,
}

/// The batch workflow orchestrator.
///
/// Cloneable: clones share the repository, engines, and the active-job
/// guard, so a clone can be moved onto a spawned task while callers keep
/// polling through the original.
#[derive(Clone)]
pub struct BatchWorkflow {
    repo: Arc<dyn JobRepository>,
    extractor: Arc<dyn ArticleExtractor>,
    generator: Arc<dyn ContentGenerator>,
    config: WorkflowConfig,
    /// Jobs currently running a crawl or generation pass. Concurrent
    /// re-entry on the same job is rejected rather than interleaved.
    active_jobs: Arc<Mutex<HashSet<String>>>,
}

/// Releases the active-job slot when a pass finishes, however it exits.
struct ActiveJobGuard {
    active_jobs: Arc<Mutex<HashSet<String>>>,
    job_id: String,
}

impl Drop for ActiveJobGuard {
    fn drop(&mut self) {
        if let Ok(mut jobs) = self.active_jobs.lock() {
            jobs.remove(&self.job_id);
        }
    }
}

impl BatchWorkflow {
    pub fn new(
        repo: Arc<dyn JobRepository>,
        extractor: Arc<dyn ArticleExtractor>,
        generator: Arc<dyn ContentGenerator>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            repo,
            extractor,
            generator,
            config,
            active_jobs: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Create a batch job with one pending item per URL.
    ///
    /// Blank URLs are trimmed away; an effectively empty list is a
    /// validation error.
    pub async fn create_batch_job(
        &self,
        project_id: &str,
        urls: Vec<String>,
        settings: JobSettings,
    ) -> Result<BatchJob, WorkflowError> {
        let urls: Vec<String> = urls
            .into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
        if urls.is_empty() {
            return Err(WorkflowError::Validation(
                "URL list must contain at least one non-blank URL".to_string(),
            ));
        }
        if project_id.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "project id must not be blank".to_string(),
            ));
        }

        let job = BatchJob::new(project_id.to_string(), urls, settings);
        info!("Created batch job {} with {} item(s)", job.id, job.items.len());
        self.repo.put(job.clone()).await;
        Ok(job)
    }

    /// Crawl every pending item, in groups, until all items are terminal
    /// for the crawl phase. Individual failures never abort the batch.
    pub async fn start_crawling(&self, job_id: &str) -> Result<(), WorkflowError> {
        let _guard = self.try_begin(job_id)?;

        let mut job = self.load(job_id).await?;
        job.status = JobStatus::Processing;
        job.recompute_progress();
        self.repo.put(job.clone()).await;

        let pending_ids: Vec<String> = job
            .items
            .iter()
            .filter(|i| i.status == ItemStatus::Pending)
            .map(|i| i.id.clone())
            .collect();

        info!(
            "Crawling job {}: {} item(s) in groups of {}",
            job_id,
            pending_ids.len(),
            self.config.crawl_group_size
        );

        for (group_idx, group) in pending_ids.chunks(self.config.crawl_group_size).enumerate() {
            if group_idx > 0 {
                tokio::time::sleep(self.config.crawl_group_delay).await;
            }

            // Mark the group as crawling so pollers see live progress.
            let mut job = self.load(job_id).await?;
            let mut urls = Vec::with_capacity(group.len());
            for item_id in group {
                if let Some(item) = job.item_mut(item_id) {
                    item.mark_crawling();
                    urls.push((item_id.clone(), item.source_url.clone()));
                }
            }
            self.repo.put(job).await;

            let extractions = join_all(
                urls.iter()
                    .map(|(_, url)| self.extractor.extract(url)),
            )
            .await;

            let mut job = self.load(job_id).await?;
            for ((item_id, url), content) in urls.iter().zip(extractions) {
                let Some(item) = job.item_mut(item_id) else {
                    continue;
                };
                if content.quality_score <= self.config.min_quality {
                    warn!(
                        "Extraction for {} degraded (quality {}), marking failed",
                        url, content.quality_score
                    );
                    item.fail(format!(
                        "extraction quality {} at or below minimum {}: {}",
                        content.quality_score,
                        self.config.min_quality,
                        content.excerpt
                    ));
                } else {
                    item.set_extracted(content);
                }
            }
            job.recompute_progress();
            self.repo.put(job).await;
        }

        let mut job = self.load(job_id).await?;
        if job.crawl_finished() {
            job.status = JobStatus::Completed;
        }
        job.recompute_progress();
        info!(
            "Crawl pass for job {} done: {}/{} crawled, {} failed",
            job_id, job.progress.crawled, job.progress.total, job.progress.failed
        );
        self.repo.put(job).await;
        Ok(())
    }

    /// Explicit async boundary for the kick-off-and-poll contract: spawn
    /// the crawl pass and return its handle immediately.
    pub fn spawn_crawling(&self, job_id: &str) -> JoinHandle<Result<(), WorkflowError>> {
        let workflow = self.clone();
        let job_id = job_id.to_string();
        tokio::spawn(async move { workflow.start_crawling(&job_id).await })
    }

    /// Generate content for every crawled item using the job's settings.
    pub async fn generate_content(&self, job_id: &str) -> Result<(), WorkflowError> {
        self.generate_with(job_id, None).await
    }

    /// Generate content with per-call settings overriding the job's.
    pub async fn generate_batch_content_with_settings(
        &self,
        job_id: &str,
        settings: JobSettings,
    ) -> Result<(), WorkflowError> {
        self.generate_with(job_id, Some(settings)).await
    }

    /// Spawn a generation pass and return its handle immediately.
    pub fn spawn_generation(&self, job_id: &str) -> JoinHandle<Result<(), WorkflowError>> {
        let workflow = self.clone();
        let job_id = job_id.to_string();
        tokio::spawn(async move { workflow.generate_content(&job_id).await })
    }

    async fn generate_with(
        &self,
        job_id: &str,
        settings_override: Option<JobSettings>,
    ) -> Result<(), WorkflowError> {
        let _guard = self.try_begin(job_id)?;

        let mut job = self.load(job_id).await?;
        let settings = settings_override.unwrap_or_else(|| job.settings.clone());

        let ready_ids: Vec<String> = job
            .items
            .iter()
            .filter(|i| i.status == ItemStatus::Crawled && i.extracted.is_some())
            .map(|i| i.id.clone())
            .collect();
        if ready_ids.is_empty() {
            return Err(WorkflowError::NoItemsReady(job_id.to_string()));
        }

        job.status = JobStatus::Processing;
        self.repo.put(job).await;

        info!(
            "Generating content for job {}: {} item(s) in groups of {}",
            job_id,
            ready_ids.len(),
            self.config.generation_group_size
        );

        for (group_idx, group) in ready_ids
            .chunks(self.config.generation_group_size)
            .enumerate()
        {
            if group_idx > 0 {
                tokio::time::sleep(self.config.generation_group_delay).await;
            }

            let mut job = self.load(job_id).await?;
            let mut requests = Vec::with_capacity(group.len());
            for item_id in group {
                if let Some(item) = job.item_mut(item_id) {
                    let Some(ref extracted) = item.extracted else {
                        continue;
                    };
                    requests.push((item_id.clone(), build_request(extracted, &settings)));
                    item.mark_generating();
                }
            }
            self.repo.put(job).await;

            let results = join_all(
                requests
                    .iter()
                    .map(|(_, request)| self.generator.generate(request)),
            )
            .await;

            let mut job = self.load(job_id).await?;
            for ((item_id, _), result) in requests.iter().zip(results) {
                let Some(item) = job.item_mut(item_id) else {
                    continue;
                };
                match result {
                    Ok(content) => item.set_generated(content),
                    Err(e) => {
                        warn!("Generation failed for item {}: {}", item_id, e);
                        item.fail(e.to_string());
                    }
                }
            }
            job.recompute_progress();
            self.repo.put(job).await;
        }

        let mut job = self.load(job_id).await?;
        job.status = JobStatus::Completed;
        job.recompute_progress();
        info!(
            "Generation pass for job {} done: {} generated, {} failed",
            job_id, job.progress.generated, job.progress.failed
        );
        self.repo.put(job).await;
        Ok(())
    }

    /// Approve a generated item. Only `Generated` items qualify.
    pub async fn approve_content_item(
        &self,
        job_id: &str,
        item_id: &str,
    ) -> Result<ContentWorkflowItem, WorkflowError> {
        let mut job = self.load(job_id).await?;
        let item = job
            .item_mut(item_id)
            .ok_or_else(|| WorkflowError::ItemNotFound(item_id.to_string()))?;

        if item.status != ItemStatus::Generated {
            return Err(WorkflowError::NotReadyForApproval(
                item_id.to_string(),
                item.status.as_str().to_string(),
            ));
        }

        item.approve();
        let approved = item.clone();
        job.recompute_progress();
        self.repo.put(job).await;
        Ok(approved)
    }

    /// Rerun generation for a single item, replacing any prior generated
    /// content. Requires extracted content to exist.
    pub async fn regenerate_content(
        &self,
        job_id: &str,
        item_id: &str,
    ) -> Result<ContentWorkflowItem, WorkflowError> {
        let mut job = self.load(job_id).await?;
        let settings = job.settings.clone();
        let item = job
            .item_mut(item_id)
            .ok_or_else(|| WorkflowError::ItemNotFound(item_id.to_string()))?;

        let Some(ref extracted) = item.extracted else {
            return Err(WorkflowError::MissingExtractedContent(item_id.to_string()));
        };
        let request = build_request(extracted, &settings);
        item.mark_generating();
        self.repo.put(job).await;

        let result = self.generator.generate(&request).await;

        let mut job = self.load(job_id).await?;
        let item = job
            .item_mut(item_id)
            .ok_or_else(|| WorkflowError::ItemNotFound(item_id.to_string()))?;
        match result {
            Ok(content) => item.set_generated(content),
            Err(e) => {
                item.fail(e.to_string());
                job.recompute_progress();
                self.repo.put(job).await;
                return Err(e.into());
            }
        }
        let regenerated = item.clone();
        job.recompute_progress();
        self.repo.put(job).await;
        Ok(regenerated)
    }

    /// All items the human has approved for publishing.
    pub async fn get_approved_content(
        &self,
        job_id: &str,
    ) -> Result<Vec<ContentWorkflowItem>, WorkflowError> {
        let job = self.load(job_id).await?;
        Ok(job
            .items
            .iter()
            .filter(|i| i.status == ItemStatus::Approved)
            .cloned()
            .collect())
    }

    /// Idempotent status snapshot for polling.
    pub async fn get_batch_job_status(
        &self,
        job_id: &str,
    ) -> Result<BatchJobSummary, WorkflowError> {
        Ok(self.load(job_id).await?.summary())
    }

    /// Full job record, items included.
    pub async fn get_batch_job(&self, job_id: &str) -> Result<BatchJob, WorkflowError> {
        self.load(job_id).await
    }

    pub async fn health_check(&self) -> HealthReport {
        HealthReport {
            providers: self.generator.configured_providers(),
            browser_compiled: cfg!(feature = "browser"),
            jobs_stored: self.repo.list().await.len(),
        }
    }

    fn try_begin(&self, job_id: &str) -> Result<ActiveJobGuard, WorkflowError> {
        let mut jobs = self
            .active_jobs
            .lock()
            .expect("active job set poisoned");
        if !jobs.insert(job_id.to_string()) {
            return Err(WorkflowError::JobAlreadyProcessing(job_id.to_string()));
        }
        Ok(ActiveJobGuard {
            active_jobs: self.active_jobs.clone(),
            job_id: job_id.to_string(),
        })
    }

    async fn load(&self, job_id: &str) -> Result<BatchJob, WorkflowError> {
        self.repo
            .get(job_id)
            .await
            .ok_or_else(|| WorkflowError::JobNotFound(job_id.to_string()))
    }
}

/// Build a generation request from an item's extracted content and the
/// batch settings.
fn build_request(extracted: &ExtractedContent, settings: &JobSettings) -> GenerationRequest {
    GenerationRequest {
        content_type: settings.content_type,
        topic: extracted.title.clone(),
        context: truncate_utf8(&extracted.body, MAX_CONTEXT_CHARS).to_string(),
        audience: settings.audience.clone(),
        keywords: settings.keywords.clone(),
        brand_voice: settings.brand_voice.clone(),
        language: settings
            .language
            .clone()
            .unwrap_or_else(|| extracted.metadata.language.clone()),
        include_images: settings.include_images,
        preferred_provider: settings.preferred_provider,
    }
}

/// Truncate at a valid UTF-8 boundary at or before `max_chars` bytes.
fn truncate_utf8(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExtractedMetadata, ExtractionStrategy};
    use chrono::Utc;

    fn extracted(language: &str) -> ExtractedContent {
        ExtractedContent {
            source_url: "https://example.com/a".to_string(),
            title: "Original headline".to_string(),
            body: "Article body. ".repeat(20),
            excerpt: "Article body.".to_string(),
            metadata: ExtractedMetadata {
                language: language.to_string(),
                domain: "example.com".to_string(),
                word_count: 40,
                ..Default::default()
            },
            quality_score: 55,
            strategy: ExtractionStrategy::Static,
            extracted_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_request_carries_settings_and_language() {
        let settings = JobSettings {
            audience: "founders".to_string(),
            keywords: vec!["saas".to_string()],
            ..Default::default()
        };
        let request = build_request(&extracted("de"), &settings);
        assert_eq!(request.topic, "Original headline");
        assert_eq!(request.audience, "founders");
        assert_eq!(request.language, "de");
        assert!(request.context.starts_with("Article body."));
    }

    #[test]
    fn test_build_request_language_override() {
        let settings = JobSettings {
            language: Some("en".to_string()),
            ..Default::default()
        };
        let request = build_request(&extracted("fr"), &settings);
        assert_eq!(request.language, "en");
    }

    #[test]
    fn test_truncate_utf8_respects_boundaries() {
        let text = "héllo wörld";
        let cut = truncate_utf8(text, 2);
        assert!(cut.len() <= 2);
        assert!(text.starts_with(cut));
        assert_eq!(truncate_utf8("short", 100), "short");
    }
}
