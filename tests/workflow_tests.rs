//! End-to-end workflow tests over mock collaborators.
//!
//! The extractor and providers are scripted so every scenario runs
//! without network access; the orchestrator and generation engine under
//! test are the real implementations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use contentforge::error::WorkflowError;
use contentforge::extraction::{fallback_content, ArticleExtractor};
use contentforge::generation::testing::MockProvider;
use contentforge::generation::{
    ContentGenerator, GenerationEngine, GenerationEngineConfig, ProviderKind, ProviderRegistry,
    TextProvider, REASON_FALLBACK,
};
use contentforge::models::{
    ExtractedContent, ExtractedMetadata, ExtractionStrategy, ItemStatus, JobSettings, JobStatus,
    ProviderChoice,
};
use contentforge::repository::InMemoryJobRepository;
use contentforge::workflow::{BatchWorkflow, WorkflowConfig};

const GOOD_RESPONSE: &str = r#"{"title": "Rewritten Headline", "body": "A fresh marketing take on the original article, rewritten for the target audience.", "excerpt": "A fresh take."}"#;

/// Scripted extractor: URLs containing "bad" degrade to the placeholder,
/// everything else extracts cleanly.
struct MockExtractor {
    delay: Duration,
}

impl MockExtractor {
    fn instant() -> Self {
        Self {
            delay: Duration::ZERO,
        }
    }

    fn slow(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ArticleExtractor for MockExtractor {
    async fn extract(&self, url: &str) -> ExtractedContent {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if url.contains("bad") {
            return fallback_content(url, Some("connection refused"));
        }
        ExtractedContent {
            source_url: url.to_string(),
            title: "Lorem Ipsum and the History of Filler Text".to_string(),
            body: "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(10),
            excerpt: "Lorem ipsum dolor sit amet.".to_string(),
            metadata: ExtractedMetadata {
                language: "en".to_string(),
                domain: "example.com".to_string(),
                word_count: 80,
                ..Default::default()
            },
            quality_score: 40,
            strategy: ExtractionStrategy::Static,
            extracted_at: Utc::now(),
        }
    }
}

fn fast_config() -> WorkflowConfig {
    WorkflowConfig {
        crawl_group_delay: Duration::ZERO,
        generation_group_delay: Duration::ZERO,
        ..Default::default()
    }
}

fn engine_with(providers: Vec<Arc<dyn TextProvider>>) -> Arc<GenerationEngine> {
    Arc::new(GenerationEngine::new(
        Arc::new(ProviderRegistry::new(providers)),
        GenerationEngineConfig::default(),
    ))
}

fn workflow_with(
    extractor: Arc<dyn ArticleExtractor>,
    generator: Arc<dyn ContentGenerator>,
) -> BatchWorkflow {
    BatchWorkflow::new(
        Arc::new(InMemoryJobRepository::new()),
        extractor,
        generator,
        fast_config(),
    )
}

fn healthy_workflow() -> BatchWorkflow {
    workflow_with(
        Arc::new(MockExtractor::instant()),
        engine_with(vec![Arc::new(MockProvider::succeeding(
            ProviderKind::OpenAi,
            GOOD_RESPONSE,
        ))]),
    )
}

#[tokio::test]
async fn test_create_batch_job_one_item_per_url() {
    let workflow = healthy_workflow();
    let job = workflow
        .create_batch_job(
            "project-1",
            vec![
                "https://example.com/a".to_string(),
                "  https://example.com/b  ".to_string(),
                "".to_string(),
                "   ".to_string(),
            ],
            JobSettings::default(),
        )
        .await
        .unwrap();

    assert_eq!(job.items.len(), 2);
    assert_eq!(job.progress.total, 2);
    assert!(job.items.iter().all(|i| i.status == ItemStatus::Pending));
    assert_eq!(job.items[1].source_url, "https://example.com/b");
}

#[tokio::test]
async fn test_create_batch_job_rejects_empty_lists() {
    let workflow = healthy_workflow();
    let err = workflow
        .create_batch_job("project-1", vec!["  ".to_string()], JobSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));
}

#[tokio::test]
async fn test_status_polling_is_idempotent() {
    let workflow = healthy_workflow();
    let job = workflow
        .create_batch_job(
            "project-1",
            vec!["https://example.com/a".to_string()],
            JobSettings::default(),
        )
        .await
        .unwrap();

    let first = workflow.get_batch_job_status(&job.id).await.unwrap();
    let second = workflow.get_batch_job_status(&job.id).await.unwrap();
    assert_eq!(first, second);
}

// Scenario A: three URLs crawl to completion; every item lands in
// {crawled, failed} and the counters add up.
#[tokio::test]
async fn test_crawl_batch_with_partial_failure() {
    let workflow = healthy_workflow();
    let job = workflow
        .create_batch_job(
            "project-1",
            vec![
                "https://example.com/a".to_string(),
                "https://bad.example.com/b".to_string(),
                "https://example.com/c".to_string(),
            ],
            JobSettings::default(),
        )
        .await
        .unwrap();

    workflow.start_crawling(&job.id).await.unwrap();

    let job = workflow.get_batch_job(&job.id).await.unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress.total, 3);
    assert!(job
        .items
        .iter()
        .all(|i| matches!(i.status, ItemStatus::Crawled | ItemStatus::Failed)));

    // The degraded URL failed with its extraction error recorded.
    let failed: Vec<_> = job
        .items
        .iter()
        .filter(|i| i.status == ItemStatus::Failed)
        .collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0]
        .error_message
        .as_ref()
        .unwrap()
        .contains("connection refused"));

    // Successful items carry extracted content.
    assert!(job
        .items
        .iter()
        .filter(|i| i.status == ItemStatus::Crawled)
        .all(|i| i.extracted.is_some()));
    assert_eq!(job.progress.crawled, 2);
    assert_eq!(job.progress.failed, 1);
}

// Scenario B: the primary provider 503s; the configured secondary takes
// over and the fallback is visible in the metadata.
#[tokio::test]
async fn test_generation_falls_back_after_primary_error() {
    let workflow = workflow_with(
        Arc::new(MockExtractor::instant()),
        engine_with(vec![
            Arc::new(MockProvider::failing_api(
                ProviderKind::OpenAi,
                503,
                "service unavailable",
            )),
            Arc::new(MockProvider::succeeding(
                ProviderKind::Anthropic,
                GOOD_RESPONSE,
            )),
        ]),
    );

    let job = workflow
        .create_batch_job(
            "project-1",
            vec!["https://example.com/a".to_string()],
            JobSettings::default(),
        )
        .await
        .unwrap();
    workflow.start_crawling(&job.id).await.unwrap();
    workflow.generate_content(&job.id).await.unwrap();

    let job = workflow.get_batch_job(&job.id).await.unwrap();
    let item = &job.items[0];
    assert_eq!(item.status, ItemStatus::Generated);
    let generated = item.generated.as_ref().unwrap();
    assert_eq!(generated.metadata.selection_reason, REASON_FALLBACK);
    assert_eq!(generated.metadata.provider, "anthropic");
    assert!(generated
        .metadata
        .original_error
        .as_ref()
        .unwrap()
        .contains("503"));
}

// Scenario C: approval of an item that is not yet generated is rejected
// with no state change.
#[tokio::test]
async fn test_approve_rejects_non_generated_item() {
    let workflow = healthy_workflow();
    let job = workflow
        .create_batch_job(
            "project-1",
            vec!["https://example.com/a".to_string()],
            JobSettings::default(),
        )
        .await
        .unwrap();
    workflow.start_crawling(&job.id).await.unwrap();

    let item_id = workflow.get_batch_job(&job.id).await.unwrap().items[0]
        .id
        .clone();
    let err = workflow
        .approve_content_item(&job.id, &item_id)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotReadyForApproval(_, _)));

    let job = workflow.get_batch_job(&job.id).await.unwrap();
    assert_eq!(job.items[0].status, ItemStatus::Crawled);
}

// Scenario D: one item generates, one hits a total provider outage.
// Approved content is empty until the human approves the survivor.
#[tokio::test]
async fn test_approved_content_after_partial_generation() {
    let outage = MockProvider::failing_api(ProviderKind::OpenAi, 503, "down")
        .with_script(vec![contentforge::generation::testing::MockOutcome::Succeed(
            GOOD_RESPONSE.to_string(),
        )]);

    let workflow = workflow_with(
        Arc::new(MockExtractor::instant()),
        engine_with(vec![Arc::new(outage)]),
    );

    let job = workflow
        .create_batch_job(
            "project-1",
            vec![
                "https://example.com/a".to_string(),
                "https://example.com/b".to_string(),
            ],
            JobSettings::default(),
        )
        .await
        .unwrap();
    workflow.start_crawling(&job.id).await.unwrap();
    workflow.generate_content(&job.id).await.unwrap();

    let job_record = workflow.get_batch_job(&job.id).await.unwrap();
    let generated: Vec<_> = job_record
        .items
        .iter()
        .filter(|i| i.status == ItemStatus::Generated)
        .collect();
    let failed: Vec<_> = job_record
        .items
        .iter()
        .filter(|i| i.status == ItemStatus::Failed)
        .collect();
    assert_eq!(generated.len(), 1);
    assert_eq!(failed.len(), 1);
    assert!(failed[0]
        .error_message
        .as_ref()
        .unwrap()
        .contains("openai"));

    assert!(workflow
        .get_approved_content(&job.id)
        .await
        .unwrap()
        .is_empty());

    workflow
        .approve_content_item(&job.id, &generated[0].id)
        .await
        .unwrap();

    let approved = workflow.get_approved_content(&job.id).await.unwrap();
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].id, generated[0].id);
}

// An unconfigured preferred provider falls back to auto-selection
// instead of failing the batch.
#[tokio::test]
async fn test_unconfigured_preferred_provider_uses_auto_selection() {
    let workflow = workflow_with(
        Arc::new(MockExtractor::instant()),
        engine_with(vec![Arc::new(MockProvider::succeeding(
            ProviderKind::OpenAi,
            GOOD_RESPONSE,
        ))]),
    );

    let settings = JobSettings {
        preferred_provider: ProviderChoice::Anthropic,
        ..Default::default()
    };
    let job = workflow
        .create_batch_job("project-1", vec!["https://example.com/a".to_string()], settings)
        .await
        .unwrap();
    workflow.start_crawling(&job.id).await.unwrap();
    workflow.generate_content(&job.id).await.unwrap();

    let job = workflow.get_batch_job(&job.id).await.unwrap();
    let generated = job.items[0].generated.as_ref().unwrap();
    assert_eq!(generated.metadata.provider, "openai");
}

#[tokio::test]
async fn test_generate_without_crawled_items_errors() {
    let workflow = healthy_workflow();
    let job = workflow
        .create_batch_job(
            "project-1",
            vec!["https://example.com/a".to_string()],
            JobSettings::default(),
        )
        .await
        .unwrap();

    let err = workflow.generate_content(&job.id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::NoItemsReady(_)));
}

#[tokio::test]
async fn test_concurrent_crawl_reentry_is_rejected() {
    let workflow = workflow_with(
        Arc::new(MockExtractor::slow(Duration::from_millis(500))),
        engine_with(vec![Arc::new(MockProvider::succeeding(
            ProviderKind::OpenAi,
            GOOD_RESPONSE,
        ))]),
    );

    let job = workflow
        .create_batch_job(
            "project-1",
            vec!["https://example.com/a".to_string()],
            JobSettings::default(),
        )
        .await
        .unwrap();

    let handle = workflow.spawn_crawling(&job.id);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let err = workflow.start_crawling(&job.id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::JobAlreadyProcessing(_)));

    handle.await.unwrap().unwrap();
    let job = workflow.get_batch_job(&job.id).await.unwrap();
    assert_eq!(job.status, JobStatus::Completed);
}

#[tokio::test]
async fn test_regenerate_replaces_failed_generation() {
    // First generation attempt fails terminally, regeneration succeeds
    // once the provider recovers.
    let provider = MockProvider::succeeding(ProviderKind::OpenAi, GOOD_RESPONSE).with_script(
        vec![contentforge::generation::testing::MockOutcome::FailApi(
            401,
            "invalid key".to_string(),
        )],
    );
    let workflow = workflow_with(
        Arc::new(MockExtractor::instant()),
        engine_with(vec![Arc::new(provider)]),
    );

    let job = workflow
        .create_batch_job(
            "project-1",
            vec!["https://example.com/a".to_string()],
            JobSettings::default(),
        )
        .await
        .unwrap();
    workflow.start_crawling(&job.id).await.unwrap();
    workflow.generate_content(&job.id).await.unwrap();

    let job_record = workflow.get_batch_job(&job.id).await.unwrap();
    let item_id = job_record.items[0].id.clone();
    assert_eq!(job_record.items[0].status, ItemStatus::Failed);

    let regenerated = workflow
        .regenerate_content(&job.id, &item_id)
        .await
        .unwrap();
    assert_eq!(regenerated.status, ItemStatus::Generated);
    assert_eq!(
        regenerated.generated.as_ref().unwrap().title,
        "Rewritten Headline"
    );

    let job_record = workflow.get_batch_job(&job.id).await.unwrap();
    assert_eq!(job_record.progress.generated, 1);
    assert_eq!(job_record.progress.failed, 0);
}

#[tokio::test]
async fn test_unknown_job_and_item_errors() {
    let workflow = healthy_workflow();
    assert!(matches!(
        workflow.get_batch_job_status("nope").await.unwrap_err(),
        WorkflowError::JobNotFound(_)
    ));

    let job = workflow
        .create_batch_job(
            "project-1",
            vec!["https://example.com/a".to_string()],
            JobSettings::default(),
        )
        .await
        .unwrap();
    assert!(matches!(
        workflow
            .approve_content_item(&job.id, "missing-item")
            .await
            .unwrap_err(),
        WorkflowError::ItemNotFound(_)
    ));
}
