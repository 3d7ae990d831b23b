//! In-memory job repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::JobRepository;
use crate::models::BatchJob;

/// Process-local job storage keyed by job id.
///
/// Jobs are cloned on read so callers never hold references into the map.
#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: RwLock<HashMap<String, BatchJob>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn get(&self, job_id: &str) -> Option<BatchJob> {
        self.jobs.read().await.get(job_id).cloned()
    }

    async fn put(&self, job: BatchJob) {
        self.jobs.write().await.insert(job.id.clone(), job);
    }

    async fn list(&self) -> Vec<BatchJob> {
        let mut jobs: Vec<BatchJob> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }
}
