//! Job storage behind a repository interface.
//!
//! The orchestrator only speaks to the `JobRepository` trait; the default
//! implementation keeps jobs in process memory. A deployment needing
//! durability supplies its own implementation.

mod memory;

pub use memory::InMemoryJobRepository;

use async_trait::async_trait;

use crate::models::BatchJob;

/// Storage interface for batch jobs and their items.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Fetch a job by id.
    async fn get(&self, job_id: &str) -> Option<BatchJob>;

    /// Insert or replace a job.
    async fn put(&self, job: BatchJob);

    /// List all stored jobs, newest first.
    async fn list(&self) -> Vec<BatchJob>;
}
