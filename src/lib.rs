//! contentforge - batch content rewriting pipeline.
//!
//! Ingests source URLs, extracts article content through layered fallback
//! strategies, rewrites it with interchangeable AI text-generation
//! backends, and tracks human approval for publishing.
//!
//! The three core components:
//! - [`extraction`]: pulls clean article text out of arbitrary web pages.
//! - [`generation`]: picks among AI backends, retries on failure, scores
//!   output quality.
//! - [`workflow`]: the batch orchestrator driving per-item state machines
//!   with bounded, staggered concurrency.

pub mod config;
pub mod error;
pub mod extraction;
pub mod generation;
pub mod models;
pub mod repository;
pub mod workflow;

pub use config::AppConfig;
pub use error::{GenerationError, ProviderError, WorkflowError};
pub use workflow::{BatchWorkflow, WorkflowConfig};
