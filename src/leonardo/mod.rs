pub mod client;
pub mod generation;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;
use crate::models::GenerationJobRequest;

pub use client::LeonardoClient;
pub use generation::{GenerationClient, GenerationOutcome};

/// What a single status query reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Complete(Vec<String>),
    Failed,
}

/// The two calls the gateway needs from an asynchronous image provider.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Submits a job and returns its generation id.
    async fn submit(&self, job: &GenerationJobRequest) -> Result<String>;

    async fn status(&self, generation_id: &str) -> Result<JobStatus>;
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
