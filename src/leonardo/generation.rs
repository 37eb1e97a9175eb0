use std::sync::Arc;

use super::{GenerationProvider, JobStatus, Sleeper, TokioSleeper};
use crate::config::{GenerationSettings, PollingConfig};
use crate::error::{GatewayError, Result};
use crate::models::GenerationJobRequest;
use crate::prompt::RenderedPrompt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub generation_id: String,
    /// Never empty.
    pub image_urls: Vec<String>,
}

impl GenerationOutcome {
    pub fn primary_url(&self) -> &str {
        self.image_urls.first().map(String::as_str).unwrap_or_default()
    }
}

/// Submits one job and polls it on a fixed interval until images appear or the
/// attempts run out.
#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn GenerationProvider>,
    sleeper: Arc<dyn Sleeper>,
    settings: GenerationSettings,
    polling: PollingConfig,
}

impl GenerationClient {
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        settings: GenerationSettings,
        polling: PollingConfig,
    ) -> Self {
        Self {
            provider,
            sleeper: Arc::new(TokioSleeper),
            settings,
            polling,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn job_request(&self, prompt: &RenderedPrompt) -> GenerationJobRequest {
        GenerationJobRequest {
            prompt: prompt.prompt.clone(),
            negative_prompt: prompt.negative_prompt.clone(),
            model_id: self.settings.model_id.clone(),
            width: self.settings.width,
            height: self.settings.height,
            num_images: self.settings.num_images,
            preset_style: self.settings.preset_style.clone(),
            alchemy: self.settings.alchemy,
        }
    }

    pub async fn generate(&self, prompt: &RenderedPrompt) -> Result<GenerationOutcome> {
        let job = self.job_request(prompt);
        log::debug!("Generating image with prompt: {}", job.prompt.trim());

        let generation_id = self.provider.submit(&job).await?;
        log::info!("Submitted generation {}", generation_id);

        let image_urls = self.poll(&generation_id).await?;
        log::info!(
            "Generation {} produced {} image(s)",
            generation_id,
            image_urls.len()
        );

        Ok(GenerationOutcome {
            generation_id,
            image_urls,
        })
    }

    async fn poll(&self, generation_id: &str) -> Result<Vec<String>> {
        let max_attempts = self.polling.max_attempts;

        for attempt in 1..=max_attempts {
            self.sleeper.sleep(self.polling.interval).await;
            log::debug!(
                "Polling attempt {}/{} for generation {}",
                attempt,
                max_attempts,
                generation_id
            );

            match self.provider.status(generation_id).await? {
                JobStatus::Complete(urls) if !urls.is_empty() => return Ok(urls),
                JobStatus::Failed => {
                    return Err(GatewayError::Provider(format!(
                        "Generation {} failed on the provider",
                        generation_id
                    )))
                }
                JobStatus::Complete(_) | JobStatus::Pending => {}
            }
        }

        Err(GatewayError::Timeout {
            generation_id: generation_id.to_string(),
            attempts: max_attempts,
        })
    }
}
