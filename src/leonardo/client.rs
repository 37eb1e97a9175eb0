use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Response;
use serde::de::DeserializeOwned;

use super::{GenerationProvider, JobStatus};
use crate::config::LeonardoConfig;
use crate::error::{GatewayError, Result};
use crate::models::{GenerationJobRequest, GenerationStatusResponse, SubmitGenerationResponse};

const ERROR_BODY_PREVIEW: usize = 300;

/// Leonardo REST client authenticated with a bearer API key.
#[derive(Clone)]
pub struct LeonardoClient {
    http: reqwest::Client,
    config: LeonardoConfig,
}

impl LeonardoClient {
    pub fn new(config: LeonardoConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    fn generations_endpoint(&self) -> String {
        format!("{}/generations", self.config.base_url)
    }

    fn generation_endpoint(&self, generation_id: &str) -> String {
        format!("{}/generations/{}", self.config.base_url, generation_id)
    }
}

#[async_trait]
impl GenerationProvider for LeonardoClient {
    async fn submit(&self, job: &GenerationJobRequest) -> Result<String> {
        log::debug!("Submitting generation job to {}", self.generations_endpoint());

        let response = self
            .http
            .post(self.generations_endpoint())
            .bearer_auth(&self.config.api_key)
            .header(ACCEPT, "application/json")
            .json(job)
            .send()
            .await?;

        let body: Option<SubmitGenerationResponse> =
            read_json("Leonardo submit", response).await?;

        body.as_ref()
            .and_then(SubmitGenerationResponse::generation_id)
            .map(String::from)
            .ok_or_else(|| GatewayError::Provider("No generation job returned from API".into()))
    }

    async fn status(&self, generation_id: &str) -> Result<JobStatus> {
        let response = self
            .http
            .get(self.generation_endpoint(generation_id))
            .bearer_auth(&self.config.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        // A payload that decodes to an unexpected shape is read as "not ready yet".
        let text = read_text("Leonardo poll", response).await?;
        let body = match parse_json::<GenerationStatusResponse>(&text) {
            Ok(Some(body)) => body,
            Ok(None) => return Ok(JobStatus::Pending),
            Err(e) => {
                log::warn!(
                    "Unreadable poll payload for generation {}, still waiting: {}",
                    generation_id,
                    e
                );
                return Ok(JobStatus::Pending);
            }
        };

        let urls = body.image_urls();
        if !urls.is_empty() {
            Ok(JobStatus::Complete(urls))
        } else if body.is_failed() {
            Ok(JobStatus::Failed)
        } else {
            Ok(JobStatus::Pending)
        }
    }
}

/// Reads the response body, mapping non-2xx statuses to provider errors.
async fn read_text(context: &str, response: Response) -> Result<String> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let preview: String = text.chars().take(ERROR_BODY_PREVIEW).collect();
        return Err(GatewayError::Provider(format!(
            "{} returned HTTP {}: {}",
            context, status, preview
        )));
    }
    Ok(text)
}

/// An empty or `null` body yields `None`.
fn parse_json<T: DeserializeOwned>(text: &str) -> Result<Option<T>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(serde_json::from_str(text)?)
}

async fn read_json<T: DeserializeOwned>(context: &str, response: Response) -> Result<Option<T>> {
    let text = read_text(context, response).await?;
    parse_json(&text)
}
