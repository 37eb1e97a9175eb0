//! Wire schemas for the Leonardo REST generations API.
//!
//! Every response field is optional: the provider omits or nulls fields while a
//! job is still running, and callers decide whether absence means "not ready"
//! or a hard failure.

use serde::{Deserialize, Serialize};

/// Body of `POST /generations`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerationJobRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(rename = "modelId")]
    pub model_id: String,
    pub width: u32,
    pub height: u32,
    pub num_images: u32,
    #[serde(rename = "presetStyle")]
    pub preset_style: String,
    pub alchemy: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitGenerationResponse {
    #[serde(rename = "sdGenerationJob", default)]
    pub sd_generation_job: Option<SdGenerationJob>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SdGenerationJob {
    #[serde(rename = "generationId", default)]
    pub generation_id: Option<String>,
}

impl SubmitGenerationResponse {
    pub fn generation_id(&self) -> Option<&str> {
        self.sd_generation_job
            .as_ref()
            .and_then(|job| job.generation_id.as_deref())
            .filter(|id| !id.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationStatusResponse {
    #[serde(default)]
    pub generations_by_pk: Option<GenerationRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationRecord {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub generated_images: Option<Vec<GeneratedImage>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedImage {
    #[serde(default)]
    pub url: Option<String>,
}

impl GenerationStatusResponse {
    /// Non-empty image URLs in provider order.
    pub fn image_urls(&self) -> Vec<String> {
        self.generations_by_pk
            .as_ref()
            .and_then(|record| record.generated_images.as_ref())
            .map(|images| {
                images
                    .iter()
                    .filter_map(|image| image.url.as_deref())
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn status(&self) -> Option<&str> {
        self.generations_by_pk
            .as_ref()
            .and_then(|record| record.status.as_deref())
    }

    pub fn is_failed(&self) -> bool {
        self.status()
            .map(|status| status.eq_ignore_ascii_case("FAILED"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_submit_response_without_job_has_no_id() {
        let parsed: SubmitGenerationResponse = serde_json::from_value(json!({})).unwrap();
        assert!(parsed.generation_id().is_none());

        let parsed: SubmitGenerationResponse =
            serde_json::from_value(json!({ "sdGenerationJob": { "generationId": "" } })).unwrap();
        assert!(parsed.generation_id().is_none());
    }

    #[test]
    fn test_status_response_pending_shapes() {
        for body in [
            json!({}),
            json!({ "generations_by_pk": null }),
            json!({ "generations_by_pk": { "status": "PENDING" } }),
            json!({ "generations_by_pk": { "status": "PENDING", "generated_images": [] } }),
            json!({ "generations_by_pk": { "generated_images": [{ "id": "a" }] } }),
            json!({ "generations_by_pk": { "id": 7, "status": "PENDING", "generated_images": null } }),
            json!({ "generations_by_pk": { "generated_images": [{ "id": 3, "nsfw": false }] } }),
        ] {
            let parsed: GenerationStatusResponse = serde_json::from_value(body).unwrap();
            assert!(parsed.image_urls().is_empty());
            assert!(!parsed.is_failed());
        }
    }

    #[test]
    fn test_status_response_complete() {
        let parsed: GenerationStatusResponse = serde_json::from_value(json!({
            "generations_by_pk": {
                "id": "gen-1",
                "status": "COMPLETE",
                "generated_images": [
                    { "id": "img-1", "url": "https://cdn.example/1.jpg" },
                    { "id": "img-2", "url": "https://cdn.example/2.jpg" }
                ]
            }
        }))
        .unwrap();

        assert_eq!(
            parsed.image_urls(),
            vec!["https://cdn.example/1.jpg", "https://cdn.example/2.jpg"]
        );
        assert_eq!(parsed.status(), Some("COMPLETE"));
    }

    #[test]
    fn test_job_request_uses_provider_field_names() {
        let body = serde_json::to_value(GenerationJobRequest {
            prompt: "p".into(),
            negative_prompt: None,
            model_id: "model".into(),
            width: 1024,
            height: 768,
            num_images: 1,
            preset_style: "DYNAMIC".into(),
            alchemy: true,
        })
        .unwrap();

        assert_eq!(body["modelId"], "model");
        assert_eq!(body["presetStyle"], "DYNAMIC");
        assert!(body.get("negative_prompt").is_none());
    }
}
