//! Integration tests for LeonardoClient using wiremock

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sede_gateway::models::GenerationJobRequest;
use sede_gateway::{GatewayError, GenerationProvider, JobStatus, LeonardoClient, LeonardoConfig};

fn create_client(mock_server: &MockServer) -> LeonardoClient {
    LeonardoClient::new(
        LeonardoConfig::new("test-api-key")
            .with_base_url(mock_server.uri())
            .with_timeout(Duration::from_secs(5)),
    )
    .unwrap()
}

fn create_job() -> GenerationJobRequest {
    GenerationJobRequest {
        prompt: "A hand-drawn doodle about yoga".to_string(),
        negative_prompt: Some("photorealism, 3D".to_string()),
        model_id: "test-model".to_string(),
        width: 1024,
        height: 768,
        num_images: 1,
        preset_style: "DYNAMIC".to_string(),
        alchemy: true,
    }
}

#[tokio::test]
async fn test_submit_returns_generation_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generations"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(body_partial_json(json!({
            "prompt": "A hand-drawn doodle about yoga",
            "negative_prompt": "photorealism, 3D",
            "modelId": "test-model",
            "width": 1024,
            "height": 768,
            "num_images": 1,
            "presetStyle": "DYNAMIC",
            "alchemy": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sdGenerationJob": { "generationId": "gen-123", "apiCreditCost": 8 }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let generation_id = client.submit(&create_job()).await.unwrap();

    assert_eq!(generation_id, "gen-123");
}

#[tokio::test]
async fn test_submit_without_job_is_provider_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "quota" })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let result = client.submit(&create_job()).await;

    assert!(matches!(result, Err(GatewayError::Provider(_))));
}

#[tokio::test]
async fn test_submit_http_error_is_provider_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generations"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Invalid API key"
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let result = client.submit(&create_job()).await;

    match result {
        Err(GatewayError::Provider(message)) => assert!(message.contains("401")),
        other => panic!("expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_status_pending_while_no_images() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/generations/gen-123"))
        .and(header("authorization", "Bearer test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "generations_by_pk": { "status": "PENDING", "generated_images": [] }
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let status = client.status("gen-123").await.unwrap();

    assert_eq!(status, JobStatus::Pending);
}

#[tokio::test]
async fn test_status_missing_fields_is_pending() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/generations/gen-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "generations_by_pk": null
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    assert_eq!(client.status("gen-123").await.unwrap(), JobStatus::Pending);
}

#[tokio::test]
async fn test_status_unexpected_shape_is_pending() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/generations/gen-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "generations_by_pk": { "id": 7, "status": "PENDING", "generated_images": null }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/generations/gen-8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "generations_by_pk": { "status": 1, "generated_images": "soon" }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/generations/gen-9"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    for id in ["gen-7", "gen-8", "gen-9"] {
        assert_eq!(client.status(id).await.unwrap(), JobStatus::Pending, "{}", id);
    }
}

#[tokio::test]
async fn test_submit_unexpected_shape_is_provider_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sdGenerationJob": { "generationId": 5 }
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let result = client.submit(&create_job()).await;
    assert!(matches!(result, Err(GatewayError::Provider(_))));
}

#[tokio::test]
async fn test_status_complete_lists_urls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/generations/gen-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "generations_by_pk": {
                "id": "gen-123",
                "status": "COMPLETE",
                "generated_images": [
                    { "id": "img-1", "url": "https://cdn.leonardo.ai/img-1.jpg" },
                    { "id": "img-2", "url": "https://cdn.leonardo.ai/img-2.jpg" }
                ]
            }
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let status = client.status("gen-123").await.unwrap();

    assert_eq!(
        status,
        JobStatus::Complete(vec![
            "https://cdn.leonardo.ai/img-1.jpg".to_string(),
            "https://cdn.leonardo.ai/img-2.jpg".to_string(),
        ])
    );
}

#[tokio::test]
async fn test_status_failed_job() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/generations/gen-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "generations_by_pk": { "status": "FAILED", "generated_images": [] }
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    assert_eq!(client.status("gen-123").await.unwrap(), JobStatus::Failed);
}

#[tokio::test]
async fn test_status_server_error_is_provider_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/generations/gen-123"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let result = client.status("gen-123").await;

    assert!(matches!(result, Err(GatewayError::Provider(_))));
}
