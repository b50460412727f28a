//! Mock HTTP tests for LumaClient.
//!
//! These tests cover:
//! - Request formatting (auth header, body, paths)
//! - Submit error classification
//! - Status parsing for both built-in schemas

use std::time::Duration;

use luma_bot::luma::{
    ApiSchema, GenerationRequest, JobStatus, LumaClient, ModelParams, PollError, SchemaOverrides,
    SchemaPreset, SubmissionError, VideoApi, DEFAULT_MODEL,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> LumaClient {
    LumaClient::with_base_url("test-api-key".to_string(), server.uri()).unwrap()
}

fn request(prompt: &str) -> GenerationRequest {
    GenerationRequest::new(prompt, DEFAULT_MODEL, ModelParams::default()).unwrap()
}

// === Submit request formatting ===

#[tokio::test]
async fn test_submit_sends_bearer_auth_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/ray/generate"))
        .and(header("Authorization", "Bearer test-api-key"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(serde_json::json!({
            "prompt": "cyberpunk cityscape with neon lights",
            "model": "ray-3-reasoning"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "gen-123"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let job_id = client(&server)
        .submit(&request("cyberpunk cityscape with neon lights"))
        .await
        .unwrap();
    assert_eq!(job_id, "gen-123");
}

#[tokio::test]
async fn test_submit_sends_optional_params() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/ray/generate"))
        .and(body_json(serde_json::json!({
            "prompt": "waves",
            "model": "ray-2",
            "resolution": "1080p",
            "duration": "9s"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "gen-params"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let params = ModelParams::new(Some("1080p".to_string()), Some("9s".to_string()));
    let request = GenerationRequest::new("waves", "ray-2", params).unwrap();
    let job_id = client(&server).submit(&request).await.unwrap();
    assert_eq!(job_id, "gen-params");
}

#[tokio::test]
async fn test_submit_uses_dream_machine_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dream-machine/v1/generations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "dm-1",
            "state": "queued"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).schema(ApiSchema::preset(SchemaPreset::DreamMachine));
    assert_eq!(client.submit(&request("koi")).await.unwrap(), "dm-1");
}

// === Submit error classification ===

#[tokio::test]
async fn test_submit_missing_job_id_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "queued"})),
        )
        .mount(&server)
        .await;

    let result = client(&server).submit(&request("koi")).await;
    assert!(matches!(
        result,
        Err(SubmissionError::MissingJobId { ref field }) if field == "id"
    ));
}

#[tokio::test]
async fn test_submit_null_job_id_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": null})))
        .mount(&server)
        .await;

    let result = client(&server).submit(&request("koi")).await;
    assert!(matches!(result, Err(SubmissionError::MissingJobId { .. })));
}

#[tokio::test]
async fn test_submit_malformed_json_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client(&server).submit(&request("koi")).await;
    assert!(matches!(result, Err(SubmissionError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_submit_server_error_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let result = client(&server).submit(&request("koi")).await;
    match result {
        Err(SubmissionError::Api { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "Internal Server Error");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_submit_unauthorized_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&server)
        .await;

    let result = client(&server).submit(&request("koi")).await;
    assert!(matches!(result, Err(SubmissionError::Api { status: 401, .. })));
}

#[tokio::test]
async fn test_submit_429_is_rate_limited_with_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "30")
                .set_body_string("Too many requests"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server).submit(&request("koi")).await;
    match result {
        Err(SubmissionError::RateLimited {
            message,
            retry_after_secs,
        }) => {
            assert_eq!(message, "Too many requests");
            assert_eq!(retry_after_secs, Some(30));
        }
        other => panic!("expected RateLimited, got {:?}", other),
    }
}

#[tokio::test]
async fn test_submit_400_content_policy() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string("Prompt violates our content policy"),
        )
        .mount(&server)
        .await;

    let result = client(&server).submit(&request("koi")).await;
    assert!(matches!(result, Err(SubmissionError::ContentPolicy { .. })));
}

#[tokio::test]
async fn test_submit_400_other_error_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Unsupported resolution"))
        .mount(&server)
        .await;

    let result = client(&server).submit(&request("koi")).await;
    assert!(matches!(result, Err(SubmissionError::Api { status: 400, .. })));
}

#[tokio::test]
async fn test_submit_slow_server_is_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"id": "late"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = LumaClient::with_timeouts(
        "test-api-key".to_string(),
        server.uri(),
        Duration::from_millis(200),
        Duration::from_millis(200),
    )
    .unwrap();

    let result = client.submit(&request("koi")).await;
    assert!(matches!(result, Err(SubmissionError::Timeout)));
}

#[tokio::test]
async fn test_submit_connection_refused_is_network_error() {
    // Nothing listens on port 1.
    let client =
        LumaClient::with_base_url("test-api-key".to_string(), "http://127.0.0.1:1".to_string())
            .unwrap();

    let result = client.submit(&request("koi")).await;
    assert!(matches!(result, Err(SubmissionError::Network(_))));
}

// === Status parsing ===

#[tokio::test]
async fn test_poll_status_sends_authenticated_get() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/ray/generations/abc123"))
        .and(header("Authorization", "Bearer test-api-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "processing"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let status = client(&server).poll_status("abc123").await.unwrap();
    assert_eq!(status, JobStatus::Pending);
}

#[tokio::test]
async fn test_poll_status_encodes_job_id_as_one_segment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/ray/generations/a%2Fb%3Fc%23d"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "queued"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let status = client(&server).poll_status("a/b?c#d").await.unwrap();
    assert_eq!(status, JobStatus::Pending);
}

#[tokio::test]
async fn test_poll_status_completed_with_video_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/ray/generations/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "completed",
            "output": {"video_url": "https://cdn.lumalabs.ai/abc123.mp4"}
        })))
        .mount(&server)
        .await;

    let status = client(&server).poll_status("abc123").await.unwrap();
    assert_eq!(
        status,
        JobStatus::Completed {
            video_url: "https://cdn.lumalabs.ai/abc123.mp4".to_string()
        }
    );
}

#[tokio::test]
async fn test_poll_status_failed_with_reason() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "failed",
            "error": "Generation failed: moderation"
        })))
        .mount(&server)
        .await;

    let status = client(&server).poll_status("abc123").await.unwrap();
    assert_eq!(
        status,
        JobStatus::Failed {
            reason: Some("Generation failed: moderation".to_string())
        }
    );
}

#[tokio::test]
async fn test_poll_status_missing_status_is_pending() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "abc123"})))
        .mount(&server)
        .await;

    let status = client(&server).poll_status("abc123").await.unwrap();
    assert_eq!(status, JobStatus::Pending);
}

#[tokio::test]
async fn test_poll_status_completed_without_url_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "completed"})),
        )
        .mount(&server)
        .await;

    let result = client(&server).poll_status("abc123").await;
    assert!(matches!(result, Err(PollError::MissingVideoUrl { .. })));
}

#[tokio::test]
async fn test_poll_status_non_success_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let result = client(&server).poll_status("abc123").await;
    assert!(matches!(result, Err(PollError::Api { status: 503, .. })));
}

#[tokio::test]
async fn test_poll_status_malformed_json_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client(&server).poll_status("abc123").await;
    assert!(matches!(result, Err(PollError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_poll_status_dream_machine_shape() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dream-machine/v1/generations/dm-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "dm-7",
            "state": "completed",
            "failure_reason": null,
            "assets": {"video": "https://storage.cdn-luma.com/dm-7.mp4"}
        })))
        .mount(&server)
        .await;

    let client = client(&server).schema(ApiSchema::preset(SchemaPreset::DreamMachine));
    let status = client.poll_status("dm-7").await.unwrap();
    assert_eq!(
        status,
        JobStatus::Completed {
            video_url: "https://storage.cdn-luma.com/dm-7.mp4".to_string()
        }
    );
}

#[tokio::test]
async fn test_poll_status_with_overridden_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/jobs/j-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "job": {"phase": "SUCCEEDED", "result": {"url": "https://v/j-1.mp4"}}
        })))
        .mount(&server)
        .await;

    let schema = SchemaOverrides {
        status_path: Some("/v2/jobs/{id}/status".to_string()),
        status_field: Some("/job/phase".to_string()),
        completed_states: Some(vec!["succeeded".to_string()]),
        video_url_field: Some("/job/result/url".to_string()),
        ..Default::default()
    }
    .apply(ApiSchema::default());

    let status = client(&server).schema(schema).poll_status("j-1").await.unwrap();
    assert_eq!(
        status,
        JobStatus::Completed {
            video_url: "https://v/j-1.mp4".to_string()
        }
    );
}
