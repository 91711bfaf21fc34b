use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use cinescope::{
    error::{AppError, AppResult},
    routes::{create_router, AppState},
    services::providers::CompletionProvider,
};

/// Provider double that records prompts and replies with a fixed outcome
struct FakeProvider {
    outcome: Outcome,
    calls: AtomicUsize,
    last_prompt: std::sync::Mutex<Option<String>>,
}

enum Outcome {
    Reply(&'static str),
    Fail,
    Hang,
    Panic,
}

impl FakeProvider {
    fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_prompt: std::sync::Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CompletionProvider for FakeProvider {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());

        match self.outcome {
            Outcome::Reply(text) => Ok(text.to_string()),
            Outcome::Fail => Err(AppError::Upstream(
                "401 invalid_api_key sk-live-secret".to_string(),
            )),
            Outcome::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok("too late".to_string())
            }
            Outcome::Panic => panic!("provider exploded"),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

fn create_test_server(provider: Arc<FakeProvider>) -> TestServer {
    let state = AppState {
        provider,
        upstream_timeout: Duration::from_millis(100),
    };
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(FakeProvider::new(Outcome::Reply("unused")));
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_liveness_message() {
    let server = create_test_server(FakeProvider::new(Outcome::Reply("unused")));

    let response = server.get("/api/test").await;

    response.assert_status_ok();
    response.assert_json(&json!({ "message": "Backend is working fine!" }));
}

#[tokio::test]
async fn test_prompt_is_relayed_verbatim() {
    let provider = FakeProvider::new(Outcome::Reply("<p>A heist classic.</p>"));
    let server = create_test_server(provider.clone());

    let response = server
        .post("/api/chat")
        .json(&json!({ "prompt": "  Tell me about Heat  " }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "response": "<p>A heist classic.</p>" }));
    assert_eq!(provider.calls(), 1);
    assert_eq!(
        provider.last_prompt.lock().unwrap().as_deref(),
        Some("  Tell me about Heat  ")
    );
}

#[tokio::test]
async fn test_missing_or_blank_prompt_is_rejected_without_upstream_call() {
    let provider = FakeProvider::new(Outcome::Reply("unused"));
    let server = create_test_server(provider.clone());

    for body in [json!({}), json!({ "prompt": "" }), json!({ "prompt": " \n\t" }), json!({ "prompt": null })] {
        let response = server.post("/api/chat").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Prompt is required" }));
    }

    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_unreadable_body_is_rejected() {
    let provider = FakeProvider::new(Outcome::Reply("unused"));
    let server = create_test_server(provider.clone());

    let response = server.post("/api/chat").text("prompt=hello").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "Prompt is required" }));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_upstream_failure_hides_provider_detail() {
    let server = create_test_server(FakeProvider::new(Outcome::Fail));

    let response = server
        .post("/api/chat")
        .json(&json!({ "prompt": "Who directed Heat?" }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body, json!({ "error": "Service unavailable" }));
    assert!(!response.text().contains("sk-live-secret"));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = create_test_server(FakeProvider::new(Outcome::Hang));

    let response = server
        .post("/api/chat")
        .json(&json!({ "prompt": "Who directed Heat?" }))
        .await;

    response.assert_status(StatusCode::GATEWAY_TIMEOUT);
    let body: Value = response.json();
    assert!(body["error"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn test_handler_panic_still_answers() {
    let server = create_test_server(FakeProvider::new(Outcome::Panic));

    let response = server
        .post("/api/chat")
        .json(&json!({ "prompt": "Who directed Heat?" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "Service unavailable" }));

    // The server keeps serving after a panic
    server.get("/api/test").await.assert_status_ok();
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server(FakeProvider::new(Outcome::Reply("ok")));

    let response = server
        .post("/api/chat")
        .add_header(
            "x-request-id".parse::<axum::http::HeaderName>().unwrap(),
            "web-42".parse::<axum::http::HeaderValue>().unwrap(),
        )
        .json(&json!({ "prompt": "hi" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.header("x-request-id"), "web-42");

    let response = server.get("/api/test").await;
    assert!(!response.header("x-request-id").is_empty());
}

#[tokio::test]
async fn test_any_origin_is_allowed() {
    let server = create_test_server(FakeProvider::new(Outcome::Reply("ok")));

    let response = server
        .get("/api/test")
        .add_header(
            "origin".parse::<axum::http::HeaderName>().unwrap(),
            "http://localhost:5173".parse::<axum::http::HeaderValue>().unwrap(),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("access-control-allow-origin"), "*");
}
