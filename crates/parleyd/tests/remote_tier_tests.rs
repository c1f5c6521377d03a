//! Tests for the remote generation tiers against fake upstream services.
//!
//! Each test binds a small axum app on 127.0.0.1:0 standing in for Ollama or
//! the hosted inference API.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use parley_shared::chat::ResponseSource;
use parley_shared::matcher::MatchPolicy;
use parleyd::composer::Responder;
use parleyd::config::{HostedConfig, LocalConfig};
use parleyd::hosted::HostedTier;
use parleyd::ollama::OllamaTier;
use parleyd::tiers::{GenerationTier, TierError};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Serve `app` on an ephemeral port and return its base URL
async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn local_config(base: &str, timeout_secs: u64) -> LocalConfig {
    LocalConfig {
        endpoint: format!("{}/api/generate", base),
        timeout_secs,
        ..LocalConfig::default()
    }
}

fn hosted_config(base: &str) -> HostedConfig {
    HostedConfig {
        endpoint: format!("{}/models/test", base),
        timeout_secs: 5,
        ..HostedConfig::default()
    }
}

/// Fake hosted endpoint answering with a fixed status and body
fn hosted_app(status: StatusCode, body: Value) -> Router {
    Router::new().route(
        "/models/test",
        post(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    )
}

// ============================================================================
// Local tier
// ============================================================================

#[tokio::test]
async fn test_ollama_returns_response_field() {
    let app = Router::new().route(
        "/api/generate",
        post(|Json(req): Json<Value>| async move {
            assert_eq!(req["model"], "llama3");
            assert_eq!(req["stream"], false);
            Json(json!({"response": format!("echo: {}", req["prompt"].as_str().unwrap())}))
        }),
    );
    let base = spawn(app).await;
    let tier = OllamaTier::new(&local_config(&base, 5)).unwrap();

    assert_eq!(tier.reply("hello").await.as_deref(), Some("echo: hello"));
}

#[tokio::test]
async fn test_ollama_error_status_is_no_output() {
    let app = Router::new().route(
        "/api/generate",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = spawn(app).await;
    let tier = OllamaTier::new(&local_config(&base, 5)).unwrap();

    assert!(matches!(tier.generate("hi").await, Err(TierError::Status(500))));
    assert!(tier.reply("hi").await.is_none());
}

#[tokio::test]
async fn test_ollama_missing_field_is_no_output() {
    let app = Router::new().route(
        "/api/generate",
        post(|| async { Json(json!({"done": true})) }),
    );
    let base = spawn(app).await;
    let tier = OllamaTier::new(&local_config(&base, 5)).unwrap();

    assert!(matches!(
        tier.generate("hi").await,
        Err(TierError::MissingField("response"))
    ));
}

#[tokio::test]
async fn test_ollama_timeout_is_no_output() {
    let app = Router::new().route(
        "/api/generate",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"response": "too late"}))
        }),
    );
    let base = spawn(app).await;
    let tier = OllamaTier::new(&local_config(&base, 1)).unwrap();

    assert!(matches!(tier.generate("hi").await, Err(TierError::Timeout(1))));
}

// ============================================================================
// Hosted tier
// ============================================================================

#[tokio::test]
async fn test_hosted_sends_bearer_and_parameters() {
    let app = Router::new().route(
        "/models/test",
        post(|headers: HeaderMap, Json(req): Json<Value>| async move {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            assert_eq!(req["parameters"]["max_new_tokens"], 80);
            Json(json!([{ "generated_text": format!("{} {}", auth, req["inputs"].as_str().unwrap()) }]))
        }),
    );
    let base = spawn(app).await;
    let tier = HostedTier::with_token(&hosted_config(&base), Some("secret".to_string())).unwrap();

    assert_eq!(tier.reply("hi").await.as_deref(), Some("Bearer secret hi"));
}

#[tokio::test]
async fn test_hosted_error_indicator_is_no_output() {
    let base = spawn(hosted_app(StatusCode::OK, json!({"error": "busy"}))).await;
    let tier = HostedTier::with_token(&hosted_config(&base), Some("secret".to_string())).unwrap();

    match tier.generate("hi").await {
        Err(TierError::Provider(msg)) => assert_eq!(msg, "busy"),
        other => panic!("expected provider error, got {:?}", other),
    }
    assert!(tier.reply("hi").await.is_none());
}

#[tokio::test]
async fn test_hosted_loading_status_reports_indicator() {
    let base = spawn(hosted_app(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({"error": "Model is currently loading", "estimated_time": 20.0}),
    ))
    .await;
    let tier = HostedTier::with_token(&hosted_config(&base), Some("secret".to_string())).unwrap();

    assert!(matches!(tier.generate("hi").await, Err(TierError::Provider(_))));
}

#[tokio::test]
async fn test_hosted_bare_string_payload() {
    let base = spawn(hosted_app(StatusCode::OK, json!("plain answer"))).await;
    let tier = HostedTier::with_token(&hosted_config(&base), Some("secret".to_string())).unwrap();

    assert_eq!(tier.reply("hi").await.as_deref(), Some("plain answer"));
}

#[tokio::test]
async fn test_hosted_without_token_never_calls_upstream() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/models/test",
            post(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({"generated_text": "should not happen"}))
            }),
        )
        .with_state(hits.clone());
    let base = spawn(app).await;
    let tier = HostedTier::with_token(&hosted_config(&base), None).unwrap();

    assert!(tier.reply("hi").await.is_none());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Full chain
// ============================================================================

#[tokio::test]
async fn test_chain_local_failure_reaches_hosted() {
    let local = spawn(Router::new().route(
        "/api/generate",
        post(|| async { (StatusCode::BAD_GATEWAY, "down") }),
    ))
    .await;
    let hosted = spawn(hosted_app(
        StatusCode::OK,
        json!({"generated_text": "hosted says hi"}),
    ))
    .await;

    let tiers: Vec<Box<dyn GenerationTier>> = vec![
        Box::new(OllamaTier::new(&local_config(&local, 5)).unwrap()),
        Box::new(
            HostedTier::with_token(&hosted_config(&hosted), Some("secret".to_string())).unwrap(),
        ),
    ];
    let temp = TempDir::new().unwrap();
    let responder = Responder::new(temp.path(), MatchPolicy::default(), tiers, "fallback");

    let resp = responder.respond("hello there").await;
    assert_eq!(resp.response, "hosted says hi");
    assert_eq!(resp.source, ResponseSource::HostedModel);
}

#[tokio::test]
async fn test_chain_local_answer_skips_hosted() {
    let local = spawn(Router::new().route(
        "/api/generate",
        post(|| async { Json(json!({"response": "local says hi"})) }),
    ))
    .await;

    let hosted_hits = Arc::new(AtomicUsize::new(0));
    let hosted = spawn(
        Router::new()
            .route(
                "/models/test",
                post(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"generated_text": "hosted"}))
                }),
            )
            .with_state(hosted_hits.clone()),
    )
    .await;

    let tiers: Vec<Box<dyn GenerationTier>> = vec![
        Box::new(OllamaTier::new(&local_config(&local, 5)).unwrap()),
        Box::new(
            HostedTier::with_token(&hosted_config(&hosted), Some("secret".to_string())).unwrap(),
        ),
    ];
    let temp = TempDir::new().unwrap();
    let responder = Responder::new(temp.path(), MatchPolicy::default(), tiers, "fallback");

    let resp = responder.respond("hello there").await;
    assert_eq!(resp.source, ResponseSource::LocalModel);
    assert_eq!(resp.response, "local says hi");
    assert_eq!(hosted_hits.load(Ordering::SeqCst), 0);
}
