//! Integration tests for the screening client
//!
//! Each test starts a throwaway axum server on 127.0.0.1 that plays the screening
//! service, then drives `VeriaClient` against it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use veria_rs::{ClientConfig, RiskLevel, Screener, ScreeningError, VeriaClient};

const API_KEY: &str = "vk_test_123";

fn clean_result() -> Value {
    json!({
        "score": 15,
        "risk": "low",
        "chain": "ethereum",
        "resolved": "0x742d...",
        "latency_ms": 45,
        "details": {
            "sanctions_hit": false,
            "pep_hit": false,
            "watchlist_hit": false,
            "checked_lists": ["OFAC SDN"],
            "address_type": "wallet"
        }
    })
}

async fn spawn_service(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client_for(base_url: &str) -> VeriaClient {
    VeriaClient::new(ClientConfig::new(API_KEY).with_base_url(base_url)).unwrap()
}

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

async fn echo_clean(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    captured.requests.lock().unwrap().push((headers, body));
    Json(clean_result())
}

#[tokio::test]
async fn test_success_returns_result_unchanged() {
    let base_url = spawn_service(
        Router::new()
            .route("/v1/screen", post(echo_clean))
            .with_state(Captured::default()),
    )
    .await;

    let result = client_for(&base_url).screen("0x742d...").await.unwrap();

    assert_eq!(serde_json::to_value(&result).unwrap(), clean_result());
    assert_eq!(result.risk_level, RiskLevel::Low);
    assert_eq!(result.details.checked_lists, vec!["OFAC SDN"]);
    assert!(!result.should_block());
}

#[tokio::test]
async fn test_unknown_risk_label_is_returned() {
    let mut body = clean_result();
    body["risk"] = json!("severe");
    body["request_id"] = json!("req_1");
    body["details"]["cluster"] = json!("exchange-hot");
    let served = body.clone();
    let base_url = spawn_service(Router::new().route(
        "/v1/screen",
        post(move || {
            let served = served.clone();
            async move { Json(served) }
        }),
    ))
    .await;

    let result = client_for(&base_url).screen("0x742d...").await.unwrap();

    assert_eq!(result.risk_level, RiskLevel::Other("severe".to_string()));
    assert_eq!(serde_json::to_value(&result).unwrap(), body);
    assert!(!result.should_block());
}

#[tokio::test]
async fn test_request_carries_credential_and_input() {
    let captured = Captured::default();
    let base_url = spawn_service(
        Router::new()
            .route("/v1/screen", post(echo_clean))
            .with_state(captured.clone()),
    )
    .await;

    client_for(&base_url).screen("vitalik.eth").await.unwrap();

    let requests = captured.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (headers, body) = &requests[0];
    assert_eq!(headers["authorization"], "Bearer vk_test_123");
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(body, &json!({ "input": "vitalik.eth" }));
}

#[tokio::test]
async fn test_input_is_not_validated_locally() {
    let captured = Captured::default();
    let base_url = spawn_service(
        Router::new()
            .route("/v1/screen", post(echo_clean))
            .with_state(captured.clone()),
    )
    .await;
    let client = client_for(&base_url);

    for input in ["DE89370400440532013000", "not an address at all", "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh"] {
        client.screen(input).await.unwrap();
    }

    assert_eq!(captured.requests.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_structured_error_body() {
    let base_url = spawn_service(Router::new().route(
        "/v1/screen",
        post(|| async {
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "error": { "code": "RATE_LIMIT_EXCEEDED", "message": "too many requests" }
                })),
            )
        }),
    ))
    .await;

    let err = client_for(&base_url).screen("0x742d...").await.unwrap_err();

    assert_eq!(err.code(), "RATE_LIMIT_EXCEEDED");
    assert_eq!(err.status_code(), Some(429));
    assert_eq!(err.message(), "too many requests");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_top_level_message_body() {
    let base_url = spawn_service(Router::new().route(
        "/v1/screen",
        post(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid API key" }))) }),
    ))
    .await;

    let err = client_for(&base_url).screen("0x742d...").await.unwrap_err();

    assert_eq!(err.code(), "REQUEST_FAILED");
    assert_eq!(err.message(), "Invalid API key");
    assert_eq!(err.status_code(), Some(401));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_unparseable_error_body() {
    let base_url = spawn_service(Router::new().route(
        "/v1/screen",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded <html>") }),
    ))
    .await;

    let err = client_for(&base_url).screen("0x742d...").await.unwrap_err();

    assert_eq!(err.code(), "REQUEST_FAILED");
    assert_eq!(err.status_code(), Some(500));
    assert!(err.message().contains("500"));
}

#[tokio::test]
async fn test_undecodable_success_body_is_network_error() {
    let base_url = spawn_service(Router::new().route(
        "/v1/screen",
        post(|| async { (StatusCode::OK, "definitely not json") }),
    ))
    .await;

    let err = client_for(&base_url).screen("0x742d...").await.unwrap_err();

    assert_eq!(err.code(), "NETWORK_ERROR");
    assert_eq!(err.status_code(), None);
}

/// Flips its flag when the server drops the handler future.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

async fn slow_clean(State(dropped): State<Arc<AtomicBool>>) -> Json<Value> {
    let _flag = DropFlag(dropped);
    tokio::time::sleep(Duration::from_secs(10)).await;
    Json(clean_result())
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let dropped = Arc::new(AtomicBool::new(false));
    let base_url = spawn_service(
        Router::new()
            .route("/v1/screen", post(slow_clean))
            .with_state(dropped.clone()),
    )
    .await;
    let client = VeriaClient::new(
        ClientConfig::new(API_KEY)
            .with_base_url(&base_url)
            .with_timeout_ms(200),
    )
    .unwrap();

    let started = tokio::time::Instant::now();
    let err = client.screen("0x742d...").await.unwrap_err();

    assert_eq!(err, ScreeningError::Timeout);
    assert_eq!(err.code(), "TIMEOUT");
    assert_eq!(err.message(), "Request timed out");
    assert_eq!(err.status_code(), None);
    assert!(started.elapsed() < Duration::from_secs(5));

    // The aborted request closes the connection, so the server gives up on the handler.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    while !dropped.load(Ordering::SeqCst) && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(dropped.load(Ordering::SeqCst), "server handler still running after timeout");
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(&format!("http://{}", addr))
        .screen("0x742d...")
        .await
        .unwrap_err();

    assert_eq!(err.code(), "NETWORK_ERROR");
    assert_eq!(err.status_code(), None);
    assert!(!err.message().is_empty());
}

#[tokio::test]
async fn test_repeated_calls_are_idempotent() {
    let base_url = spawn_service(
        Router::new()
            .route("/v1/screen", post(echo_clean))
            .with_state(Captured::default()),
    )
    .await;
    let client = client_for(&base_url);

    let first = client.screen("0x742d...").await.unwrap();
    let second = client.screen("0x742d...").await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_concurrent_calls_share_one_client() {
    let captured = Captured::default();
    let base_url = spawn_service(
        Router::new()
            .route("/v1/screen", post(echo_clean))
            .with_state(captured.clone()),
    )
    .await;
    let screener: Arc<dyn Screener> = Arc::new(client_for(&base_url));

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..8 {
        let screener = screener.clone();
        tasks.spawn(async move { screener.screen(&format!("0x{:040x}", i)).await });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        results.push(joined.unwrap().unwrap());
    }

    assert_eq!(results.len(), 8);
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(captured.requests.lock().unwrap().len(), 8);
}

#[tokio::test]
async fn test_blocking_result_from_service() {
    let base_url = spawn_service(Router::new().route(
        "/v1/screen",
        post(|| async {
            Json(json!({
                "score": 97,
                "risk": "critical",
                "chain": "ethereum",
                "resolved": "0x8589427373D6D84E98730D7795D8f6f8731FDA16",
                "latency_ms": 61.5,
                "details": {
                    "sanctions_hit": true,
                    "pep_hit": false,
                    "watchlist_hit": true,
                    "checked_lists": ["OFAC SDN", "UN Consolidated"],
                    "address_type": "mixer"
                }
            }))
        }),
    ))
    .await;

    let result = client_for(&base_url).screen("tornado.eth").await.unwrap();

    assert_eq!(result.risk_level, RiskLevel::Critical);
    assert_eq!(result.details.address_type, "mixer");
    assert!(result.should_block());
    assert!(result.decision().is_block());
}
