//! End-to-end checks of `HttpTransport` against a local axum server

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use mindarena_sdk::{
    ArenaClient, ClientConfig, IdempotencyKey, MemoryCredentialStore, ProblemFilter, SdkError,
    SessionContext, SessionId, UserId,
};
use mindarena_types::AuthUser;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

const TOKEN: &str = "test-token";

#[derive(Clone, Default)]
struct Seen {
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    idempotency: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

async fn profile(Path(user_id): Path<String>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "bad token"})));
    }
    if user_id != "ada@example.com" {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Profile not found"})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "user_id": user_id,
            "current_difficulty": 3,
            "calibration_completed": true,
            "xp": {"analyst": 40}
        })),
    )
}

async fn problems(
    State(seen): State<Seen>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    seen.queries.lock().push(query);
    Json(json!([]))
}

async fn submit(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let header = headers
        .get("idempotency-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    seen.idempotency
        .lock()
        .push((header, body["idempotency_key"].clone()));
    Json(json!({"xp_earned": 15, "xp_breakdown": {"analyst": 15}}))
}

async fn spawn_server() -> (String, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/api/profiles/:user_id", get(profile))
        .route("/api/problems", get(problems))
        .route("/api/arena/submit", post(submit))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api", addr), seen)
}

fn client(endpoint: &str, token: &str) -> ArenaClient {
    let session = SessionContext::new(Arc::new(MemoryCredentialStore::new()));
    session.login(token, AuthUser::new("ada@example.com")).unwrap();
    ArenaClient::new(ClientConfig::default().with_endpoint(endpoint), session).unwrap()
}

#[tokio::test]
async fn test_bearer_token_reaches_server() {
    let (endpoint, _) = spawn_server().await;
    let client = client(&endpoint, TOKEN);

    let profile = client
        .fetch_profile(&UserId::from("ada@example.com"))
        .await
        .unwrap();

    assert!(profile.calibration_completed);
    assert_eq!(profile.xp.analyst, 40);
}

#[tokio::test]
async fn test_missing_profile_maps_to_not_found() {
    let (endpoint, _) = spawn_server().await;
    let client = client(&endpoint, TOKEN);

    let err = client
        .fetch_profile(&UserId::from("bob@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, SdkError::ProfileNotFound { .. }));
}

#[tokio::test]
async fn test_rejected_token_clears_session() {
    let (endpoint, _) = spawn_server().await;
    let client = client(&endpoint, "stale-token");

    let err = client
        .fetch_profile(&UserId::from("ada@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, SdkError::Unauthorized));
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn test_problem_filter_is_sent_as_query() {
    let (endpoint, seen) = spawn_server().await;
    let client = client(&endpoint, TOKEN);

    let filter = ProblemFilter {
        difficulty_min: Some(2),
        difficulty_max: Some(5),
        is_active: Some(true),
        user_id: Some(UserId::from("ada@example.com")),
    };
    let problems = client.list_problems(&filter).await.unwrap();
    assert!(problems.is_empty());

    let queries = seen.queries.lock().clone();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].get("difficulty_min").map(String::as_str), Some("2"));
    assert_eq!(queries[0].get("difficulty_max").map(String::as_str), Some("5"));
    assert_eq!(queries[0].get("is_active").map(String::as_str), Some("true"));
    assert_eq!(
        queries[0].get("user_id").map(String::as_str),
        Some("ada@example.com")
    );
}

#[tokio::test]
async fn test_idempotency_key_in_header_and_body() {
    let (endpoint, seen) = spawn_server().await;
    let client = client(&endpoint, TOKEN);
    let key = IdempotencyKey::new();

    let response = client
        .submit_solution_with_key(&SessionId::from("s1"), "answer", 42, None, key)
        .await
        .unwrap();
    assert_eq!(response.result.xp_earned, 15);

    let recorded = seen.idempotency.lock().clone();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].0.as_deref(), Some(key.to_string().as_str()));
    assert_eq!(recorded[0].1, json!(key.to_string()));
}
