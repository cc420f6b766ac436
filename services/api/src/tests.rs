//! Router-level tests: the full axum app against the in-memory store and
//! deterministic AI stand-ins.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use wellbeing_core::insights::{
    JournalInsightsFlow, KeywordExtractor, ModelInsights, ModelRequest, SentimentLabel,
    SentimentResult,
};
use wellbeing_core::ports::{InsightsModel, PortResult, SentimentClassifier};

use crate::adapters::{MemoryAdapter, OfflineInsightsModel};
use crate::config::Config;
use crate::web::{router, state::AppState};

//=========================================================================================
// Fixtures
//=========================================================================================

struct WordClassifier;

#[async_trait]
impl SentimentClassifier for WordClassifier {
    async fn analyze(&self, text: &str) -> PortResult<SentimentResult> {
        let lowered = text.to_lowercase();
        let (label, score) = if lowered.contains("great") {
            (SentimentLabel::Positive, 0.9)
        } else if lowered.contains("awful") {
            (SentimentLabel::Negative, 0.9)
        } else {
            (SentimentLabel::Neutral, 0.6)
        };
        Ok(SentimentResult { label, score })
    }
}

struct SilentModel;

#[async_trait]
impl InsightsModel for SilentModel {
    async fn generate(&self, _request: &ModelRequest) -> PortResult<Option<ModelInsights>> {
        Ok(None)
    }
}

struct HangingModel;

#[async_trait]
impl InsightsModel for HangingModel {
    async fn generate(&self, _request: &ModelRequest) -> PortResult<Option<ModelInsights>> {
        std::future::pending::<PortResult<Option<ModelInsights>>>().await
    }
}

fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "AI_BACKEND" => Some("offline".to_string()),
        _ => None,
    })
    .unwrap()
}

fn app_with_model(model: Arc<dyn InsightsModel>) -> (Router, CancellationToken) {
    let shutdown = CancellationToken::new();
    let extractor = KeywordExtractor::new(Arc::new(WordClassifier));
    let state = Arc::new(AppState {
        db: Arc::new(MemoryAdapter::new()),
        config: Arc::new(test_config()),
        insights: JournalInsightsFlow::new(extractor, model),
        shutdown: shutdown.clone(),
    });
    (router(state), shutdown)
}

fn app() -> Router {
    app_with_model(Arc::new(OfflineInsightsModel::new())).0
}

struct Reply {
    status: StatusCode,
    set_cookie: Option<String>,
    body: Value,
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    Reply {
        status,
        set_cookie,
        body,
    }
}

/// Signs up `email` and returns `(access, refresh)`.
async fn signup(app: &Router, email: &str) -> (String, String) {
    let reply = send(
        app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({"email": email, "password": "correct horse"})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    (
        reply.body["access"].as_str().unwrap().to_string(),
        reply.body["refresh"].as_str().unwrap().to_string(),
    )
}

//=========================================================================================
// Auth
//=========================================================================================

#[tokio::test]
async fn signup_login_and_current_user() {
    let app = app();

    let reply = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({"email": "ana@example.com", "password": "correct horse"})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["email"], "ana@example.com");
    let access = reply.body["access"].as_str().unwrap().to_string();
    assert!(reply.set_cookie.unwrap().starts_with(&format!("session={};", access)));

    let dup = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({"email": "ana@example.com", "password": "other"})),
    )
    .await;
    assert_eq!(dup.status, StatusCode::CONFLICT);

    let blank = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({"email": "  ", "password": "x"})),
    )
    .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);

    let wrong = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"email": "ana@example.com", "password": "wrong"})),
    )
    .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let unknown = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"email": "nobody@example.com", "password": "correct horse"})),
    )
    .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);

    let login = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"email": "ana@example.com", "password": "correct horse"})),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    let login_access = login.body["access"].as_str().unwrap();

    let me = send(&app, Method::GET, "/auth/user", Some(login_access), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], "ana@example.com");
}

#[tokio::test]
async fn session_cookie_authenticates() {
    let app = app();
    let (access, _) = signup(&app, "ana@example.com").await;

    let request = Request::builder()
        .uri("/auth/user")
        .header(header::COOKIE, format!("theme=dark; session={}", access))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_reject_missing_or_bad_tokens() {
    let app = app();
    assert_eq!(send(&app, Method::GET, "/journal", None, None).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        send(&app, Method::GET, "/journal", Some("not-a-token"), None).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(send(&app, Method::POST, "/insights", None, Some(json!({}))).await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_then_logout_revokes_tokens() {
    let app = app();
    let (access, refresh) = signup(&app, "ana@example.com").await;

    // An access token is not accepted where a refresh token is expected.
    let wrong_kind = send(&app, Method::POST, "/auth/token/refresh", None, Some(json!({"refresh": access}))).await;
    assert_eq!(wrong_kind.status, StatusCode::UNAUTHORIZED);

    let refreshed = send(&app, Method::POST, "/auth/token/refresh", None, Some(json!({"refresh": refresh}))).await;
    assert_eq!(refreshed.status, StatusCode::OK);
    let new_access = refreshed.body["access"].as_str().unwrap().to_string();
    assert_ne!(new_access, access);
    assert_eq!(send(&app, Method::GET, "/auth/user", Some(&new_access), None).await.status, StatusCode::OK);

    let logout = send(&app, Method::POST, "/auth/logout", Some(&access), Some(json!({"refresh": refresh}))).await;
    assert_eq!(logout.status, StatusCode::OK);
    assert!(logout.set_cookie.unwrap().contains("Max-Age=0"));

    assert_eq!(send(&app, Method::GET, "/auth/user", Some(&access), None).await.status, StatusCode::UNAUTHORIZED);
    let after = send(&app, Method::POST, "/auth/token/refresh", None, Some(json!({"refresh": refresh}))).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);

    assert_eq!(send(&app, Method::POST, "/auth/logout", None, None).await.status, StatusCode::UNAUTHORIZED);
}

//=========================================================================================
// Journal & Mood
//=========================================================================================

#[tokio::test]
async fn journal_crud_is_scoped_to_owner() {
    let app = app();
    let (ana, _) = signup(&app, "ana@example.com").await;
    let (ben, _) = signup(&app, "ben@example.com").await;

    let blank = send(&app, Method::POST, "/journal", Some(&ana), Some(json!({"content": "   "}))).await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);

    let first = send(&app, Method::POST, "/journal", Some(&ana), Some(json!({"content": "First"}))).await;
    assert_eq!(first.status, StatusCode::CREATED);
    let second = send(&app, Method::POST, "/journal", Some(&ana), Some(json!({"content": "Second"}))).await;
    let id = second.body["id"].as_str().unwrap().to_string();

    let list = send(&app, Method::GET, "/journal", Some(&ana), None).await;
    let contents: Vec<&str> = list.body.as_array().unwrap().iter().map(|e| e["content"].as_str().unwrap()).collect();
    assert_eq!(contents, vec!["Second", "First"]);

    let uri = format!("/journal/{}", id);
    assert_eq!(send(&app, Method::GET, &uri, Some(&ben), None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(send(&app, Method::DELETE, &uri, Some(&ben), None).await.status, StatusCode::NOT_FOUND);

    let updated = send(&app, Method::PUT, &uri, Some(&ana), Some(json!({"content": "Edited"}))).await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["content"], "Edited");

    assert_eq!(send(&app, Method::DELETE, &uri, Some(&ana), None).await.status, StatusCode::NO_CONTENT);
    assert_eq!(send(&app, Method::GET, &uri, Some(&ana), None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mood_logs_validate_ratings_and_filter_by_date() {
    let app = app();
    let (token, _) = signup(&app, "ana@example.com").await;

    for bad in [0, 6, -1] {
        let reply = send(&app, Method::POST, "/moodlog", Some(&token), Some(json!({"mood_rating": bad}))).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "rating {}", bad);
    }

    let created = send(&app, Method::POST, "/moodlog", Some(&token), Some(json!({"mood_rating": 4}))).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["mood_rating"], 4);
    let id = created.body["id"].as_str().unwrap().to_string();

    let today = Utc::now().date_naive();
    let yesterday = today - Duration::days(1);

    let in_range = send(&app, Method::GET, &format!("/moodlog?start_date={}", today), Some(&token), None).await;
    assert_eq!(in_range.body.as_array().unwrap().len(), 1);

    let before = send(&app, Method::GET, &format!("/moodlog?end_date={}", yesterday), Some(&token), None).await;
    assert!(before.body.as_array().unwrap().is_empty());

    let inverted = send(
        &app,
        Method::GET,
        &format!("/moodlog?start_date={}&end_date={}", today, yesterday),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(inverted.status, StatusCode::BAD_REQUEST);

    let uri = format!("/moodlog/{}", id);
    assert_eq!(send(&app, Method::GET, &uri, Some(&token), None).await.status, StatusCode::OK);
    assert_eq!(send(&app, Method::DELETE, &uri, Some(&token), None).await.status, StatusCode::NO_CONTENT);
    assert_eq!(send(&app, Method::GET, &uri, Some(&token), None).await.status, StatusCode::NOT_FOUND);
}

//=========================================================================================
// Insights
//=========================================================================================

#[tokio::test]
async fn posted_insights_end_to_end() {
    let app = app();
    let (token, _) = signup(&app, "ana@example.com").await;

    let body = json!({
        "journalEntries": [{"content": "Feeling great today!", "createdAt": "2024-07-15T10:00:00Z"}],
        "moodLogs": [{"moodRating": 5, "timestamp": "2024-07-15T10:00:00Z"}]
    });
    let reply = send(&app, Method::POST, "/insights", Some(&token), Some(body)).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["dominantMood"], "Mostly Positive");
    assert!(!reply.body["summary"].as_str().unwrap().is_empty());
    let positive: Vec<&str> = reply.body["positiveKeywords"]
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k.as_str().unwrap())
        .collect();
    assert!(positive.contains(&"Happiness indicators"));
    assert!(positive.contains(&"Feeling great today!"));
    assert_eq!(reply.body["negativeKeywords"], json!([]));
}

#[tokio::test]
async fn posted_insights_reject_out_of_range_ratings() {
    let app = app();
    let (token, _) = signup(&app, "ana@example.com").await;

    let body = json!({"moodLogs": [{"moodRating": 9, "timestamp": "2024-07-15T10:00:00Z"}]});
    let reply = send(&app, Method::POST, "/insights", Some(&token), Some(body)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_model_output_is_a_bad_gateway() {
    let (app, _) = app_with_model(Arc::new(SilentModel));
    let (token, _) = signup(&app, "ana@example.com").await;

    let reply = send(&app, Method::POST, "/insights", Some(&token), Some(json!({}))).await;
    assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
    assert_eq!(reply.body, "AI failed to generate insights.");
}

#[tokio::test]
async fn shutdown_cancels_insights_runs() {
    let (app, shutdown) = app_with_model(Arc::new(HangingModel));
    let (token, _) = signup(&app, "ana@example.com").await;
    shutdown.cancel();

    let reply = send(&app, Method::POST, "/insights", Some(&token), Some(json!({}))).await;
    assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn stored_insights_need_data() {
    let app = app();
    let (token, _) = signup(&app, "ana@example.com").await;

    let empty = send(&app, Method::GET, "/insights", Some(&token), None).await;
    assert_eq!(empty.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(empty.body.as_str().unwrap().starts_with("Not enough data"));

    send(&app, Method::POST, "/journal", Some(&token), Some(json!({"content": "An awful, sad day."}))).await;
    send(&app, Method::POST, "/moodlog", Some(&token), Some(json!({"mood_rating": 2}))).await;

    let reply = send(&app, Method::GET, "/insights", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["dominantMood"], "Mostly Negative");
    assert_eq!(
        reply.body["negativeKeywords"],
        json!(["An awful, sad day.", "Stress/Sadness indicators"])
    );
}

#[tokio::test]
async fn keyword_tool_is_exposed() {
    let app = app();
    let (token, _) = signup(&app, "ana@example.com").await;

    let spec = send(&app, Method::GET, "/insights/keywords", Some(&token), None).await;
    assert_eq!(spec.status, StatusCode::OK);
    assert_eq!(spec.body["name"], "analyzeJournalEntries");
    assert_eq!(spec.body["parameters"]["required"], json!(["entries"]));

    let args = json!({"entries": [{"content": "I am HAPPY", "createdAt": "2024-07-15T10:00:00Z"}]});
    let reply = send(&app, Method::POST, "/insights/keywords", Some(&token), Some(args)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["positiveKeywords"], json!(["Happiness indicators"]));
    assert_eq!(reply.body["negativeKeywords"], json!([]));

    let malformed = send(&app, Method::POST, "/insights/keywords", Some(&token), Some(json!({"texts": []}))).await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}
