//! services/api/src/web/insights.rs
//!
//! Endpoints that run the journal insights flow and expose its keyword tool.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use wellbeing_core::domain::{is_valid_mood_rating, MoodLogFilter};
use wellbeing_core::insights::keywords::DISPLAY_KEYWORDS;
use wellbeing_core::insights::{
    EntrySnapshot, InsightsError, InsightsInput, InsightsOutput, KeywordExtractor, KeywordSet,
    MoodSnapshot,
};

use crate::web::rest::port_error_response;
use crate::web::state::{AppState, AuthUser};

const NOT_ENOUGH_DATA: &str =
    "Not enough data to generate insights. Please add more journal entries or mood logs.";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryInput {
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoodInput {
    pub mood_rating: i64,
    pub timestamp: DateTime<Utc>,
}

/// The data to analyze. Either list may be empty or omitted.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightsRequest {
    #[serde(default)]
    pub journal_entries: Vec<EntryInput>,
    #[serde(default)]
    pub mood_logs: Vec<MoodInput>,
}

impl InsightsRequest {
    fn into_input(self) -> Result<InsightsInput, (StatusCode, String)> {
        let mood_logs = self
            .mood_logs
            .into_iter()
            .map(|log| {
                if is_valid_mood_rating(log.mood_rating) {
                    Ok(MoodSnapshot {
                        mood_rating: log.mood_rating as u8,
                        timestamp: log.timestamp,
                    })
                } else {
                    Err((
                        StatusCode::BAD_REQUEST,
                        format!("moodRating {} is outside 1..=5", log.mood_rating),
                    ))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let journal_entries = self
            .journal_entries
            .into_iter()
            .map(|entry| EntrySnapshot {
                content: entry.content,
                created_at: entry.created_at,
            })
            .collect();

        Ok(InsightsInput {
            journal_entries,
            mood_logs,
        })
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    pub summary: String,
    pub dominant_mood: String,
    pub positive_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
}

impl From<InsightsOutput> for InsightsResponse {
    fn from(mut output: InsightsOutput) -> Self {
        // Client display cap; applies to whatever flow produced the output.
        output.positive_keywords.truncate(DISPLAY_KEYWORDS);
        output.negative_keywords.truncate(DISPLAY_KEYWORDS);
        Self {
            summary: output.summary,
            dominant_mood: output.dominant_mood,
            positive_keywords: output.positive_keywords,
            negative_keywords: output.negative_keywords,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeywordsResponse {
    pub positive_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
}

impl From<KeywordSet> for KeywordsResponse {
    fn from(set: KeywordSet) -> Self {
        Self {
            positive_keywords: set.positive,
            negative_keywords: set.negative,
        }
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

fn insights_error_response(e: InsightsError) -> (StatusCode, String) {
    match e {
        InsightsError::EmptyModelOutput => {
            warn!("Insights model produced no usable output.");
            (StatusCode::BAD_GATEWAY, InsightsError::EmptyModelOutput.to_string())
        }
        InsightsError::Model(inner) => {
            error!("Insights model call failed: {:?}", inner);
            (
                StatusCode::BAD_GATEWAY,
                "Failed to generate insights. Please try again later.".to_string(),
            )
        }
        InsightsError::InvalidToolInput(msg) => (StatusCode::BAD_REQUEST, msg),
        InsightsError::Cancelled => (
            StatusCode::SERVICE_UNAVAILABLE,
            "The server is shutting down. Please try again.".to_string(),
        ),
    }
}

async fn run_flow(
    state: &AppState,
    input: &InsightsInput,
) -> Result<Json<InsightsResponse>, (StatusCode, String)> {
    let output = state
        .insights
        .get_journal_insights_cancellable(input, &state.shutdown)
        .await
        .map_err(insights_error_response)?;

    Ok(Json(output.into()))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /insights - Generate insights for the supplied entries and mood logs
#[utoipa::path(
    post,
    path = "/insights",
    request_body = InsightsRequest,
    responses(
        (status = 200, description = "Generated insights", body = InsightsResponse),
        (status = 400, description = "Malformed input"),
        (status = 401, description = "Not signed in"),
        (status = 502, description = "The model failed to generate insights"),
        (status = 503, description = "Server shutting down")
    )
)]
pub async fn generate_insights_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<InsightsRequest>,
) -> Result<Json<InsightsResponse>, (StatusCode, String)> {
    let input = req.into_input()?;
    info!(%user_id, "Insights requested for supplied data.");
    run_flow(&state, &input).await
}

/// GET /insights - Generate insights from the caller's stored data
#[utoipa::path(
    get,
    path = "/insights",
    responses(
        (status = 200, description = "Generated insights", body = InsightsResponse),
        (status = 401, description = "Not signed in"),
        (status = 422, description = "No journal entries or mood logs yet"),
        (status = 500, description = "Failed to load stored data"),
        (status = 502, description = "The model failed to generate insights"),
        (status = 503, description = "Server shutting down")
    )
)]
pub async fn stored_insights_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<InsightsResponse>, (StatusCode, String)> {
    let entries = state
        .db
        .list_journal_entries(user_id)
        .await
        .map_err(|e| port_error_response(e, "load journal entries"))?;
    let logs = state
        .db
        .list_mood_logs(user_id, MoodLogFilter::default())
        .await
        .map_err(|e| port_error_response(e, "load mood logs"))?;

    let input = InsightsInput {
        journal_entries: entries.iter().map(EntrySnapshot::from).collect(),
        mood_logs: logs.iter().map(MoodSnapshot::from).collect(),
    };
    if input.is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, NOT_ENOUGH_DATA.to_string()));
    }

    info!(%user_id, "Insights requested for stored data.");
    run_flow(&state, &input).await
}

/// GET /insights/keywords - The keyword tool's declaration
#[utoipa::path(
    get,
    path = "/insights/keywords",
    responses(
        (status = 200, description = "Tool name, description, and JSON Schema parameters")
    )
)]
pub async fn keyword_tool_handler() -> impl IntoResponse {
    Json(KeywordExtractor::tool_spec())
}

/// POST /insights/keywords - Run the keyword tool on raw arguments
#[utoipa::path(
    post,
    path = "/insights/keywords",
    request_body(content = Object, description = "Tool arguments: {\"entries\": [{\"content\", \"createdAt\"}]}"),
    responses(
        (status = 200, description = "Extracted keywords", body = KeywordsResponse),
        (status = 400, description = "Arguments do not match the tool schema"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn run_keyword_tool_handler(
    State(state): State<Arc<AppState>>,
    Json(arguments): Json<Value>,
) -> Result<Json<KeywordsResponse>, (StatusCode, String)> {
    let keywords = state
        .insights
        .extractor()
        .call_tool(arguments)
        .await
        .map_err(insights_error_response)?;

    Ok(Json(keywords.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_caps_each_keyword_list_for_display() {
        let words = |prefix: &str| (0..12).map(|i| format!("{prefix}{i}")).collect::<Vec<_>>();
        let response = InsightsResponse::from(InsightsOutput {
            summary: "s".to_string(),
            dominant_mood: "Neutral".to_string(),
            positive_keywords: words("up"),
            negative_keywords: vec!["down".to_string()],
        });

        assert_eq!(response.positive_keywords.len(), DISPLAY_KEYWORDS);
        assert_eq!(response.positive_keywords[0], "up0");
        assert_eq!(response.negative_keywords, vec!["down".to_string()]);
    }
}
