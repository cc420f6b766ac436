//! services/api/src/web/mood.rs
//!
//! Endpoints for recording and browsing mood logs.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use wellbeing_core::domain::{
    is_valid_mood_rating, MoodLog, MoodLogFilter, MAX_MOOD_RATING, MIN_MOOD_RATING,
};

use crate::web::rest::port_error_response;
use crate::web::state::{AppState, AuthUser};

#[derive(Deserialize, ToSchema)]
pub struct MoodLogRequest {
    /// 1 (very low) to 5 (very good).
    pub mood_rating: i64,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct MoodLogResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood_rating: u8,
    pub timestamp: DateTime<Utc>,
}

impl From<MoodLog> for MoodLogResponse {
    fn from(log: MoodLog) -> Self {
        Self {
            id: log.id,
            user_id: log.user_id,
            mood_rating: log.mood_rating,
            timestamp: log.timestamp,
        }
    }
}

/// Inclusive UTC date bounds for listing.
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MoodLogQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// GET /moodlog - List the caller's mood logs, newest first
#[utoipa::path(
    get,
    path = "/moodlog",
    params(MoodLogQuery),
    responses(
        (status = 200, description = "Mood logs", body = [MoodLogResponse]),
        (status = 400, description = "Malformed date or inverted range"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_mood_logs_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Query(query): Query<MoodLogQuery>,
) -> Result<Json<Vec<MoodLogResponse>>, (StatusCode, String)> {
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if start > end {
            return Err((
                StatusCode::BAD_REQUEST,
                "start_date must not be after end_date".to_string(),
            ));
        }
    }

    let filter = MoodLogFilter {
        start_date: query.start_date,
        end_date: query.end_date,
    };
    let logs = state
        .db
        .list_mood_logs(user_id, filter)
        .await
        .map_err(|e| port_error_response(e, "list mood logs"))?;

    Ok(Json(logs.into_iter().map(Into::into).collect()))
}

/// POST /moodlog - Record a mood rating
#[utoipa::path(
    post,
    path = "/moodlog",
    request_body = MoodLogRequest,
    responses(
        (status = 201, description = "Mood log created", body = MoodLogResponse),
        (status = 400, description = "Rating outside 1..=5"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn create_mood_log_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<MoodLogRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if !is_valid_mood_rating(req.mood_rating) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "mood_rating must be between {} and {}",
                MIN_MOOD_RATING, MAX_MOOD_RATING
            ),
        ));
    }

    let log = state
        .db
        .create_mood_log(user_id, req.mood_rating as u8)
        .await
        .map_err(|e| port_error_response(e, "create mood log"))?;

    Ok((StatusCode::CREATED, Json(MoodLogResponse::from(log))))
}

/// GET /moodlog/{id} - Fetch one mood log
#[utoipa::path(
    get,
    path = "/moodlog/{id}",
    params(("id" = Uuid, Path, description = "Mood log id")),
    responses(
        (status = 200, description = "The mood log", body = MoodLogResponse),
        (status = 404, description = "No such log for this user")
    )
)]
pub async fn get_mood_log_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MoodLogResponse>, (StatusCode, String)> {
    let log = state
        .db
        .get_mood_log(user_id, id)
        .await
        .map_err(|e| port_error_response(e, "load mood log"))?;

    Ok(Json(log.into()))
}

/// DELETE /moodlog/{id} - Remove a mood log
#[utoipa::path(
    delete,
    path = "/moodlog/{id}",
    params(("id" = Uuid, Path, description = "Mood log id")),
    responses(
        (status = 204, description = "Mood log deleted"),
        (status = 404, description = "No such log for this user")
    )
)]
pub async fn delete_mood_log_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .db
        .delete_mood_log(user_id, id)
        .await
        .map_err(|e| port_error_response(e, "delete mood log"))?;

    Ok(StatusCode::NO_CONTENT)
}
