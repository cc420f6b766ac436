//! services/api/src/web/journal.rs
//!
//! CRUD endpoints for the caller's journal entries.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use wellbeing_core::domain::JournalEntry;

use crate::web::rest::port_error_response;
use crate::web::state::{AppState, AuthUser};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct JournalEntryRequest {
    pub content: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct JournalEntryResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<JournalEntry> for JournalEntryResponse {
    fn from(entry: JournalEntry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            content: entry.content,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

fn require_content(req: &JournalEntryRequest) -> Result<&str, (StatusCode, String)> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Content must not be blank".to_string()));
    }
    Ok(content)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /journal - List the caller's entries, newest first
#[utoipa::path(
    get,
    path = "/journal",
    responses(
        (status = 200, description = "Journal entries", body = [JournalEntryResponse]),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_entries_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<Vec<JournalEntryResponse>>, (StatusCode, String)> {
    let entries = state
        .db
        .list_journal_entries(user_id)
        .await
        .map_err(|e| port_error_response(e, "list journal entries"))?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// POST /journal - Write a new entry
#[utoipa::path(
    post,
    path = "/journal",
    request_body = JournalEntryRequest,
    responses(
        (status = 201, description = "Entry created", body = JournalEntryResponse),
        (status = 400, description = "Blank content"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn create_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<JournalEntryRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let content = require_content(&req)?;

    let entry = state
        .db
        .create_journal_entry(user_id, content)
        .await
        .map_err(|e| port_error_response(e, "create journal entry"))?;
    info!(%user_id, entry_id = %entry.id, "Journal entry created.");

    Ok((StatusCode::CREATED, Json(JournalEntryResponse::from(entry))))
}

/// GET /journal/{id} - Fetch one entry
#[utoipa::path(
    get,
    path = "/journal/{id}",
    params(("id" = Uuid, Path, description = "Journal entry id")),
    responses(
        (status = 200, description = "The entry", body = JournalEntryResponse),
        (status = 404, description = "No such entry for this user")
    )
)]
pub async fn get_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<JournalEntryResponse>, (StatusCode, String)> {
    let entry = state
        .db
        .get_journal_entry(user_id, id)
        .await
        .map_err(|e| port_error_response(e, "load journal entry"))?;

    Ok(Json(entry.into()))
}

/// PUT /journal/{id} - Replace an entry's content
#[utoipa::path(
    put,
    path = "/journal/{id}",
    params(("id" = Uuid, Path, description = "Journal entry id")),
    request_body = JournalEntryRequest,
    responses(
        (status = 200, description = "Entry updated", body = JournalEntryResponse),
        (status = 400, description = "Blank content"),
        (status = 404, description = "No such entry for this user")
    )
)]
pub async fn update_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<JournalEntryRequest>,
) -> Result<Json<JournalEntryResponse>, (StatusCode, String)> {
    let content = require_content(&req)?;

    let entry = state
        .db
        .update_journal_entry(user_id, id, content)
        .await
        .map_err(|e| port_error_response(e, "update journal entry"))?;

    Ok(Json(entry.into()))
}

/// DELETE /journal/{id} - Remove an entry
#[utoipa::path(
    delete,
    path = "/journal/{id}",
    params(("id" = Uuid, Path, description = "Journal entry id")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 404, description = "No such entry for this user")
    )
)]
pub async fn delete_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .db
        .delete_journal_entry(user_id, id)
        .await
        .map_err(|e| port_error_response(e, "delete journal entry"))?;

    Ok(StatusCode::NO_CONTENT)
}
