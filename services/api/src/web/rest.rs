//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification, plus the error mapping
//! shared by every REST handler.

use axum::http::StatusCode;
use tracing::error;
use utoipa::OpenApi;
use wellbeing_core::ports::PortError;

use crate::web::{auth, insights, journal, mood};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::refresh_handler,
        auth::logout_handler,
        auth::current_user_handler,
        journal::list_entries_handler,
        journal::create_entry_handler,
        journal::get_entry_handler,
        journal::update_entry_handler,
        journal::delete_entry_handler,
        mood::list_mood_logs_handler,
        mood::create_mood_log_handler,
        mood::get_mood_log_handler,
        mood::delete_mood_log_handler,
        insights::generate_insights_handler,
        insights::stored_insights_handler,
        insights::keyword_tool_handler,
        insights::run_keyword_tool_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            auth::RefreshRequest,
            auth::RefreshResponse,
            auth::LogoutRequest,
            auth::UserResponse,
            journal::JournalEntryRequest,
            journal::JournalEntryResponse,
            mood::MoodLogRequest,
            mood::MoodLogResponse,
            insights::InsightsRequest,
            insights::EntryInput,
            insights::MoodInput,
            insights::InsightsResponse,
            insights::KeywordsResponse,
        )
    ),
    tags(
        (name = "Wellbeing Journal API", description = "Journaling, mood tracking, and AI-generated insights.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Error Mapping
//=========================================================================================

/// Maps a storage failure onto an HTTP status. `what` names the operation for
/// the log line and the 500 message.
pub fn port_error_response(e: PortError, what: &str) -> (StatusCode, String) {
    match e {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        PortError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Unexpected(msg) => {
            error!("Failed to {}: {}", what, msg);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to {}", what))
        }
    }
}
