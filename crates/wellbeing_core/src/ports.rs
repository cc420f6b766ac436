//! crates/wellbeing_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{JournalEntry, MoodLog, MoodLogFilter, TokenKind, User, UserCredentials};
use crate::insights::types::{ModelInsights, ModelRequest, SentimentResult};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Users & Auth ---
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    async fn create_auth_token(
        &self,
        token: &str,
        user_id: Uuid,
        kind: TokenKind,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Resolves a live token of the given kind to its owner.
    /// Unknown, expired, or wrong-kind tokens are `Unauthorized`.
    async fn validate_auth_token(&self, token: &str, kind: TokenKind) -> PortResult<Uuid>;

    async fn delete_auth_token(&self, token: &str) -> PortResult<()>;

    // --- Journal Entries ---
    /// Lists a user's entries, newest first.
    async fn list_journal_entries(&self, user_id: Uuid) -> PortResult<Vec<JournalEntry>>;

    async fn get_journal_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<JournalEntry>;

    async fn create_journal_entry(&self, user_id: Uuid, content: &str) -> PortResult<JournalEntry>;

    async fn update_journal_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        content: &str,
    ) -> PortResult<JournalEntry>;

    async fn delete_journal_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<()>;

    // --- Mood Logs ---
    /// Lists a user's mood logs inside `filter`, newest first.
    async fn list_mood_logs(&self, user_id: Uuid, filter: MoodLogFilter) -> PortResult<Vec<MoodLog>>;

    async fn get_mood_log(&self, user_id: Uuid, log_id: Uuid) -> PortResult<MoodLog>;

    async fn create_mood_log(&self, user_id: Uuid, mood_rating: u8) -> PortResult<MoodLog>;

    async fn delete_mood_log(&self, user_id: Uuid, log_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classifies a piece of text as positive, negative, or neutral with a confidence score.
    async fn analyze(&self, text: &str) -> PortResult<SentimentResult>;
}

#[async_trait]
pub trait InsightsModel: Send + Sync {
    /// Sends a rendered prompt to a generative model and asks for output matching
    /// `request.schema`. `Ok(None)` means the model produced no structured result.
    async fn generate(&self, request: &ModelRequest) -> PortResult<Option<ModelInsights>>;
}
