//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;
use wellbeing_core::domain::{
    JournalEntry, MoodLog, MoodLogFilter, TokenKind, User, UserCredentials,
};
use wellbeing_core::ports::{DatabaseService, PortError, PortResult};

/// Postgres SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or_unexpected(what: String) -> impl FnOnce(sqlx::Error) -> PortError {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: Option<String>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct JournalEntryRecord {
    id: Uuid,
    user_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl JournalEntryRecord {
    fn to_domain(self) -> JournalEntry {
        JournalEntry {
            id: self.id,
            user_id: self.user_id,
            content: self.content,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct MoodLogRecord {
    id: Uuid,
    user_id: Uuid,
    mood_rating: i32,
    logged_at: DateTime<Utc>,
}
impl MoodLogRecord {
    fn to_domain(self) -> MoodLog {
        MoodLog {
            id: self.id,
            user_id: self.user_id,
            // The column carries a CHECK (1..=5) constraint.
            mood_rating: self.mood_rating as u8,
            timestamp: self.logged_at,
        }
    }
}

const JOURNAL_COLUMNS: &str = "id, user_id, content, created_at, updated_at";
const MOOD_COLUMNS: &str = "id, user_id, mood_rating, logged_at";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(&self, email: &str, hashed_password: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                PortError::Conflict(format!("User with email {} already exists", email))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected(format!("User with email {} not found", email)))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>("SELECT user_id, email FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(not_found_or_unexpected(format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn create_auth_token(
        &self,
        token: &str,
        user_id: Uuid,
        kind: TokenKind,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        // Expired rows are never read again; sweep them on every issue.
        let pruned = sqlx::query("DELETE FROM auth_tokens WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?
            .rows_affected();
        if pruned > 0 {
            debug!(pruned, "Pruned expired auth tokens.");
        }

        sqlx::query("INSERT INTO auth_tokens (token, user_id, kind, expires_at) VALUES ($1, $2, $3, $4)")
            .bind(token)
            .bind(user_id)
            .bind(kind.as_str())
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_token(&self, token: &str, kind: TokenKind) -> PortResult<Uuid> {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM auth_tokens WHERE token = $1 AND kind = $2 AND expires_at > NOW()",
        )
        .bind(token)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_token(&self, token: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn list_journal_entries(&self, user_id: Uuid) -> PortResult<Vec<JournalEntry>> {
        let records = sqlx::query_as::<_, JournalEntryRecord>(&format!(
            "SELECT {} FROM journal_entries WHERE user_id = $1 ORDER BY created_at DESC",
            JOURNAL_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_journal_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<JournalEntry> {
        let record = sqlx::query_as::<_, JournalEntryRecord>(&format!(
            "SELECT {} FROM journal_entries WHERE id = $1 AND user_id = $2",
            JOURNAL_COLUMNS
        ))
        .bind(entry_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected(format!("Journal entry {} not found", entry_id)))?;
        Ok(record.to_domain())
    }

    async fn create_journal_entry(&self, user_id: Uuid, content: &str) -> PortResult<JournalEntry> {
        let record = sqlx::query_as::<_, JournalEntryRecord>(&format!(
            "INSERT INTO journal_entries (id, user_id, content) VALUES ($1, $2, $3) RETURNING {}",
            JOURNAL_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn update_journal_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        content: &str,
    ) -> PortResult<JournalEntry> {
        let record = sqlx::query_as::<_, JournalEntryRecord>(&format!(
            "UPDATE journal_entries SET content = $1, updated_at = NOW() WHERE id = $2 AND user_id = $3 RETURNING {}",
            JOURNAL_COLUMNS
        ))
        .bind(content)
        .bind(entry_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected(format!("Journal entry {} not found", entry_id)))?;
        Ok(record.to_domain())
    }

    async fn delete_journal_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM journal_entries WHERE id = $1 AND user_id = $2")
            .bind(entry_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Journal entry {} not found", entry_id)));
        }
        Ok(())
    }

    async fn list_mood_logs(&self, user_id: Uuid, filter: MoodLogFilter) -> PortResult<Vec<MoodLog>> {
        let records = sqlx::query_as::<_, MoodLogRecord>(&format!(
            "SELECT {} FROM mood_logs WHERE user_id = $1 \
             AND ($2::date IS NULL OR (logged_at AT TIME ZONE 'UTC')::date >= $2) \
             AND ($3::date IS NULL OR (logged_at AT TIME ZONE 'UTC')::date <= $3) \
             ORDER BY logged_at DESC",
            MOOD_COLUMNS
        ))
        .bind(user_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_mood_log(&self, user_id: Uuid, log_id: Uuid) -> PortResult<MoodLog> {
        let record = sqlx::query_as::<_, MoodLogRecord>(&format!(
            "SELECT {} FROM mood_logs WHERE id = $1 AND user_id = $2",
            MOOD_COLUMNS
        ))
        .bind(log_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected(format!("Mood log {} not found", log_id)))?;
        Ok(record.to_domain())
    }

    async fn create_mood_log(&self, user_id: Uuid, mood_rating: u8) -> PortResult<MoodLog> {
        let record = sqlx::query_as::<_, MoodLogRecord>(&format!(
            "INSERT INTO mood_logs (id, user_id, mood_rating) VALUES ($1, $2, $3) RETURNING {}",
            MOOD_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(i32::from(mood_rating))
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn delete_mood_log(&self, user_id: Uuid, log_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM mood_logs WHERE id = $1 AND user_id = $2")
            .bind(log_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Mood log {} not found", log_id)));
        }
        Ok(())
    }
}
