//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the `DatabaseService` port. Used when no
//! `DATABASE_URL` is configured and by the router tests. Nothing is persisted.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;
use wellbeing_core::domain::{
    JournalEntry, MoodLog, MoodLogFilter, TokenKind, User, UserCredentials,
};
use wellbeing_core::ports::{DatabaseService, PortError, PortResult};

struct StoredToken {
    user_id: Uuid,
    kind: TokenKind,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct Store {
    users: HashMap<Uuid, UserCredentials>,
    tokens: HashMap<String, StoredToken>,
    // Insertion order; listings reverse it so ties read newest first.
    journal_entries: Vec<JournalEntry>,
    mood_logs: Vec<MoodLog>,
}

/// A `DatabaseService` backed by process memory.
#[derive(Default)]
pub struct MemoryAdapter {
    store: RwLock<Store>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn entry_not_found(id: Uuid) -> PortError {
    PortError::NotFound(format!("Journal entry {} not found", id))
}

fn mood_not_found(id: Uuid) -> PortError {
    PortError::NotFound(format!("Mood log {} not found", id))
}

#[async_trait]
impl DatabaseService for MemoryAdapter {
    async fn create_user_with_email(&self, email: &str, hashed_password: &str) -> PortResult<User> {
        let mut store = self.store.write().await;
        if store.users.values().any(|u| u.email == email) {
            return Err(PortError::Conflict(format!(
                "User with email {} already exists",
                email
            )));
        }
        let user_id = Uuid::new_v4();
        store.users.insert(
            user_id,
            UserCredentials {
                user_id,
                email: email.to_string(),
                hashed_password: hashed_password.to_string(),
            },
        );
        Ok(User {
            user_id,
            email: Some(email.to_string()),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let store = self.store.read().await;
        store
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User with email {} not found", email)))
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let store = self.store.read().await;
        store
            .users
            .get(&user_id)
            .map(|u| User {
                user_id: u.user_id,
                email: Some(u.email.clone()),
            })
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn create_auth_token(
        &self,
        token: &str,
        user_id: Uuid,
        kind: TokenKind,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut store = self.store.write().await;
        let now = Utc::now();
        store.tokens.retain(|_, t| t.expires_at > now);
        store.tokens.insert(
            token.to_string(),
            StoredToken {
                user_id,
                kind,
                expires_at,
            },
        );
        Ok(())
    }

    async fn validate_auth_token(&self, token: &str, kind: TokenKind) -> PortResult<Uuid> {
        let store = self.store.read().await;
        match store.tokens.get(token) {
            Some(t) if t.kind == kind && t.expires_at > Utc::now() => Ok(t.user_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_token(&self, token: &str) -> PortResult<()> {
        self.store.write().await.tokens.remove(token);
        Ok(())
    }

    async fn list_journal_entries(&self, user_id: Uuid) -> PortResult<Vec<JournalEntry>> {
        let store = self.store.read().await;
        let mut entries: Vec<JournalEntry> = store
            .journal_entries
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn get_journal_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<JournalEntry> {
        let store = self.store.read().await;
        store
            .journal_entries
            .iter()
            .find(|e| e.id == entry_id && e.user_id == user_id)
            .cloned()
            .ok_or_else(|| entry_not_found(entry_id))
    }

    async fn create_journal_entry(&self, user_id: Uuid, content: &str) -> PortResult<JournalEntry> {
        let now = Utc::now();
        let entry = JournalEntry {
            id: Uuid::new_v4(),
            user_id,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.store.write().await.journal_entries.push(entry.clone());
        Ok(entry)
    }

    async fn update_journal_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        content: &str,
    ) -> PortResult<JournalEntry> {
        let mut store = self.store.write().await;
        let entry = store
            .journal_entries
            .iter_mut()
            .find(|e| e.id == entry_id && e.user_id == user_id)
            .ok_or_else(|| entry_not_found(entry_id))?;
        entry.content = content.to_string();
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete_journal_entry(&self, user_id: Uuid, entry_id: Uuid) -> PortResult<()> {
        let mut store = self.store.write().await;
        let before = store.journal_entries.len();
        store
            .journal_entries
            .retain(|e| !(e.id == entry_id && e.user_id == user_id));
        if store.journal_entries.len() == before {
            return Err(entry_not_found(entry_id));
        }
        Ok(())
    }

    async fn list_mood_logs(&self, user_id: Uuid, filter: MoodLogFilter) -> PortResult<Vec<MoodLog>> {
        let store = self.store.read().await;
        let mut logs: Vec<MoodLog> = store
            .mood_logs
            .iter()
            .rev()
            .filter(|l| l.user_id == user_id && filter.matches(&l.timestamp))
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(logs)
    }

    async fn get_mood_log(&self, user_id: Uuid, log_id: Uuid) -> PortResult<MoodLog> {
        let store = self.store.read().await;
        store
            .mood_logs
            .iter()
            .find(|l| l.id == log_id && l.user_id == user_id)
            .cloned()
            .ok_or_else(|| mood_not_found(log_id))
    }

    async fn create_mood_log(&self, user_id: Uuid, mood_rating: u8) -> PortResult<MoodLog> {
        let log = MoodLog {
            id: Uuid::new_v4(),
            user_id,
            mood_rating,
            timestamp: Utc::now(),
        };
        self.store.write().await.mood_logs.push(log.clone());
        Ok(log)
    }

    async fn delete_mood_log(&self, user_id: Uuid, log_id: Uuid) -> PortResult<()> {
        let mut store = self.store.write().await;
        let before = store.mood_logs.len();
        store
            .mood_logs
            .retain(|l| !(l.id == log_id && l.user_id == user_id));
        if store.mood_logs.len() == before {
            return Err(mood_not_found(log_id));
        }
        Ok(())
    }
}
