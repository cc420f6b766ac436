//! crates/wellbeing_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Lowest accepted mood rating.
pub const MIN_MOOD_RATING: u8 = 1;
/// Highest accepted mood rating.
pub const MAX_MOOD_RATING: u8 = 5;

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: Option<String>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// The two kinds of opaque bearer tokens handed out at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Short-lived token presented on every protected request.
    Access,
    /// Long-lived token only accepted by the refresh endpoint.
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// A single free-text journal entry written by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single mood rating on the 1-5 scale (1 = awful, 5 = great).
#[derive(Debug, Clone, PartialEq)]
pub struct MoodLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood_rating: u8,
    pub timestamp: DateTime<Utc>,
}

/// Inclusive day bounds applied to mood log timestamps when listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoodLogFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl MoodLogFilter {
    /// Returns true when `timestamp` falls on a day inside the bounds.
    pub fn matches(&self, timestamp: &DateTime<Utc>) -> bool {
        let day = timestamp.date_naive();
        self.start_date.map_or(true, |start| day >= start)
            && self.end_date.map_or(true, |end| day <= end)
    }
}

/// Checks a rating against the accepted scale.
pub fn is_valid_mood_rating(rating: i64) -> bool {
    (i64::from(MIN_MOOD_RATING)..=i64::from(MAX_MOOD_RATING)).contains(&rating)
}
