pub mod domain;
pub mod insights;
pub mod ports;

pub use domain::{JournalEntry, MoodLog, MoodLogFilter, TokenKind, User, UserCredentials};
pub use insights::{
    DominantMood, EntrySnapshot, InsightsError, InsightsInput, InsightsOutput,
    JournalInsightsFlow, KeywordExtractor, KeywordSet, MoodSnapshot,
};
pub use ports::{DatabaseService, InsightsModel, PortError, PortResult, SentimentClassifier};
