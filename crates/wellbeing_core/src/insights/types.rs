//! crates/wellbeing_core/src/insights/types.rs
//!
//! Data carried through the insights pipeline. Field names on the wire follow
//! the camelCase shape the browser client already sends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::{JournalEntry, MoodLog};

//=========================================================================================
// Sentiment
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

/// One classifier verdict. `score` is the classifier's confidence in `label`, 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub score: f32,
}

//=========================================================================================
// Flow Input
//=========================================================================================

/// A journal entry as handed to the insights flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySnapshot {
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<&JournalEntry> for EntrySnapshot {
    fn from(entry: &JournalEntry) -> Self {
        Self {
            content: entry.content.clone(),
            created_at: entry.created_at,
        }
    }
}

/// A mood log as handed to the insights flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodSnapshot {
    pub mood_rating: u8,
    pub timestamp: DateTime<Utc>,
}

impl From<&MoodLog> for MoodSnapshot {
    fn from(log: &MoodLog) -> Self {
        Self {
            mood_rating: log.mood_rating,
            timestamp: log.timestamp,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsInput {
    pub journal_entries: Vec<EntrySnapshot>,
    pub mood_logs: Vec<MoodSnapshot>,
}

impl InsightsInput {
    pub fn is_empty(&self) -> bool {
        self.journal_entries.is_empty() && self.mood_logs.is_empty()
    }
}

//=========================================================================================
// Keywords & Output
//=========================================================================================

/// Positive and negative theme lists. Each side is free of duplicates and keeps
/// first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSet {
    #[serde(rename = "positiveKeywords")]
    pub positive: Vec<String>,
    #[serde(rename = "negativeKeywords")]
    pub negative: Vec<String>,
}

/// The assembled result of one flow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsOutput {
    pub summary: String,
    pub dominant_mood: String,
    pub positive_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
}

//=========================================================================================
// Model Request / Response
//=========================================================================================

/// The structured fields the model is asked to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInsights {
    pub summary: String,
    pub dominant_mood: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: &'static str,
    pub description: &'static str,
}

/// A flat object schema of required string fields.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: &'static str,
    pub fields: Vec<SchemaField>,
}

impl OutputSchema {
    pub fn to_json_schema(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .fields
            .iter()
            .map(|f| {
                (
                    f.name.to_string(),
                    json!({ "type": "string", "description": f.description }),
                )
            })
            .collect();
        let required: Vec<&str> = self.fields.iter().map(|f| f.name).collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

/// Declaration of a callable tool: name, purpose, and JSON schema of its arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// Everything an `InsightsModel` needs for one call.
///
/// `mood_ratings` and `keywords` are the data `prompt` was rendered from, for
/// models that work on structured input instead of text. Ratings are newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub prompt: String,
    pub schema: OutputSchema,
    pub mood_ratings: Vec<u8>,
    pub keywords: KeywordSet,
}
