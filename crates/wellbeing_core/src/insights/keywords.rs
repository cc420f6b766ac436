//! crates/wellbeing_core/src/insights/keywords.rs
//!
//! The keyword extraction tool. Each journal entry is run through the sentiment
//! classifier and a fixed vocabulary scan; the hits are collected into a
//! `KeywordSet`.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::types::{EntrySnapshot, KeywordSet, SentimentLabel, SentimentResult, ToolSpec};
use super::InsightsError;
use crate::ports::SentimentClassifier;

/// Name the tool is advertised under.
pub const TOOL_NAME: &str = "analyzeJournalEntries";
pub const TOOL_DESCRIPTION: &str = "Analyzes journal entries to extract sentiment and keywords.";

/// A classifier verdict must be strictly more confident than this to count.
pub const SENTIMENT_THRESHOLD: f32 = 0.5;
/// Number of characters of an entry kept as its theme excerpt.
pub const EXCERPT_CHARS: usize = 50;
/// Maximum keywords per side returned by the tool.
pub const MAX_KEYWORDS: usize = 5;
/// Maximum keywords per side shown to a user.
pub const DISPLAY_KEYWORDS: usize = 10;

pub const HAPPINESS_MARKER: &str = "Happiness indicators";
pub const SADNESS_MARKER: &str = "Stress/Sadness indicators";

const POSITIVE_WORDS: [&str; 2] = ["happy", "great"];
const NEGATIVE_WORDS: [&str; 2] = ["sad", "anxious"];

const DEFAULT_CONCURRENCY: usize = 4;

//=========================================================================================
// Tool Arguments
//=========================================================================================

#[derive(Debug, Deserialize)]
struct ToolArgs {
    entries: Vec<EntrySnapshot>,
}

//=========================================================================================
// The Extractor
//=========================================================================================

#[derive(Clone)]
pub struct KeywordExtractor {
    classifier: Arc<dyn SentimentClassifier>,
    concurrency: usize,
}

impl KeywordExtractor {
    pub fn new(classifier: Arc<dyn SentimentClassifier>) -> Self {
        Self {
            classifier,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Sets how many entries are classified at once. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// The tool declaration offered to a model.
    pub fn tool_spec() -> ToolSpec {
        ToolSpec {
            name: TOOL_NAME,
            description: TOOL_DESCRIPTION,
            parameters: json!({
                "type": "object",
                "properties": {
                    "entries": {
                        "type": "array",
                        "description": "Array of journal entries",
                        "items": {
                            "type": "object",
                            "properties": {
                                "content": { "type": "string" },
                                "createdAt": { "type": "string" }
                            },
                            "required": ["content", "createdAt"]
                        }
                    }
                },
                "required": ["entries"]
            }),
        }
    }

    /// Runs the tool from raw JSON arguments of the shape `{"entries": [...]}`.
    pub async fn call_tool(&self, arguments: Value) -> Result<KeywordSet, InsightsError> {
        let args: ToolArgs = serde_json::from_value(arguments)
            .map_err(|e| InsightsError::InvalidToolInput(e.to_string()))?;
        Ok(self.extract(&args.entries).await)
    }

    /// Builds the keyword lists for `entries`. Never fails: an entry whose
    /// classification errors simply contributes no excerpt.
    pub async fn extract(&self, entries: &[EntrySnapshot]) -> KeywordSet {
        // `buffered` yields in input order, so the lists match a sequential pass.
        let verdicts: Vec<Option<SentimentResult>> = stream::iter(entries.iter().enumerate())
            .map(|(index, entry)| {
                let classifier = Arc::clone(&self.classifier);
                async move {
                    match classifier.analyze(&entry.content).await {
                        Ok(result) => Some(result),
                        Err(e) => {
                            warn!(entry = index, error = %e, "Sentiment analysis failed; skipping entry.");
                            None
                        }
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut positive = Vec::new();
        let mut negative = Vec::new();

        for (entry, verdict) in entries.iter().zip(&verdicts) {
            let Some(verdict) = verdict else { continue };
            if verdict.score <= SENTIMENT_THRESHOLD {
                continue;
            }
            match verdict.label {
                SentimentLabel::Positive => positive.push(excerpt(&entry.content)),
                SentimentLabel::Negative => negative.push(excerpt(&entry.content)),
                SentimentLabel::Neutral => {}
            }
        }

        // The vocabulary pass is independent of the classifier, so one entry can
        // land on both sides.
        for entry in entries {
            let lowered = entry.content.to_lowercase();
            if POSITIVE_WORDS.iter().any(|w| lowered.contains(w)) {
                positive.push(HAPPINESS_MARKER.to_string());
            }
            if NEGATIVE_WORDS.iter().any(|w| lowered.contains(w)) {
                negative.push(SADNESS_MARKER.to_string());
            }
        }

        let set = KeywordSet {
            positive: dedup_and_cap(positive, MAX_KEYWORDS),
            negative: dedup_and_cap(negative, MAX_KEYWORDS),
        };
        debug!(
            entries = entries.len(),
            positive = set.positive.len(),
            negative = set.negative.len(),
            "Keyword extraction complete."
        );
        set
    }
}

/// The first `EXCERPT_CHARS` characters of `content`.
fn excerpt(content: &str) -> String {
    content.chars().take(EXCERPT_CHARS).collect()
}

/// Drops repeats (keeping the first occurrence) and truncates to `max`.
pub fn dedup_and_cap(items: Vec<String>, max: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(max.min(items.len()));
    for item in items {
        if out.len() == max {
            break;
        }
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
