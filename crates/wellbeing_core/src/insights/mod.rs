//! crates/wellbeing_core/src/insights/mod.rs
//!
//! The journal insights pipeline: keyword extraction, prompt rendering, the
//! model call, and assembly of the final result.

pub mod flow;
pub mod keywords;
pub mod mood;
pub mod prompt;
pub mod types;

pub use flow::JournalInsightsFlow;
pub use keywords::KeywordExtractor;
pub use mood::{classify_mood, DominantMood};
pub use prompt::{insights_output_schema, render_prompt};
pub use types::{
    EntrySnapshot, InsightsInput, InsightsOutput, KeywordSet, ModelInsights, ModelRequest,
    MoodSnapshot, OutputSchema, SentimentLabel, SentimentResult, ToolSpec,
};

use crate::ports::PortError;

/// Everything that can abort a single insights run.
#[derive(Debug, thiserror::Error)]
pub enum InsightsError {
    /// The model answered but produced no usable structured result.
    #[error("AI failed to generate insights.")]
    EmptyModelOutput,

    /// The model call itself failed (transport, auth, quota...).
    #[error("Model call failed: {0}")]
    Model(#[from] PortError),

    /// Tool arguments were not `{"entries": [...]}`.
    #[error("Invalid tool input: {0}")]
    InvalidToolInput(String),

    /// The caller gave up before the run finished.
    #[error("Insights generation was cancelled.")]
    Cancelled,
}
