//! services/api/src/adapters/sentiment_llm.rs
//!
//! This module contains the adapter for the sentiment classifier.
//! It implements the `SentimentClassifier` port from the `core` crate by asking an
//! OpenAI chat model for a one-line JSON verdict.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use serde::Deserialize;
use wellbeing_core::insights::{SentimentLabel, SentimentResult};
use wellbeing_core::ports::{PortError, PortResult, SentimentClassifier};

const SYSTEM_INSTRUCTIONS: &str = "You are a sentiment classifier for personal journal entries. \
Classify the overall sentiment of the user's text as exactly one of \"positive\", \"negative\", or \"neutral\", \
and give your confidence as a number between 0 and 1. \
Respond with ONLY a JSON object of the form {\"label\": \"positive\", \"score\": 0.87}.";

/// The verdict as the model writes it. Labels are matched case-insensitively.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    label: String,
    score: f32,
}

/// Turns the model's JSON text into a `SentimentResult`.
fn parse_verdict(text: &str) -> PortResult<SentimentResult> {
    let raw: RawVerdict = serde_json::from_str(text.trim())
        .map_err(|e| PortError::Unexpected(format!("Unparseable sentiment verdict: {}", e)))?;

    let label = match raw.label.trim().to_lowercase().as_str() {
        "positive" => SentimentLabel::Positive,
        "negative" => SentimentLabel::Negative,
        "neutral" => SentimentLabel::Neutral,
        other => {
            return Err(PortError::Unexpected(format!(
                "Unknown sentiment label '{}'",
                other
            )))
        }
    };
    if !raw.score.is_finite() {
        return Err(PortError::Unexpected("Sentiment score is not a number".to_string()));
    }

    Ok(SentimentResult {
        label,
        score: raw.score.clamp(0.0, 1.0),
    })
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SentimentClassifier` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiSentimentAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSentimentAdapter {
    /// Creates a new `OpenAiSentimentAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `SentimentClassifier` Trait Implementation
//=========================================================================================

#[async_trait]
impl SentimentClassifier for OpenAiSentimentAdapter {
    async fn analyze(&self, text: &str) -> PortResult<SentimentResult> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(text)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(ResponseFormat::JsonObject)
            .temperature(0.0)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Sentiment LLM response contained no text content.".to_string())
            })?;

        parse_verdict(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_verdict() {
        let result = parse_verdict(r#" {"label": "Positive", "score": 0.91} "#).unwrap();
        assert_eq!(result.label, SentimentLabel::Positive);
        assert!((result.score - 0.91).abs() < f32::EPSILON);
    }

    #[test]
    fn clamps_out_of_range_scores() {
        let result = parse_verdict(r#"{"label": "negative", "score": 1.7}"#).unwrap();
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn rejects_unknown_labels_and_garbage() {
        assert!(parse_verdict(r#"{"label": "ecstatic", "score": 0.9}"#).is_err());
        assert!(parse_verdict("I think it's positive").is_err());
    }
}
