//! services/api/src/adapters/insights_llm.rs
//!
//! This module contains the adapter for the insights-generating LLM.
//! It implements the `InsightsModel` port from the `core` crate.

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
use tracing::{info, warn};
use wellbeing_core::insights::{ModelInsights, ModelRequest};
use wellbeing_core::ports::{InsightsModel, PortError, PortResult};

/// Pulls the structured result out of the model's reply. Anything that is not
/// a JSON object with both string fields counts as "no result".
fn parse_insights(text: &str) -> Option<ModelInsights> {
    let trimmed = text.trim();
    // Some models wrap JSON in a markdown fence even in JSON mode.
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    match serde_json::from_str::<ModelInsights>(body.trim()) {
        Ok(insights) => Some(insights),
        Err(e) => {
            warn!(error = %e, "Insights LLM reply did not match the output schema.");
            None
        }
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `InsightsModel` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiInsightsAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiInsightsAdapter {
    /// Creates a new `OpenAiInsightsAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `InsightsModel` Trait Implementation
//=========================================================================================

#[async_trait]
impl InsightsModel for OpenAiInsightsAdapter {
    async fn generate(&self, request: &ModelRequest) -> PortResult<Option<ModelInsights>> {
        let system = format!(
            "Respond with ONLY a JSON object that matches this JSON Schema:\n{}",
            request.schema.to_json_schema()
        );

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.prompt.as_str())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(ResponseFormat::JsonObject)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let Some(content) = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
        else {
            warn!("Insights LLM returned no content.");
            return Ok(None);
        };

        info!(model = %self.model, "Insights LLM responded.");
        Ok(parse_insights(&content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let parsed = parse_insights(r#"{"summary": "Calm week.", "dominantMood": "Neutral"}"#).unwrap();
        assert_eq!(parsed.summary, "Calm week.");
        assert_eq!(parsed.dominant_mood, "Neutral");
    }

    #[test]
    fn parses_fenced_json() {
        let reply = "```json\n{\"summary\": \"Up and down.\", \"dominantMood\": \"Mixed\"}\n```";
        assert_eq!(parse_insights(reply).unwrap().dominant_mood, "Mixed");
    }

    #[test]
    fn missing_fields_are_no_result() {
        assert!(parse_insights(r#"{"summary": "Only half."}"#).is_none());
        assert!(parse_insights("Sorry, I can't help with that.").is_none());
    }
}
