//! crates/wellbeing_core/src/insights/flow.rs
//!
//! The insights orchestrator. One run is strictly sequential:
//! keywords -> prompt -> model -> assembly. Nothing is retried and no partial
//! result is ever returned.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::keywords::KeywordExtractor;
use super::mood::{classify_mood, DominantMood};
use super::prompt::{insights_output_schema, render_prompt};
use super::types::{InsightsInput, InsightsOutput, ModelInsights, ModelRequest, MoodSnapshot};
use super::InsightsError;
use crate::ports::InsightsModel;

/// Holds the injected collaborators for the insights pipeline.
#[derive(Clone)]
pub struct JournalInsightsFlow {
    extractor: KeywordExtractor,
    model: Arc<dyn InsightsModel>,
}

impl JournalInsightsFlow {
    pub fn new(extractor: KeywordExtractor, model: Arc<dyn InsightsModel>) -> Self {
        Self { extractor, model }
    }

    pub fn extractor(&self) -> &KeywordExtractor {
        &self.extractor
    }

    /// Produces a summary, a dominant mood, and keyword lists for `input`.
    ///
    /// Keyword lists always come from the extractor, never from the model, so
    /// they are stable for a given input and classifier.
    pub async fn get_journal_insights(
        &self,
        input: &InsightsInput,
    ) -> Result<InsightsOutput, InsightsError> {
        info!(
            entries = input.journal_entries.len(),
            mood_logs = input.mood_logs.len(),
            "Insights flow started."
        );

        // --- 1. Keywords ---
        let keywords = self.extractor.extract(&input.journal_entries).await;

        // --- 2. Prompt ---
        let request = ModelRequest {
            prompt: render_prompt(input, &keywords),
            schema: insights_output_schema(),
            mood_ratings: newest_first_ratings(&input.mood_logs),
            keywords: keywords.clone(),
        };

        // --- 3. Model ---
        let model_output = self
            .model
            .generate(&request)
            .await?
            .filter(is_complete)
            .ok_or(InsightsError::EmptyModelOutput)?;

        let expected = classify_mood(&input.mood_logs);
        match model_output.dominant_mood.parse::<DominantMood>() {
            Ok(reported) if reported == expected => {}
            Ok(reported) => debug!(%reported, %expected, "Model mood differs from rating average."),
            Err(e) => debug!(error = %e, "Model returned a non-standard mood category."),
        }

        // --- 4. Assembly ---
        info!("Insights flow complete.");
        Ok(InsightsOutput {
            summary: model_output.summary,
            dominant_mood: model_output.dominant_mood,
            positive_keywords: keywords.positive,
            negative_keywords: keywords.negative,
        })
    }

    /// Same as `get_journal_insights`, but abandons the run as soon as `token`
    /// is cancelled. In-flight classifier and model calls are dropped.
    pub async fn get_journal_insights_cancellable(
        &self,
        input: &InsightsInput,
        token: &CancellationToken,
    ) -> Result<InsightsOutput, InsightsError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!("Insights flow cancelled.");
                Err(InsightsError::Cancelled)
            }
            result = self.get_journal_insights(input) => result,
        }
    }
}

fn newest_first_ratings(logs: &[MoodSnapshot]) -> Vec<u8> {
    let mut sorted: Vec<&MoodSnapshot> = logs.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted.into_iter().map(|l| l.mood_rating).collect()
}

fn is_complete(output: &ModelInsights) -> bool {
    !output.summary.trim().is_empty() && !output.dominant_mood.trim().is_empty()
}
