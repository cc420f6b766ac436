//! crates/wellbeing_core/src/insights/prompt.rs
//!
//! Renders the model-facing insights prompt. The exact text (placeholders,
//! comma-joined lists, "None") is what the model sees, so changes here change
//! model behavior.

use chrono::{DateTime, SecondsFormat, Utc};

use super::types::{InsightsInput, KeywordSet, OutputSchema, SchemaField};

const PREAMBLE: &str = "You are an AI assistant helping users reflect on their mental well-being. \
Analyze the provided journal entries, mood logs, and keywords to identify emotional patterns and trends.";

const NO_ENTRIES: &str = "- No journal entries provided.";
const NO_MOOD_LOGS: &str = "- No mood logs provided.";
const NO_KEYWORDS: &str = "None";

const INSTRUCTIONS: &str = r#"Instructions:
1.  **Summarize Emotional Themes:** Based *only* on the provided journal entries and keywords, write a brief (2-3 sentences) summary identifying the main emotional themes or recurring topics. Are the themes generally positive, negative, or mixed?
2.  **Determine Dominant Mood:** Based *only* on the mood log ratings provided (1-5 scale: 1=Awful, 5=Great), determine the overall dominant mood for the period. Categorize it as 'Mostly Positive' (average > 3.5), 'Mostly Negative' (average < 2.5), 'Neutral' (average between 2.5 and 3.5), or 'Mixed' if there's significant fluctuation. If no logs, state 'Not enough mood data'.
3.  **Output:** Provide the summary and the dominant mood in the specified JSON format. Be concise and base your analysis strictly on the data given."#;

pub const POSITIVE_KEYWORDS_LABEL: &str = "Identified Positive Themes/Keywords:";
pub const NEGATIVE_KEYWORDS_LABEL: &str = "Identified Negative Themes/Keywords:";
pub const MOOD_LOGS_HEADER: &str = "Mood Logs (recent first):";

/// Timestamps as the browser writes them: `2024-07-15T00:00:00.000Z`.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        NO_KEYWORDS.to_string()
    } else {
        items.join(", ")
    }
}

/// Returns `items` sorted newest first; equal timestamps keep their input order.
fn newest_first<'a, T>(items: &'a [T], ts: impl Fn(&T) -> DateTime<Utc>) -> Vec<&'a T> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by(|a, b| ts(b).cmp(&ts(a)));
    sorted
}

/// Renders the full prompt for one flow run.
pub fn render_prompt(input: &InsightsInput, keywords: &KeywordSet) -> String {
    let mut lines: Vec<String> = vec![PREAMBLE.to_string(), String::new()];

    lines.push("Journal Entries (recent first):".to_string());
    if input.journal_entries.is_empty() {
        lines.push(NO_ENTRIES.to_string());
    } else {
        for entry in newest_first(&input.journal_entries, |e| e.created_at) {
            lines.push(format!("- {}: {}", format_timestamp(&entry.created_at), entry.content));
        }
    }
    lines.push(String::new());

    lines.push(MOOD_LOGS_HEADER.to_string());
    if input.mood_logs.is_empty() {
        lines.push(NO_MOOD_LOGS.to_string());
    } else {
        for log in newest_first(&input.mood_logs, |l| l.timestamp) {
            lines.push(format!(
                "- {}: Rating {}/5",
                format_timestamp(&log.timestamp),
                log.mood_rating
            ));
        }
    }
    lines.push(String::new());

    lines.push(format!("{} {}", POSITIVE_KEYWORDS_LABEL, join_or_none(&keywords.positive)));
    lines.push(format!("{} {}", NEGATIVE_KEYWORDS_LABEL, join_or_none(&keywords.negative)));
    lines.push(String::new());
    lines.push(INSTRUCTIONS.to_string());

    lines.join("\n")
}

/// The two string fields the model must return.
pub fn insights_output_schema() -> OutputSchema {
    OutputSchema {
        name: "journal_insights",
        fields: vec![
            SchemaField {
                name: "summary",
                description: "A 2-3 sentence summary of key emotional themes and trends observed in the journal entries and mood logs. Mention any correlation or divergence between entries and mood ratings.",
            },
            SchemaField {
                name: "dominantMood",
                description: "The dominant mood observed from the mood logs (e.g., Mostly Positive, Mixed, Mostly Negative, Neutral). Calculate this based on average or mode of mood ratings.",
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::types::{EntrySnapshot, MoodSnapshot};
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn empty_input_uses_placeholders() {
        let prompt = render_prompt(&InsightsInput::default(), &KeywordSet::default());

        assert!(prompt.contains("Journal Entries (recent first):\n- No journal entries provided.\n"));
        assert!(prompt.contains("Mood Logs (recent first):\n- No mood logs provided.\n"));
        assert!(prompt.contains("Identified Positive Themes/Keywords: None\n"));
        assert!(prompt.contains("Identified Negative Themes/Keywords: None\n"));
        assert!(prompt.contains("If no logs, state 'Not enough mood data'."));
    }

    #[test]
    fn lists_newest_first_with_iso_timestamps() {
        let input = InsightsInput {
            journal_entries: vec![
                EntrySnapshot { content: "older".into(), created_at: day(12) },
                EntrySnapshot { content: "newer".into(), created_at: day(15) },
            ],
            mood_logs: vec![
                MoodSnapshot { mood_rating: 3, timestamp: day(12) },
                MoodSnapshot { mood_rating: 5, timestamp: day(15) },
            ],
        };
        let prompt = render_prompt(&input, &KeywordSet::default());

        assert!(prompt.contains(
            "- 2024-07-15T00:00:00.000Z: newer\n- 2024-07-12T00:00:00.000Z: older\n"
        ));
        assert!(prompt.contains(
            "- 2024-07-15T00:00:00.000Z: Rating 5/5\n- 2024-07-12T00:00:00.000Z: Rating 3/5\n"
        ));
    }

    #[test]
    fn keywords_are_comma_joined() {
        let keywords = KeywordSet {
            positive: vec!["Feeling great".into(), "Happiness indicators".into()],
            negative: vec![],
        };
        let prompt = render_prompt(&InsightsInput::default(), &keywords);

        assert!(prompt.contains(
            "Identified Positive Themes/Keywords: Feeling great, Happiness indicators\n"
        ));
        assert!(prompt.contains("Identified Negative Themes/Keywords: None\n"));
    }

    #[test]
    fn instructions_carry_mood_thresholds() {
        let prompt = render_prompt(&InsightsInput::default(), &KeywordSet::default());
        assert!(prompt.contains("'Mostly Positive' (average > 3.5)"));
        assert!(prompt.contains("'Mostly Negative' (average < 2.5)"));
        assert!(prompt.contains("'Neutral' (average between 2.5 and 3.5)"));
        assert!(prompt.contains("'Mixed' if there's significant fluctuation"));
    }

    #[test]
    fn schema_declares_summary_and_dominant_mood() {
        let names: Vec<&str> = insights_output_schema().fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["summary", "dominantMood"]);
    }
}
