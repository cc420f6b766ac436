//! crates/wellbeing_core/src/insights/mood.rs
//!
//! Dominant-mood categories and the arithmetic behind them.

use std::fmt;
use std::str::FromStr;

use super::types::MoodSnapshot;

/// Averages above this are "Mostly Positive".
pub const POSITIVE_AVERAGE: f64 = 3.5;
/// Averages below this are "Mostly Negative".
pub const NEGATIVE_AVERAGE: f64 = 2.5;
/// Population standard deviation at or above which ratings count as "Mixed".
pub const MIXED_STD_DEV: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DominantMood {
    MostlyPositive,
    MostlyNegative,
    Neutral,
    Mixed,
    NotEnoughData,
}

impl DominantMood {
    pub fn as_str(&self) -> &'static str {
        match self {
            DominantMood::MostlyPositive => "Mostly Positive",
            DominantMood::MostlyNegative => "Mostly Negative",
            DominantMood::Neutral => "Neutral",
            DominantMood::Mixed => "Mixed",
            DominantMood::NotEnoughData => "Not enough mood data",
        }
    }
}

impl fmt::Display for DominantMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DominantMood {
    type Err = String;

    /// Case-insensitive, ignores surrounding whitespace and a trailing period.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_end_matches('.').to_lowercase();
        [
            DominantMood::MostlyPositive,
            DominantMood::MostlyNegative,
            DominantMood::Neutral,
            DominantMood::Mixed,
            DominantMood::NotEnoughData,
        ]
        .into_iter()
        .find(|m| m.as_str().to_lowercase() == normalized)
        .ok_or_else(|| format!("unknown mood category '{}'", s))
    }
}

/// Mean and population standard deviation of the ratings, `None` when empty.
pub fn rating_stats(ratings: &[u8]) -> Option<(f64, f64)> {
    if ratings.is_empty() {
        return None;
    }
    let n = ratings.len() as f64;
    let mean = ratings.iter().map(|&r| f64::from(r)).sum::<f64>() / n;
    let variance = ratings
        .iter()
        .map(|&r| (f64::from(r) - mean).powi(2))
        .sum::<f64>()
        / n;
    Some((mean, variance.sqrt()))
}

/// Buckets a set of ratings the same way the prompt instructs the model to.
pub fn classify_ratings(ratings: &[u8]) -> DominantMood {
    let Some((mean, std_dev)) = rating_stats(ratings) else {
        return DominantMood::NotEnoughData;
    };

    if std_dev >= MIXED_STD_DEV {
        DominantMood::Mixed
    } else if mean > POSITIVE_AVERAGE {
        DominantMood::MostlyPositive
    } else if mean < NEGATIVE_AVERAGE {
        DominantMood::MostlyNegative
    } else {
        DominantMood::Neutral
    }
}

pub fn classify_mood(logs: &[MoodSnapshot]) -> DominantMood {
    let ratings: Vec<u8> = logs.iter().map(|l| l.mood_rating).collect();
    classify_ratings(&ratings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_map_to_categories() {
        assert_eq!(classify_ratings(&[4, 4, 4, 4, 4]), DominantMood::MostlyPositive);
        assert_eq!(classify_ratings(&[3, 5, 4, 4, 4]), DominantMood::MostlyPositive);
        assert_eq!(classify_ratings(&[2, 2, 2, 2, 2]), DominantMood::MostlyNegative);
        assert_eq!(classify_ratings(&[1, 3, 2]), DominantMood::MostlyNegative);
        assert_eq!(classify_ratings(&[3, 3, 3]), DominantMood::Neutral);
        assert_eq!(classify_ratings(&[]), DominantMood::NotEnoughData);
    }

    #[test]
    fn boundaries_are_neutral() {
        // 3.5 and 2.5 are inside the neutral band.
        assert_eq!(classify_ratings(&[3, 4]), DominantMood::Neutral);
        assert_eq!(classify_ratings(&[2, 3]), DominantMood::Neutral);
    }

    #[test]
    fn wide_swings_are_mixed() {
        assert_eq!(classify_ratings(&[1, 5, 1, 5]), DominantMood::Mixed);
        // Sample from the insights page: 5,2,5,3,4 swings but stays under the threshold.
        assert_eq!(classify_ratings(&[5, 2, 5, 3, 4]), DominantMood::MostlyPositive);
    }

    #[test]
    fn parses_model_spelling() {
        assert_eq!("mostly positive".parse::<DominantMood>(), Ok(DominantMood::MostlyPositive));
        assert_eq!(" Not enough mood data. ".parse::<DominantMood>(), Ok(DominantMood::NotEnoughData));
        assert!("Ecstatic".parse::<DominantMood>().is_err());
    }
}
