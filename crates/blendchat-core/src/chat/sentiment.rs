//! Keyword sentiment heuristic for user messages.
//!
//! Intentionally simple: counts positive and negative keyword hits and
//! tags whichever side wins, defaulting to neutral.

use blendchat_types::chat::Sentiment;

const POSITIVE_WORDS: &[&str] = &[
    "great",
    "awesome",
    "excellent",
    "thanks",
    "love",
    "perfect",
    "wonderful",
    "happy",
    "good",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "hate",
    "problem",
    "issue",
    "wrong",
    "error",
    "fail",
    "disappointing",
];

/// Tag a message text with its dominant sentiment.
pub fn analyze(text: &str) -> Sentiment {
    let lower = text.to_lowercase();

    let positive = POSITIVE_WORDS.iter().filter(|w| lower.contains(**w)).count();
    let negative = NEGATIVE_WORDS.iter().filter(|w| lower.contains(**w)).count();

    if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_text() {
        assert_eq!(analyze("Thanks, this looks great!"), Sentiment::Positive);
    }

    #[test]
    fn test_negative_text() {
        assert_eq!(
            analyze("There is a problem with the deploy, it keeps failing"),
            Sentiment::Negative
        );
    }

    #[test]
    fn test_neutral_text() {
        assert_eq!(analyze("Meeting at 3pm tomorrow"), Sentiment::Neutral);
    }

    #[test]
    fn test_mixed_text_balances_to_neutral() {
        assert_eq!(analyze("good idea but wrong timing"), Sentiment::Neutral);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(analyze("AWESOME"), Sentiment::Positive);
    }
}
