//! Keyword-overlap FAQ lookup
//!
//! A question and every FAQ entry are reduced to sets of lowercase words
//! longer than two characters. An entry scores the larger of its question-side
//! and answer-side overlap, divided by the number of distinct question words.
//! The first entry with the highest score wins; it is reported only when the
//! score reaches the configured threshold.

use crate::data::{load_blocking, DataProvider, FaqEntry};
use crate::tools::registry::Tool;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

pub const NO_MATCH: &str = "No good match found in FAQ.";
pub const FAQ_UNAVAILABLE: &str = "FAQ not available";

fn keywords(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| word.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

/// Fraction of `question` words that also appear in `text`.
fn overlap(question: &HashSet<String>, text: &str) -> f64 {
    if question.is_empty() {
        return 0.0;
    }
    let words = keywords(text);
    let shared = question.iter().filter(|w| words.contains(*w)).count();
    shared as f64 / question.len() as f64
}

/// The best-scoring entry, regardless of threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct FaqMatch<'a> {
    pub entry: &'a FaqEntry,
    pub score: f64,
}

pub fn best_match<'a>(question: &str, entries: &'a [FaqEntry]) -> Option<FaqMatch<'a>> {
    let question = keywords(question);
    let mut best: Option<FaqMatch<'a>> = None;

    for entry in entries {
        let score = overlap(&question, &entry.q).max(overlap(&question, &entry.a));
        if score > best.as_ref().map_or(0.0, |b| b.score) {
            best = Some(FaqMatch { entry, score });
        }
    }

    best
}

/// Answer `question` from `entries`, or report that nothing matched well enough.
pub fn answer(question: &str, entries: &[FaqEntry], threshold: f64) -> String {
    match best_match(question, entries) {
        Some(found) if found.score >= threshold => format!(
            "MatchScore={:.2}\nQ: {}\nA: {}",
            found.score, found.entry.q, found.entry.a
        ),
        _ => NO_MATCH.to_string(),
    }
}

pub struct FaqLookup {
    faq: Arc<dyn DataProvider<FaqEntry>>,
    threshold: f64,
}

impl FaqLookup {
    pub fn new(faq: Arc<dyn DataProvider<FaqEntry>>, threshold: f64) -> Self {
        Self { faq, threshold }
    }
}

#[async_trait]
impl Tool for FaqLookup {
    fn name(&self) -> &str {
        "faq_lookup"
    }

    fn description(&self) -> &str {
        "Answer from a curated internal FAQ knowledge base."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "A short question to look up"
                }
            },
            "required": ["question"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let question = args
            .get("question")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let entries = match load_blocking(&self.faq).await {
            Ok(entries) => entries,
            Err(AppError::NotFound(_)) => return Ok(Value::String(FAQ_UNAVAILABLE.to_string())),
            Err(e) => return Err(e),
        };

        Ok(Value::String(answer(question, &entries, self.threshold)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{JsonFaqProvider, StaticProvider};

    fn entries() -> Vec<FaqEntry> {
        vec![
            FaqEntry::new("reset password", "go to settings"),
            FaqEntry::new("What are your opening hours?", "We open at 9am every weekday."),
        ]
    }

    #[test]
    fn test_keywords_drop_short_words_and_punctuation() {
        let words = keywords("How do I reset my Password?!");
        let expected: HashSet<String> = ["how", "reset", "password"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(words, expected);
    }

    #[test]
    fn test_reset_password_matches() {
        let entries = entries();
        let found = best_match("how do I reset my password", &entries).unwrap();
        assert_eq!(found.entry.q, "reset password");
        // {how, reset, password} against {reset, password}
        assert!((found.score - 2.0 / 3.0).abs() < 1e-9);

        let text = answer("how do I reset my password", &entries, 0.2);
        assert_eq!(text, "MatchScore=0.67\nQ: reset password\nA: go to settings");
    }

    #[test]
    fn test_answer_side_scores_too() {
        let entries = entries();
        let found = best_match("every weekday", &entries).unwrap();
        assert_eq!(found.entry.q, "What are your opening hours?");
        assert_eq!(found.score, 1.0);
    }

    #[test]
    fn test_unrelated_question_has_no_match() {
        assert_eq!(answer("quantum chromodynamics lecture", &entries(), 0.2), NO_MATCH);
    }

    #[test]
    fn test_below_threshold_is_no_match() {
        // one of five question words overlaps: 0.2 passes, 0.25 does not
        let q = "reset alpha bravo charlie delta";
        assert_ne!(answer(q, &entries(), 0.2), NO_MATCH);
        assert_eq!(answer(q, &entries(), 0.25), NO_MATCH);
    }

    #[test]
    fn test_empty_question_scores_zero() {
        assert!(best_match("", &entries()).is_none());
        assert!(best_match("a an to", &entries()).is_none());
        assert_eq!(answer("", &entries(), 0.0), NO_MATCH);
    }

    #[test]
    fn test_first_entry_wins_ties() {
        let entries = vec![
            FaqEntry::new("refund policy", "first"),
            FaqEntry::new("refund policy", "second"),
        ];
        let found = best_match("refund policy", &entries).unwrap();
        assert_eq!(found.entry.a, "first");
    }

    #[tokio::test]
    async fn test_tool_reports_missing_faq() {
        let tool = FaqLookup::new(Arc::new(JsonFaqProvider::new("/nonexistent/faq.json")), 0.2);
        let result = tool.execute(json!({ "question": "anything" })).await.unwrap();
        assert_eq!(result, json!(FAQ_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_tool_answers_from_provider() {
        let tool = FaqLookup::new(Arc::new(StaticProvider::new(entries())), 0.2);
        let result = tool
            .execute(json!({ "question": "how do I reset my password" }))
            .await
            .unwrap();
        assert!(result.as_str().unwrap().starts_with("MatchScore=0.67"));
    }
}
