//! Intent classifier: free text → learning direction.
//!
//! Stages, in order, each able to short-circuit:
//! 1. Empty input → generic clarification.
//! 2. Exploratory phrase ("not sure", "just exploring") → clarification.
//! 3. Bare ambiguous term ("java") without context → targeted clarification.
//! 4. Weighted keyword scoring per direction (whole-word matches).
//! 5. Below `MIN_SCORE` → `Other`, low confidence, no clarification.
//! 6. Top two within `AMBIGUITY_MARGIN` → ask the user to pick one of them.
//! 7. Otherwise the top direction with a tiered confidence.
//!
//! The classifier is a pure function over static tables. Compiled matchers
//! are built once and shared.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::pipeline::keywords::{
    AMBIGUITY_MARGIN, AMBIGUOUS_TERMS, AmbiguousTerm, DIRECTION_KEYWORDS, EMPTY_INPUT_QUESTION,
    EXPLORATORY_PHRASES, EXPLORATORY_QUESTION, HIGH_CONFIDENCE_SCORE, LEAD_IN_WORDS,
    MEDIUM_CONFIDENCE_SCORE, MIN_SCORE,
};
use crate::pipeline::types::{ClassificationResult, Confidence, DirectionScore, SkillDirection};

static CLASSIFIER: LazyLock<IntentClassifier> = LazyLock::new(IntentClassifier::new);

/// Classify free text using the shared default classifier.
pub fn classify_intent(text: &str) -> ClassificationResult {
    CLASSIFIER.classify(text)
}

/// Build a case-insensitive regex matching any of `phrases` as whole words.
///
/// A phrase that starts or ends with a non-word character (`c++`, `.net`)
/// cannot use `\b` on that side, so it is anchored on a non-word character
/// or the string edge instead.
pub(crate) fn phrase_matcher(phrases: &[&str]) -> Regex {
    let alternatives: Vec<String> = phrases
        .iter()
        .map(|phrase| {
            let starts_word = phrase.chars().next().is_some_and(is_word_char);
            let ends_word = phrase.chars().last().is_some_and(is_word_char);
            format!(
                "{}{}{}",
                if starts_word { r"\b" } else { r"(?:^|\W)" },
                regex::escape(phrase),
                if ends_word { r"\b" } else { r"(?:\W|$)" },
            )
        })
        .collect();
    Regex::new(&format!("(?i)(?:{})", alternatives.join("|")))
        .expect("keyword tables only contain escaped literals")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Trim and collapse internal whitespace so multi-word keywords match.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Join directions as "A or B" / "A, B or C".
fn join_options(directions: &[SkillDirection]) -> String {
    match directions {
        [] => String::new(),
        [only] => only.label().to_string(),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(|d| d.label()).collect();
            format!("{} or {}", head.join(", "), last.label())
        }
    }
}

struct CompiledDirection {
    direction: SkillDirection,
    groups: Vec<(u32, Regex)>,
}

struct CompiledAmbiguousTerm {
    entry: &'static AmbiguousTerm,
    context: Regex,
}

/// Keyword-table intent classifier with pre-compiled matchers.
pub struct IntentClassifier {
    directions: Vec<CompiledDirection>,
    ambiguous: Vec<CompiledAmbiguousTerm>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    /// Compile the static keyword tables.
    pub fn new() -> Self {
        let directions = DIRECTION_KEYWORDS
            .iter()
            .map(|entry| CompiledDirection {
                direction: entry.direction,
                groups: entry
                    .groups
                    .iter()
                    .map(|g| (g.weight, phrase_matcher(g.keywords)))
                    .collect(),
            })
            .collect();

        let ambiguous = AMBIGUOUS_TERMS
            .iter()
            .map(|entry| CompiledAmbiguousTerm {
                entry,
                context: phrase_matcher(entry.context),
            })
            .collect();

        Self {
            directions,
            ambiguous,
        }
    }

    /// Classify `text` into a learning direction.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let normalized = normalize_whitespace(text);
        if normalized.is_empty() {
            return ClassificationResult::clarify(EMPTY_INPUT_QUESTION, Vec::new());
        }

        let lower = normalized.to_lowercase();

        if let Some(phrase) = EXPLORATORY_PHRASES.iter().find(|p| lower.contains(**p)) {
            debug!(phrase = %phrase, "Exploratory phrase, asking for direction");
            return ClassificationResult::clarify(EXPLORATORY_QUESTION, Vec::new());
        }

        if let Some(term) = self.bare_ambiguous_term(&lower) {
            debug!(term = %term.term, "Bare ambiguous term without context");
            let question = format!(
                "\"{}\" is used in several areas. Are you more interested in {}?",
                term.term,
                join_options(term.directions)
            );
            return ClassificationResult::clarify(question, term.directions.to_vec());
        }

        let scores = self.score(&normalized);

        let top = match scores.first() {
            Some(top) if top.score >= MIN_SCORE => top.clone(),
            _ => {
                debug!(?scores, "No direction reached minimum score, falling back to Other");
                return ClassificationResult::detected(SkillDirection::Other, Confidence::Low)
                    .with_scores(scores);
            }
        };

        if let Some(second) = scores.get(1) {
            if top.score - second.score < AMBIGUITY_MARGIN {
                debug!(
                    first = %top.direction,
                    second = %second.direction,
                    "Top directions too close, asking user to choose"
                );
                let question = format!(
                    "Your goals touch on both {} and {}. Which would you like to focus on first?",
                    top.direction, second.direction
                );
                let candidates = vec![top.direction, second.direction];
                return ClassificationResult::clarify(question, candidates).with_scores(scores);
            }
        }

        let confidence = if top.score >= HIGH_CONFIDENCE_SCORE {
            Confidence::High
        } else if top.score >= MEDIUM_CONFIDENCE_SCORE {
            Confidence::Medium
        } else {
            Confidence::Low
        };

        debug!(direction = %top.direction, score = top.score, %confidence, "Direction detected");
        ClassificationResult::detected(top.direction, confidence).with_scores(scores)
    }

    /// Score every direction; zero scores are dropped. Sorted by score
    /// descending, ties kept in table order.
    pub fn score(&self, text: &str) -> Vec<DirectionScore> {
        let mut scores: Vec<DirectionScore> = self
            .directions
            .iter()
            .map(|d| DirectionScore {
                direction: d.direction,
                score: d
                    .groups
                    .iter()
                    .filter(|(_, re)| re.is_match(text))
                    .map(|(weight, _)| *weight)
                    .sum(),
            })
            .filter(|s| s.score > 0)
            .collect();
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        scores
    }

    /// Returns the ambiguous term if, once lead-in words are removed, the
    /// input is exactly that term and none of its context words appear.
    fn bare_ambiguous_term(&self, lower: &str) -> Option<&'static AmbiguousTerm> {
        let tokens: Vec<&str> = lower
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#')))
            .filter(|t| !t.is_empty() && !LEAD_IN_WORDS.contains(t))
            .collect();

        let [token] = tokens.as_slice() else {
            return None;
        };

        self.ambiguous
            .iter()
            .find(|a| a.entry.term == *token && !a.context.is_match(lower))
            .map(|a| a.entry)
    }
}
