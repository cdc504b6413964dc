//! Skill-level and goal extraction.
//!
//! Works on the same free text the intent classifier sees, plus the
//! direction it settled on (used only to pick a follow-up question).

use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::intent::{normalize_whitespace, phrase_matcher};
use crate::pipeline::keywords::{
    ADVANCED_KEYWORDS, BEGINNER_KEYWORDS, FILLER_LEAD_INS, INTERMEDIATE_KEYWORDS, MAX_GOAL_WORDS,
    MIN_SPECIFIC_WORDS, UNCERTAINTY_PHRASES, clarification_question,
};
use crate::pipeline::types::{SkillAnalysis, SkillDirection, SkillLevel};

struct LevelMatchers {
    /// Checked in order; first match wins.
    ordered: Vec<(SkillLevel, Regex)>,
    /// Lead-ins sorted longest first.
    lead_ins: Vec<&'static str>,
}

static MATCHERS: LazyLock<LevelMatchers> = LazyLock::new(|| {
    let mut lead_ins = FILLER_LEAD_INS.to_vec();
    lead_ins.sort_by(|a, b| b.len().cmp(&a.len()));
    LevelMatchers {
        ordered: vec![
            (SkillLevel::Advanced, phrase_matcher(ADVANCED_KEYWORDS)),
            (SkillLevel::Intermediate, phrase_matcher(INTERMEDIATE_KEYWORDS)),
            (SkillLevel::Beginner, phrase_matcher(BEGINNER_KEYWORDS)),
        ],
        lead_ins,
    }
});

/// Derive skill level and a normalized goal from free text.
pub fn analyze_skill_level(text: &str, direction: SkillDirection) -> SkillAnalysis {
    let normalized = normalize_whitespace(text);
    let level = infer_level(&normalized);

    if is_vague(&normalized) {
        return SkillAnalysis {
            level,
            goal: String::new(),
            needs_clarification: true,
            question: Some(clarification_question(direction).to_string()),
        };
    }

    SkillAnalysis {
        level,
        goal: extract_goal(&normalized),
        needs_clarification: false,
        question: None,
    }
}

/// Advanced keywords win over intermediate, intermediate over beginner.
/// No signal at all defaults to `Beginner`.
pub fn infer_level(text: &str) -> SkillLevel {
    MATCHERS
        .ordered
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(level, _)| *level)
        .unwrap_or_default()
}

/// Too short, or hedged with an uncertainty phrase.
pub fn is_vague(text: &str) -> bool {
    if text.split_whitespace().count() < MIN_SPECIFIC_WORDS {
        return true;
    }
    let lower = text.to_lowercase();
    UNCERTAINTY_PHRASES.iter().any(|p| lower.contains(p))
}

/// Strip one filler lead-in, capitalize, and cap at `MAX_GOAL_WORDS` words.
pub fn extract_goal(text: &str) -> String {
    let normalized = normalize_whitespace(text);
    let stripped = strip_lead_in(&normalized);
    let trimmed = stripped
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ':' | '-'))
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '.' | '!' | ',' | ';'));

    let words: Vec<&str> = trimmed.split_whitespace().take(MAX_GOAL_WORDS).collect();
    capitalize_first(&words.join(" "))
}

fn strip_lead_in(text: &str) -> &str {
    for lead_in in &MATCHERS.lead_ins {
        let Some(head) = text.get(..lead_in.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(lead_in) {
            continue;
        }
        let rest = &text[lead_in.len()..];
        // Must end on a word boundary: "learning" is not "learn" + "ing".
        if rest.chars().next().is_none_or(|c| !c.is_alphanumeric()) {
            return rest;
        }
    }
    text
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
