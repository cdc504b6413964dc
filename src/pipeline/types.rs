//! Shared types for the classification pipeline.

use serde::{Deserialize, Serialize};

// ── Skill direction (intent taxonomy) ───────────────────────────────

/// Fine-grained learning direction produced by the intent classifier.
///
/// This is the user-facing vocabulary. Content and mentors are keyed on the
/// coarser [`SkillDomain`]; see `pipeline::domain` for the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillDirection {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "Data Science")]
    DataScience,
    #[serde(rename = "Machine Learning / AI")]
    MachineLearning,
    #[serde(rename = "Backend Engineering")]
    BackendEngineering,
    #[serde(rename = "DevOps & Cloud")]
    DevOpsCloud,
    #[serde(rename = "Cybersecurity")]
    Cybersecurity,
    #[serde(rename = "Game Development")]
    GameDevelopment,
    #[serde(rename = "UI/UX Design")]
    UiUxDesign,
    #[serde(rename = "Blockchain")]
    Blockchain,
    #[serde(rename = "Other")]
    Other,
}

impl SkillDirection {
    /// Every direction, in table order. Score ties between directions are
    /// broken by this order.
    pub const ALL: [SkillDirection; 11] = [
        Self::WebDevelopment,
        Self::MobileDevelopment,
        Self::DataScience,
        Self::MachineLearning,
        Self::BackendEngineering,
        Self::DevOpsCloud,
        Self::Cybersecurity,
        Self::GameDevelopment,
        Self::UiUxDesign,
        Self::Blockchain,
        Self::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::WebDevelopment => "Web Development",
            Self::MobileDevelopment => "Mobile Development",
            Self::DataScience => "Data Science",
            Self::MachineLearning => "Machine Learning / AI",
            Self::BackendEngineering => "Backend Engineering",
            Self::DevOpsCloud => "DevOps & Cloud",
            Self::Cybersecurity => "Cybersecurity",
            Self::GameDevelopment => "Game Development",
            Self::UiUxDesign => "UI/UX Design",
            Self::Blockchain => "Blockchain",
            Self::Other => "Other",
        }
    }

    /// Case-insensitive label lookup. Returns `None` for unknown labels.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(label))
    }
}

impl std::fmt::Display for SkillDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── Skill domain (platform taxonomy) ────────────────────────────────

/// Platform skill domain used to key curriculum items and mentor
/// specializations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillDomain {
    #[serde(rename = "Full Stack Development")]
    FullStack,
    #[serde(rename = "Mobile Development")]
    Mobile,
    #[serde(rename = "Data Science")]
    DataScience,
    #[serde(rename = "Artificial Intelligence")]
    ArtificialIntelligence,
    #[serde(rename = "Cloud & DevOps")]
    CloudDevOps,
    #[serde(rename = "Cybersecurity")]
    Cybersecurity,
    #[serde(rename = "Game Development")]
    GameDevelopment,
    #[serde(rename = "Design")]
    Design,
    #[serde(rename = "Blockchain")]
    Blockchain,
    #[serde(rename = "General")]
    General,
}

impl SkillDomain {
    pub const ALL: [SkillDomain; 10] = [
        Self::FullStack,
        Self::Mobile,
        Self::DataScience,
        Self::ArtificialIntelligence,
        Self::CloudDevOps,
        Self::Cybersecurity,
        Self::GameDevelopment,
        Self::Design,
        Self::Blockchain,
        Self::General,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::FullStack => "Full Stack Development",
            Self::Mobile => "Mobile Development",
            Self::DataScience => "Data Science",
            Self::ArtificialIntelligence => "Artificial Intelligence",
            Self::CloudDevOps => "Cloud & DevOps",
            Self::Cybersecurity => "Cybersecurity",
            Self::GameDevelopment => "Game Development",
            Self::Design => "Design",
            Self::Blockchain => "Blockchain",
            Self::General => "General",
        }
    }

    /// Case-insensitive label lookup; unknown labels fold into `General`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(label))
            .unwrap_or(Self::General)
    }
}

impl std::fmt::Display for SkillDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── Skill level / difficulty ────────────────────────────────────────

/// Learner skill level; also used as curriculum item difficulty.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    /// Sort rank: Beginner < Intermediate < Advanced.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Beginner => 0,
            Self::Intermediate => 1,
            Self::Advanced => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── Classification output ───────────────────────────────────────────

/// Coarse confidence tier for a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{s}")
    }
}

/// Score accumulated by one direction during keyword scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionScore {
    pub direction: SkillDirection,
    pub score: u32,
}

/// Output of the intent classifier. Built fresh for every input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// `None` whenever a clarification is requested.
    pub detected_domain: Option<SkillDirection>,
    pub confidence: Confidence,
    pub needs_clarification: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarification_question: Option<String>,
    /// Directions offered to the user by the clarification question.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<SkillDirection>,
    /// Non-zero direction scores, highest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scores: Vec<DirectionScore>,
}

impl ClassificationResult {
    pub(crate) fn clarify(question: impl Into<String>, candidates: Vec<SkillDirection>) -> Self {
        Self {
            detected_domain: None,
            confidence: Confidence::Low,
            needs_clarification: true,
            clarification_question: Some(question.into()),
            candidates,
            scores: Vec::new(),
        }
    }

    pub(crate) fn detected(direction: SkillDirection, confidence: Confidence) -> Self {
        Self {
            detected_domain: Some(direction),
            confidence,
            needs_clarification: false,
            clarification_question: None,
            candidates: Vec::new(),
            scores: Vec::new(),
        }
    }

    pub(crate) fn with_scores(mut self, scores: Vec<DirectionScore>) -> Self {
        self.scores = scores;
        self
    }
}

/// Output of the skill-level and goal extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillAnalysis {
    pub level: SkillLevel,
    /// Normalized goal phrase; empty when clarification is needed.
    pub goal: String,
    pub needs_clarification: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_display_matches_serde() {
        for direction in SkillDirection::ALL {
            let json = serde_json::to_string(&direction).unwrap();
            assert_eq!(format!("\"{direction}\""), json);
        }
    }

    #[test]
    fn domain_display_matches_serde() {
        for domain in SkillDomain::ALL {
            let json = serde_json::to_string(&domain).unwrap();
            assert_eq!(format!("\"{domain}\""), json);
        }
    }

    #[test]
    fn domain_from_label_is_total() {
        assert_eq!(SkillDomain::from_label("data science"), SkillDomain::DataScience);
        assert_eq!(SkillDomain::from_label("  Design "), SkillDomain::Design);
        assert_eq!(SkillDomain::from_label("Underwater Basketry"), SkillDomain::General);
        assert_eq!(SkillDomain::from_label(""), SkillDomain::General);
    }

    #[test]
    fn direction_from_label() {
        assert_eq!(
            SkillDirection::from_label("machine learning / ai"),
            Some(SkillDirection::MachineLearning)
        );
        assert_eq!(SkillDirection::from_label("nope"), None);
    }

    #[test]
    fn level_rank_orders_difficulty() {
        assert!(SkillLevel::Beginner.rank() < SkillLevel::Intermediate.rank());
        assert!(SkillLevel::Intermediate.rank() < SkillLevel::Advanced.rank());
        assert_eq!(SkillLevel::default(), SkillLevel::Beginner);
        assert_eq!(SkillLevel::from_label("ADVANCED"), Some(SkillLevel::Advanced));
    }

    #[test]
    fn classification_serde_skips_empty_fields() {
        let result = ClassificationResult::detected(SkillDirection::DataScience, Confidence::High);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["detected_domain"], "Data Science");
        assert_eq!(json["confidence"], "high");
        assert!(json.get("clarification_question").is_none());
        assert!(json.get("candidates").is_none());
    }
}
