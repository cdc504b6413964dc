//! Learner/mentor profile data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::types::{SkillDomain, SkillLevel};

/// Which onboarding track a user is on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Mentor,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Student => write!(f, "student"),
            Self::Mentor => write!(f, "mentor"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "mentor" => Ok(Self::Mentor),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A user profile row.
///
/// `onboarding_completed` and `mentor_onboarding_completed` are advisory
/// only. Completion is always recomputed from the raw fields through
/// [`Profile::missing_student_fields`] / [`Profile::missing_mentor_fields`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Authenticated user id.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_name: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,

    // ── Student onboarding answers ──
    #[serde(default)]
    pub motivation_type: Option<String>,
    /// Self-declared level from the onboarding form.
    #[serde(default)]
    pub current_skill_level: Option<String>,
    /// "casual", "regular" or "intensive".
    #[serde(default)]
    pub time_commitment: Option<String>,
    /// Free-text "what do you want to learn".
    #[serde(default)]
    pub learning_direction: Option<String>,
    #[serde(default)]
    pub learning_goal: Option<String>,

    // ── Legacy sources used by the repair job ──
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_answers: Option<serde_json::Value>,

    // ── Derived by the pipeline ──
    #[serde(default)]
    pub inferred_skill_domain: Option<SkillDomain>,
    #[serde(default)]
    pub inferred_skill_level: Option<SkillLevel>,
    #[serde(default)]
    pub normalized_learning_goal: Option<String>,

    // ── Mentor onboarding answers ──
    #[serde(default)]
    pub mentor_expertise: Vec<String>,
    #[serde(default)]
    pub mentor_experience_level: Option<String>,
    #[serde(default)]
    pub mentor_availability: Option<String>,

    // ── Advisory flags ──
    #[serde(default)]
    pub onboarding_completed: bool,
    #[serde(default)]
    pub mentor_onboarding_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// True when the value is present and not just whitespace.
pub fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

impl Profile {
    /// Create an empty profile for an authenticated user.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            email: None,
            role: None,
            full_name: None,
            preferred_name: None,
            institution: None,
            motivation_type: None,
            current_skill_level: None,
            time_commitment: None,
            learning_direction: None,
            learning_goal: None,
            legacy_goal: None,
            onboarding_answers: None,
            inferred_skill_domain: None,
            inferred_skill_level: None,
            normalized_learning_goal: None,
            mentor_expertise: Vec::new(),
            mentor_experience_level: None,
            mentor_availability: None,
            onboarding_completed: false,
            mentor_onboarding_completed: false,
            onboarding_completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder: set role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Builder: set email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Student fields still blank, in form order.
    pub fn missing_student_fields(&self) -> Vec<&'static str> {
        [
            ("full_name", &self.full_name),
            ("motivation_type", &self.motivation_type),
            ("current_skill_level", &self.current_skill_level),
            ("time_commitment", &self.time_commitment),
            ("institution", &self.institution),
        ]
        .into_iter()
        .filter(|(_, value)| !has_text(value))
        .map(|(name, _)| name)
        .collect()
    }

    /// Mentor fields still blank.
    pub fn missing_mentor_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.mentor_expertise.iter().any(|e| !e.trim().is_empty()) {
            missing.push("mentor_expertise");
        }
        if !has_text(&self.mentor_experience_level) {
            missing.push("mentor_experience_level");
        }
        if !has_text(&self.mentor_availability) {
            missing.push("mentor_availability");
        }
        missing
    }

    /// Derived student completion.
    pub fn is_student_onboarding_complete(&self) -> bool {
        self.missing_student_fields().is_empty()
    }

    /// Derived mentor completion.
    pub fn is_mentor_onboarding_complete(&self) -> bool {
        self.missing_mentor_fields().is_empty()
    }

    /// Derived completion for whichever role the profile holds.
    pub fn is_onboarding_complete(&self) -> bool {
        match self.role {
            Some(Role::Student) => self.is_student_onboarding_complete(),
            Some(Role::Mentor) => self.is_mentor_onboarding_complete(),
            None => false,
        }
    }

    /// Domain used for matching and curriculum; unset means `General`.
    pub fn skill_domain(&self) -> SkillDomain {
        self.inferred_skill_domain.unwrap_or(SkillDomain::General)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_student() -> Profile {
        let mut p = Profile::new("u1").with_role(Role::Student);
        p.full_name = Some("Ada Lovelace".into());
        p.motivation_type = Some("career_change".into());
        p.current_skill_level = Some("beginner".into());
        p.time_commitment = Some("casual".into());
        p.institution = Some("Analytical College".into());
        p
    }

    #[test]
    fn new_profile_is_blank() {
        let p = Profile::new("u1");
        assert!(p.role.is_none());
        assert!(!p.onboarding_completed);
        assert_eq!(p.missing_student_fields().len(), 5);
        assert!(!p.is_onboarding_complete());
    }

    #[test]
    fn student_completion_is_derived_not_flagged() {
        let mut p = complete_student();
        assert!(p.is_onboarding_complete());

        // the advisory flag does not count
        p.institution = None;
        p.onboarding_completed = true;
        assert!(!p.is_onboarding_complete());
        assert_eq!(p.missing_student_fields(), vec!["institution"]);
    }

    #[test]
    fn whitespace_counts_as_missing() {
        let mut p = complete_student();
        p.full_name = Some("   ".into());
        assert_eq!(p.missing_student_fields(), vec!["full_name"]);
    }

    #[test]
    fn mentor_completion() {
        let mut p = Profile::new("m1").with_role(Role::Mentor);
        assert_eq!(p.missing_mentor_fields().len(), 3);

        p.mentor_expertise = vec!["  ".into()];
        p.mentor_experience_level = Some("senior".into());
        p.mentor_availability = Some("weekends".into());
        assert_eq!(p.missing_mentor_fields(), vec!["mentor_expertise"]);

        p.mentor_expertise = vec!["Data Science".into()];
        assert!(p.is_onboarding_complete());
    }

    #[test]
    fn role_parse_and_display() {
        assert_eq!("Mentor".parse::<Role>().unwrap(), Role::Mentor);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Student.to_string(), "student");
        assert_eq!(serde_json::to_string(&Role::Student).unwrap(), "\"student\"");
    }

    #[test]
    fn profile_serde_roundtrip() {
        let mut p = complete_student();
        p.inferred_skill_domain = Some(SkillDomain::DataScience);
        p.inferred_skill_level = Some(SkillLevel::Intermediate);
        p.onboarding_answers = Some(serde_json::json!({"learning_direction": "data"}));

        let json = serde_json::to_string(&p).unwrap();
        let parsed: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, p);
        assert_eq!(parsed.skill_domain(), SkillDomain::DataScience);
    }

    #[test]
    fn skill_domain_defaults_to_general() {
        assert_eq!(Profile::new("x").skill_domain(), SkillDomain::General);
    }
}
