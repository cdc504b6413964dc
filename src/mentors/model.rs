//! Mentor catalog and assignment data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A mentor in the matching catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mentor {
    pub id: Uuid,
    /// Profile id of the mentor's own account, when they have one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub name: String,
    /// Domain taxonomy values, e.g. "Data Science", "Career Guidance".
    #[serde(default)]
    pub specializations: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Mentor {
    /// Create an active mentor with no specializations.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            name: name.into(),
            specializations: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder: set specializations.
    pub fn with_specializations<I, S>(mut self, specializations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.specializations = specializations.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: link to a profile id.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Builder: deactivate.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Case-insensitive specialization check.
    pub fn has_specialization(&self, name: &str) -> bool {
        let name = name.trim();
        self.specializations
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(name))
    }
}

/// Why a learner signed up, as captured by the onboarding form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotivationType {
    CareerChange,
    JobReady,
    Academic,
    Entrepreneurship,
    PersonalProject,
    Upskilling,
    Other,
}

impl MotivationType {
    /// Parse a stored form value. Unknown values are `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "career_change" => Self::CareerChange,
            "job_ready" => Self::JobReady,
            "academic" => Self::Academic,
            "entrepreneurship" => Self::Entrepreneurship,
            "personal_project" => Self::PersonalProject,
            "upskilling" => Self::Upskilling,
            _ => Self::Other,
        }
    }

    /// Mentor specialization that serves this motivation.
    pub fn specialization(&self) -> Option<&'static str> {
        match self {
            Self::CareerChange => Some("Career Guidance"),
            Self::JobReady => Some("Interview Preparation"),
            Self::Academic => Some("Research"),
            Self::Entrepreneurship => Some("Entrepreneurship"),
            Self::PersonalProject => Some("Project Mentoring"),
            Self::Upskilling => Some("Technical Leadership"),
            Self::Other => None,
        }
    }
}

impl std::fmt::Display for MotivationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CareerChange => "career_change",
            Self::JobReady => "job_ready",
            Self::Academic => "academic",
            Self::Entrepreneurship => "entrepreneurship",
            Self::PersonalProject => "personal_project",
            Self::Upskilling => "upskilling",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// The single mentor assignment a user holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserMentorAssignment {
    pub user_id: String,
    pub mentor_id: Uuid,
    /// Scoring rationale for display. Not used for logic.
    pub assignment_reason: String,
    pub score: u32,
    pub assigned_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
