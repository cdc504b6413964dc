//! Curriculum catalog and per-user assignment model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AssignmentError;
use crate::pipeline::types::{SkillDomain, SkillLevel};

/// One item of the static curriculum catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurriculumItem {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub skill_domain: SkillDomain,
    pub difficulty: SkillLevel,
    pub estimated_minutes: u32,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl CurriculumItem {
    pub fn new(
        title: impl Into<String>,
        skill_domain: SkillDomain,
        difficulty: SkillLevel,
        estimated_minutes: u32,
        display_order: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            skill_domain,
            difficulty,
            estimated_minutes,
            display_order,
            is_active: true,
        }
    }
}

/// Progress of a user on one curriculum item. Moves forward only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    #[default]
    Assigned,
    InProgress,
    Completed,
}

impl AssignmentStatus {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: AssignmentStatus) -> bool {
        use AssignmentStatus::*;
        matches!(
            (self, target),
            (Assigned, InProgress) | (Assigned, Completed) | (InProgress, Completed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assigned" => Ok(Self::Assigned),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Unknown assignment status: {s}")),
        }
    }
}

/// A curriculum item assigned to a user. Unique per (user, item).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserCurriculumAssignment {
    pub id: Uuid,
    pub user_id: String,
    pub curriculum_item_id: Uuid,
    pub status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl UserCurriculumAssignment {
    pub fn new(user_id: impl Into<String>, curriculum_item_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            curriculum_item_id,
            status: AssignmentStatus::Assigned,
            assigned_at: now,
            started_at: None,
            completed_at: None,
            updated_at: now,
        }
    }

    /// Move to `target`, stamping start/completion times.
    ///
    /// Re-applying the current status is a no-op and returns `Ok(false)`.
    pub fn advance(&mut self, target: AssignmentStatus) -> Result<bool, AssignmentError> {
        if self.status == target {
            return Ok(false);
        }
        if !self.status.can_transition_to(target) {
            return Err(AssignmentError::InvalidTransition {
                item_id: self.curriculum_item_id,
                state: self.status.to_string(),
                target: target.to_string(),
            });
        }

        let now = Utc::now();
        if target == AssignmentStatus::InProgress || self.started_at.is_none() {
            self.started_at = Some(now);
        }
        if target == AssignmentStatus::Completed {
            self.completed_at = Some(now);
        }
        self.status = target;
        self.updated_at = now;
        Ok(true)
    }
}
