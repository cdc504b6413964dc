//! Retroactive repair: fill derived profile fields and chain assignments.
//!
//! Each user runs as a three-step saga (`fill_profile`, `assign_mentor`,
//! `generate_curriculum`). A failed step is recorded and later steps still
//! run. Every step checks what is already in place first, so a re-run only
//! does the work that is still missing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::audit::AuditTrail;
use crate::error::{RepairError, Result};
use crate::onboarding::manager::OnboardingManager;
use crate::onboarding::model::{Profile, Role, has_text};
use crate::pipeline::{self, SkillDirection, to_skill_domain};

/// Answer keys checked, in order, for a learning direction.
const DIRECTION_ANSWER_KEYS: &[&str] = &[
    "learning_direction",
    "learningDirection",
    "direction",
    "interests",
];

/// Per-user async locks. One user's read-modify-write never interleaves
/// with another task working on the same user.
///
/// An entry lives only while some task holds or waits on it.
#[derive(Debug, Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl UserLocks {
    pub async fn lock(&self, user_id: &str) -> UserLockGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(user_id.to_string()).or_default())
        };
        UserLockGuard {
            locks: self,
            user_id: user_id.to_string(),
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Number of users with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the entry for `user_id` if nobody else holds a handle to it.
    /// Clones are only taken under the map lock, so the count is stable here.
    fn release(&self, user_id: &str) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks.get(user_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(user_id);
        }
    }
}

/// Held lock for one user. Dropping it unlocks and prunes the map entry
/// once no other task is waiting.
#[derive(Debug)]
pub struct UserLockGuard<'a> {
    locks: &'a UserLocks,
    user_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserLockGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.release(&self.user_id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStep {
    FillProfile,
    AssignMentor,
    GenerateCurriculum,
}

impl std::fmt::Display for RepairStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FillProfile => write!(f, "fill_profile"),
            Self::AssignMentor => write!(f, "assign_mentor"),
            Self::GenerateCurriculum => write!(f, "generate_curriculum"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Done,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: RepairStep,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl StepOutcome {
    fn done(step: RepairStep, detail: impl Into<String>) -> Self {
        Self {
            step,
            status: StepStatus::Done,
            detail: Some(detail.into()),
        }
    }

    fn skipped(step: RepairStep, detail: impl Into<String>) -> Self {
        Self {
            step,
            status: StepStatus::Skipped,
            detail: Some(detail.into()),
        }
    }

    fn failed(step: RepairStep, user_id: &str, reason: impl std::fmt::Display) -> Self {
        let err = RepairError::StepFailed {
            step: step.to_string(),
            user_id: user_id.to_string(),
            reason: reason.to_string(),
        };
        Self {
            step,
            status: StepStatus::Failed,
            detail: Some(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    Completed,
    Skipped,
    Error,
}

impl std::fmt::Display for RepairStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Skipped => write!(f, "skipped"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// What happened to one user.
#[derive(Debug, Clone, Serialize)]
pub struct RepairReport {
    pub user_id: String,
    pub status: RepairStatus,
    /// Fields written in this run, in order.
    pub filled: Vec<String>,
    pub steps: Vec<StepOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RepairReport {
    fn skipped(user_id: &str, message: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            status: RepairStatus::Skipped,
            filled: Vec::new(),
            steps: Vec::new(),
            message: Some(message.to_string()),
        }
    }

    fn error(user_id: &str, message: String) -> Self {
        Self {
            user_id: user_id.to_string(),
            status: RepairStatus::Error,
            filled: Vec::new(),
            steps: Vec::new(),
            message: Some(message),
        }
    }
}

/// Result of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct RepairRun {
    pub run_id: Uuid,
    pub reports: Vec<RepairReport>,
}

impl RepairRun {
    pub fn count(&self, status: RepairStatus) -> usize {
        self.reports.iter().filter(|r| r.status == status).count()
    }
}

/// Derive a display name: preferred name, else the email local part.
///
/// `jane.doe42+news@example.com` becomes `Jane Doe`.
pub fn infer_full_name(profile: &Profile) -> Option<(String, &'static str)> {
    if let Some(preferred) = profile.preferred_name.as_deref().map(str::trim)
        && !preferred.is_empty()
    {
        return Some((preferred.to_string(), "preferred_name"));
    }

    let email = profile.email.as_deref()?;
    let local = email.split('@').next()?;
    // drop plus-address tags
    let local = local.split('+').next().unwrap_or_default();

    let name = local
        .split(|c: char| matches!(c, '.' | '_' | '-') || c.is_ascii_digit())
        .filter(|t| !t.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");

    (!name.is_empty()).then_some((name, "email"))
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Find a learning direction in stored answers, else the legacy goal.
pub fn infer_learning_direction(profile: &Profile) -> Option<(String, String)> {
    if let Some(answers) = profile.onboarding_answers.as_ref() {
        for key in DIRECTION_ANSWER_KEYS {
            let text = match answers.get(*key) {
                Some(serde_json::Value::String(s)) => s.trim().to_string(),
                Some(serde_json::Value::Array(values)) => values
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => continue,
            };
            if !text.is_empty() {
                return Some((text, format!("onboarding_answers.{key}")));
            }
        }
    }

    profile
        .legacy_goal
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| (s.to_string(), "legacy_goal".to_string()))
}

/// Fields the profile step still has to produce.
fn missing_required(profile: &Profile) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if !has_text(&profile.full_name) {
        missing.push("full_name");
    }
    if profile.role.is_none() {
        missing.push("role");
    }
    if !has_text(&profile.learning_direction) {
        missing.push("learning_direction");
    }
    missing
}

/// Batch driver. Borrows the manager for its database and user locks.
pub struct RepairJob<'a> {
    manager: &'a OnboardingManager,
    concurrency: usize,
    run_id: Uuid,
}

impl<'a> RepairJob<'a> {
    pub fn new(manager: &'a OnboardingManager, concurrency: usize) -> Self {
        Self {
            manager,
            concurrency: concurrency.max(1),
            run_id: Uuid::new_v4(),
        }
    }

    /// Repair every profile. A failing user is reported and the run goes on.
    pub async fn run(&self) -> Result<RepairRun> {
        let profiles = self.manager.db().list_profiles().await?;
        info!(
            run_id = %self.run_id,
            profiles = profiles.len(),
            concurrency = self.concurrency,
            "Starting retroactive repair"
        );

        let mut indexed: Vec<(usize, RepairReport)> = stream::iter(profiles.into_iter().enumerate())
            .map(|(i, profile)| async move { (i, self.repair_user(&profile.id).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;
        indexed.sort_by_key(|(i, _)| *i);

        let run = RepairRun {
            run_id: self.run_id,
            reports: indexed.into_iter().map(|(_, r)| r).collect(),
        };
        info!(
            run_id = %run.run_id,
            completed = run.count(RepairStatus::Completed),
            skipped = run.count(RepairStatus::Skipped),
            errors = run.count(RepairStatus::Error),
            "Retroactive repair finished"
        );
        Ok(run)
    }

    /// Repair one user under that user's lock, re-reading the profile first.
    pub async fn repair_user(&self, user_id: &str) -> RepairReport {
        let _guard = self.manager.locks().lock(user_id).await;
        let db = self.manager.db();

        let mut profile = match db.get_profile(user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return RepairReport::skipped(user_id, "profile not found"),
            Err(e) => {
                warn!(user_id, error = %e, "Repair could not load profile");
                return RepairReport::error(user_id, e.to_string());
            }
        };

        if profile.role == Some(Role::Mentor) {
            return RepairReport::skipped(user_id, "mentor profile");
        }

        let mut trail = AuditTrail::new(self.run_id, user_id);
        let mut steps = Vec::with_capacity(3);

        steps.push(self.fill_profile(&mut profile, &mut trail).await);

        let missing = missing_required(&profile);
        if !missing.is_empty() {
            let message = format!("missing {}", missing.join(", "));
            steps.push(StepOutcome::skipped(RepairStep::AssignMentor, &message));
            steps.push(StepOutcome::skipped(RepairStep::GenerateCurriculum, &message));
        } else {
            steps.push(self.assign_mentor(&profile, &mut trail).await);
            steps.push(self.generate_curriculum(&profile, &mut trail).await);
        }

        let filled = trail.fields();
        let mut message = None;
        if !trail.is_empty()
            && let Err(e) = db.append_audit_entries(&trail.into_entries()).await
        {
            warn!(user_id, error = %e, "Failed to write repair audit entries");
            message = Some(format!("audit log: {e}"));
        }

        let status = if message.is_some() || steps.iter().any(|s| s.status == StepStatus::Failed) {
            RepairStatus::Error
        } else if !missing.is_empty() {
            message = Some(format!("left incomplete: missing {}", missing.join(", ")));
            RepairStatus::Skipped
        } else if steps.iter().all(|s| s.status == StepStatus::Skipped) {
            message = Some("nothing to repair".to_string());
            RepairStatus::Skipped
        } else {
            RepairStatus::Completed
        };

        if status == RepairStatus::Error {
            warn!(user_id, ?steps, "Repair finished with errors");
        } else {
            debug!(user_id, %status, filled = filled.len(), "User repaired");
        }

        RepairReport {
            user_id: user_id.to_string(),
            status,
            filled,
            steps,
            message,
        }
    }

    /// Fill blank fields one by one and persist if anything changed.
    async fn fill_profile(&self, profile: &mut Profile, trail: &mut AuditTrail) -> StepOutcome {
        let step = RepairStep::FillProfile;
        let before = trail.len();

        if !has_text(&profile.full_name)
            && let Some((name, source)) = infer_full_name(profile)
        {
            trail.record("full_name", source, name.clone());
            profile.full_name = Some(name);
        }

        if profile.role.is_none() {
            trail.record("role", "default", Role::Student.to_string());
            profile.role = Some(Role::Student);
        }

        if !has_text(&profile.learning_direction)
            && let Some((direction, source)) = infer_learning_direction(profile)
        {
            trail.record("learning_direction", &source, direction.clone());
            profile.learning_direction = Some(direction);
        }

        if let Some(text) = profile.learning_direction.clone().filter(|t| !t.trim().is_empty()) {
            // No one is around to answer a clarification in a batch run.
            let direction = pipeline::classify_intent(&text)
                .detected_domain
                .unwrap_or(SkillDirection::Other);

            if profile.inferred_skill_domain.is_none() {
                let domain = to_skill_domain(direction);
                trail.record("inferred_skill_domain", "classifier", domain.label());
                profile.inferred_skill_domain = Some(domain);
            }

            let analysis = pipeline::analyze_skill_level(&text, direction);
            if profile.inferred_skill_level.is_none() {
                trail.record("inferred_skill_level", "skill_extractor", analysis.level.label());
                profile.inferred_skill_level = Some(analysis.level);
            }
            if !has_text(&profile.normalized_learning_goal) && !analysis.goal.is_empty() {
                trail.record("normalized_learning_goal", "skill_extractor", analysis.goal.clone());
                profile.normalized_learning_goal = Some(analysis.goal);
            }
        }

        if missing_required(profile).is_empty() && !profile.onboarding_completed {
            profile.onboarding_completed = true;
            profile.onboarding_completed_at.get_or_insert_with(Utc::now);
            trail.record("onboarding_completed", "repair", "true");
        }

        let filled = trail.len() - before;
        if filled == 0 {
            return StepOutcome::skipped(step, "nothing to fill");
        }

        profile.updated_at = Utc::now();
        match self.manager.db().upsert_profile(profile).await {
            Ok(()) => StepOutcome::done(step, format!("{filled} field(s) filled")),
            Err(e) => StepOutcome::failed(step, &profile.id, e),
        }
    }

    async fn assign_mentor(&self, profile: &Profile, trail: &mut AuditTrail) -> StepOutcome {
        let step = RepairStep::AssignMentor;
        match self.manager.db().get_mentor_assignment(&profile.id).await {
            Ok(Some(_)) => return StepOutcome::skipped(step, "already assigned"),
            Ok(None) => {}
            Err(e) => return StepOutcome::failed(step, &profile.id, e),
        }

        match self.manager.assign_mentor_for(profile).await {
            Ok(Some(result)) => {
                trail.record("mentor_assignment", "mentor_matcher", result.mentor_id.to_string());
                StepOutcome::done(step, format!("{} (score {})", result.mentor_name, result.score))
            }
            Ok(None) => StepOutcome::skipped(step, "no active mentors"),
            Err(e) => StepOutcome::failed(step, &profile.id, e),
        }
    }

    async fn generate_curriculum(&self, profile: &Profile, trail: &mut AuditTrail) -> StepOutcome {
        let step = RepairStep::GenerateCurriculum;
        match self.manager.db().list_curriculum_assignments(&profile.id).await {
            Ok(existing) if !existing.is_empty() => {
                return StepOutcome::skipped(step, "already assigned");
            }
            Ok(_) => {}
            Err(e) => return StepOutcome::failed(step, &profile.id, e),
        }

        match self.manager.generate_curriculum_for(profile).await {
            Ok(plan) if plan.newly_assigned.is_empty() => {
                StepOutcome::skipped(step, "no curriculum content")
            }
            Ok(plan) => {
                trail.record(
                    "curriculum_assignments",
                    "curriculum_engine",
                    plan.newly_assigned.len().to_string(),
                );
                StepOutcome::done(
                    step,
                    format!("{} item(s), {} min", plan.newly_assigned.len(), plan.total_minutes),
                )
            }
            Err(e) => StepOutcome::failed(step, &profile.id, e),
        }
    }
}
