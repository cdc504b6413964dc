//! OnboardingManager: the functional entry points over a `Database`.
//!
//! Classification, skill analysis and gate decisions are pure; everything
//! that reads or writes a user's rows runs under that user's lock so
//! concurrent callers cannot interleave a read-modify-write.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::curriculum::engine::{self, CurriculumPlan};
use crate::curriculum::model::{AssignmentStatus, CurriculumItem, UserCurriculumAssignment};
use crate::error::{AssignmentError, ConfigError, DatabaseError, Error, Result};
use crate::mentors::matcher::select_mentor;
use crate::mentors::model::{Mentor, MotivationType, UserMentorAssignment};
use crate::pipeline::{
    self, ClassificationResult, SkillAnalysis, SkillDirection, SkillDomain, to_skill_domain,
};
use crate::rate_limit::KeyedRateLimiter;
use crate::repair::{RepairJob, RepairRun, UserLocks};
use crate::store::Database;

use super::gate::{GateDecision, check_gate};
use super::model::Profile;

/// Outcome of `assign_mentor`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MentorAssignmentResult {
    pub mentor_id: Uuid,
    pub mentor_name: String,
    pub reason: String,
    pub score: u32,
}

/// Outcome of `submit_learning_direction`.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub classification: ClassificationResult,
    /// Present once a concrete direction was detected.
    pub analysis: Option<SkillAnalysis>,
    pub domain: Option<SkillDomain>,
}

impl Submission {
    /// The follow-up question to show, if any.
    pub fn question(&self) -> Option<&str> {
        self.classification
            .clarification_question
            .as_deref()
            .or_else(|| self.analysis.as_ref().and_then(|a| a.question.as_deref()))
    }
}

/// Mentors and curriculum items to load into the catalog.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Catalog {
    #[serde(default)]
    pub mentors: Vec<Mentor>,
    #[serde(default)]
    pub curriculum: Vec<CurriculumItem>,
}

impl Catalog {
    pub fn from_json_str(json: &str) -> std::result::Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(format!("catalog: {e}")))
    }

    pub fn load(path: &Path) -> std::result::Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// Counts written by `seed_catalog`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub mentors: usize,
    pub curriculum_items: usize,
}

/// Coordinates classification, matching, curriculum, gate and repair.
pub struct OnboardingManager {
    db: Arc<dyn Database>,
    limiter: Arc<KeyedRateLimiter>,
    locks: UserLocks,
}

impl OnboardingManager {
    pub fn new(db: Arc<dyn Database>, limiter: Arc<KeyedRateLimiter>) -> Self {
        Self {
            db,
            limiter,
            locks: UserLocks::default(),
        }
    }

    /// Build with the rate limit from config.
    pub fn from_config(db: Arc<dyn Database>, config: &PipelineConfig) -> Self {
        let limiter =
            KeyedRateLimiter::new(config.classify_rate_limit, config.classify_rate_window);
        Self::new(db, Arc::new(limiter))
    }

    pub fn db(&self) -> &Arc<dyn Database> {
        &self.db
    }

    pub(crate) fn locks(&self) -> &UserLocks {
        &self.locks
    }

    // ── Pure pipeline ───────────────────────────────────────────────

    /// Classify free text. Pure and unlimited.
    pub fn classify_intent(&self, text: &str) -> ClassificationResult {
        pipeline::classify_intent(text)
    }

    /// Classify on behalf of a user, subject to the per-user rate limit.
    pub fn classify_for_user(&self, user_id: &str, text: &str) -> Result<ClassificationResult> {
        if !self.limiter.check(user_id) {
            warn!(user_id, "Classification rate limited");
            return Err(Error::RateLimited {
                key: user_id.to_string(),
            });
        }
        Ok(pipeline::classify_intent(text))
    }

    pub fn analyze_skill_level(&self, text: &str, direction: SkillDirection) -> SkillAnalysis {
        pipeline::analyze_skill_level(text, direction)
    }

    // ── Profile writes ──────────────────────────────────────────────

    /// Store a learner's learning-direction answer with whatever could be
    /// derived from it. A clarification stores the raw text only.
    ///
    /// Derived fields always describe the stored text: anything this answer
    /// does not produce is cleared.
    pub async fn submit_learning_direction(&self, user_id: &str, text: &str) -> Result<Submission> {
        let _guard = self.locks.lock(user_id).await;

        let mut profile = self
            .db
            .get_profile(user_id)
            .await?
            .unwrap_or_else(|| Profile::new(user_id));

        let classification = pipeline::classify_intent(text);
        profile.learning_direction = Some(text.trim().to_string());
        profile.inferred_skill_domain = None;
        profile.inferred_skill_level = None;
        profile.normalized_learning_goal = None;

        let mut submission = Submission {
            classification,
            analysis: None,
            domain: None,
        };

        if let Some(direction) = submission.classification.detected_domain
            && !submission.classification.needs_clarification
        {
            let domain = to_skill_domain(direction);
            let analysis = pipeline::analyze_skill_level(text, direction);

            profile.inferred_skill_domain = Some(domain);
            profile.inferred_skill_level = Some(analysis.level);
            if !analysis.goal.is_empty() {
                profile.normalized_learning_goal = Some(analysis.goal.clone());
            }
            submission.domain = Some(domain);
            submission.analysis = Some(analysis);
        }

        profile.updated_at = Utc::now();
        self.db.upsert_profile(&profile).await?;

        info!(
            user_id,
            domain = ?submission.domain,
            needs_clarification = submission.question().is_some(),
            "Learning direction submitted"
        );
        Ok(submission)
    }

    // ── Mentor matching ─────────────────────────────────────────────

    /// Match the user with a mentor and store the single assignment row.
    ///
    /// `None` only when the catalog has no active mentor.
    pub async fn assign_mentor(&self, user_id: &str) -> Result<Option<MentorAssignmentResult>> {
        let _guard = self.locks.lock(user_id).await;
        let profile = self.require_profile(user_id).await?;
        self.assign_mentor_for(&profile).await
    }

    /// Caller must hold the user's lock.
    pub(crate) async fn assign_mentor_for(
        &self,
        profile: &Profile,
    ) -> Result<Option<MentorAssignmentResult>> {
        let mentors = self.db.list_active_mentors().await?;
        let motivation = profile.motivation_type.as_deref().map(MotivationType::parse);
        let domain = profile.skill_domain();

        let Some(matched) = select_mentor(&mentors, domain, motivation) else {
            info!(user_id = %profile.id, "No active mentors, nothing assigned");
            return Ok(None);
        };

        let now = Utc::now();
        let assignment = UserMentorAssignment {
            user_id: profile.id.clone(),
            mentor_id: matched.mentor.id,
            assignment_reason: matched.reason(),
            score: matched.score,
            assigned_at: now,
            updated_at: now,
        };
        self.db.upsert_mentor_assignment(&assignment).await?;

        info!(
            user_id = %profile.id,
            mentor = %matched.mentor.name,
            score = matched.score,
            domain = %domain,
            "Mentor assigned"
        );
        Ok(Some(MentorAssignmentResult {
            mentor_id: matched.mentor.id,
            mentor_name: matched.mentor.name,
            reason: assignment.assignment_reason,
            score: assignment.score,
        }))
    }

    // ── Curriculum ──────────────────────────────────────────────────

    /// Recommend curriculum and insert only the items not yet assigned.
    pub async fn generate_curriculum(&self, user_id: &str) -> Result<CurriculumPlan> {
        let _guard = self.locks.lock(user_id).await;
        let profile = self.require_profile(user_id).await?;
        self.generate_curriculum_for(&profile).await
    }

    /// Caller must hold the user's lock.
    pub(crate) async fn generate_curriculum_for(
        &self,
        profile: &Profile,
    ) -> Result<CurriculumPlan> {
        let domain = profile.skill_domain();
        let domain_items = self.db.list_curriculum_items(domain).await?;
        let general_items = if domain_items.is_empty() && domain != SkillDomain::General {
            self.db.list_curriculum_items(SkillDomain::General).await?
        } else {
            Vec::new()
        };

        let count = engine::items_for_commitment(profile.time_commitment.as_deref());
        let items = engine::recommend(&domain_items, &general_items, count);

        let existing: HashSet<Uuid> = self
            .db
            .list_curriculum_assignments(&profile.id)
            .await?
            .into_iter()
            .map(|a| a.curriculum_item_id)
            .collect();

        let mut newly_assigned = Vec::new();
        for item_id in engine::assignment_delta(&items, &existing) {
            let assignment = UserCurriculumAssignment::new(profile.id.clone(), item_id);
            if self.db.insert_curriculum_assignment(&assignment).await? {
                newly_assigned.push(item_id);
            }
        }

        let plan = CurriculumPlan {
            domain: items.first().map(|i| i.skill_domain).unwrap_or(domain),
            total_minutes: engine::total_minutes(&items),
            items,
            newly_assigned,
        };
        info!(
            user_id = %profile.id,
            domain = %plan.domain,
            items = plan.items.len(),
            new = plan.newly_assigned.len(),
            "Curriculum generated"
        );
        Ok(plan)
    }

    /// Move one assignment forward. Regressions are rejected.
    pub async fn update_curriculum_progress(
        &self,
        user_id: &str,
        item_id: Uuid,
        status: AssignmentStatus,
    ) -> Result<UserCurriculumAssignment> {
        let _guard = self.locks.lock(user_id).await;

        let mut assignment = self
            .db
            .get_curriculum_assignment(user_id, item_id)
            .await?
            .ok_or_else(|| AssignmentError::NotAssigned {
                user_id: user_id.to_string(),
                item_id,
            })?;

        if assignment.advance(status)? {
            self.db.update_curriculum_assignment(&assignment).await?;
            debug!(user_id, item_id = %item_id, status = %status, "Curriculum progress updated");
        }
        Ok(assignment)
    }

    // ── Gate ────────────────────────────────────────────────────────

    /// Redirect decision for a navigation, from the stored profile.
    pub async fn check_onboarding_gate(
        &self,
        user_id: Option<&str>,
        current_path: &str,
    ) -> Result<GateDecision> {
        let profile = match user_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => self.db.get_profile(id).await?,
            None => None,
        };
        Ok(check_gate(user_id, profile.as_ref(), current_path))
    }

    // ── Batch ───────────────────────────────────────────────────────

    /// Fill derived fields for every incomplete profile and chain mentor
    /// and curriculum assignment. Safe to re-run.
    pub async fn run_retroactive_repair(&self, concurrency: usize) -> Result<RepairRun> {
        RepairJob::new(self, concurrency).run().await
    }

    /// Upsert catalog mentors and items by id.
    pub async fn seed_catalog(&self, catalog: &Catalog) -> Result<SeedSummary> {
        for mentor in &catalog.mentors {
            self.db.upsert_mentor(mentor).await?;
        }
        for item in &catalog.curriculum {
            self.db.upsert_curriculum_item(item).await?;
        }
        let summary = SeedSummary {
            mentors: catalog.mentors.len(),
            curriculum_items: catalog.curriculum.len(),
        };
        info!(mentors = summary.mentors, items = summary.curriculum_items, "Catalog seeded");
        Ok(summary)
    }

    async fn require_profile(&self, user_id: &str) -> Result<Profile> {
        self.db.get_profile(user_id).await?.ok_or_else(|| {
            Error::from(DatabaseError::NotFound {
                entity: "profile".to_string(),
                id: user_id.to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::onboarding::gate::{DASHBOARD_PATH, ONBOARDING_PATH};
    use crate::onboarding::model::Role;
    use crate::pipeline::SkillLevel;
    use crate::store::LibSqlBackend;

    const SENIOR_DATA_SCIENTIST: &str =
        "I want to become a senior data scientist working with pandas and statistics";

    async fn test_manager() -> OnboardingManager {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let limiter = KeyedRateLimiter::new(2, Duration::from_secs(60));
        OnboardingManager::new(Arc::new(db), Arc::new(limiter))
    }

    fn student(id: &str, domain: SkillDomain, commitment: &str) -> Profile {
        let mut p = Profile::new(id).with_role(Role::Student);
        p.full_name = Some("Test Learner".into());
        p.motivation_type = Some("career_change".into());
        p.current_skill_level = Some("beginner".into());
        p.time_commitment = Some(commitment.into());
        p.institution = Some("Open University".into());
        p.inferred_skill_domain = Some(domain);
        p
    }

    #[test]
    fn catalog_parse_errors_are_config_errors() {
        let err = Catalog::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        let empty = Catalog::from_json_str("{}").unwrap();
        assert!(empty.mentors.is_empty() && empty.curriculum.is_empty());
    }

    #[tokio::test]
    async fn classify_for_user_is_rate_limited_per_user() {
        let mgr = test_manager().await;
        assert!(mgr.classify_for_user("u1", "java").is_ok());
        assert!(mgr.classify_for_user("u1", "java").is_ok());
        let err = mgr.classify_for_user("u1", "java").unwrap_err();
        assert!(matches!(err, Error::RateLimited { ref key } if key == "u1"));
        assert!(mgr.classify_for_user("u2", "java").is_ok());
        // the pure entry point is never limited
        for _ in 0..5 {
            assert!(mgr.classify_intent("java").needs_clarification);
        }
    }

    #[tokio::test]
    async fn submit_stores_derived_fields() {
        let mgr = test_manager().await;
        let text = SENIOR_DATA_SCIENTIST;
        let submission = mgr.submit_learning_direction("u1", text).await.unwrap();
        assert_eq!(submission.domain, Some(SkillDomain::DataScience));

        let profile = mgr.db().get_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.learning_direction.as_deref(), Some(text));
        assert_eq!(profile.inferred_skill_domain, Some(SkillDomain::DataScience));
        assert_eq!(profile.inferred_skill_level, Some(SkillLevel::Advanced));
    }

    #[tokio::test]
    async fn submit_clarification_stores_raw_text_only() {
        let mgr = test_manager().await;
        let submission = mgr.submit_learning_direction("u1", "java").await.unwrap();
        assert!(submission.question().is_some());
        assert!(submission.domain.is_none());

        let profile = mgr.db().get_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.learning_direction.as_deref(), Some("java"));
        assert!(profile.inferred_skill_domain.is_none());
    }

    #[tokio::test]
    async fn resubmission_replaces_derived_fields() {
        let mgr = test_manager().await;
        mgr.submit_learning_direction("u1", SENIOR_DATA_SCIENTIST).await.unwrap();
        let first = mgr.db().get_profile("u1").await.unwrap().unwrap();
        assert_eq!(first.inferred_skill_domain, Some(SkillDomain::DataScience));
        assert!(first.normalized_learning_goal.is_some());

        let submission = mgr.submit_learning_direction("u1", "java").await.unwrap();
        assert!(submission.question().is_some());

        let profile = mgr.db().get_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.learning_direction.as_deref(), Some("java"));
        assert_eq!(profile.inferred_skill_domain, None);
        assert_eq!(profile.inferred_skill_level, None);
        assert_eq!(profile.normalized_learning_goal, None);
        assert_eq!(profile.skill_domain(), SkillDomain::General);
    }

    #[tokio::test]
    async fn vague_goal_clears_previous_goal() {
        let mgr = test_manager().await;
        mgr.submit_learning_direction("u1", SENIOR_DATA_SCIENTIST).await.unwrap();

        // concrete direction, but too short to normalize a goal from
        let submission = mgr.submit_learning_direction("u1", "pandas dashboards").await.unwrap();
        let analysis = submission.analysis.expect("direction detected");
        assert!(analysis.needs_clarification);

        let profile = mgr.db().get_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.inferred_skill_domain, Some(SkillDomain::DataScience));
        assert_eq!(profile.inferred_skill_level, Some(SkillLevel::Beginner));
        assert_eq!(profile.normalized_learning_goal, None);
    }

    #[tokio::test]
    async fn unknown_users_leave_no_lock_entries() {
        let mgr = test_manager().await;
        for i in 0..500 {
            let user = format!("ghost-{i}");
            assert!(mgr.assign_mentor(&user).await.is_err());
        }
        mgr.submit_learning_direction("u1", "java").await.unwrap();
        assert_eq!(mgr.locks().len(), 0);
    }

    #[tokio::test]
    async fn assign_mentor_requires_profile() {
        let mgr = test_manager().await;
        let err = mgr.assign_mentor("ghost").await.unwrap_err();
        assert!(matches!(err, Error::Database(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn assign_mentor_without_mentors_is_none() {
        let mgr = test_manager().await;
        mgr.db()
            .upsert_profile(&student("u1", SkillDomain::Design, "casual"))
            .await
            .unwrap();
        assert!(mgr.assign_mentor("u1").await.unwrap().is_none());
        assert!(mgr.db().get_mentor_assignment("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn progress_moves_forward_only() {
        let mgr = test_manager().await;
        let item = CurriculumItem::new("Intro", SkillDomain::General, SkillLevel::Beginner, 20, 1);
        mgr.seed_catalog(&Catalog {
            mentors: vec![],
            curriculum: vec![item.clone()],
        })
        .await
        .unwrap();
        mgr.db()
            .upsert_profile(&student("u1", SkillDomain::General, "regular"))
            .await
            .unwrap();
        mgr.generate_curriculum("u1").await.unwrap();

        let a = mgr
            .update_curriculum_progress("u1", item.id, AssignmentStatus::Completed)
            .await
            .unwrap();
        assert_eq!(a.status, AssignmentStatus::Completed);

        let err = mgr
            .update_curriculum_progress("u1", item.id, AssignmentStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Assignment(AssignmentError::InvalidTransition { .. })
        ));

        let err = mgr
            .update_curriculum_progress("u2", item.id, AssignmentStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Assignment(AssignmentError::NotAssigned { .. })));
    }

    #[tokio::test]
    async fn gate_reads_stored_profile() {
        let mgr = test_manager().await;
        let mut profile = student("u1", SkillDomain::General, "casual");
        profile.institution = None;
        mgr.db().upsert_profile(&profile).await.unwrap();

        let d = mgr.check_onboarding_gate(Some("u1"), "/dashboard").await.unwrap();
        assert_eq!(d.redirect_to.as_deref(), Some(ONBOARDING_PATH));

        profile.institution = Some("Somewhere".into());
        mgr.db().upsert_profile(&profile).await.unwrap();
        let d = mgr.check_onboarding_gate(Some("u1"), "/dashboard").await.unwrap();
        assert_eq!(d.redirect_to, None);
        let d = mgr.check_onboarding_gate(Some("u1"), "/onboarding").await.unwrap();
        assert_eq!(d.redirect_to.as_deref(), Some(DASHBOARD_PATH));

        let d = mgr.check_onboarding_gate(None, "/dashboard").await.unwrap();
        assert_eq!(d.redirect_to.as_deref(), Some("/auth"));
    }
}
