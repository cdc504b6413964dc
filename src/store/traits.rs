//! Unified `Database` trait: single async interface for all persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::curriculum::model::{CurriculumItem, UserCurriculumAssignment};
use crate::error::DatabaseError;
use crate::mentors::model::{Mentor, UserMentorAssignment};
use crate::onboarding::model::Profile;
use crate::pipeline::types::SkillDomain;
use crate::repair::audit::AuditEntry;

/// Backend-agnostic database trait covering profiles, catalogs,
/// assignments and the repair audit log.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Profiles ────────────────────────────────────────────────────

    /// Get a profile by user id.
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, DatabaseError>;

    /// Insert or fully overwrite a profile. Profiles are never deleted.
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), DatabaseError>;

    /// All profiles, oldest first.
    async fn list_profiles(&self) -> Result<Vec<Profile>, DatabaseError>;

    // ── Mentors ─────────────────────────────────────────────────────

    /// Insert or update a mentor by id.
    async fn upsert_mentor(&self, mentor: &Mentor) -> Result<(), DatabaseError>;

    /// Active mentors in catalog (registration) order.
    async fn list_active_mentors(&self) -> Result<Vec<Mentor>, DatabaseError>;

    /// The user's mentor assignment, if any.
    async fn get_mentor_assignment(
        &self,
        user_id: &str,
    ) -> Result<Option<UserMentorAssignment>, DatabaseError>;

    /// Insert or overwrite the single assignment row for the user.
    ///
    /// Writing identical values leaves the stored row untouched.
    async fn upsert_mentor_assignment(
        &self,
        assignment: &UserMentorAssignment,
    ) -> Result<(), DatabaseError>;

    // ── Curriculum ──────────────────────────────────────────────────

    /// Insert or update a catalog item by id.
    async fn upsert_curriculum_item(&self, item: &CurriculumItem) -> Result<(), DatabaseError>;

    /// Active items for a domain, ordered by display order.
    async fn list_curriculum_items(
        &self,
        domain: SkillDomain,
    ) -> Result<Vec<CurriculumItem>, DatabaseError>;

    /// A user's curriculum assignments in assignment order.
    async fn list_curriculum_assignments(
        &self,
        user_id: &str,
    ) -> Result<Vec<UserCurriculumAssignment>, DatabaseError>;

    /// One assignment by (user, item).
    async fn get_curriculum_assignment(
        &self,
        user_id: &str,
        item_id: Uuid,
    ) -> Result<Option<UserCurriculumAssignment>, DatabaseError>;

    /// Insert an assignment unless the (user, item) pair already exists.
    /// Returns whether a row was inserted.
    async fn insert_curriculum_assignment(
        &self,
        assignment: &UserCurriculumAssignment,
    ) -> Result<bool, DatabaseError>;

    /// Persist status and timestamps of an existing assignment.
    async fn update_curriculum_assignment(
        &self,
        assignment: &UserCurriculumAssignment,
    ) -> Result<(), DatabaseError>;

    // ── Repair audit log ────────────────────────────────────────────

    /// Append entries. Existing entries are never modified.
    async fn append_audit_entries(&self, entries: &[AuditEntry]) -> Result<(), DatabaseError>;

    /// Audit entries, optionally for one user, oldest first.
    async fn list_audit_entries(
        &self,
        user_id: Option<&str>,
    ) -> Result<Vec<AuditEntry>, DatabaseError>;
}
