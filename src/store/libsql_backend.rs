//! libSQL backend: async `Database` trait implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::curriculum::model::{AssignmentStatus, CurriculumItem, UserCurriculumAssignment};
use crate::error::DatabaseError;
use crate::mentors::model::{Mentor, UserMentorAssignment};
use crate::onboarding::model::{Profile, Role};
use crate::pipeline::types::{SkillDomain, SkillLevel};
use crate::repair::audit::AuditEntry;
use crate::store::migrations;
use crate::store::traits::Database;

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    // Try RFC 3339 first (our canonical write format)
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    // Try SQLite datetime() output with fractional seconds
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    // Try SQLite datetime() output without fractional seconds
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn parse_optional_datetime(s: &Option<String>) -> Option<DateTime<Utc>> {
    s.as_ref().map(|s| parse_datetime(s))
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid, DatabaseError> {
    s.parse()
        .map_err(|e| DatabaseError::Serialization(format!("{what}: invalid uuid {s:?}: {e}")))
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

fn opt_datetime(dt: Option<DateTime<Utc>>) -> libsql::Value {
    opt_text(dt.map(|d| d.to_rfc3339()).as_deref())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T, what: &str) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::Serialization(format!("{what}: {e}")))
}

const PROFILE_COLUMNS: &str = "id, email, role, full_name, preferred_name, institution, \
    motivation_type, current_skill_level, time_commitment, learning_direction, learning_goal, \
    legacy_goal, onboarding_answers, inferred_skill_domain, inferred_skill_level, \
    normalized_learning_goal, mentor_expertise, mentor_experience_level, mentor_availability, \
    onboarding_completed, mentor_onboarding_completed, onboarding_completed_at, created_at, \
    updated_at";

const MENTOR_COLUMNS: &str =
    "id, user_id, name, specializations, is_active, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, title, description, skill_domain, difficulty, estimated_minutes, display_order, is_active";

const ASSIGNMENT_COLUMNS: &str = "id, user_id, curriculum_item_id, status, assigned_at, \
    started_at, completed_at, updated_at";

const MENTOR_ASSIGNMENT_COLUMNS: &str =
    "user_id, mentor_id, assignment_reason, score, assigned_at, updated_at";

const AUDIT_COLUMNS: &str = "id, run_id, user_id, field, source, value, created_at";

/// Map a libsql Row to a Profile. Column order matches PROFILE_COLUMNS.
fn row_to_profile(row: &libsql::Row) -> Result<Profile, DatabaseError> {
    let text = |i: i32| row.get::<String>(i).ok();

    let id: String = row
        .get(0)
        .map_err(|e| DatabaseError::Query(format!("profile id: {e}")))?;
    let role = text(2)
        .map(|s| s.parse::<Role>())
        .transpose()
        .map_err(DatabaseError::Serialization)?;
    let onboarding_answers = text(12)
        .map(|s| serde_json::from_str::<serde_json::Value>(&s))
        .transpose()
        .map_err(|e| DatabaseError::Serialization(format!("onboarding_answers: {e}")))?;
    let mentor_expertise: Vec<String> =
        serde_json::from_str(&text(16).unwrap_or_else(|| "[]".to_string()))
            .map_err(|e| DatabaseError::Serialization(format!("mentor_expertise: {e}")))?;
    let created_str: String = row.get(22).unwrap_or_default();
    let updated_str: String = row.get(23).unwrap_or_default();

    Ok(Profile {
        id,
        email: text(1),
        role,
        full_name: text(3),
        preferred_name: text(4),
        institution: text(5),
        motivation_type: text(6),
        current_skill_level: text(7),
        time_commitment: text(8),
        learning_direction: text(9),
        learning_goal: text(10),
        legacy_goal: text(11),
        onboarding_answers,
        inferred_skill_domain: text(13).map(|s| SkillDomain::from_label(&s)),
        inferred_skill_level: text(14).and_then(|s| SkillLevel::from_label(&s)),
        normalized_learning_goal: text(15),
        mentor_expertise,
        mentor_experience_level: text(17),
        mentor_availability: text(18),
        onboarding_completed: row.get::<i64>(19).unwrap_or(0) != 0,
        mentor_onboarding_completed: row.get::<i64>(20).unwrap_or(0) != 0,
        onboarding_completed_at: parse_optional_datetime(&text(21)),
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

fn row_to_mentor(row: &libsql::Row) -> Result<Mentor, DatabaseError> {
    let id_str: String = row.get(0).unwrap_or_default();
    let specializations_str: String = row.get(3).unwrap_or_else(|_| "[]".to_string());
    let created_str: String = row.get(5).unwrap_or_default();
    let updated_str: String = row.get(6).unwrap_or_default();

    Ok(Mentor {
        id: parse_uuid(&id_str, "mentor id")?,
        user_id: row.get::<String>(1).ok(),
        name: row.get(2).unwrap_or_default(),
        specializations: serde_json::from_str(&specializations_str)
            .map_err(|e| DatabaseError::Serialization(format!("specializations: {e}")))?,
        is_active: row.get::<i64>(4).unwrap_or(1) != 0,
        created_at: parse_datetime(&created_str),
        updated_at: parse_datetime(&updated_str),
    })
}

fn row_to_item(row: &libsql::Row) -> Result<CurriculumItem, DatabaseError> {
    let id_str: String = row.get(0).unwrap_or_default();
    let domain_str: String = row.get(3).unwrap_or_default();
    let difficulty_str: String = row.get(4).unwrap_or_default();
    let difficulty = SkillLevel::from_label(&difficulty_str).ok_or_else(|| {
        DatabaseError::Serialization(format!("unknown difficulty: {difficulty_str}"))
    })?;

    Ok(CurriculumItem {
        id: parse_uuid(&id_str, "curriculum item id")?,
        title: row.get(1).unwrap_or_default(),
        description: row.get::<String>(2).ok(),
        skill_domain: SkillDomain::from_label(&domain_str),
        difficulty,
        estimated_minutes: row.get::<i64>(5).unwrap_or(0).max(0) as u32,
        display_order: row.get::<i64>(6).unwrap_or(0) as i32,
        is_active: row.get::<i64>(7).unwrap_or(1) != 0,
    })
}

fn row_to_assignment(row: &libsql::Row) -> Result<UserCurriculumAssignment, DatabaseError> {
    let id_str: String = row.get(0).unwrap_or_default();
    let item_str: String = row.get(2).unwrap_or_default();
    let status_str: String = row.get(3).unwrap_or_else(|_| "assigned".to_string());
    let status: AssignmentStatus = status_str
        .parse()
        .map_err(|e: String| DatabaseError::Serialization(e))?;
    let assigned_str: String = row.get(4).unwrap_or_default();
    let started_str: Option<String> = row.get(5).ok();
    let completed_str: Option<String> = row.get(6).ok();
    let updated_str: String = row.get(7).unwrap_or_default();

    Ok(UserCurriculumAssignment {
        id: parse_uuid(&id_str, "assignment id")?,
        user_id: row.get(1).unwrap_or_default(),
        curriculum_item_id: parse_uuid(&item_str, "curriculum_item_id")?,
        status,
        assigned_at: parse_datetime(&assigned_str),
        started_at: parse_optional_datetime(&started_str),
        completed_at: parse_optional_datetime(&completed_str),
        updated_at: parse_datetime(&updated_str),
    })
}

fn row_to_mentor_assignment(row: &libsql::Row) -> Result<UserMentorAssignment, DatabaseError> {
    let mentor_str: String = row.get(1).unwrap_or_default();
    let assigned_str: String = row.get(4).unwrap_or_default();
    let updated_str: String = row.get(5).unwrap_or_default();

    Ok(UserMentorAssignment {
        user_id: row.get(0).unwrap_or_default(),
        mentor_id: parse_uuid(&mentor_str, "mentor_id")?,
        assignment_reason: row.get(2).unwrap_or_default(),
        score: row.get::<i64>(3).unwrap_or(0).max(0) as u32,
        assigned_at: parse_datetime(&assigned_str),
        updated_at: parse_datetime(&updated_str),
    })
}

fn row_to_audit(row: &libsql::Row) -> Result<AuditEntry, DatabaseError> {
    let id_str: String = row.get(0).unwrap_or_default();
    let run_str: String = row.get(1).unwrap_or_default();
    let created_str: String = row.get(6).unwrap_or_default();

    Ok(AuditEntry {
        id: parse_uuid(&id_str, "audit id")?,
        run_id: parse_uuid(&run_str, "audit run_id")?,
        user_id: row.get(2).unwrap_or_default(),
        field: row.get(3).unwrap_or_default(),
        source: row.get(4).unwrap_or_default(),
        value: row.get(5).unwrap_or_default(),
        created_at: parse_datetime(&created_str),
    })
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Profiles ────────────────────────────────────────────────────

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"),
                params![user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_profile: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_profile(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_profile: {e}"))),
        }
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), DatabaseError> {
        let conn = self.conn();
        let answers = profile
            .onboarding_answers
            .as_ref()
            .map(|v| to_json(v, "onboarding_answers"))
            .transpose()?;
        let expertise = to_json(&profile.mentor_expertise, "mentor_expertise")?;

        conn.execute(
            &format!(
                "INSERT INTO profiles ({PROFILE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)
                 ON CONFLICT(id) DO UPDATE SET
                    email = excluded.email,
                    role = excluded.role,
                    full_name = excluded.full_name,
                    preferred_name = excluded.preferred_name,
                    institution = excluded.institution,
                    motivation_type = excluded.motivation_type,
                    current_skill_level = excluded.current_skill_level,
                    time_commitment = excluded.time_commitment,
                    learning_direction = excluded.learning_direction,
                    learning_goal = excluded.learning_goal,
                    legacy_goal = excluded.legacy_goal,
                    onboarding_answers = excluded.onboarding_answers,
                    inferred_skill_domain = excluded.inferred_skill_domain,
                    inferred_skill_level = excluded.inferred_skill_level,
                    normalized_learning_goal = excluded.normalized_learning_goal,
                    mentor_expertise = excluded.mentor_expertise,
                    mentor_experience_level = excluded.mentor_experience_level,
                    mentor_availability = excluded.mentor_availability,
                    onboarding_completed = excluded.onboarding_completed,
                    mentor_onboarding_completed = excluded.mentor_onboarding_completed,
                    onboarding_completed_at = excluded.onboarding_completed_at,
                    updated_at = excluded.updated_at"
            ),
            params![
                profile.id.as_str(),
                opt_text(profile.email.as_deref()),
                opt_text(profile.role.map(|r| r.to_string()).as_deref()),
                opt_text(profile.full_name.as_deref()),
                opt_text(profile.preferred_name.as_deref()),
                opt_text(profile.institution.as_deref()),
                opt_text(profile.motivation_type.as_deref()),
                opt_text(profile.current_skill_level.as_deref()),
                opt_text(profile.time_commitment.as_deref()),
                opt_text(profile.learning_direction.as_deref()),
                opt_text(profile.learning_goal.as_deref()),
                opt_text(profile.legacy_goal.as_deref()),
                opt_text(answers.as_deref()),
                opt_text(profile.inferred_skill_domain.map(|d| d.label())),
                opt_text(profile.inferred_skill_level.map(|l| l.label())),
                opt_text(profile.normalized_learning_goal.as_deref()),
                expertise,
                opt_text(profile.mentor_experience_level.as_deref()),
                opt_text(profile.mentor_availability.as_deref()),
                profile.onboarding_completed as i64,
                profile.mentor_onboarding_completed as i64,
                opt_datetime(profile.onboarding_completed_at),
                profile.created_at.to_rfc3339(),
                profile.updated_at.to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("upsert_profile: {e}")))?;

        debug!(user_id = %profile.id, "Profile upserted");
        Ok(())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at ASC, rowid ASC"
                ),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_profiles: {e}")))?;

        let mut profiles = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            profiles.push(row_to_profile(&row)?);
        }
        Ok(profiles)
    }

    // ── Mentors ─────────────────────────────────────────────────────

    async fn upsert_mentor(&self, mentor: &Mentor) -> Result<(), DatabaseError> {
        let conn = self.conn();
        let specializations = to_json(&mentor.specializations, "specializations")?;
        conn.execute(
            &format!(
                "INSERT INTO mentors ({MENTOR_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                    user_id = excluded.user_id,
                    name = excluded.name,
                    specializations = excluded.specializations,
                    is_active = excluded.is_active,
                    updated_at = excluded.updated_at"
            ),
            params![
                mentor.id.to_string(),
                opt_text(mentor.user_id.as_deref()),
                mentor.name.as_str(),
                specializations,
                mentor.is_active as i64,
                mentor.created_at.to_rfc3339(),
                mentor.updated_at.to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("upsert_mentor: {e}")))?;

        debug!(mentor_id = %mentor.id, name = %mentor.name, "Mentor upserted");
        Ok(())
    }

    async fn list_active_mentors(&self) -> Result<Vec<Mentor>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {MENTOR_COLUMNS} FROM mentors WHERE is_active = 1 ORDER BY created_at ASC, rowid ASC"
                ),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_active_mentors: {e}")))?;

        let mut mentors = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            mentors.push(row_to_mentor(&row)?);
        }
        Ok(mentors)
    }

    async fn get_mentor_assignment(
        &self,
        user_id: &str,
    ) -> Result<Option<UserMentorAssignment>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {MENTOR_ASSIGNMENT_COLUMNS} FROM user_mentor_assignments WHERE user_id = ?1"
                ),
                params![user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_mentor_assignment: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_mentor_assignment(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_mentor_assignment: {e}"))),
        }
    }

    async fn upsert_mentor_assignment(
        &self,
        assignment: &UserMentorAssignment,
    ) -> Result<(), DatabaseError> {
        let conn = self.conn();
        let changed = conn
            .execute(
                &format!(
                    "INSERT INTO user_mentor_assignments ({MENTOR_ASSIGNMENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(user_id) DO UPDATE SET
                        assigned_at = CASE
                            WHEN user_mentor_assignments.mentor_id = excluded.mentor_id
                            THEN user_mentor_assignments.assigned_at
                            ELSE excluded.assigned_at
                        END,
                        mentor_id = excluded.mentor_id,
                        assignment_reason = excluded.assignment_reason,
                        score = excluded.score,
                        updated_at = excluded.updated_at
                     WHERE user_mentor_assignments.mentor_id != excluded.mentor_id
                        OR user_mentor_assignments.assignment_reason != excluded.assignment_reason
                        OR user_mentor_assignments.score != excluded.score"
                ),
                params![
                    assignment.user_id.as_str(),
                    assignment.mentor_id.to_string(),
                    assignment.assignment_reason.as_str(),
                    assignment.score as i64,
                    assignment.assigned_at.to_rfc3339(),
                    assignment.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("upsert_mentor_assignment: {e}")))?;

        debug!(
            user_id = %assignment.user_id,
            mentor_id = %assignment.mentor_id,
            changed,
            "Mentor assignment upserted"
        );
        Ok(())
    }

    // ── Curriculum ──────────────────────────────────────────────────

    async fn upsert_curriculum_item(&self, item: &CurriculumItem) -> Result<(), DatabaseError> {
        let conn = self.conn();
        conn.execute(
            &format!(
                "INSERT INTO curriculum_items ({ITEM_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    skill_domain = excluded.skill_domain,
                    difficulty = excluded.difficulty,
                    estimated_minutes = excluded.estimated_minutes,
                    display_order = excluded.display_order,
                    is_active = excluded.is_active"
            ),
            params![
                item.id.to_string(),
                item.title.as_str(),
                opt_text(item.description.as_deref()),
                item.skill_domain.label(),
                item.difficulty.label(),
                item.estimated_minutes as i64,
                item.display_order as i64,
                item.is_active as i64,
            ],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("upsert_curriculum_item: {e}")))?;

        debug!(item_id = %item.id, domain = %item.skill_domain, "Curriculum item upserted");
        Ok(())
    }

    async fn list_curriculum_items(
        &self,
        domain: SkillDomain,
    ) -> Result<Vec<CurriculumItem>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {ITEM_COLUMNS} FROM curriculum_items WHERE skill_domain = ?1 AND is_active = 1 ORDER BY display_order ASC, rowid ASC"
                ),
                params![domain.label()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_curriculum_items: {e}")))?;

        let mut items = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            items.push(row_to_item(&row)?);
        }
        Ok(items)
    }

    async fn list_curriculum_assignments(
        &self,
        user_id: &str,
    ) -> Result<Vec<UserCurriculumAssignment>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {ASSIGNMENT_COLUMNS} FROM user_curriculum_assignments WHERE user_id = ?1 ORDER BY assigned_at ASC, rowid ASC"
                ),
                params![user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_curriculum_assignments: {e}")))?;

        let mut assignments = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            assignments.push(row_to_assignment(&row)?);
        }
        Ok(assignments)
    }

    async fn get_curriculum_assignment(
        &self,
        user_id: &str,
        item_id: Uuid,
    ) -> Result<Option<UserCurriculumAssignment>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {ASSIGNMENT_COLUMNS} FROM user_curriculum_assignments WHERE user_id = ?1 AND curriculum_item_id = ?2"
                ),
                params![user_id, item_id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_curriculum_assignment: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_assignment(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_curriculum_assignment: {e}"))),
        }
    }

    async fn insert_curriculum_assignment(
        &self,
        assignment: &UserCurriculumAssignment,
    ) -> Result<bool, DatabaseError> {
        let conn = self.conn();
        let inserted = conn
            .execute(
                &format!(
                    "INSERT INTO user_curriculum_assignments ({ASSIGNMENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                     ON CONFLICT(user_id, curriculum_item_id) DO NOTHING"
                ),
                params![
                    assignment.id.to_string(),
                    assignment.user_id.as_str(),
                    assignment.curriculum_item_id.to_string(),
                    assignment.status.to_string(),
                    assignment.assigned_at.to_rfc3339(),
                    opt_datetime(assignment.started_at),
                    opt_datetime(assignment.completed_at),
                    assignment.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_curriculum_assignment: {e}")))?;

        Ok(inserted > 0)
    }

    async fn update_curriculum_assignment(
        &self,
        assignment: &UserCurriculumAssignment,
    ) -> Result<(), DatabaseError> {
        let conn = self.conn();
        let count = conn
            .execute(
                "UPDATE user_curriculum_assignments
                 SET status = ?1, started_at = ?2, completed_at = ?3, updated_at = ?4
                 WHERE user_id = ?5 AND curriculum_item_id = ?6",
                params![
                    assignment.status.to_string(),
                    opt_datetime(assignment.started_at),
                    opt_datetime(assignment.completed_at),
                    assignment.updated_at.to_rfc3339(),
                    assignment.user_id.as_str(),
                    assignment.curriculum_item_id.to_string(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("update_curriculum_assignment: {e}")))?;

        if count == 0 {
            return Err(DatabaseError::NotFound {
                entity: "curriculum_assignment".to_string(),
                id: format!("{}/{}", assignment.user_id, assignment.curriculum_item_id),
            });
        }
        debug!(
            user_id = %assignment.user_id,
            item_id = %assignment.curriculum_item_id,
            status = %assignment.status,
            "Curriculum assignment updated"
        );
        Ok(())
    }

    // ── Repair audit log ────────────────────────────────────────────

    async fn append_audit_entries(&self, entries: &[AuditEntry]) -> Result<(), DatabaseError> {
        let conn = self.conn();
        for entry in entries {
            conn.execute(
                &format!("INSERT INTO repair_audit_log ({AUDIT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
                params![
                    entry.id.to_string(),
                    entry.run_id.to_string(),
                    entry.user_id.as_str(),
                    entry.field.as_str(),
                    entry.source.as_str(),
                    entry.value.as_str(),
                    entry.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("append_audit_entries: {e}")))?;
        }
        Ok(())
    }

    async fn list_audit_entries(
        &self,
        user_id: Option<&str>,
    ) -> Result<Vec<AuditEntry>, DatabaseError> {
        let conn = self.conn();
        let mut rows = match user_id {
            Some(user_id) => conn
                .query(
                    &format!(
                        "SELECT {AUDIT_COLUMNS} FROM repair_audit_log WHERE user_id = ?1 ORDER BY created_at ASC, rowid ASC"
                    ),
                    params![user_id],
                )
                .await,
            None => conn
                .query(
                    &format!(
                        "SELECT {AUDIT_COLUMNS} FROM repair_audit_log ORDER BY created_at ASC, rowid ASC"
                    ),
                    (),
                )
                .await,
        }
        .map_err(|e| DatabaseError::Query(format!("list_audit_entries: {e}")))?;

        let mut entries = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            entries.push(row_to_audit(&row)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> LibSqlBackend {
        LibSqlBackend::new_memory().await.unwrap()
    }

    fn make_item(
        title: &str,
        domain: SkillDomain,
        level: SkillLevel,
        order: i32,
    ) -> CurriculumItem {
        CurriculumItem::new(title, domain, level, 30, order)
    }

    // ── Profile tests ───────────────────────────────────────────────

    #[tokio::test]
    async fn profile_roundtrip() {
        let db = test_db().await;
        let mut profile = Profile::new("u1")
            .with_role(Role::Student)
            .with_email("jane.doe@example.com");
        profile.full_name = Some("Jane Doe".into());
        profile.onboarding_answers = Some(serde_json::json!({"interests": "web"}));
        profile.inferred_skill_domain = Some(SkillDomain::CloudDevOps);
        profile.inferred_skill_level = Some(SkillLevel::Advanced);
        profile.mentor_expertise = vec!["Statistics".into()];
        profile.onboarding_completed = true;

        db.upsert_profile(&profile).await.unwrap();
        let fetched = db.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(fetched, profile);
    }

    #[tokio::test]
    async fn missing_profile_is_none() {
        let db = test_db().await;
        assert!(db.get_profile("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_overwrites_profile() {
        let db = test_db().await;
        let mut profile = Profile::new("u1");
        db.upsert_profile(&profile).await.unwrap();

        profile.institution = Some("MIT".into());
        profile.role = Some(Role::Mentor);
        db.upsert_profile(&profile).await.unwrap();

        let profiles = db.list_profiles().await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].institution.as_deref(), Some("MIT"));
        assert_eq!(profiles[0].role, Some(Role::Mentor));
    }

    // ── Mentor tests ────────────────────────────────────────────────

    #[tokio::test]
    async fn active_mentors_in_catalog_order() {
        let db = test_db().await;
        let first = Mentor::new("First").with_specializations(["General"]);
        let gone = Mentor::new("Gone").inactive();
        let second = Mentor::new("Second").with_specializations(["Design", "Product Design"]);
        for m in [&first, &gone, &second] {
            db.upsert_mentor(m).await.unwrap();
        }

        let mentors = db.list_active_mentors().await.unwrap();
        let names: Vec<&str> = mentors.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert_eq!(mentors[1].specializations, vec!["Design", "Product Design"]);
    }

    #[tokio::test]
    async fn mentor_assignment_is_single_row_per_user() {
        let db = test_db().await;
        let a = Mentor::new("A");
        let b = Mentor::new("B");
        db.upsert_mentor(&a).await.unwrap();
        db.upsert_mentor(&b).await.unwrap();

        let now = Utc::now();
        let first = UserMentorAssignment {
            user_id: "u1".into(),
            mentor_id: a.id,
            assignment_reason: "Specializes in General".into(),
            score: 10,
            assigned_at: now,
            updated_at: now,
        };
        db.upsert_mentor_assignment(&first).await.unwrap();

        // same values later: stored row untouched
        let later = now + chrono::Duration::seconds(5);
        let again = UserMentorAssignment {
            assigned_at: later,
            updated_at: later,
            ..first.clone()
        };
        db.upsert_mentor_assignment(&again).await.unwrap();
        assert_eq!(db.get_mentor_assignment("u1").await.unwrap().unwrap(), first);

        // different mentor: overwritten in place
        let switched = UserMentorAssignment {
            mentor_id: b.id,
            ..again.clone()
        };
        db.upsert_mentor_assignment(&switched).await.unwrap();
        let stored = db.get_mentor_assignment("u1").await.unwrap().unwrap();
        assert_eq!(stored.mentor_id, b.id);
        assert_eq!(stored.assigned_at, later);
    }

    // ── Curriculum tests ────────────────────────────────────────────

    #[tokio::test]
    async fn items_filtered_by_domain_and_active() {
        let db = test_db().await;
        let mut hidden = make_item("Hidden", SkillDomain::Design, SkillLevel::Beginner, 0);
        hidden.is_active = false;
        let items = [
            make_item("Color Theory", SkillDomain::Design, SkillLevel::Beginner, 2),
            make_item("Wireframes", SkillDomain::Design, SkillLevel::Beginner, 1),
            make_item("Rust Basics", SkillDomain::FullStack, SkillLevel::Beginner, 1),
            hidden,
        ];
        for item in &items {
            db.upsert_curriculum_item(item).await.unwrap();
        }

        let design = db.list_curriculum_items(SkillDomain::Design).await.unwrap();
        let titles: Vec<&str> = design.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Wireframes", "Color Theory"]);
        assert_eq!(design[0], items[1]);
        assert!(db.list_curriculum_items(SkillDomain::Blockchain).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn assignment_insert_is_idempotent() {
        let db = test_db().await;
        let item = make_item("Intro", SkillDomain::General, SkillLevel::Beginner, 1);
        db.upsert_curriculum_item(&item).await.unwrap();

        let assignment = UserCurriculumAssignment::new("u1", item.id);
        assert!(db.insert_curriculum_assignment(&assignment).await.unwrap());

        let duplicate = UserCurriculumAssignment::new("u1", item.id);
        assert!(!db.insert_curriculum_assignment(&duplicate).await.unwrap());

        let stored = db.list_curriculum_assignments("u1").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, assignment.id);
    }

    #[tokio::test]
    async fn assignment_update_persists_progress() {
        let db = test_db().await;
        let item = make_item("Intro", SkillDomain::General, SkillLevel::Beginner, 1);
        db.upsert_curriculum_item(&item).await.unwrap();

        let mut assignment = UserCurriculumAssignment::new("u1", item.id);
        db.insert_curriculum_assignment(&assignment).await.unwrap();
        assignment.advance(AssignmentStatus::InProgress).unwrap();
        db.update_curriculum_assignment(&assignment).await.unwrap();

        let stored = db.get_curriculum_assignment("u1", item.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AssignmentStatus::InProgress);
        assert_eq!(stored.started_at, assignment.started_at);
        assert!(stored.completed_at.is_none());
    }

    #[tokio::test]
    async fn updating_missing_assignment_is_not_found() {
        let db = test_db().await;
        let assignment = UserCurriculumAssignment::new("u1", Uuid::new_v4());
        let err = db.update_curriculum_assignment(&assignment).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    // ── Audit tests ─────────────────────────────────────────────────

    #[tokio::test]
    async fn audit_entries_append_and_filter() {
        let db = test_db().await;
        let run_id = Uuid::new_v4();
        let entries = vec![
            AuditEntry::new(run_id, "u1", "full_name", "email", "Jane Doe"),
            AuditEntry::new(run_id, "u2", "role", "default", "student"),
            AuditEntry::new(run_id, "u1", "role", "default", "student"),
        ];
        db.append_audit_entries(&entries).await.unwrap();

        assert_eq!(db.list_audit_entries(None).await.unwrap().len(), 3);
        let u1 = db.list_audit_entries(Some("u1")).await.unwrap();
        assert_eq!(u1.len(), 2);
        assert_eq!(u1[0], entries[0]);
        assert_eq!(u1[1].field, "role");
    }
}
