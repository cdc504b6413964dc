//! Version-tracked database migrations for the libSQL backend.
//!
//! Each migration has a version number and SQL. `run_migrations()` checks
//! the current version and applies only the new ones sequentially.

use libsql::Connection;

use crate::error::DatabaseError;

/// A single migration step.
struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// All migrations in order. Add new versions to the end.
static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        sql: r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                email TEXT,
                role TEXT,
                full_name TEXT,
                preferred_name TEXT,
                institution TEXT,
                motivation_type TEXT,
                current_skill_level TEXT,
                time_commitment TEXT,
                learning_direction TEXT,
                learning_goal TEXT,
                legacy_goal TEXT,
                onboarding_answers TEXT,
                inferred_skill_domain TEXT,
                inferred_skill_level TEXT,
                normalized_learning_goal TEXT,
                mentor_expertise TEXT NOT NULL DEFAULT '[]',
                mentor_experience_level TEXT,
                mentor_availability TEXT,
                onboarding_completed INTEGER NOT NULL DEFAULT 0,
                mentor_onboarding_completed INTEGER NOT NULL DEFAULT 0,
                onboarding_completed_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_profiles_role ON profiles(role);

            CREATE TABLE IF NOT EXISTS mentors (
                id TEXT PRIMARY KEY,
                user_id TEXT,
                name TEXT NOT NULL,
                specializations TEXT NOT NULL DEFAULT '[]',
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_mentors_active ON mentors(is_active);

            CREATE TABLE IF NOT EXISTS curriculum_items (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                skill_domain TEXT NOT NULL,
                difficulty TEXT NOT NULL,
                estimated_minutes INTEGER NOT NULL DEFAULT 0,
                display_order INTEGER NOT NULL DEFAULT 0,
                is_active INTEGER NOT NULL DEFAULT 1
            );
            CREATE INDEX IF NOT EXISTS idx_curriculum_items_domain
                ON curriculum_items(skill_domain, is_active);

            CREATE TABLE IF NOT EXISTS user_curriculum_assignments (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                curriculum_item_id TEXT NOT NULL REFERENCES curriculum_items(id),
                status TEXT NOT NULL DEFAULT 'assigned',
                assigned_at TEXT NOT NULL,
                started_at TEXT,
                completed_at TEXT,
                updated_at TEXT NOT NULL,
                UNIQUE(user_id, curriculum_item_id)
            );
            CREATE INDEX IF NOT EXISTS idx_user_curriculum_user
                ON user_curriculum_assignments(user_id);

            CREATE TABLE IF NOT EXISTS user_mentor_assignments (
                user_id TEXT PRIMARY KEY,
                mentor_id TEXT NOT NULL REFERENCES mentors(id),
                assignment_reason TEXT NOT NULL,
                score INTEGER NOT NULL DEFAULT 0,
                assigned_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
        "#,
    },
    Migration {
        version: 2,
        name: "repair_audit_log",
        sql: r#"
            CREATE TABLE IF NOT EXISTS repair_audit_log (
                id TEXT PRIMARY KEY,
                run_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                field TEXT NOT NULL,
                source TEXT NOT NULL,
                value TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_repair_audit_user ON repair_audit_log(user_id);
            CREATE INDEX IF NOT EXISTS idx_repair_audit_run ON repair_audit_log(run_id);
        "#,
    },
];

/// Run all pending migrations against the given connection.
///
/// Creates the `_migrations` table if it doesn't exist.
pub async fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        (),
    )
    .await
    .map_err(|e| DatabaseError::Migration(format!("Failed to create _migrations table: {e}")))?;

    let current_version = get_current_version(conn).await?;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            conn.execute_batch(migration.sql).await.map_err(|e| {
                DatabaseError::Migration(format!(
                    "Migration V{} ({}) failed: {e}",
                    migration.version, migration.name
                ))
            })?;
            seed_version(conn, migration.version, migration.name).await?;
        }
    }

    let version = get_current_version(conn).await?;
    tracing::debug!(version, "Database migrations complete");
    Ok(())
}

/// Get the highest applied migration version, or 0 if none.
async fn get_current_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM _migrations", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("Failed to query migration version: {e}")))?;

    let row = rows
        .next()
        .await
        .map_err(|e| DatabaseError::Migration(format!("Failed to read migration version: {e}")))?;

    match row {
        Some(row) => {
            let version: i64 = row.get(0).map_err(|e| {
                DatabaseError::Migration(format!("Failed to parse migration version: {e}"))
            })?;
            Ok(version)
        }
        None => Ok(0),
    }
}

/// Insert a version record into `_migrations`.
async fn seed_version(conn: &Connection, version: i64, name: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO _migrations (version, name) VALUES (?1, ?2)",
        libsql::params![version, name],
    )
    .await
    .map_err(|e| DatabaseError::Migration(format!("Failed to record migration V{version}: {e}")))?;
    Ok(())
}
