//! Audit trail for fields filled by the repair job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One filled field: what was written, where it came from, and in which run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    pub id: Uuid,
    pub run_id: Uuid,
    pub user_id: String,
    pub field: String,
    /// Where the value came from, e.g. `email`, `legacy_goal`, `classifier`.
    pub source: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        run_id: Uuid,
        user_id: impl Into<String>,
        field: impl Into<String>,
        source: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            run_id,
            user_id: user_id.into(),
            field: field.into(),
            source: source.into(),
            value: value.into(),
            created_at: Utc::now(),
        }
    }
}

/// Collects entries for one user during a run.
#[derive(Debug)]
pub struct AuditTrail {
    run_id: Uuid,
    user_id: String,
    entries: Vec<AuditEntry>,
}

impl AuditTrail {
    pub fn new(run_id: Uuid, user_id: impl Into<String>) -> Self {
        Self {
            run_id,
            user_id: user_id.into(),
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, field: &str, source: &str, value: impl Into<String>) {
        self.entries.push(AuditEntry::new(
            self.run_id,
            self.user_id.clone(),
            field,
            source,
            value,
        ));
    }

    /// Field names recorded so far, in order.
    pub fn fields(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.field.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<AuditEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trail_stamps_run_and_user() {
        let run_id = Uuid::new_v4();
        let mut trail = AuditTrail::new(run_id, "u1");
        assert!(trail.is_empty());

        trail.record("full_name", "email", "Jane Doe");
        trail.record("role", "default", "student");
        assert_eq!(trail.fields(), vec!["full_name", "role"]);

        let entries = trail.into_entries();
        assert!(entries.iter().all(|e| e.run_id == run_id && e.user_id == "u1"));
        assert_eq!(entries[0].source, "email");
        assert_eq!(entries[1].value, "student");
    }
}
