//! Retroactive repair of incomplete profiles.

pub mod audit;
pub mod job;

pub use audit::{AuditEntry, AuditTrail};
pub use job::{
    RepairJob, RepairReport, RepairRun, RepairStatus, RepairStep, StepOutcome, StepStatus,
    UserLockGuard, UserLocks, infer_full_name, infer_learning_direction,
};
