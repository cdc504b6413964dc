//! Curriculum catalog and recommendation.

pub mod engine;
pub mod model;

pub use engine::{CurriculumPlan, assignment_delta, items_for_commitment, recommend, total_minutes};
pub use model::{AssignmentStatus, CurriculumItem, UserCurriculumAssignment};
