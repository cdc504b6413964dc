//! Mentor catalog and matching.

pub mod matcher;
pub mod model;

pub use matcher::{MentorMatch, score_mentor, select_mentor, specializations_for_domain};
pub use model::{Mentor, MotivationType, UserMentorAssignment};
