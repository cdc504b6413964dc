//! Onboarding: profile model, completion state, the route gate, and the
//! manager that ties the pipeline to storage.
//!
//! Completion is always derived from profile fields through
//! `GateState::derive`; the stored flags are advisory.

pub mod gate;
pub mod manager;
pub mod model;
pub mod state;

pub use gate::{GateDecision, check_gate, decide};
pub use manager::{Catalog, MentorAssignmentResult, OnboardingManager, SeedSummary, Submission};
pub use model::{Profile, Role, has_text};
pub use state::GateState;
