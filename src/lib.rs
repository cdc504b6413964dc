//! Onboarding intelligence: classifies what a new learner wants to study,
//! infers their level, matches a mentor, builds a starter curriculum, gates
//! navigation until onboarding is complete, and repairs old profiles.

pub mod config;
pub mod curriculum;
pub mod error;
pub mod mentors;
pub mod onboarding;
pub mod pipeline;
pub mod rate_limit;
pub mod repair;
pub mod store;
