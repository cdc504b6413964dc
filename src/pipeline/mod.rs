//! Text classification pipeline.
//!
//! Raw learner text flows through:
//! 1. `intent::classify_intent()` -> keyword scoring into a `SkillDirection`
//! 2. `domain::to_skill_domain()` -> fold into the platform `SkillDomain`
//! 3. `skill::analyze_skill_level()` -> level + normalized goal
//!
//! Every stage is pure. Insufficient input comes back as a clarification
//! request, never as an error.

pub mod domain;
pub mod intent;
pub mod keywords;
pub mod skill;
pub mod types;

pub use domain::{domain_for_classification, domain_for_label, to_skill_domain};
pub use intent::{IntentClassifier, classify_intent};
pub use skill::analyze_skill_level;
pub use types::{
    ClassificationResult, Confidence, DirectionScore, SkillAnalysis, SkillDirection, SkillDomain,
    SkillLevel,
};
