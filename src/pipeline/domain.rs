//! Maps classifier directions onto the platform skill-domain taxonomy.

use crate::pipeline::types::{ClassificationResult, SkillDirection, SkillDomain};

/// Total mapping from intent direction to platform domain.
pub fn to_skill_domain(direction: SkillDirection) -> SkillDomain {
    match direction {
        SkillDirection::WebDevelopment | SkillDirection::BackendEngineering => {
            SkillDomain::FullStack
        }
        SkillDirection::MobileDevelopment => SkillDomain::Mobile,
        SkillDirection::DataScience => SkillDomain::DataScience,
        SkillDirection::MachineLearning => SkillDomain::ArtificialIntelligence,
        SkillDirection::DevOpsCloud => SkillDomain::CloudDevOps,
        SkillDirection::Cybersecurity => SkillDomain::Cybersecurity,
        SkillDirection::GameDevelopment => SkillDomain::GameDevelopment,
        SkillDirection::UiUxDesign => SkillDomain::Design,
        SkillDirection::Blockchain => SkillDomain::Blockchain,
        SkillDirection::Other => SkillDomain::General,
    }
}

/// Map a raw direction label; unknown labels map to `General`.
pub fn domain_for_label(label: &str) -> SkillDomain {
    SkillDirection::from_label(label)
        .map(to_skill_domain)
        .unwrap_or(SkillDomain::General)
}

/// Domain for a classification; a pending clarification maps to `General`.
pub fn domain_for_classification(result: &ClassificationResult) -> SkillDomain {
    result
        .detected_domain
        .map(to_skill_domain)
        .unwrap_or(SkillDomain::General)
}
