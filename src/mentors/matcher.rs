//! Mentor scoring and selection.
//!
//! Scores are additive so every point can be traced back to a reason.
//! Selection always yields a mentor when at least one active mentor exists.

use serde::Serialize;
use tracing::debug;

use super::model::{Mentor, MotivationType};
use crate::pipeline::types::SkillDomain;

const RELATED_SPECIALIZATION_SCORE: u32 = 10;
const EXACT_DOMAIN_SCORE: u32 = 5;
const MOTIVATION_SCORE: u32 = 3;
const VERSATILITY_SCORE: u32 = 1;
const VERSATILITY_MIN_SPECIALIZATIONS: usize = 2;

/// Specializations that count as relevant for a domain. The domain label
/// itself is always first.
pub fn specializations_for_domain(domain: SkillDomain) -> &'static [&'static str] {
    match domain {
        SkillDomain::FullStack => &[
            "Full Stack Development",
            "Web Development",
            "Backend Engineering",
            "Frontend Development",
        ],
        SkillDomain::Mobile => &[
            "Mobile Development",
            "iOS Development",
            "Android Development",
        ],
        SkillDomain::DataScience => &[
            "Data Science",
            "Artificial Intelligence",
            "Statistics",
            "Data Engineering",
        ],
        SkillDomain::ArtificialIntelligence => &[
            "Artificial Intelligence",
            "Machine Learning",
            "Data Science",
            "Deep Learning",
        ],
        SkillDomain::CloudDevOps => &[
            "Cloud & DevOps",
            "DevOps",
            "Cloud Architecture",
            "Infrastructure",
        ],
        SkillDomain::Cybersecurity => &[
            "Cybersecurity",
            "Security Engineering",
            "Penetration Testing",
        ],
        SkillDomain::GameDevelopment => &[
            "Game Development",
            "Graphics Programming",
            "Unity",
            "Unreal Engine",
        ],
        SkillDomain::Design => &["Design", "UI/UX Design", "Product Design"],
        SkillDomain::Blockchain => &["Blockchain", "Smart Contracts", "Web3"],
        SkillDomain::General => &["General", "Career Guidance"],
    }
}

/// A selected mentor with its score breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct MentorMatch {
    pub mentor: Mentor,
    pub score: u32,
    pub reasons: Vec<String>,
}

impl MentorMatch {
    /// Human-readable reason string stored on the assignment row.
    pub fn reason(&self) -> String {
        self.reasons.join("; ")
    }
}

/// Score one mentor for a learner.
pub fn score_mentor(
    mentor: &Mentor,
    domain: SkillDomain,
    motivation: Option<MotivationType>,
) -> (u32, Vec<String>) {
    let mut score = 0;
    let mut reasons = Vec::new();

    let related: Vec<&str> = specializations_for_domain(domain)
        .iter()
        .copied()
        .filter(|s| mentor.has_specialization(s))
        .collect();
    if !related.is_empty() {
        score += RELATED_SPECIALIZATION_SCORE;
        reasons.push(format!("Specializes in {}", related.join(", ")));
    }

    if mentor.has_specialization(domain.label()) {
        score += EXACT_DOMAIN_SCORE;
        reasons.push(format!("Exact match for {domain}"));
    }

    if let Some(spec) = motivation.and_then(|m| m.specialization())
        && mentor.has_specialization(spec)
    {
        score += MOTIVATION_SCORE;
        reasons.push(format!("Offers {spec}"));
    }

    if mentor.specializations.len() >= VERSATILITY_MIN_SPECIALIZATIONS {
        score += VERSATILITY_SCORE;
        reasons.push("Broad expertise".to_string());
    }

    (score, reasons)
}

/// Pick the best active mentor.
///
/// Ties keep catalog order. When nobody scores, the first `General` mentor
/// is used, then the first active mentor. `None` only when no active
/// mentor exists.
pub fn select_mentor(
    mentors: &[Mentor],
    domain: SkillDomain,
    motivation: Option<MotivationType>,
) -> Option<MentorMatch> {
    let mut scored: Vec<MentorMatch> = mentors
        .iter()
        .filter(|m| m.is_active)
        .map(|mentor| {
            let (score, reasons) = score_mentor(mentor, domain, motivation);
            MentorMatch {
                mentor: mentor.clone(),
                score,
                reasons,
            }
        })
        .collect();

    // stable: equal scores keep catalog order
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    let best = scored.first()?;
    if best.score > 0 {
        debug!(
            mentor = %best.mentor.name,
            score = best.score,
            domain = %domain,
            "Mentor matched by score"
        );
        return scored.into_iter().next();
    }

    let fallback_index = scored
        .iter()
        .position(|m| m.mentor.has_specialization(SkillDomain::General.label()));
    let (index, reason) = match fallback_index {
        Some(i) => (i, "No specialization match; assigned a General mentor"),
        None => (0, "No specialization match; assigned the first available mentor"),
    };

    let mut chosen = scored.swap_remove(index);
    chosen.reasons = vec![reason.to_string()];
    debug!(mentor = %chosen.mentor.name, domain = %domain, "Mentor fallback");
    Some(chosen)
}
