//! Curriculum recommendation: pick, order and diff catalog items.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::model::CurriculumItem;
use crate::pipeline::types::SkillDomain;

const DEFAULT_ITEM_COUNT: usize = 5;

/// How many items a time commitment gets. Unknown values get the
/// "regular" count.
pub fn items_for_commitment(time_commitment: Option<&str>) -> usize {
    match time_commitment.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("casual") => 3,
        Some("regular") => DEFAULT_ITEM_COUNT,
        Some("intensive") => 8,
        _ => DEFAULT_ITEM_COUNT,
    }
}

/// The ordered recommendation for a user.
#[derive(Debug, Clone, Serialize)]
pub struct CurriculumPlan {
    /// Domain the items were actually taken from (may be `General`).
    pub domain: SkillDomain,
    pub items: Vec<CurriculumItem>,
    pub total_minutes: u32,
    /// Item ids inserted by this run. Empty on a re-run.
    pub newly_assigned: Vec<Uuid>,
}

/// Order active items by difficulty rank, then display order, and truncate.
pub fn recommend(
    domain_items: &[CurriculumItem],
    general_items: &[CurriculumItem],
    count: usize,
) -> Vec<CurriculumItem> {
    let active = |items: &[CurriculumItem]| -> Vec<CurriculumItem> {
        items.iter().filter(|i| i.is_active).cloned().collect()
    };

    let mut items = active(domain_items);
    if items.is_empty() {
        debug!("No domain content, falling back to General");
        items = active(general_items);
    }

    items.sort_by(|a, b| {
        a.difficulty
            .rank()
            .cmp(&b.difficulty.rank())
            .then(a.display_order.cmp(&b.display_order))
    });
    items.truncate(count);
    items
}

/// Ids from `recommended` that the user does not hold yet, in order.
pub fn assignment_delta(recommended: &[CurriculumItem], existing: &HashSet<Uuid>) -> Vec<Uuid> {
    recommended
        .iter()
        .map(|i| i.id)
        .filter(|id| !existing.contains(id))
        .collect()
}

/// Sum of estimated minutes, saturating at `u32::MAX`.
pub fn total_minutes(items: &[CurriculumItem]) -> u32 {
    items
        .iter()
        .fold(0u32, |total, i| total.saturating_add(i.estimated_minutes))
}
