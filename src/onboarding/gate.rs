//! Navigation gate: one redirect decision per request.
//!
//! The final step of every decision compares the target with the
//! normalized current path and drops the redirect when they are equal.
//! That comparison is the only thing standing between the gate and a
//! redirect loop, so it must stay last.

use serde::Serialize;
use tracing::debug;

use super::model::Profile;
use super::state::GateState;

pub const AUTH_PATH: &str = "/auth";
pub const ONBOARDING_PATH: &str = "/onboarding";
pub const MENTOR_ONBOARDING_PATH: &str = "/mentor-onboarding";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const MENTOR_DASHBOARD_PATH: &str = "/mentor-dashboard";

/// Result of a gate check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateDecision {
    pub state: GateState,
    /// `None` means "stay where you are".
    pub redirect_to: Option<String>,
}

/// Strip query/fragment and trailing slashes; `""` becomes `/`.
pub fn normalize_path(path: &str) -> String {
    let path = path.trim();
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn is_under(path: &str, root: &str) -> bool {
    path == root || path.strip_prefix(root).is_some_and(|rest| rest.starts_with('/'))
}

/// Whether the path belongs to either onboarding flow.
pub fn is_onboarding_path(path: &str) -> bool {
    let path = normalize_path(path);
    is_under(&path, ONBOARDING_PATH) || is_under(&path, MENTOR_ONBOARDING_PATH)
}

/// Decide where a user in `state` should go from `current_path`.
pub fn decide(state: GateState, current_path: &str) -> GateDecision {
    let current = normalize_path(current_path);

    let target = match &state {
        GateState::Unauthenticated => Some(AUTH_PATH),
        GateState::NoProfile | GateState::NoRole | GateState::StudentIncomplete { .. } => {
            Some(ONBOARDING_PATH)
        }
        GateState::StudentComplete => is_onboarding_path(&current).then_some(DASHBOARD_PATH),
        GateState::MentorIncomplete { .. } => Some(MENTOR_ONBOARDING_PATH),
        GateState::MentorComplete => {
            is_onboarding_path(&current).then_some(MENTOR_DASHBOARD_PATH)
        }
    };

    // Loop guard: never redirect to the page we are already on.
    let redirect_to = target
        .filter(|target| normalize_path(target) != current)
        .map(str::to_string);

    debug!(%state, current = %current, redirect_to = ?redirect_to, "Gate decision");
    GateDecision { state, redirect_to }
}

/// Derive state from a profile snapshot and decide in one step.
pub fn check_gate(
    user_id: Option<&str>,
    profile: Option<&Profile>,
    current_path: &str,
) -> GateDecision {
    decide(GateState::derive(user_id, profile), current_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::model::Role;

    fn student_missing_institution() -> Profile {
        let mut p = Profile::new("u1").with_role(Role::Student);
        p.full_name = Some("Alan Turing".into());
        p.motivation_type = Some("academic".into());
        p.current_skill_level = Some("advanced".into());
        p.time_commitment = Some("intensive".into());
        p
    }

    fn all_states() -> Vec<GateState> {
        vec![
            GateState::Unauthenticated,
            GateState::NoProfile,
            GateState::NoRole,
            GateState::StudentIncomplete { missing: vec!["institution"] },
            GateState::StudentComplete,
            GateState::MentorIncomplete { missing: vec!["mentor_availability"] },
            GateState::MentorComplete,
        ]
    }

    const PATHS: &[&str] = &[
        "/",
        "",
        "/auth",
        "/auth/",
        "/onboarding",
        "/onboarding/",
        "/onboarding/step-2",
        "/mentor-onboarding",
        "/mentor-onboarding/?ref=x",
        "/dashboard",
        "/dashboard/",
        "/mentor-dashboard",
        "/courses/42",
        "settings",
    ];

    #[test]
    fn normalize_strips_trailing_slash_and_query() {
        assert_eq!(normalize_path("/dashboard/"), "/dashboard");
        assert_eq!(normalize_path("/dashboard///"), "/dashboard");
        assert_eq!(normalize_path("/onboarding?step=2#top"), "/onboarding");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("settings"), "/settings");
    }

    #[test]
    fn onboarding_path_detection() {
        assert!(is_onboarding_path("/onboarding"));
        assert!(is_onboarding_path("/onboarding/step-3/"));
        assert!(is_onboarding_path("/mentor-onboarding"));
        assert!(!is_onboarding_path("/onboarding-faq"));
        assert!(!is_onboarding_path("/dashboard"));
    }

    #[test]
    fn unauthenticated_goes_to_auth() {
        let d = decide(GateState::Unauthenticated, "/dashboard");
        assert_eq!(d.redirect_to.as_deref(), Some(AUTH_PATH));
        let d = decide(GateState::Unauthenticated, "/auth/");
        assert_eq!(d.redirect_to, None);
    }

    #[test]
    fn incomplete_student_goes_to_onboarding() {
        let profile = student_missing_institution();
        let d = check_gate(Some("u1"), Some(&profile), "/dashboard");
        assert_eq!(d.redirect_to.as_deref(), Some(ONBOARDING_PATH));

        let mut fixed = profile.clone();
        fixed.institution = Some("Bletchley".into());
        let d = check_gate(Some("u1"), Some(&fixed), "/dashboard");
        assert_eq!(d.redirect_to, None);
    }

    #[test]
    fn complete_student_leaves_onboarding() {
        let d = decide(GateState::StudentComplete, "/onboarding/");
        assert_eq!(d.redirect_to.as_deref(), Some(DASHBOARD_PATH));
        let d = decide(GateState::StudentComplete, "/mentor-onboarding");
        assert_eq!(d.redirect_to.as_deref(), Some(DASHBOARD_PATH));
        let d = decide(GateState::StudentComplete, "/courses/42");
        assert_eq!(d.redirect_to, None);
    }

    #[test]
    fn mentor_routes() {
        let d = decide(GateState::MentorIncomplete { missing: vec![] }, "/dashboard");
        assert_eq!(d.redirect_to.as_deref(), Some(MENTOR_ONBOARDING_PATH));
        let d = decide(GateState::MentorComplete, "/mentor-onboarding");
        assert_eq!(d.redirect_to.as_deref(), Some(MENTOR_DASHBOARD_PATH));
        let d = decide(GateState::MentorComplete, "/mentor-dashboard/");
        assert_eq!(d.redirect_to, None);
    }

    #[test]
    fn following_a_redirect_never_redirects_again() {
        for state in all_states() {
            for path in PATHS {
                let first = decide(state.clone(), path);
                if let Some(target) = first.redirect_to {
                    let second = decide(state.clone(), &target);
                    assert_eq!(
                        second.redirect_to, None,
                        "{state} bounced from {path} to {target} and onward"
                    );
                }
            }
        }
    }

    #[test]
    fn current_page_is_never_a_target() {
        for state in all_states() {
            for path in PATHS {
                let decision = decide(state.clone(), path);
                if let Some(target) = decision.redirect_to {
                    assert_ne!(normalize_path(&target), normalize_path(path));
                }
            }
        }
    }
}
