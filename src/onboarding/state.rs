//! Onboarding gate states, derived fresh from a profile snapshot.

use serde::Serialize;

use super::model::{Profile, Role};

/// Where a user stands in onboarding right now.
///
/// Never persisted. Rebuilt from raw profile fields on every navigation so
/// a stale `onboarding_completed` flag cannot let anyone through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GateState {
    Unauthenticated,
    NoProfile,
    NoRole,
    StudentIncomplete { missing: Vec<&'static str> },
    StudentComplete,
    MentorIncomplete { missing: Vec<&'static str> },
    MentorComplete,
}

impl GateState {
    /// Derive the state for an (optionally) authenticated user.
    pub fn derive(user_id: Option<&str>, profile: Option<&Profile>) -> Self {
        if user_id.is_none_or(|id| id.trim().is_empty()) {
            return Self::Unauthenticated;
        }
        let Some(profile) = profile else {
            return Self::NoProfile;
        };
        match profile.role {
            None => Self::NoRole,
            Some(Role::Student) => {
                let missing = profile.missing_student_fields();
                if missing.is_empty() {
                    Self::StudentComplete
                } else {
                    Self::StudentIncomplete { missing }
                }
            }
            Some(Role::Mentor) => {
                let missing = profile.missing_mentor_fields();
                if missing.is_empty() {
                    Self::MentorComplete
                } else {
                    Self::MentorIncomplete { missing }
                }
            }
        }
    }

    /// Whether onboarding is done for this state.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::StudentComplete | Self::MentorComplete)
    }
}

impl std::fmt::Display for GateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::NoProfile => "no_profile",
            Self::NoRole => "no_role",
            Self::StudentIncomplete { .. } => "student_incomplete",
            Self::StudentComplete => "student_complete",
            Self::MentorIncomplete { .. } => "mentor_incomplete",
            Self::MentorComplete => "mentor_complete",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Profile {
        let mut p = Profile::new("u1").with_role(Role::Student);
        p.full_name = Some("Grace Hopper".into());
        p.motivation_type = Some("upskilling".into());
        p.current_skill_level = Some("intermediate".into());
        p.time_commitment = Some("regular".into());
        p.institution = Some("Navy".into());
        p
    }

    #[test]
    fn missing_user_is_unauthenticated() {
        assert_eq!(GateState::derive(None, None), GateState::Unauthenticated);
        assert_eq!(GateState::derive(Some("  "), Some(&student())), GateState::Unauthenticated);
    }

    #[test]
    fn missing_profile_and_role() {
        assert_eq!(GateState::derive(Some("u1"), None), GateState::NoProfile);
        assert_eq!(
            GateState::derive(Some("u1"), Some(&Profile::new("u1"))),
            GateState::NoRole
        );
    }

    #[test]
    fn student_states() {
        let mut p = student();
        assert_eq!(GateState::derive(Some("u1"), Some(&p)), GateState::StudentComplete);

        p.time_commitment = None;
        p.onboarding_completed = true;
        assert_eq!(
            GateState::derive(Some("u1"), Some(&p)),
            GateState::StudentIncomplete { missing: vec!["time_commitment"] }
        );
    }

    #[test]
    fn mentor_states() {
        let mut p = Profile::new("m1").with_role(Role::Mentor);
        p.mentor_onboarding_completed = true;
        assert!(matches!(
            GateState::derive(Some("m1"), Some(&p)),
            GateState::MentorIncomplete { .. }
        ));

        p.mentor_expertise = vec!["Design".into()];
        p.mentor_experience_level = Some("10 years".into());
        p.mentor_availability = Some("weekday evenings".into());
        let state = GateState::derive(Some("m1"), Some(&p));
        assert_eq!(state, GateState::MentorComplete);
        assert!(state.is_complete());
    }

    #[test]
    fn display_matches_serde_tag() {
        let states = [
            GateState::Unauthenticated,
            GateState::NoProfile,
            GateState::NoRole,
            GateState::StudentIncomplete { missing: vec!["institution"] },
            GateState::StudentComplete,
            GateState::MentorIncomplete { missing: vec![] },
            GateState::MentorComplete,
        ];
        for state in states {
            let json = serde_json::to_value(&state).unwrap();
            assert_eq!(json["state"], state.to_string());
        }
    }
}
