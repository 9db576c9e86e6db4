//! Root-layout gate: which top-level surface a session snapshot renders.

use serde::Serialize;

use crate::session::{SessionPhase, SessionSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderTarget {
    LoadingScreen,
    AuthFlow,
    MainShell,
}

pub fn render_target(snapshot: &SessionSnapshot) -> RenderTarget {
    match snapshot.phase {
        SessionPhase::Initializing => RenderTarget::LoadingScreen,
        SessionPhase::Unauthenticated => RenderTarget::AuthFlow,
        SessionPhase::Authenticated(_) => RenderTarget::MainShell,
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::{User, UserId};

    use super::*;
    use crate::session::ProfileStatus;

    fn user() -> User {
        User::new(UserId::new("u-1").expect("id"), "a@b.com").expect("user")
    }

    #[test]
    fn initial_snapshot_shows_loading_screen() {
        assert_eq!(
            render_target(&SessionSnapshot::initial()),
            RenderTarget::LoadingScreen
        );
    }

    #[test]
    fn unauthenticated_shows_auth_flow_even_while_loading() {
        let snapshot = SessionSnapshot {
            current_user: None,
            is_loading: true,
            phase: SessionPhase::Unauthenticated,
        };
        assert_eq!(render_target(&snapshot), RenderTarget::AuthFlow);
    }

    #[test]
    fn both_profile_states_show_main_shell() {
        for status in [ProfileStatus::Incomplete, ProfileStatus::Complete] {
            let snapshot = SessionSnapshot {
                current_user: Some(user()),
                is_loading: false,
                phase: SessionPhase::Authenticated(status),
            };
            assert_eq!(render_target(&snapshot), RenderTarget::MainShell);
        }
    }
}
