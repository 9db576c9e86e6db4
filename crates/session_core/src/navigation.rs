use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    AuthFlow,
    ProfileSetup,
    MainShell,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::AuthFlow => "/auth",
            Self::ProfileSetup => "/auth/profile-setup",
            Self::MainShell => "/(tabs)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    /// Swap the active stack for `route`.
    Replace,
    /// Stack `route` on top of the current screen.
    Push,
}

/// Screen-stack capability the controller drives after a committed transition.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route, mode: NavigationMode);
}

pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _route: Route, _mode: NavigationMode) {}
}

pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, route: Route, mode: NavigationMode) {
        tracing::debug!(path = route.path(), ?mode, "navigate");
    }
}
