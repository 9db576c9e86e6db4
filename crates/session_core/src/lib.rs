use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use shared::domain::User;

pub mod config;
pub mod error;
pub mod gate;
pub mod navigation;
mod session;
mod simulated_backend;
pub mod validation;

pub use error::SessionError;
pub use navigation::{NavigationMode, Navigator, NoopNavigator, Route, TracingNavigator};
pub use session::{
    ProfileStatus, SessionController, SessionPhase, SessionSnapshot, SocialProvider,
};
pub use simulated_backend::{BackendOperation, SimulatedBackend};

/// Password used when a phone sign-up is turned into an account.
pub const PHONE_VERIFICATION_PASSWORD: &str = "phone_verification";

/// Password sent with provider sign-ins.
pub const SOCIAL_LOGIN_PASSWORD: &str = "social_login";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Account service the controller talks to. Credential verification and
/// profile persistence both live behind this seam.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// A previously stored session, if any.
    async fn restore_session(&self) -> Result<Option<User>>;
    async fn sign_in(&self, credentials: &Credentials) -> Result<User>;
    async fn sign_up(&self, credentials: &Credentials) -> Result<User>;
    async fn sign_out(&self, user: &User) -> Result<()>;
    async fn persist_profile(&self, user: &User) -> Result<()>;
    async fn send_verification_code(&self, phone: &str) -> Result<()>;
    async fn verify_code(&self, phone: &str, code: &str) -> Result<()>;
    async fn send_password_reset(&self, email: &str) -> Result<()>;
}
