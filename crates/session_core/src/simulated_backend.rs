use std::{collections::HashMap, time::Duration};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::{User, UserId, DEFAULT_USERNAME};
use uuid::Uuid;

use crate::{config::LatencySettings, AuthBackend, Credentials};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOperation {
    RestoreSession,
    SignIn,
    SignUp,
    SignOut,
    PersistProfile,
    SendVerificationCode,
    VerifyCode,
    SendPasswordReset,
}

/// In-process stand-in for the account service: fixed latency per call,
/// never remembers a session, accepts any credentials unless a failure has
/// been injected for the operation.
pub struct SimulatedBackend {
    latency: LatencySettings,
    failures: HashMap<BackendOperation, String>,
}

impl SimulatedBackend {
    pub fn new(latency: LatencySettings) -> Self {
        Self {
            latency,
            failures: HashMap::new(),
        }
    }

    pub fn instant() -> Self {
        Self::new(LatencySettings::instant())
    }

    /// Makes every call to `operation` fail with `message` after its latency.
    pub fn failing(mut self, operation: BackendOperation, message: impl Into<String>) -> Self {
        self.failures.insert(operation, message.into());
        self
    }

    async fn round_trip(&self, operation: BackendOperation, delay: Duration) -> Result<()> {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match self.failures.get(&operation) {
            Some(message) => Err(anyhow!("{operation:?} rejected: {message}")),
            None => Ok(()),
        }
    }

    fn fabricate_user(email: &str) -> Result<User> {
        let id = UserId::new(Uuid::new_v4().to_string())?;
        Ok(User::new(id, email)?)
    }
}

#[async_trait]
impl AuthBackend for SimulatedBackend {
    async fn restore_session(&self) -> Result<Option<User>> {
        self.round_trip(BackendOperation::RestoreSession, self.latency.startup())
            .await?;
        Ok(None)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<User> {
        self.round_trip(BackendOperation::SignIn, self.latency.sign_in())
            .await?;
        Ok(Self::fabricate_user(&credentials.email)?.with_username(DEFAULT_USERNAME))
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<User> {
        self.round_trip(BackendOperation::SignUp, self.latency.sign_up())
            .await?;
        Self::fabricate_user(&credentials.email)
    }

    async fn sign_out(&self, _user: &User) -> Result<()> {
        self.round_trip(BackendOperation::SignOut, self.latency.sign_out())
            .await
    }

    async fn persist_profile(&self, _user: &User) -> Result<()> {
        self.round_trip(BackendOperation::PersistProfile, self.latency.profile_update())
            .await
    }

    async fn send_verification_code(&self, _phone: &str) -> Result<()> {
        self.round_trip(
            BackendOperation::SendVerificationCode,
            self.latency.verification_code(),
        )
        .await
    }

    async fn verify_code(&self, _phone: &str, _code: &str) -> Result<()> {
        self.round_trip(BackendOperation::VerifyCode, Duration::ZERO)
            .await
    }

    async fn send_password_reset(&self, _email: &str) -> Result<()> {
        self.round_trip(
            BackendOperation::SendPasswordReset,
            self.latency.password_reset(),
        )
        .await
    }
}

#[cfg(test)]
#[path = "tests/simulated_backend_tests.rs"]
mod tests;
