use std::{future::Future, sync::Arc};

use serde::Serialize;
use shared::domain::{is_phone_derived_email, phone_derived_email, phone_number_from_email, User};
use tokio::sync::{watch, Mutex, MutexGuard};
use tracing::{info, warn};

use crate::{
    validation, AuthBackend, Credentials, NavigationMode, Navigator, NoopNavigator, Route,
    SessionError, PHONE_VERIFICATION_PASSWORD, SOCIAL_LOGIN_PASSWORD,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    Incomplete,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "profile", rename_all = "snake_case")]
pub enum SessionPhase {
    Initializing,
    Unauthenticated,
    Authenticated(ProfileStatus),
}

/// Immutable view of the session handed to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub current_user: Option<User>,
    pub is_loading: bool,
    pub phase: SessionPhase,
}

impl SessionSnapshot {
    pub fn initial() -> Self {
        Self {
            current_user: None,
            is_loading: true,
            phase: SessionPhase::Initializing,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn profile_status(&self) -> Option<ProfileStatus> {
        match self.phase {
            SessionPhase::Authenticated(status) => Some(status),
            _ => None,
        }
    }
}

/// Sign-in identities offered on the landing screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialProvider {
    Google,
    Apple,
}

impl SocialProvider {
    pub fn label(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Apple => "Apple",
        }
    }

    /// Account email the provider hands back after consent.
    pub fn account_email(self) -> &'static str {
        match self {
            Self::Google => "user@gmail.com",
            Self::Apple => "user@icloud.com",
        }
    }
}

/// Single owner of the authentication state.
///
/// Transitions are serialized: while one is in flight, a second
/// `initialize`/`sign_in`/`sign_up`/`update_profile` is rejected with
/// [`SessionError::TransitionInProgress`] and `sign_out` waits its turn.
/// Each transition runs on its own task, so dropping the returned future
/// does not abandon it half way. Every transition publishes its final state
/// in one update, so observers never see a user change without
/// `is_loading` dropping back to false.
pub struct SessionController {
    backend: Arc<dyn AuthBackend>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<SessionSnapshot>,
    transition: Mutex<()>,
}

impl SessionController {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Arc<Self> {
        Self::new_with_navigator(backend, Arc::new(NoopNavigator))
    }

    pub fn new_with_navigator(
        backend: Arc<dyn AuthBackend>,
        navigator: Arc<dyn Navigator>,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(SessionSnapshot::initial());
        Arc::new(Self {
            backend,
            navigator,
            state,
            transition: Mutex::new(()),
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Startup check for a stored session. Only acts while the session is
    /// still `Initializing`; a failed check resolves to unauthenticated.
    pub async fn initialize(self: &Arc<Self>) -> Result<(), SessionError> {
        self.run_detached(|this| async move { this.apply_initialize().await })
            .await
    }

    pub async fn sign_in(
        self: &Arc<Self>,
        email: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        let credentials = checked_credentials(email, password)?;
        self.run_detached(move |this| async move { this.apply_sign_in(credentials).await })
            .await
    }

    pub async fn sign_in_with_provider(
        self: &Arc<Self>,
        provider: SocialProvider,
    ) -> Result<(), SessionError> {
        info!(provider = provider.label(), "social sign-in accepted");
        self.sign_in(provider.account_email(), SOCIAL_LOGIN_PASSWORD)
            .await
    }

    /// Phone-derived accounts skip profile setup; everyone else is sent there.
    pub async fn sign_up(
        self: &Arc<Self>,
        email: &str,
        password: &str,
    ) -> Result<(), SessionError> {
        let credentials = checked_credentials(email, password)?;
        self.run_detached(move |this| async move { this.apply_sign_up(credentials).await })
            .await
    }

    /// Always clears the session. A backend failure is logged and ignored.
    pub async fn sign_out(self: &Arc<Self>) {
        let outcome = self
            .run_detached(|this| async move {
                this.apply_sign_out().await;
                Ok(())
            })
            .await;
        if let Err(err) = outcome {
            warn!(error = %err, "sign-out task did not finish");
        }
    }

    /// Overwrites `username` and `profile_image`; every other field is kept.
    pub async fn update_profile(
        self: &Arc<Self>,
        username: &str,
        profile_image: Option<String>,
    ) -> Result<(), SessionError> {
        let username = username.to_string();
        self.run_detached(move |this| async move {
            this.apply_update_profile(username, profile_image).await
        })
        .await
    }

    /// Leaves profile setup without choosing a username.
    pub fn skip_profile_setup(&self) -> Result<(), SessionError> {
        let _guard = self.acquire()?;
        let current = self.state.borrow().current_user.clone();
        let Some(current) = current else {
            return Err(SessionError::NotAuthenticated);
        };

        self.commit(
            Some(current),
            SessionPhase::Authenticated(ProfileStatus::Complete),
        );
        self.navigator
            .navigate(Route::MainShell, NavigationMode::Replace);
        Ok(())
    }

    pub async fn send_phone_verification(&self, phone: &str) -> Result<(), SessionError> {
        if !validation::is_valid_phone_number(phone) {
            return Err(SessionError::InvalidInput("phone number"));
        }
        let digits = validation::phone_digits(phone);
        self.backend
            .send_verification_code(&digits)
            .await
            .map_err(|err| SessionError::Verification(err.to_string()))
    }

    /// Confirms the code, then registers the phone-derived account.
    pub async fn verify_phone_and_sign_up(
        self: &Arc<Self>,
        phone: &str,
        code: &str,
    ) -> Result<(), SessionError> {
        if !validation::is_valid_phone_number(phone) {
            return Err(SessionError::InvalidInput("phone number"));
        }
        if !validation::is_valid_verification_code(code) {
            return Err(SessionError::InvalidInput("verification code"));
        }
        let digits = validation::phone_digits(phone);
        self.backend
            .verify_code(&digits, code)
            .await
            .map_err(|err| SessionError::Verification(err.to_string()))?;

        self.sign_up(&phone_derived_email(&digits), PHONE_VERIFICATION_PASSWORD)
            .await
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), SessionError> {
        if !validation::is_valid_email(email) {
            return Err(SessionError::InvalidInput("email"));
        }
        self.backend
            .send_password_reset(email)
            .await
            .map_err(SessionError::Backend)?;
        info!(email, "password reset requested");
        Ok(())
    }

    async fn run_detached<T, F>(
        self: &Arc<Self>,
        transition: impl FnOnce(Arc<Self>) -> F,
    ) -> Result<T, SessionError>
    where
        F: Future<Output = Result<T, SessionError>> + Send + 'static,
        T: Send + 'static,
    {
        let task = tokio::spawn(transition(Arc::clone(self)));
        match task.await {
            Ok(outcome) => outcome,
            Err(err) => Err(SessionError::Backend(anyhow::Error::new(err))),
        }
    }

    async fn apply_initialize(&self) -> Result<(), SessionError> {
        let _guard = self.acquire()?;
        if self.state.borrow().phase != SessionPhase::Initializing {
            return Ok(());
        }
        self.mark_loading();

        match self.backend.restore_session().await {
            Ok(Some(user)) => {
                info!(user_id = %user.id, "restored stored session");
                self.commit(
                    Some(user),
                    SessionPhase::Authenticated(ProfileStatus::Complete),
                );
            }
            Ok(None) => {
                info!("no stored session");
                self.commit(None, SessionPhase::Unauthenticated);
            }
            Err(err) => {
                warn!(error = %err, "session restore failed; starting unauthenticated");
                self.commit(None, SessionPhase::Unauthenticated);
            }
        }
        Ok(())
    }

    async fn apply_sign_in(&self, credentials: Credentials) -> Result<(), SessionError> {
        let _guard = self.acquire()?;
        self.mark_loading();

        let user = self
            .settle(self.backend.sign_in(&credentials), |err| {
                SessionError::Auth(err.to_string())
            })
            .await?;
        let user = with_derived_phone(user, &credentials.email);

        info!(user_id = %user.id, "signed in");
        self.commit(
            Some(user),
            SessionPhase::Authenticated(ProfileStatus::Complete),
        );
        self.navigator
            .navigate(Route::MainShell, NavigationMode::Replace);
        Ok(())
    }

    async fn apply_sign_up(&self, credentials: Credentials) -> Result<(), SessionError> {
        let _guard = self.acquire()?;
        self.mark_loading();

        let user = self
            .settle(self.backend.sign_up(&credentials), |err| {
                SessionError::Auth(err.to_string())
            })
            .await?;
        let user = with_derived_phone(user, &credentials.email);

        let phone_account = is_phone_derived_email(&credentials.email);
        info!(user_id = %user.id, phone_account, "signed up");
        if phone_account {
            self.commit(
                Some(user),
                SessionPhase::Authenticated(ProfileStatus::Complete),
            );
            self.navigator
                .navigate(Route::MainShell, NavigationMode::Replace);
        } else {
            self.commit(
                Some(user),
                SessionPhase::Authenticated(ProfileStatus::Incomplete),
            );
            self.navigator
                .navigate(Route::ProfileSetup, NavigationMode::Push);
        }
        Ok(())
    }

    async fn apply_sign_out(&self) {
        let _guard = self.transition.lock().await;
        let current_user = self.state.borrow().current_user.clone();

        if let Some(user) = current_user {
            self.mark_loading();
            if let Err(err) = self.backend.sign_out(&user).await {
                warn!(user_id = %user.id, error = %err, "sign-out request failed; clearing session anyway");
            }
            info!(user_id = %user.id, "signed out");
        }

        self.commit(None, SessionPhase::Unauthenticated);
        self.navigator
            .navigate(Route::AuthFlow, NavigationMode::Replace);
    }

    async fn apply_update_profile(
        &self,
        username: String,
        profile_image: Option<String>,
    ) -> Result<(), SessionError> {
        let _guard = self.acquire()?;
        let current = self.state.borrow().current_user.clone();
        let Some(current) = current else {
            return Err(SessionError::NotAuthenticated);
        };
        if username.trim().is_empty() {
            return Err(SessionError::InvalidInput("username"));
        }
        self.mark_loading();

        let updated = current.with_profile(username, profile_image);
        self.settle(self.backend.persist_profile(&updated), |err| {
            SessionError::ProfileUpdate(err.to_string())
        })
        .await?;

        info!(user_id = %updated.id, "profile updated");
        self.commit(
            Some(updated),
            SessionPhase::Authenticated(ProfileStatus::Complete),
        );
        self.navigator
            .navigate(Route::MainShell, NavigationMode::Replace);
        Ok(())
    }

    fn acquire(&self) -> Result<MutexGuard<'_, ()>, SessionError> {
        self.transition
            .try_lock()
            .map_err(|_| SessionError::TransitionInProgress)
    }

    fn mark_loading(&self) {
        self.state.send_modify(|state| state.is_loading = true);
    }

    fn commit(&self, user: Option<User>, phase: SessionPhase) {
        self.state.send_modify(|state| {
            state.current_user = user;
            state.phase = phase;
            state.is_loading = false;
        });
    }

    async fn settle<T>(
        &self,
        request: impl Future<Output = anyhow::Result<T>>,
        map_err: impl FnOnce(anyhow::Error) -> SessionError,
    ) -> Result<T, SessionError> {
        match request.await {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(error = %err, "session transition failed");
                self.state.send_modify(|state| state.is_loading = false);
                Err(map_err(err))
            }
        }
    }
}

fn checked_credentials(email: &str, password: &str) -> Result<Credentials, SessionError> {
    if email.trim().is_empty() {
        return Err(SessionError::InvalidInput("email"));
    }
    if password.is_empty() {
        return Err(SessionError::InvalidInput("password"));
    }
    Ok(Credentials::new(email, password))
}

fn with_derived_phone(mut user: User, email: &str) -> User {
    if user.phone_number.is_none() {
        user.phone_number = phone_number_from_email(email);
    }
    user
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
