//! Typed failures surfaced by [`crate::SessionController`].

use shared::error::{ErrorCode, FailureReport};
use thiserror::Error;

use crate::SocialProvider;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("no authenticated user")]
    NotAuthenticated,
    #[error("failed to update profile: {0}")]
    ProfileUpdate(String),
    #[error("another session transition is already in progress")]
    TransitionInProgress,
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("verification failed: {0}")]
    Verification(String),
    #[error("backend request failed: {0}")]
    Backend(#[source] anyhow::Error),
}

impl SessionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Auth(_) => ErrorCode::Auth,
            Self::NotAuthenticated => ErrorCode::NotAuthenticated,
            Self::ProfileUpdate(_) => ErrorCode::ProfileUpdate,
            Self::TransitionInProgress => ErrorCode::TransitionInProgress,
            Self::InvalidInput(_) => ErrorCode::Validation,
            Self::Verification(_) => ErrorCode::Verification,
            Self::Backend(_) => ErrorCode::Internal,
        }
    }

    pub fn report(&self) -> FailureReport {
        FailureReport::new(self.code(), self.to_string())
    }
}

/// Which form a failure is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormContext {
    SignIn,
    SocialSignIn(SocialProvider),
    SignUp,
    PhoneVerification,
    ProfileSetup,
    PasswordReset,
}

/// Maps a failure to the message rendered next to the triggering form.
pub fn classify_failure(context: FormContext, err: &SessionError) -> String {
    match (context, err) {
        (_, SessionError::TransitionInProgress | SessionError::NotAuthenticated) => {
            err.code().user_message().to_string()
        }
        (FormContext::SignIn | FormContext::SignUp, SessionError::InvalidInput(_)) => {
            "Please enter a valid email and password".to_string()
        }
        (FormContext::SignIn, _) => ErrorCode::Auth.user_message().to_string(),
        (FormContext::SocialSignIn(provider), _) => {
            format!("Failed to sign in with {}", provider.label())
        }
        (FormContext::SignUp, _) => "Failed to create account".to_string(),
        (FormContext::PhoneVerification, SessionError::InvalidInput(_)) => {
            "Please enter a valid phone number and 6-digit code".to_string()
        }
        (FormContext::PhoneVerification, _) => {
            ErrorCode::Verification.user_message().to_string()
        }
        (FormContext::ProfileSetup, SessionError::InvalidInput(_)) => {
            "Username must be at least 3 characters and contain only letters, numbers, and underscores"
                .to_string()
        }
        (FormContext::ProfileSetup, _) => ErrorCode::ProfileUpdate.user_message().to_string(),
        (FormContext::PasswordReset, _) => {
            "Failed to send reset email. Please try again.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_the_error_kind() {
        assert_eq!(SessionError::Auth("x".into()).code(), ErrorCode::Auth);
        assert_eq!(
            SessionError::NotAuthenticated.code(),
            ErrorCode::NotAuthenticated
        );
        assert_eq!(
            SessionError::Backend(anyhow::anyhow!("boom")).report().code,
            ErrorCode::Internal
        );
    }

    #[test]
    fn sign_in_failures_read_as_invalid_credentials() {
        let message = classify_failure(
            FormContext::SignIn,
            &SessionError::Auth("upstream said no".into()),
        );
        assert_eq!(message, "Invalid credentials");
    }

    #[test]
    fn busy_controller_is_reported_the_same_on_every_form() {
        let err = SessionError::TransitionInProgress;
        assert_eq!(
            classify_failure(FormContext::SignUp, &err),
            classify_failure(FormContext::ProfileSetup, &err)
        );
    }

    #[test]
    fn social_failures_name_the_provider() {
        let err = SessionError::Auth("consent revoked".into());
        assert_eq!(
            classify_failure(FormContext::SocialSignIn(SocialProvider::Google), &err),
            "Failed to sign in with Google"
        );
        assert_eq!(
            classify_failure(FormContext::SocialSignIn(SocialProvider::Apple), &err),
            "Failed to sign in with Apple"
        );
    }

    #[test]
    fn rejected_credentials_are_not_reported_as_backend_failures() {
        let err = SessionError::InvalidInput("email");
        assert_eq!(
            classify_failure(FormContext::SignUp, &err),
            "Please enter a valid email and password"
        );
        assert_eq!(
            classify_failure(FormContext::SignIn, &err),
            "Please enter a valid email and password"
        );
        assert_eq!(
            classify_failure(FormContext::SignUp, &SessionError::Auth("taken".into())),
            "Failed to create account"
        );
    }
}
