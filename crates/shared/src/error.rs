use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Auth,
    NotAuthenticated,
    ProfileUpdate,
    TransitionInProgress,
    Validation,
    Verification,
    Internal,
}

impl ErrorCode {
    /// Message shown next to the form that triggered the failure.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Auth => "Invalid credentials",
            Self::NotAuthenticated => "You need to sign in first",
            Self::ProfileUpdate => "Failed to update profile",
            Self::TransitionInProgress => "Please wait for the current request to finish",
            Self::Validation => "Please check the highlighted fields",
            Self::Verification => "Invalid verification code. Please try again.",
            Self::Internal => "Something went wrong. Please try again.",
        }
    }
}

/// Serializable failure report handed to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureReport {
    pub code: ErrorCode,
    pub message: String,
}

impl FailureReport {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}
