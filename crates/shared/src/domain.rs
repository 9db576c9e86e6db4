use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Suffix appended to a phone number's digits to synthesize an account email.
pub const PHONE_EMAIL_SUFFIX: &str = "@phone.local";

/// Username assigned to accounts that sign in without completing a profile.
pub const DEFAULT_USERNAME: &str = "user123";

macro_rules! string_id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Result<Self, DomainError> {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    return Err(DomainError::EmptyField(stringify!($name)));
                }
                Ok(Self(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id_newtype!(UserId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl User {
    /// Builds a bare account record. The phone number is filled in when
    /// `email` is phone-derived.
    pub fn new(id: UserId, email: impl Into<String>) -> Result<Self, DomainError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(DomainError::EmptyField("email"));
        }
        let phone_number = phone_number_from_email(&email);
        Ok(Self {
            id,
            email,
            username: None,
            profile_image: None,
            phone_number,
        })
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn is_phone_account(&self) -> bool {
        self.phone_number.is_some()
    }

    /// Returns a copy carrying the new profile fields; everything else is kept.
    pub fn with_profile(&self, username: impl Into<String>, profile_image: Option<String>) -> Self {
        Self {
            username: Some(username.into()),
            profile_image,
            ..self.clone()
        }
    }
}

pub fn is_phone_derived_email(email: &str) -> bool {
    phone_number_from_email(email).is_some()
}

pub fn phone_number_from_email(email: &str) -> Option<String> {
    email
        .strip_suffix(PHONE_EMAIL_SUFFIX)
        .filter(|prefix| !prefix.is_empty())
        .map(str::to_string)
}

/// Digits of `phone` followed by [`PHONE_EMAIL_SUFFIX`].
pub fn phone_derived_email(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    format!("{digits}{PHONE_EMAIL_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_number_is_recovered_from_derived_email() {
        let email = phone_derived_email("(555) 123-4567");
        assert_eq!(email, "5551234567@phone.local");
        assert_eq!(phone_number_from_email(&email).as_deref(), Some("5551234567"));
    }

    #[test]
    fn plain_email_has_no_phone_number() {
        assert_eq!(phone_number_from_email("a@b.com"), None);
        assert_eq!(phone_number_from_email("@phone.local"), None);
        assert!(!is_phone_derived_email("someone@phone.local.example"));
    }

    #[test]
    fn user_requires_email_and_id() {
        assert!(UserId::new("  ").is_err());
        let id = UserId::new("u-1").expect("id");
        assert!(User::new(id.clone(), "").is_err());

        let user = User::new(id, "5551234567@phone.local").expect("user");
        assert!(user.is_phone_account());
        assert_eq!(user.username, None);
    }

    #[test]
    fn with_profile_only_touches_profile_fields() {
        let user = User::new(UserId::new("u-1").expect("id"), "a@b.com")
            .expect("user")
            .with_username("old");
        let updated = user.with_profile("alice", Some("file:///avatar.png".to_string()));

        assert_eq!(updated.id, user.id);
        assert_eq!(updated.email, user.email);
        assert_eq!(updated.phone_number, user.phone_number);
        assert_eq!(updated.username.as_deref(), Some("alice"));
        assert_eq!(updated.profile_image.as_deref(), Some("file:///avatar.png"));
    }

    #[test]
    fn user_serializes_without_absent_fields() {
        let user = User::new(UserId::new("u-1").expect("id"), "a@b.com").expect("user");
        let json = serde_json::to_value(&user).expect("json");
        assert_eq!(json, serde_json::json!({ "id": "u-1", "email": "a@b.com" }));
    }
}
