//! Form checks the auth screens run before submitting to the controller.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid regex"));
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,}$").expect("invalid regex"));

const LOGIN_PASSWORD_MIN_LEN: usize = 6;
const SIGNUP_PASSWORD_MIN_LEN: usize = 8;
const PHONE_MIN_DIGITS: usize = 10;
const VERIFICATION_CODE_LEN: usize = 6;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_login_password(password: &str) -> bool {
    password.chars().count() >= LOGIN_PASSWORD_MIN_LEN
}

pub fn is_valid_signup_password(password: &str) -> bool {
    password.chars().count() >= SIGNUP_PASSWORD_MIN_LEN
}

pub fn passwords_match(password: &str, confirmation: &str) -> bool {
    !confirmation.is_empty() && password == confirmation
}

pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

pub fn is_valid_phone_number(phone: &str) -> bool {
    phone_digits(phone).len() >= PHONE_MIN_DIGITS
}

pub fn is_valid_verification_code(code: &str) -> bool {
    code.len() == VERIFICATION_CODE_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

/// `(555) 123-4567` for exactly ten digits; anything else is returned as given.
pub fn format_phone_number(phone: &str) -> String {
    let digits = phone_digits(phone);
    if digits.len() != 10 {
        return phone.to_string();
    }
    format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_needs_local_part_domain_and_tld() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn password_lengths_differ_between_login_and_signup() {
        assert!(is_valid_login_password("secret"));
        assert!(!is_valid_signup_password("secret"));
        assert!(is_valid_signup_password("secret12"));
    }

    #[test]
    fn empty_confirmation_never_matches() {
        assert!(!passwords_match("", ""));
        assert!(passwords_match("secret12", "secret12"));
        assert!(!passwords_match("secret12", "secret13"));
    }

    #[test]
    fn phone_numbers_count_digits_only() {
        assert!(is_valid_phone_number("(555) 123-4567"));
        assert!(!is_valid_phone_number("555-1234"));
        assert_eq!(format_phone_number("5551234567"), "(555) 123-4567");
        assert_eq!(format_phone_number("555123"), "555123");
    }

    #[test]
    fn verification_code_is_six_digits() {
        assert!(is_valid_verification_code("123456"));
        assert!(!is_valid_verification_code("12345"));
        assert!(!is_valid_verification_code("12345a"));
    }

    #[test]
    fn usernames_are_word_characters() {
        assert!(is_valid_username("alice_01"));
        assert!(!is_valid_username("al"));
        assert!(!is_valid_username("alice!"));
    }
}
