//! Contact form field rules.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Digits, spaces, and `- + ( )`, 10 to 20 characters.
pub const PHONE_PATTERN: &str = r"^[0-9\s\-\+\(\)]{10,20}$";

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_MESSAGE_LEN: usize = 5000;

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("valid regex"));

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Validate already-trimmed contact fields.
pub fn validate_contact_fields(name: &str, phone: &str, message: &str) -> Result<(), CoreError> {
    if name.is_empty() || phone.is_empty() || message.is_empty() {
        return Err(CoreError::Validation(
            "Name, phone and message are all required".into(),
        ));
    }
    if !is_valid_phone(phone) {
        return Err(CoreError::Validation("Invalid phone number".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(CoreError::Validation(format!(
            "Message must be at most {MAX_MESSAGE_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn accepts_formatted_phone_numbers() {
        assert!(is_valid_phone("0532 123 45 67"));
        assert!(is_valid_phone("+90 (532) 123-4567"));
        assert!(is_valid_phone("5321234567"));
    }

    #[test]
    fn rejects_bad_phone_numbers() {
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("call me maybe"));
        assert!(!is_valid_phone("123456789012345678901"));
    }

    #[test]
    fn all_fields_required() {
        assert_matches!(
            validate_contact_fields("", "5321234567", "hi"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            validate_contact_fields("Ada", "5321234567", ""),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn message_length_is_capped() {
        let long = "x".repeat(MAX_MESSAGE_LEN + 1);
        assert_matches!(
            validate_contact_fields("Ada", "5321234567", &long),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn valid_submission_passes() {
        assert!(validate_contact_fields("Ada", "0532 123 45 67", "Hello").is_ok());
    }
}
