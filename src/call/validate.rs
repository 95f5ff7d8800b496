//! Client-side phone number checks. Only cheap, user-facing rules live here;
//! the backend does the authoritative format validation.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a phone number")]
    Empty,

    #[error("Phone number must start with + (e.g., +18005551234)")]
    MissingPlusPrefix,
}

/// Rules are applied in order and the first failure wins.
pub fn validate_phone_number(phone_number: &str) -> Result<(), ValidationError> {
    if phone_number.trim().is_empty() {
        return Err(ValidationError::Empty);
    }
    if !phone_number.starts_with('+') {
        return Err(ValidationError::MissingPlusPrefix);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case(" ")]
    #[case("   \t ")]
    #[case("\n")]
    fn test_blank_is_empty(#[case] input: &str) {
        assert_eq!(validate_phone_number(input), Err(ValidationError::Empty));
    }

    #[rstest]
    #[case("18005551234")]
    #[case(" +18005551234")]
    #[case("abc")]
    #[case("00448005551234")]
    fn test_missing_plus(#[case] input: &str) {
        assert_eq!(
            validate_phone_number(input),
            Err(ValidationError::MissingPlusPrefix)
        );
    }

    #[rstest]
    #[case("+18005551234")]
    #[case("+")]
    #[case("+not-a-number")]
    fn test_accepted(#[case] input: &str) {
        assert_eq!(validate_phone_number(input), Ok(()));
    }

    #[test]
    fn test_messages() {
        assert_eq!(ValidationError::Empty.to_string(), "Please enter a phone number");
        assert_eq!(
            ValidationError::MissingPlusPrefix.to_string(),
            "Phone number must start with + (e.g., +18005551234)"
        );
    }
}
