//! Field-level request validation.
//!
//! Decoding checks shape and presence; [`Validate`] checks the values. Every failure
//! is a `validation` error naming the offending field.

use swift_signals_core::{Result, ServiceError};

/// Value checks on a decoded request.
pub trait Validate {
    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns a `validation` error for the first field that fails.
    fn validate(&self) -> Result<()>;
}

/// Require a non-blank string.
///
/// # Errors
///
/// `validation` if `value` is empty or whitespace.
pub fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Require a length, in characters, within `min..=max`.
///
/// # Errors
///
/// `validation` if the length is out of range.
pub fn length(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(
            ServiceError::validation(format!(
                "{field} must be between {min} and {max} characters"
            ))
            .with_context("length", len),
        );
    }
    Ok(())
}

/// Require at most `max` characters.
///
/// # Errors
///
/// `validation` if `value` is longer.
pub fn max_length(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(ServiceError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Require a plausible email address: a non-empty local part and domain around a
/// single `@`, no whitespace.
///
/// # Errors
///
/// `validation` if `value` does not look like an email address.
pub fn email(field: &str, value: &str) -> Result<()> {
    let plausible = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !plausible {
        return Err(ServiceError::validation(format!(
            "{field} must be a valid email address"
        )));
    }
    Ok(())
}

/// Require `value >= min`.
///
/// # Errors
///
/// `validation` if `value` is smaller.
pub fn at_least(field: &str, value: i32, min: i32) -> Result<()> {
    if value < min {
        return Err(ServiceError::validation(format!(
            "{field} must be at least {min}"
        )));
    }
    Ok(())
}

/// Require `value` within `min..=max`.
///
/// # Errors
///
/// `validation` if `value` is out of range.
pub fn between(field: &str, value: i32, min: i32, max: i32) -> Result<()> {
    if value < min || value > max {
        return Err(ServiceError::validation(format!(
            "{field} must be between {min} and {max}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use swift_signals_core::ErrorKind;

    use super::*;

    #[test]
    fn emails() {
        for ok in ["a@x.com", "first.last@sub.example.org", "a@localhost"] {
            assert!(email("email", ok).is_ok(), "{ok}");
        }
        for bad in ["", "alice", "@x.com", "a@", "a@@x.com", "a b@x.com", "a@x.com."] {
            let err = email("email", bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{bad}");
        }
    }

    #[test]
    fn lengths_count_characters() {
        assert!(length("username", "abc", 3, 32).is_ok());
        assert!(length("username", "ab", 3, 32).is_err());
        assert!(length("username", "ééé", 3, 3).is_ok());
        assert!(length("username", &"a".repeat(33), 3, 32).is_err());
        assert!(max_length("name", &"n".repeat(256), 256).is_ok());
        assert!(max_length("name", &"n".repeat(257), 256).is_err());
    }

    #[test]
    fn numbers() {
        assert!(at_least("green", 1, 1).is_ok());
        assert_eq!(
            at_least("green", 0, 1).unwrap_err().message(),
            "green must be at least 1"
        );
        assert!(between("page_size", 100, 1, 100).is_ok());
        assert!(between("page_size", 101, 1, 100).is_err());
        assert!(between("page_size", 0, 1, 100).is_err());
    }

    #[test]
    fn required_rejects_blank() {
        assert!(required("password", "x").is_ok());
        assert_eq!(
            required("password", "  ").unwrap_err().message(),
            "password is required"
        );
    }
}
