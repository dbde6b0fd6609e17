//! Field rules shared by customer and address validation.
//!
//! Validation never stops at the first failure: callers feed every field
//! through a [`Violations`] accumulator and convert it into a single
//! [`DomainError::Validation`] at the end.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;

use crate::error::{DomainError, FieldError};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex pattern")
});

static MOBILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9]\d{9}$").expect("Invalid mobile regex pattern"));

static PINCODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{5}$").expect("Invalid pincode regex pattern"));

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Ten digits, first digit 6-9.
pub fn is_valid_mobile(value: &str) -> bool {
    MOBILE_PATTERN.is_match(value)
}

/// Six digits, first digit non-zero.
pub fn is_valid_pincode(value: &str) -> bool {
    PINCODE_PATTERN.is_match(value)
}

/// Parses a date of birth given either as `YYYY-MM-DD` or as an RFC 3339
/// timestamp, and requires it to be strictly before `today`.
pub fn parse_date_of_birth(value: &str, today: NaiveDate) -> Result<NaiveDate, &'static str> {
    let value = value.trim();
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| "Date of birth must be a valid date (YYYY-MM-DD)")?;

    if date >= today {
        return Err("Date of birth cannot be in the future");
    }
    Ok(date)
}

/// Accumulates field violations across a whole input.
#[derive(Debug, Default)]
pub struct Violations {
    errors: Vec<FieldError>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Returns the trimmed value if present and non-blank, recording
    /// `message` otherwise.
    pub fn required<'a>(
        &mut self,
        field: &str,
        value: Option<&'a str>,
        message: &str,
    ) -> Option<&'a str> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v),
            _ => {
                self.push(field, message);
                None
            }
        }
    }

    /// Checks a person-name field: trimmed length within 2..=50 characters.
    pub fn name(&mut self, field: &str, label: &str, value: &str) -> Option<String> {
        let trimmed = value.trim();
        let len = trimmed.chars().count();
        if len == 0 {
            self.push(field, format!("{label} is required"));
            None
        } else if len < NAME_MIN_CHARS {
            self.push(
                field,
                format!("{label} must be at least {NAME_MIN_CHARS} characters"),
            );
            None
        } else if len > NAME_MAX_CHARS {
            self.push(
                field,
                format!("{label} cannot exceed {NAME_MAX_CHARS} characters"),
            );
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Lower-cases and checks an email address.
    pub fn email(&mut self, field: &str, value: &str) -> Option<String> {
        let normalized = value.trim().to_lowercase();
        if is_valid_email(&normalized) {
            Some(normalized)
        } else {
            self.push(field, "Please provide a valid email address");
            None
        }
    }

    pub fn mobile(&mut self, field: &str, value: &str) -> Option<String> {
        let trimmed = value.trim();
        if is_valid_mobile(trimmed) {
            Some(trimmed.to_string())
        } else {
            self.push(
                field,
                "Please provide a valid 10-digit mobile number starting with 6-9",
            );
            None
        }
    }

    pub fn pincode(&mut self, field: &str, value: &str) -> Option<String> {
        let trimmed = value.trim();
        if is_valid_pincode(trimmed) {
            Some(trimmed.to_string())
        } else {
            self.push(field, "Pincode must be 6 digits and not start with 0");
            None
        }
    }

    pub fn date_of_birth(&mut self, field: &str, value: &str, today: NaiveDate) -> Option<NaiveDate> {
        match parse_date_of_birth(value, today) {
            Ok(date) => Some(date),
            Err(message) => {
                self.push(field, message);
                None
            }
        }
    }

    /// Parses an enumerated value, recording `message` on failure.
    pub fn parse<T: std::str::FromStr>(&mut self, field: &str, value: &str, message: &str) -> Option<T> {
        match value.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                self.push(field, message);
                None
            }
        }
    }

    /// Merges the violations of a nested input under `prefix`.
    pub fn absorb(&mut self, prefix: &str, error: DomainError) {
        for e in error.field_errors() {
            self.errors
                .push(FieldError::new(format!("{prefix}.{}", e.field), e.message.clone()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), DomainError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation {
                errors: self.errors,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn pincode_rules() {
        assert!(is_valid_pincode("411001"));
        assert!(!is_valid_pincode("011001"));
        assert!(!is_valid_pincode("41100"));
        assert!(!is_valid_pincode("4110011"));
        assert!(!is_valid_pincode("41100a"));
    }

    #[test]
    fn mobile_rules() {
        assert!(is_valid_mobile("9876543210"));
        assert!(is_valid_mobile("6000000000"));
        assert!(!is_valid_mobile("5876543210"));
        assert!(!is_valid_mobile("987654321"));
        assert!(!is_valid_mobile("98765432100"));
    }

    #[test]
    fn email_rules() {
        assert!(is_valid_email("a@x.com"));
        assert!(!is_valid_email("invalid-email"));
        assert!(!is_valid_email("a @x.com"));
        assert!(!is_valid_email("a@x"));
    }

    #[test]
    fn date_of_birth_must_be_in_the_past() {
        assert_eq!(
            parse_date_of_birth("1990-01-01", today()),
            Ok(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap())
        );
        assert!(parse_date_of_birth("2024-06-01", today()).is_err());
        assert!(parse_date_of_birth("2030-01-01", today()).is_err());
        assert!(parse_date_of_birth("not a date", today()).is_err());
        assert!(parse_date_of_birth("1990-01-01T10:00:00Z", today()).is_ok());
    }

    #[test]
    fn violations_collect_every_failure() {
        let mut v = Violations::new();
        v.name("firstName", "First name", "J");
        v.email("email", "nope");
        v.mobile("mobile", "123");
        assert!(!v.is_empty());

        let err = v.into_result().unwrap_err();
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["firstName", "email", "mobile"]);
    }

    #[test]
    fn name_is_trimmed_and_bounded() {
        let mut v = Violations::new();
        assert_eq!(v.name("f", "First name", "  John "), Some("John".to_string()));
        assert_eq!(v.name("f", "First name", &"x".repeat(51)), None);
        assert!(v.into_result().is_err());
    }

    #[test]
    fn email_is_lower_cased() {
        let mut v = Violations::new();
        assert_eq!(v.email("email", " A@X.COM "), Some("a@x.com".to_string()));
    }
}
