use std::collections::HashMap;

use crate::services::error::{ServiceError, ServiceResult};

/// Basic email shape check: one `@`, non-empty local part, dotted domain, no whitespace.
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    if email.chars().any(char::is_whitespace) {
        return Err("Email cannot contain whitespace".to_string());
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err("Invalid email format".to_string());
    }

    let domain = parts[1];
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

pub fn validate_password(password: &str, min_length: usize) -> Result<(), String> {
    if password.chars().count() < min_length {
        return Err(format!("Password must be at least {} characters", min_length));
    }
    Ok(())
}

pub fn validate_capacity(capacity: f64) -> Result<(), String> {
    if !capacity.is_finite() || capacity <= 0.0 {
        return Err("Capacity must be greater than 0".to_string());
    }
    Ok(())
}

/// Collects per-field failures so a request reports all of them at once
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: HashMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, field: &str, result: Result<(), String>) -> &mut Self {
        if let Err(message) = result {
            self.errors.entry(field.to_string()).or_insert(message);
        }
        self
    }

    pub fn finish(self) -> ServiceResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(validate_email_format("admin@effitech.com").is_ok());
        assert!(validate_email_format("first.last+tag@mail.example.org").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in ["", "plain", "@example.com", "a@", "a@b", "a@@b.com", "a b@c.com", "a@.com", "a@b..com"] {
            assert!(validate_email_format(email).is_err(), "{email} should be rejected");
        }
    }

    #[test]
    fn password_length_is_counted_in_characters() {
        assert!(validate_password("12345", 6).is_err());
        assert!(validate_password("123456", 6).is_ok());
        assert!(validate_password("ñññññ", 6).is_err());
    }

    #[test]
    fn capacity_must_be_positive_and_finite() {
        assert!(validate_capacity(0.5).is_ok());
        assert!(validate_capacity(0.0).is_err());
        assert!(validate_capacity(-10.0).is_err());
        assert!(validate_capacity(f64::NAN).is_err());
        assert!(validate_capacity(f64::INFINITY).is_err());
    }

    #[test]
    fn field_errors_collects_every_failure() {
        let mut errors = FieldErrors::new();
        errors
            .check("email", validate_email_format("nope"))
            .check("password", validate_password("x", 6))
            .check("capacity", validate_capacity(10.0));

        match errors.finish() {
            Err(ServiceError::Validation(fields)) => {
                assert_eq!(fields.len(), 2);
                assert!(fields.contains_key("email"));
                assert!(fields.contains_key("password"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
