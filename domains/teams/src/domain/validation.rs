//! Validation helpers for user and team fields

use curlarc_common::{Error, Result};
use validator::ValidateEmail;

/// Maximum length of user and team names
pub const MAX_NAME_LEN: usize = 100;

/// Validate a display name (user or team)
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(Error::Validation(format!(
            "{} name must be 1-{} characters",
            kind, MAX_NAME_LEN
        )));
    }
    Ok(())
}

/// Validate an email address (validator crate enforces RFC 5321 including length)
pub fn validate_email(email: &str) -> Result<()> {
    if !email.validate_email() {
        return Err(Error::Validation("Invalid email format".to_string()));
    }
    Ok(())
}

/// Canonical form used for email lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
