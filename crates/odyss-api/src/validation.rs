//! Request field validation. Failures map to 422.

use once_cell::sync::Lazy;
use regex::Regex;

use odyss_core::defaults::{NAME_MAX_LEN, PASSWORD_MIN_LEN, USERNAME_MAX_LEN, USERNAME_MIN_LEN};

use crate::error::ApiError;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("email pattern is valid"));

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Length in characters within `min..=max`.
pub fn length(field: &str, value: &str, min: usize, max: usize) -> Result<(), ApiError> {
    let len = char_len(value);
    if len < min {
        return Err(ApiError::Validation(format!(
            "{} must be at least {} characters",
            field, min
        )));
    }
    if len > max {
        return Err(ApiError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

/// Folder, vault and note names: 1 to 255 characters, not blank.
pub fn name(field: &str, value: &str) -> Result<(), ApiError> {
    length(field, value, 1, NAME_MAX_LEN)?;
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{} must not be blank", field)));
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), ApiError> {
    if EMAIL_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(ApiError::Validation("email is not a valid address".to_string()))
    }
}

pub fn username(value: &str) -> Result<(), ApiError> {
    length("username", value, USERNAME_MIN_LEN, USERNAME_MAX_LEN)
}

pub fn password(value: &str) -> Result<(), ApiError> {
    length("password", value, PASSWORD_MIN_LEN, usize::MAX)
}
