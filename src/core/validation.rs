//! Input validation for bootstrap configuration.
//!
//! Validates the name prefix, domain label and region before any cloud
//! call is made.

use crate::core::constants::NAME_MAX_LEN;
use crate::error::{Result, ValidationError};

/// Validate a resource name fragment (prefix or domain label).
///
/// Names must match `^[a-z0-9-]{1,15}$` and must not start or end with a
/// hyphen. The first violation found is reported.
///
/// # Errors
///
/// Returns `ValidationError` describing the violated constraint.
pub fn validate_name(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field }.into());
    }

    let len = value.chars().count();
    if len > NAME_MAX_LEN {
        return Err(ValidationError::TooLong {
            field,
            value: value.to_string(),
            len,
            max: NAME_MAX_LEN,
        }
        .into());
    }

    for (i, ch) in value.chars().enumerate() {
        if !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-') {
            return Err(ValidationError::InvalidChar {
                field,
                value: value.to_string(),
                ch,
                position: i + 1,
            }
            .into());
        }
    }

    if value.starts_with('-') || value.ends_with('-') {
        return Err(ValidationError::HyphenBoundary {
            field,
            value: value.to_string(),
        }
        .into());
    }

    Ok(())
}

/// Validate an Azure region name such as `canadacentral`.
pub fn validate_location(location: &str) -> Result<()> {
    let ok = !location.is_empty()
        && location
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !ok {
        return Err(ValidationError::InvalidLocation(location.to_string()).into());
    }
    Ok(())
}
