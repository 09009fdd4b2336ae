//! Input validation helpers

use shared::LngLat;

use crate::utils::AppError;

/// Marker and tag names
pub const MAX_NAME_LEN: usize = 200;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string is within the length limit.
pub fn validate_optional_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate a position in decimal degrees
pub fn validate_coordinate(at: LngLat) -> Result<(), AppError> {
    if !at.is_finite() || !at.in_range() {
        return Err(AppError::validation(format!("{at} is not a valid position")));
    }
    Ok(())
}
