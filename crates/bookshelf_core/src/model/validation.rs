//! Argument validation shared by keys and service inputs.

/// Malformed caller input, detected before any store access.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be blank")]
    Blank { field: &'static str },
    #[error("{field} must be a positive id, got {value}")]
    NonPositiveId { field: &'static str, value: i64 },
    #[error("overall score must be a finite number, got {0}")]
    NonFiniteScore(f64),
}

/// Rejects empty or whitespace-only text.
pub fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    Ok(())
}

/// Rejects ids `<= 0`.
pub fn require_positive_id(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::NonPositiveId { field, value });
    }
    Ok(())
}
