//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Require a non-empty trimmed string.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidField(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional string, mapping blank input to `None`.
pub(crate) fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Require a strictly positive amount.
pub(crate) fn validate_positive(amount: MoneyCents, label: &str) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} must be > 0"
        )));
    }
    Ok(())
}

/// Require a non-negative amount.
pub(crate) fn validate_non_negative(amount: MoneyCents, label: &str) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} must be >= 0"
        )));
    }
    Ok(())
}

/// Require a percentage in 0–100.
pub(crate) fn validate_percentage(pct: u8, label: &str) -> ResultEngine<()> {
    if pct > 100 {
        return Err(EngineError::InvalidField(format!(
            "{label} must be between 0 and 100"
        )));
    }
    Ok(())
}
