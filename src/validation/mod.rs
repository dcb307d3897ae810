//! Structural checks a trade record must pass before it is admitted to the
//! store. Pure functions; the engine runs them on every create and update.

use rust_decimal::Decimal;
use std::fmt;

use crate::domain::transaction::TransactionDraft;

pub const ACCOUNT_NUMBER_MAX_LEN: usize = 50;
pub const SECURITY_CODE_MAX_LEN: usize = 20;
pub const DESCRIPTION_MAX_LEN: usize = 255;
pub const CURRENCY_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be blank"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_positive_units(units: i64) -> ValidationResult {
    if units <= 0 {
        return Err(ValidationError::new("units", "must be greater than zero"));
    }

    Ok(())
}

pub fn validate_positive_decimal(field: &'static str, value: &Decimal) -> ValidationResult {
    if value <= &Decimal::ZERO {
        return Err(ValidationError::new(field, "must be greater than zero"));
    }

    Ok(())
}

pub fn validate_currency(currency: &str) -> ValidationResult {
    validate_required("currency", currency)?;

    if currency.len() != CURRENCY_LEN || !currency.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return Err(ValidationError::new(
            "currency",
            "must be a 3-letter currency code",
        ));
    }

    Ok(())
}

/// Full admission check for a draft. Field checks run first; the
/// `amount == units * price` invariant is recomputed last and any
/// discrepancy is a hard failure — amount is never auto-corrected.
pub fn validate_draft(draft: &TransactionDraft) -> ValidationResult {
    validate_required("account_number", &draft.account_number)?;
    validate_max_len("account_number", &draft.account_number, ACCOUNT_NUMBER_MAX_LEN)?;
    validate_positive_decimal("amount", &draft.amount)?;
    validate_positive_units(draft.units)?;
    validate_positive_decimal("price", &draft.price)?;
    validate_required("security_code", &draft.security_code)?;
    validate_max_len("security_code", &draft.security_code, SECURITY_CODE_MAX_LEN)?;
    validate_currency(&draft.currency)?;

    if let Some(description) = &draft.description {
        validate_max_len("description", description, DESCRIPTION_MAX_LEN)?;
    }

    let expected = draft.price * Decimal::from(draft.units);
    if draft.amount != expected {
        return Err(ValidationError::new(
            "amount",
            format!("must equal units * price ({} expected)", expected),
        ));
    }

    Ok(())
}
