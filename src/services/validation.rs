use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::models::{DraftField, ExpenseDraft};
use crate::utils::{parse_decimal, round_to_cents};

/// Checks the required fields, then the amount. On success returns the amount
/// as a two-decimal string; see [`round_to_cents`] for the rounding rule.
pub fn validate(draft: &ExpenseDraft) -> Result<String, ValidationError> {
    let missing = missing_required_fields(draft);
    if !missing.is_empty() {
        return Err(ValidationError::MissingRequiredField(missing));
    }
    normalize_amount(&draft.amount)
}

pub fn missing_required_fields(draft: &ExpenseDraft) -> Vec<DraftField> {
    let mut missing = Vec::new();
    if draft.merchant.trim().is_empty() {
        missing.push(DraftField::Merchant);
    }
    if draft.date.trim().is_empty() {
        missing.push(DraftField::Date);
    }
    missing
}

pub fn normalize_amount(raw: &str) -> Result<String, ValidationError> {
    let value = if raw.trim().is_empty() {
        Decimal::ZERO
    } else {
        parse_decimal(raw).ok_or_else(|| ValidationError::InvalidAmount(raw.to_string()))?
    };

    // Positivity is checked after rounding, so 0.001 is rejected.
    match round_to_cents(value) {
        Some(rounded) if rounded > Decimal::ZERO => Ok(rounded.to_string()),
        _ => Err(ValidationError::InvalidAmount(raw.to_string())),
    }
}
