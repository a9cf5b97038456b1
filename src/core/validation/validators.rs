//! Reusable field validators
//!
//! Custom checks plugged into `#[validate(custom(...))]` on form schemas.
//! Each one reports a human-readable message on the returned error.

use crate::core::invoice::InvoiceStatus;
use crate::core::money::{AmountError, Cents};
use std::borrow::Cow;
use validator::ValidationError;

fn failure(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validator: text must be a decimal amount in major units
pub fn validate_amount(value: &str) -> Result<(), ValidationError> {
    match Cents::parse_major(value) {
        Ok(_) => Ok(()),
        Err(AmountError::Empty) => Err(failure("required", "Please enter an amount.")),
        Err(e) => Err(failure(
            "amount",
            format!("Please enter a valid amount: {}.", e),
        )),
    }
}

/// Validator: text must name an invoice status
pub fn validate_status(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(failure("required", "Please select an invoice status."));
    }
    value
        .parse::<InvoiceStatus>()
        .map(|_| ())
        .map_err(|e| failure("status", format!("Please select an invoice status: {}.", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: ValidationError) -> String {
        err.message.map(|m| m.to_string()).unwrap_or_default()
    }

    // === validate_amount() ===

    #[test]
    fn test_amount_numeric_string_is_ok() {
        assert!(validate_amount("19.99").is_ok());
        assert!(validate_amount("0").is_ok());
    }

    #[test]
    fn test_amount_empty_is_required() {
        let err = validate_amount("").unwrap_err();
        assert_eq!(err.code, "required");
        assert!(message(err).contains("enter an amount"));
    }

    #[test]
    fn test_amount_garbage_is_rejected() {
        let err = validate_amount("abc").unwrap_err();
        assert_eq!(err.code, "amount");
        assert!(message(err).contains("abc"));
    }

    // === validate_status() ===

    #[test]
    fn test_status_known_values_are_ok() {
        assert!(validate_status("pending").is_ok());
        assert!(validate_status("paid").is_ok());
    }

    #[test]
    fn test_status_empty_is_required() {
        let err = validate_status("").unwrap_err();
        assert_eq!(err.code, "required");
    }

    #[test]
    fn test_status_unknown_is_rejected() {
        let err = validate_status("overdue").unwrap_err();
        assert_eq!(err.code, "status");
        assert!(message(err).contains("overdue"));
    }
}
