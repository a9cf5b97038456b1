//! Form submissions and the invoice form schema

use super::validators::{validate_amount, validate_status};
use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::invoice::{InvoiceDraft, InvoiceStatus};
use crate::core::money::Cents;
use std::collections::HashMap;
use validator::Validate;

/// Field names as they appear in submitted forms, in display order
pub const INVOICE_FIELDS: [&str; 3] = ["customerId", "amount", "status"];

/// Raw key-value bag of a submitted form
///
/// Read once per action; only the validated projection is kept.
#[derive(Debug, Clone, Default)]
pub struct FormSubmission {
    fields: HashMap<String, String>,
}

impl FormSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and programmatic callers
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<HashMap<String, String>> for FormSubmission {
    fn from(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormSubmission {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Schema for the create and update invoice forms
///
/// Missing keys read as empty strings, so "missing" and "blank" fail the
/// same checks.
#[derive(Debug, Clone, Default, Validate)]
pub struct InvoiceForm {
    #[validate(length(min = 1, message = "Please select a customer."))]
    pub customer_id: String,

    #[validate(custom(function = "validate_amount"))]
    pub amount: String,

    #[validate(custom(function = "validate_status"))]
    pub status: String,
}

impl InvoiceForm {
    /// Project the submission onto the schema's fields
    pub fn from_submission(form: &FormSubmission) -> Self {
        let read = |key: &str| form.get(key).unwrap_or_default().to_string();
        Self {
            customer_id: read("customerId").trim().to_string(),
            amount: read("amount"),
            status: read("status"),
        }
    }

    /// Validate every field and, if all pass, produce the typed draft
    pub fn into_draft(self) -> Result<InvoiceDraft, ValidationError> {
        if let Err(errors) = self.validate() {
            return Err(ValidationError::FieldErrors(collect_field_errors(&errors)));
        }

        let amount = Cents::parse_major(&self.amount).map_err(|e| ValidationError::FieldError {
            field: "amount".to_string(),
            message: e.to_string(),
        })?;
        let status = self
            .status
            .parse::<InvoiceStatus>()
            .map_err(|message| ValidationError::FieldError {
                field: "status".to_string(),
                message,
            })?;

        Ok(InvoiceDraft {
            customer_id: self.customer_id,
            amount,
            status,
        })
    }
}

/// Validate a raw submission in one step
pub fn parse_invoice_form(form: &FormSubmission) -> Result<InvoiceDraft, ValidationError> {
    InvoiceForm::from_submission(form).into_draft()
}

/// `customer_id` -> `customerId`
fn form_key(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn collect_field_errors(errors: &validator::ValidationErrors) -> Vec<FieldValidationError> {
    let mut collected: Vec<FieldValidationError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = form_key(&field.to_string());
            errs.iter().map(move |e| FieldValidationError {
                field: field.clone(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value ({})", e.code)),
            })
        })
        .collect();

    collected.sort_by_key(|e| {
        INVOICE_FIELDS
            .iter()
            .position(|f| *f == e.field)
            .unwrap_or(INVOICE_FIELDS.len())
    });
    collected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> FormSubmission {
        FormSubmission::new()
            .with("customerId", "c1")
            .with("amount", "19.99")
            .with("status", "pending")
    }

    fn fields(err: ValidationError) -> Vec<String> {
        match err {
            ValidationError::FieldErrors(errors) => errors.into_iter().map(|e| e.field).collect(),
            ValidationError::FieldError { field, .. } => vec![field],
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_valid_submission_produces_draft() {
        let draft = parse_invoice_form(&valid()).expect("form should validate");
        assert_eq!(draft.customer_id, "c1");
        assert_eq!(draft.amount, Cents::new(1999));
        assert_eq!(draft.status, InvoiceStatus::Pending);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let form = valid().with("id", "client-id").with("date", "1999-01-01");
        assert!(parse_invoice_form(&form).is_ok());
    }

    #[test]
    fn test_empty_submission_reports_every_field_in_order() {
        let err = parse_invoice_form(&FormSubmission::new()).unwrap_err();
        assert_eq!(fields(err), vec!["customerId", "amount", "status"]);
    }

    #[test]
    fn test_blank_customer_is_rejected() {
        let form = valid().with("customerId", "   ");
        let err = parse_invoice_form(&form).unwrap_err();
        assert_eq!(fields(err), vec!["customerId"]);
    }

    #[test]
    fn test_non_numeric_amount_is_rejected() {
        let form = valid().with("amount", "abc");
        let err = parse_invoice_form(&form).unwrap_err();
        assert_eq!(fields(err), vec!["amount"]);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let form = valid().with("status", "overdue");
        let err = parse_invoice_form(&form).unwrap_err();
        assert_eq!(fields(err), vec!["status"]);
    }

    #[test]
    fn test_form_key_camel_cases() {
        assert_eq!(form_key("customer_id"), "customerId");
        assert_eq!(form_key("customerId"), "customerId");
        assert_eq!(form_key("amount"), "amount");
    }

    #[test]
    fn test_submission_from_iterator() {
        let form: FormSubmission = [("amount", "1")].into_iter().collect();
        assert_eq!(form.get("amount"), Some("1"));
        assert_eq!(form.len(), 1);
        assert!(form.get("status").is_none());
    }
}
