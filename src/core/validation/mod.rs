//! Form validation
//!
//! Submitted forms arrive as an untyped [`FormSubmission`] and are projected
//! onto schema structs validated with the `validator` crate. Failures come
//! back as a field-to-message list rather than a single opaque string.

pub mod extractor;
pub mod form;
pub mod validators;

pub use form::{FormSubmission, INVOICE_FIELDS, InvoiceForm, parse_invoice_form};
