//! Invoice mutation actions
//!
//! Each action runs validate → persist → invalidate and reports its outcome
//! as an [`ActionState`]. Success carries the route the caller should
//! navigate to (if any); failure carries a message and, for validation
//! failures, the offending fields. Nothing is retried and no error escapes
//! as a `Result::Err`.
//!
//! ```rust,ignore
//! let actions = InvoiceActions::new(store, cache.clone());
//! match actions.create_invoice(&form).await {
//!     ActionState::Success { redirect: Some(to), .. } => Redirect::to(&to),
//!     ActionState::Success { redirect: None, .. } => /* stay on page */,
//!     ActionState::Error { message, errors, .. } => /* re-render form */,
//! }
//! ```

use crate::core::cache::Revalidate;
use crate::core::error::{DashboardError, ValidationError};
use crate::core::invoice::InvoiceDraft;
use crate::core::store::InvoiceStore;
use crate::core::validation::{FormSubmission, parse_invoice_form};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Default route of the invoice listing
pub const INVOICES_ROUTE: &str = "/dashboard/invoices";

/// Source of "today" for newly created invoices
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Which stage of an action failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The form did not match the schema; nothing was persisted
    Validation,
    /// The store rejected or failed the statement
    Persistence,
}

/// Outcome of a mutation action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionState {
    Success {
        /// Where the caller should navigate; `None` means stay put
        #[serde(skip_serializing_if = "Option::is_none")]
        redirect: Option<String>,
    },
    Error {
        reason: FailureReason,
        message: String,
        /// Form field -> messages; empty unless validation failed
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        errors: BTreeMap<String, Vec<String>>,
    },
}

impl ActionState {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionState::Success { .. })
    }

    pub fn redirect(&self) -> Option<&str> {
        match self {
            ActionState::Success { redirect } => redirect.as_deref(),
            ActionState::Error { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ActionState::Success { .. } => None,
            ActionState::Error { message, .. } => Some(message),
        }
    }

    fn invalid(op: Operation, err: ValidationError) -> Self {
        let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
        match err {
            ValidationError::FieldErrors(list) => {
                for e in list {
                    errors.entry(e.field).or_default().push(e.message);
                }
            }
            ValidationError::FieldError { field, message } => {
                errors.entry(field).or_default().push(message);
            }
            ValidationError::InvalidForm { message } => {
                errors.entry("form".to_string()).or_default().push(message);
            }
        }
        ActionState::Error {
            reason: FailureReason::Validation,
            message: format!("Missing or invalid fields. Failed to {} invoice.", op),
            errors,
        }
    }

    fn store_failed(op: Operation, err: &DashboardError) -> Self {
        ActionState::Error {
            reason: FailureReason::Persistence,
            message: format!("Database error: {}. Failed to {} invoice", err, op),
            errors: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        })
    }
}

/// The invoice mutation pipeline
///
/// Stateless across calls: the store owns the records, the revalidator
/// owns the cache.
#[derive(Clone)]
pub struct InvoiceActions {
    store: Arc<dyn InvoiceStore>,
    revalidator: Arc<dyn Revalidate>,
    listing_route: String,
    clock: Clock,
}

impl InvoiceActions {
    pub fn new(store: Arc<dyn InvoiceStore>, revalidator: Arc<dyn Revalidate>) -> Self {
        Self {
            store,
            revalidator,
            listing_route: INVOICES_ROUTE.to_string(),
            clock: Arc::new(|| Utc::now().date_naive()),
        }
    }

    /// Route that is invalidated after every mutation and redirected to
    /// after create/update
    pub fn with_listing_route(mut self, route: impl Into<String>) -> Self {
        self.listing_route = route.into();
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn listing_route(&self) -> &str {
        &self.listing_route
    }

    /// Validate the form, insert a new invoice dated today, invalidate the
    /// listing and send the caller back to it
    pub async fn create_invoice(&self, form: &FormSubmission) -> ActionState {
        let draft = match parse_invoice_form(form) {
            Ok(draft) => draft,
            Err(e) => {
                tracing::debug!(error = %e, "create invoice form rejected");
                return ActionState::invalid(Operation::Create, e);
            }
        };

        let id = Uuid::new_v4().to_string();
        let date = (self.clock)();
        let invoice = draft.into_invoice(id.clone(), date);

        if let Err(e) = self.store.insert(invoice).await {
            tracing::warn!(error = %e, "failed to create invoice");
            return ActionState::store_failed(Operation::Create, &e);
        }

        tracing::info!(invoice_id = %id, %date, "invoice created");
        self.revalidator.revalidate(&self.listing_route);
        self.back_to_listing()
    }

    /// Validate the form and overwrite customer, amount and status of the
    /// invoice keyed by `id`; its date is kept
    pub async fn update_invoice(&self, id: &str, form: &FormSubmission) -> ActionState {
        let draft: InvoiceDraft = match parse_invoice_form(form) {
            Ok(draft) => draft,
            Err(e) => {
                tracing::debug!(invoice_id = id, error = %e, "update invoice form rejected");
                return ActionState::invalid(Operation::Update, e);
            }
        };

        if let Err(e) = self.store.update(id, &draft).await {
            tracing::warn!(invoice_id = id, error = %e, "failed to update invoice");
            return ActionState::store_failed(Operation::Update, &e);
        }

        tracing::info!(invoice_id = id, "invoice updated");
        self.revalidator.revalidate(&self.listing_route);
        self.back_to_listing()
    }

    /// Remove the invoice keyed by `id` and invalidate the listing
    ///
    /// Never navigates; the caller stays where it is.
    pub async fn delete_invoice(&self, id: &str) -> ActionState {
        if let Err(e) = self.store.delete(id).await {
            tracing::warn!(invoice_id = id, error = %e, "failed to delete invoice");
            return ActionState::store_failed(Operation::Delete, &e);
        }

        tracing::info!(invoice_id = id, "invoice deleted");
        self.revalidator.revalidate(&self.listing_route);
        ActionState::Success { redirect: None }
    }

    fn back_to_listing(&self) -> ActionState {
        ActionState::Success {
            redirect: Some(self.listing_route.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::FieldValidationError;

    #[test]
    fn test_success_serializes_with_kind_tag() {
        let state = ActionState::Success {
            redirect: Some(INVOICES_ROUTE.to_string()),
        };
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            serde_json::json!({"kind": "success", "redirect": "/dashboard/invoices"})
        );

        let stay = ActionState::Success { redirect: None };
        assert_eq!(
            serde_json::to_value(&stay).unwrap(),
            serde_json::json!({"kind": "success"})
        );
    }

    #[test]
    fn test_invalid_groups_messages_by_field() {
        let state = ActionState::invalid(
            Operation::Create,
            ValidationError::FieldErrors(vec![
                FieldValidationError {
                    field: "amount".to_string(),
                    message: "first".to_string(),
                },
                FieldValidationError {
                    field: "amount".to_string(),
                    message: "second".to_string(),
                },
                FieldValidationError {
                    field: "status".to_string(),
                    message: "third".to_string(),
                },
            ]),
        );

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["kind"], "error");
        assert_eq!(value["reason"], "validation");
        assert_eq!(value["errors"]["amount"], serde_json::json!(["first", "second"]));
        assert_eq!(value["errors"]["status"], serde_json::json!(["third"]));
        assert_eq!(
            state.message(),
            Some("Missing or invalid fields. Failed to create invoice.")
        );
    }

    #[test]
    fn test_store_failure_embeds_store_message() {
        let err = DashboardError::Internal("disk full".to_string());
        let state = ActionState::store_failed(Operation::Delete, &err);
        let message = state.message().unwrap();
        assert!(message.starts_with("Database error: "));
        assert!(message.contains("disk full"));
        assert!(message.ends_with("Failed to delete invoice"));
        assert!(state.redirect().is_none());
    }
}
