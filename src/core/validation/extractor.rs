//! Axum extractor for submitted forms
//!
//! Decodes `application/x-www-form-urlencoded` bodies into a
//! [`FormSubmission`] bag. Shape validation happens later, inside the
//! action that consumes the bag, so a bad field never short-circuits here.

use super::form::FormSubmission;
use crate::core::error::{DashboardError, ValidationError};
use axum::{
    Form,
    extract::{FromRequest, Request},
};
use std::collections::HashMap;

impl<S> FromRequest<S> for FormSubmission
where
    S: Send + Sync,
{
    type Rejection = DashboardError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
            .await
            .map_err(|e| {
                DashboardError::Validation(ValidationError::InvalidForm {
                    message: e.body_text(),
                })
            })?;

        Ok(FormSubmission::from(fields))
    }
}
