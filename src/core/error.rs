//! Typed error handling for the dashboard
//!
//! Every failure the HTTP surface or a store can produce maps onto one of
//! the categories below, each carrying an HTTP status and a stable error
//! code so clients can branch on the code rather than the message.
//!
//! # Error Categories
//!
//! - [`InvoiceError`]: Invoice lookups that found nothing
//! - [`ValidationError`]: Malformed form or request input
//! - [`StorageError`]: Store backends rejecting or failing a statement
//! - [`ConfigError`]: Configuration loading and parsing
//! - [`RequestError`]: Request-level failures (headers, unknown routes)
//!
//! # Example
//!
//! ```rust,ignore
//! use dashboard::prelude::*;
//!
//! match store.get("missing").await {
//!     Ok(Some(invoice)) => println!("Found: {:?}", invoice),
//!     Ok(None) => println!("No such invoice"),
//!     Err(DashboardError::Storage(e)) => eprintln!("Store failed: {}", e),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type for the dashboard
#[derive(Debug)]
pub enum DashboardError {
    /// Invoice-related errors
    Invoice(InvoiceError),

    /// Validation errors
    Validation(ValidationError),

    /// Storage backend errors
    Storage(StorageError),

    /// Configuration errors
    Config(ConfigError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::Invoice(e) => write!(f, "{}", e),
            DashboardError::Validation(e) => write!(f, "{}", e),
            DashboardError::Storage(e) => write!(f, "{}", e),
            DashboardError::Config(e) => write!(f, "{}", e),
            DashboardError::Request(e) => write!(f, "{}", e),
            DashboardError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DashboardError::Invoice(e) => Some(e),
            DashboardError::Validation(e) => Some(e),
            DashboardError::Storage(e) => Some(e),
            DashboardError::Config(e) => Some(e),
            DashboardError::Request(e) => Some(e),
            DashboardError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl DashboardError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::Invoice(e) => e.status_code(),
            DashboardError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DashboardError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DashboardError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DashboardError::Request(e) => e.status_code(),
            DashboardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DashboardError::Invoice(e) => e.error_code(),
            DashboardError::Validation(_) => "VALIDATION_ERROR",
            DashboardError::Storage(_) => "STORAGE_ERROR",
            DashboardError::Config(_) => "CONFIG_ERROR",
            DashboardError::Request(e) => e.error_code(),
            DashboardError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            DashboardError::Invoice(InvoiceError::NotFound { id }) => {
                Some(serde_json::json!({ "id": id }))
            }
            DashboardError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Invoice Errors
// =============================================================================

/// Errors related to invoice lookups
#[derive(Debug)]
pub enum InvoiceError {
    /// No invoice with this id exists in the store
    NotFound { id: String },
}

impl fmt::Display for InvoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceError::NotFound { id } => write!(f, "invoice with id '{}' not found", id),
        }
    }
}

impl std::error::Error for InvoiceError {}

impl InvoiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            InvoiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            InvoiceError::NotFound { .. } => "INVOICE_NOT_FOUND",
        }
    }
}

impl From<InvoiceError> for DashboardError {
    fn from(err: InvoiceError) -> Self {
        DashboardError::Invoice(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// Single field validation error
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// Request body could not be decoded as a form
    InvalidForm { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldError { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidForm { message } => {
                write!(f, "Invalid form submission: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for DashboardError {
    fn from(err: ValidationError) -> Self {
        DashboardError::Validation(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug)]
pub enum StorageError {
    /// Connection error
    ConnectionError { backend: String, message: String },

    /// Query execution error
    QueryError { backend: String, message: String },

    /// A stored row could not be mapped back onto the model
    IntegrityError { message: String },

    /// Backend not available (poisoned lock, closed pool)
    Unavailable { backend: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionError { backend, message } => {
                write!(f, "Failed to connect to {}: {}", backend, message)
            }
            StorageError::QueryError { backend, message } => {
                write!(f, "{} query error: {}", backend, message)
            }
            StorageError::IntegrityError { message } => {
                write!(f, "Data integrity error: {}", message)
            }
            StorageError::Unavailable { backend } => {
                write!(f, "Storage backend '{}' is unavailable", backend)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for DashboardError {
    fn from(err: StorageError) -> Self {
        DashboardError::Storage(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    FileNotFound { path: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for DashboardError {
    fn from(err: ConfigError) -> Self {
        DashboardError::Config(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug)]
pub enum RequestError {
    /// Malformed header value
    InvalidHeader { header: String, message: String },

    /// No route matches the request path
    RouteNotFound { path: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::InvalidHeader { header, message } => {
                write!(f, "Invalid header '{}': {}", header, message)
            }
            RequestError::RouteNotFound { path } => write!(f, "No route for '{}'", path),
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidHeader { .. } => StatusCode::BAD_REQUEST,
            RequestError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidHeader { .. } => "INVALID_HEADER",
            RequestError::RouteNotFound { .. } => "ROUTE_NOT_FOUND",
        }
    }
}

impl From<RequestError> for DashboardError {
    fn from(err: RequestError) -> Self {
        DashboardError::Request(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Internal(err.to_string())
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for DashboardError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DashboardError::Storage(StorageError::ConnectionError {
                    backend: "PostgreSQL".to_string(),
                    message: err.to_string(),
                })
            }
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DashboardError::Storage(StorageError::IntegrityError {
                    message: db.message().to_string(),
                })
            }
            other => DashboardError::Storage(StorageError::QueryError {
                backend: "PostgreSQL".to_string(),
                message: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for dashboard operations
pub type DashboardResult<T> = Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_error_display() {
        let err = InvoiceError::NotFound {
            id: "abc".to_string(),
        };
        assert!(err.to_string().contains("abc"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_invoice_not_found_maps_to_404() {
        let err: DashboardError = InvoiceError::NotFound {
            id: "abc".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "INVOICE_NOT_FOUND");
    }

    #[test]
    fn test_validation_error_multiple_fields() {
        let err = ValidationError::FieldErrors(vec![
            FieldValidationError {
                field: "customerId".to_string(),
                message: "required".to_string(),
            },
            FieldValidationError {
                field: "amount".to_string(),
                message: "not a number".to_string(),
            },
        ]);
        let display = err.to_string();
        assert!(display.contains("customerId"));
        assert!(display.contains("amount"));
    }

    #[test]
    fn test_validation_error_is_unprocessable() {
        let err = DashboardError::Validation(ValidationError::InvalidForm {
            message: "bad".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::ConnectionError {
            backend: "PostgreSQL".to_string(),
            message: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("PostgreSQL"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_error_response_details() {
        let err = DashboardError::Invoice(InvoiceError::NotFound {
            id: "abc".to_string(),
        });
        let response = err.to_response();
        assert_eq!(response.code, "INVOICE_NOT_FOUND");
        assert_eq!(response.details, Some(serde_json::json!({ "id": "abc" })));

        let err = DashboardError::Internal("boom".to_string());
        assert!(err.to_response().details.is_none());
    }

    #[test]
    fn test_request_error_status_codes() {
        assert_eq!(
            RequestError::RouteNotFound {
                path: "/dashboard/nope".to_string()
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RequestError::InvalidHeader {
                header: "cookie".to_string(),
                message: "not ascii".to_string()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_config_error_display_names_the_file() {
        let err = ConfigError::ParseError {
            file: Some("dashboard.yaml".to_string()),
            message: "bad indent".to_string(),
        };
        assert!(err.to_string().contains("dashboard.yaml"));
    }
}
