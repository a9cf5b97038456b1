//! Session resolution
//!
//! Identity lives outside this crate. A [`SessionProvider`] only answers
//! one question per request: is there an authenticated user, and who?

use crate::core::error::{DashboardError, DashboardResult, RequestError, StorageError};
use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Default name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// Session state of a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionContext {
    /// Authenticated user
    User { user_id: String },

    /// No session (public access)
    Anonymous,
}

impl SessionContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionContext::User { .. })
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            SessionContext::User { user_id } => Some(user_id),
            SessionContext::Anonymous => None,
        }
    }
}

/// Resolves the session carried by a request
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> DashboardResult<SessionContext>;
}

/// Provider that never finds a session
pub struct NoSessionProvider;

#[async_trait]
impl SessionProvider for NoSessionProvider {
    async fn resolve(&self, _headers: &HeaderMap) -> DashboardResult<SessionContext> {
        Ok(SessionContext::Anonymous)
    }
}

/// Session tokens held in memory
///
/// A token is read from the session cookie or, failing that, from an
/// `Authorization: Bearer` header.
#[derive(Clone)]
pub struct InMemorySessionProvider {
    sessions: Arc<RwLock<HashMap<String, String>>>,
    cookie_name: String,
}

impl InMemorySessionProvider {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            cookie_name: SESSION_COOKIE.to_string(),
        }
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Start a session for `user_id` and return its token
    pub fn issue(&self, user_id: impl Into<String>) -> DashboardResult<String> {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions
            .write()
            .map_err(|_| Self::unavailable())?
            .insert(token.clone(), user_id.into());
        Ok(token)
    }

    /// End the session behind `token`; returns whether it existed
    pub fn revoke(&self, token: &str) -> DashboardResult<bool> {
        Ok(self
            .sessions
            .write()
            .map_err(|_| Self::unavailable())?
            .remove(token)
            .is_some())
    }

    fn unavailable() -> DashboardError {
        DashboardError::Storage(StorageError::Unavailable {
            backend: "in-memory sessions".to_string(),
        })
    }

    fn token_from(&self, headers: &HeaderMap) -> DashboardResult<Option<String>> {
        for value in headers.get_all(header::COOKIE) {
            let raw = value.to_str().map_err(|e| {
                DashboardError::Request(RequestError::InvalidHeader {
                    header: "cookie".to_string(),
                    message: e.to_string(),
                })
            })?;
            if let Some(token) = cookie_value(raw, &self.cookie_name) {
                return Ok(Some(token.to_string()));
            }
        }

        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Ok(bearer)
    }
}

impl Default for InMemorySessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionProvider for InMemorySessionProvider {
    async fn resolve(&self, headers: &HeaderMap) -> DashboardResult<SessionContext> {
        let Some(token) = self.token_from(headers)? else {
            return Ok(SessionContext::Anonymous);
        };

        let sessions = self.sessions.read().map_err(|_| Self::unavailable())?;
        Ok(match sessions.get(&token) {
            Some(user_id) => SessionContext::User {
                user_id: user_id.clone(),
            },
            None => SessionContext::Anonymous,
        })
    }
}

/// Find `name` in a `Cookie` header value (`a=1; b=2`)
fn cookie_value<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    raw.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}
