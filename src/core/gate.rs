//! Route-authorization gate
//!
//! A pure decision over (authenticated?, path). The HTTP middleware turns
//! the decision into a response; nothing here touches a request.

use serde::Serialize;

/// Outcome of evaluating the gate for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "target", rename_all = "snake_case")]
pub enum GateDecision {
    /// Let the request through
    Allow,
    /// Challenge the caller to sign in
    Deny,
    /// Send an already signed-in caller to the given path
    Redirect(String),
}

/// Splits paths into a protected area and the public rest
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    protected_prefix: String,
    entry_point: String,
    public_paths: Vec<String>,
}

impl AuthorizationGate {
    pub fn new(protected_prefix: impl Into<String>, entry_point: impl Into<String>) -> Self {
        Self {
            protected_prefix: protected_prefix.into(),
            entry_point: entry_point.into(),
            public_paths: Vec::new(),
        }
    }

    /// Paths that skip the gate entirely (probes)
    pub fn with_public_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn protected_prefix(&self) -> &str {
        &self.protected_prefix
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// The prefix itself is protected; so is anything starting with it
    pub fn is_protected(&self, path: &str) -> bool {
        path.starts_with(&self.protected_prefix)
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| p == path)
    }

    pub fn decide(&self, authenticated: bool, path: &str) -> GateDecision {
        if self.is_public(path) {
            return GateDecision::Allow;
        }

        match (self.is_protected(path), authenticated) {
            (true, true) => GateDecision::Allow,
            (true, false) => GateDecision::Deny,
            (false, true) => GateDecision::Redirect(self.entry_point.clone()),
            (false, false) => GateDecision::Allow,
        }
    }
}

impl Default for AuthorizationGate {
    fn default() -> Self {
        Self::new("/dashboard", "/dashboard").with_public_paths(["/health", "/healthz"])
    }
}
