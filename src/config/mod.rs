//! Configuration loading and management

use crate::core::actions::INVOICES_ROUTE;
use crate::core::auth::SESSION_COOKIE;
use crate::core::error::ConfigError;
use crate::core::gate::AuthorizationGate;
use crate::core::invoice::Customer;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the server binds to
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

/// Route layout of the dashboard and the gate in front of it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Paths starting with this prefix require a session
    pub protected_prefix: String,

    /// Where signed-in users are sent from public pages
    pub entry_point: String,

    /// Sign-in page used for the login challenge
    pub login_path: String,

    /// Invoice listing; invalidated after every mutation
    pub invoices_route: String,

    /// Exact paths that skip the gate
    pub public_paths: Vec<String>,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            protected_prefix: "/dashboard".to_string(),
            entry_point: "/dashboard".to_string(),
            login_path: "/login".to_string(),
            invoices_route: INVOICES_ROUTE.to_string(),
            public_paths: vec!["/health".to_string(), "/healthz".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Cookie carrying the session token
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: SESSION_COOKIE.to_string(),
        }
    }
}

/// PostgreSQL connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// Complete configuration of the dashboard service
///
/// Every field has a default, so an empty document is a valid config.
///
/// ```yaml
/// server:
///   bind: 0.0.0.0:8080
/// routes:
///   protected_prefix: /dashboard
///   login_path: /login
/// session:
///   cookie_name: sid
/// customers:
///   - id: c1
///     name: Lee Robinson
///     email: lee@robinson.com
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub server: ServerConfig,
    pub routes: RouteConfig,
    pub session: SessionConfig,

    /// Absent means the in-memory store
    pub database: Option<DatabaseConfig>,

    /// Customers seeded into the store at startup
    pub customers: Vec<Customer>,
}

impl DashboardConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject route settings that could never match a request path
    pub fn validate(&self) -> Result<(), ConfigError> {
        let routes = [
            ("routes.protected_prefix", &self.routes.protected_prefix),
            ("routes.entry_point", &self.routes.entry_point),
            ("routes.login_path", &self.routes.login_path),
            ("routes.invoices_route", &self.routes.invoices_route),
        ];
        for (field, value) in routes {
            if !value.starts_with('/') {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.clone(),
                    message: "must start with '/'".to_string(),
                });
            }
        }

        if self.routes.login_path.starts_with(&self.routes.protected_prefix) {
            return Err(ConfigError::InvalidValue {
                field: "routes.login_path".to_string(),
                value: self.routes.login_path.clone(),
                message: "must lie outside the protected prefix".to_string(),
            });
        }

        // Anything the gate should guard must sit under the prefix: a public
        // entry point redirects to itself, a public listing takes anonymous
        // mutations.
        let guarded = [
            ("routes.entry_point", &self.routes.entry_point),
            ("routes.invoices_route", &self.routes.invoices_route),
        ];
        for (field, value) in guarded {
            if !value.starts_with(&self.routes.protected_prefix) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.clone(),
                    message: format!(
                        "must lie inside the protected prefix '{}'",
                        self.routes.protected_prefix
                    ),
                });
            }
        }

        if let Some(path) = self
            .routes
            .public_paths
            .iter()
            .find(|p| p.starts_with(&self.routes.protected_prefix))
        {
            return Err(ConfigError::InvalidValue {
                field: "routes.public_paths".to_string(),
                value: path.clone(),
                message: "must lie outside the protected prefix".to_string(),
            });
        }

        if self.routes.entry_point == self.routes.invoices_route {
            return Err(ConfigError::InvalidValue {
                field: "routes.invoices_route".to_string(),
                value: self.routes.invoices_route.clone(),
                message: "must differ from routes.entry_point".to_string(),
            });
        }

        if self.session.cookie_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "session.cookie_name".to_string(),
                value: self.session.cookie_name.clone(),
                message: "must not be empty".to_string(),
            });
        }

        if self.database.as_ref().is_some_and(|db| db.max_connections == 0) {
            return Err(ConfigError::InvalidValue {
                field: "database.max_connections".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// The gate described by the route settings
    pub fn gate(&self) -> AuthorizationGate {
        AuthorizationGate::new(&self.routes.protected_prefix, &self.routes.entry_point)
            .with_public_paths(self.routes.public_paths.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gate::GateDecision;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = DashboardConfig::from_yaml_str("{}").unwrap();

        assert_eq!(config.server.bind.port(), 3000);
        assert_eq!(config.routes.protected_prefix, "/dashboard");
        assert_eq!(config.routes.login_path, "/login");
        assert_eq!(config.routes.invoices_route, "/dashboard/invoices");
        assert_eq!(config.session.cookie_name, "session");
        assert!(config.database.is_none());
        assert!(config.customers.is_empty());
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let yaml = r#"
routes:
  login_path: /signin
database:
  url: postgres://localhost/dashboard
customers:
  - id: c1
    name: Lee Robinson
    email: lee@robinson.com
"#;
        let config = DashboardConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.routes.login_path, "/signin");
        assert_eq!(config.routes.entry_point, "/dashboard");
        assert_eq!(config.database.as_ref().unwrap().max_connections, 5);
        assert_eq!(config.customers[0].image_url, None);
    }

    #[test]
    fn test_rejects_relative_routes() {
        let err = DashboardConfig::from_yaml_str("routes:\n  entry_point: dashboard\n").unwrap_err();
        assert!(err.to_string().contains("routes.entry_point"));
    }

    #[test]
    fn test_rejects_login_inside_protected_area() {
        let err =
            DashboardConfig::from_yaml_str("routes:\n  login_path: /dashboard/login\n").unwrap_err();
        assert!(err.to_string().contains("routes.login_path"));
    }

    #[test]
    fn test_rejects_entry_point_outside_protected_area() {
        let err = DashboardConfig::from_yaml_str("routes:\n  entry_point: /home\n").unwrap_err();
        assert!(err.to_string().contains("routes.entry_point"));
    }

    #[test]
    fn test_rejects_listing_outside_protected_area() {
        let err =
            DashboardConfig::from_yaml_str("routes:\n  invoices_route: /invoices\n").unwrap_err();
        assert!(err.to_string().contains("routes.invoices_route"));
    }

    #[test]
    fn test_rejects_public_path_inside_protected_area() {
        let err = DashboardConfig::from_yaml_str("routes:\n  public_paths: [/dashboard/open]\n")
            .unwrap_err();
        assert!(err.to_string().contains("routes.public_paths"));
    }

    #[test]
    fn test_gate_follows_routes() {
        let yaml = "routes:\n  protected_prefix: /app\n  entry_point: /app/home\n  invoices_route: /app/invoices\n";
        let config = DashboardConfig::from_yaml_str(yaml).unwrap();
        let gate = config.gate();

        assert_eq!(gate.decide(false, "/app"), GateDecision::Deny);
        assert_eq!(
            gate.decide(true, "/login"),
            GateDecision::Redirect("/app/home".to_string())
        );
        assert_eq!(gate.decide(false, "/healthz"), GateDecision::Allow);
    }

    #[test]
    fn test_yaml_serialization() {
        let config = DashboardConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = DashboardConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed.routes.public_paths, config.routes.public_paths);
        assert_eq!(parsed.server.bind, config.server.bind);
    }
}
