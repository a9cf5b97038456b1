//! Tests for loading `DashboardConfig` from YAML files

use dashboard::config::DashboardConfig;
use dashboard::core::gate::GateDecision;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(yaml.as_bytes())
        .expect("Failed to write config");
    file
}

#[test]
fn test_load_full_config_file() {
    let file = write_config(
        r#"
server:
  bind: 0.0.0.0:8080
routes:
  protected_prefix: /app
  entry_point: /app/overview
  login_path: /signin
  invoices_route: /app/invoices
  public_paths: [/ping]
session:
  cookie_name: sid
customers:
  - id: c1
    name: Lee Robinson
    email: lee@robinson.com
    image_url: /customers/lee-robinson.png
"#,
    );

    let config = DashboardConfig::from_yaml_file(file.path()).unwrap();

    assert_eq!(config.server.bind.port(), 8080);
    assert_eq!(config.routes.invoices_route, "/app/invoices");
    assert_eq!(config.session.cookie_name, "sid");
    assert_eq!(
        config.customers[0].image_url.as_deref(),
        Some("/customers/lee-robinson.png")
    );

    let gate = config.gate();
    assert_eq!(gate.decide(false, "/ping"), GateDecision::Allow);
    assert_eq!(gate.decide(false, "/health"), GateDecision::Allow);
    assert_eq!(
        gate.decide(true, "/health"),
        GateDecision::Redirect("/app/overview".to_string())
    );
    assert_eq!(gate.decide(false, "/app/invoices"), GateDecision::Deny);
}

#[test]
fn test_missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");

    let err = DashboardConfig::from_yaml_file(&path).unwrap_err();

    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_malformed_file_names_the_file() {
    let file = write_config("routes: [this is not a mapping");

    let err = DashboardConfig::from_yaml_file(file.path()).unwrap_err();

    let message = err.to_string();
    assert!(message.contains("Failed to parse config file"));
    assert!(message.contains(&file.path().display().to_string()));
}

#[test]
fn test_invalid_values_are_rejected_on_load() {
    let file = write_config("session:\n  cookie_name: \"  \"\n");

    let err = DashboardConfig::from_yaml_file(file.path()).unwrap_err();

    assert!(err.to_string().contains("session.cookie_name"));
}

#[test]
fn test_entry_point_outside_protected_area_is_rejected() {
    let file = write_config("routes:\n  entry_point: /home\n");

    let err = DashboardConfig::from_yaml_file(file.path()).unwrap_err();

    assert!(err.to_string().contains("routes.entry_point"));
}

#[test]
fn test_listing_outside_protected_area_is_rejected() {
    let file = write_config(
        r#"
routes:
  protected_prefix: /app
  entry_point: /app
  invoices_route: /invoices
"#,
    );

    let err = DashboardConfig::from_yaml_file(file.path()).unwrap_err();

    assert!(err.to_string().contains("routes.invoices_route"));
}

#[test]
fn test_demo_config_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/dashboard/dashboard.yaml");

    let config = DashboardConfig::from_yaml_file(path).unwrap();

    assert_eq!(config.customers.len(), 3);
    assert!(config.database.is_none());
}
