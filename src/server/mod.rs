//! Server module for building the dashboard HTTP server
//!
//! This module provides a `DashboardBuilder` that registers:
//! - Health routes
//! - The login placeholder
//! - Dashboard routes (overview, invoices, customers)
//!
//! behind the session gate.

pub mod builder;
pub mod exposure;
pub mod host;
pub mod router;

pub use builder::DashboardBuilder;
pub use exposure::RestExposure;
pub use host::DashboardHost;
