//! API exposure
//!
//! An exposure consumes a `DashboardHost` and produces a Router for its
//! protocol. REST is the only one.

pub mod rest;

pub use rest::RestExposure;
