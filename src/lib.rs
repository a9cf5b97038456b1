//! # Invoice Dashboard
//!
//! Backend for an invoice dashboard: validated form actions that mutate
//! invoices, and a session gate in front of the dashboard routes.
//!
//! ## Features
//!
//! - **Mutation pipeline**: validate → persist → invalidate → redirect, with
//!   the outcome returned as a tagged [`ActionState`](core::ActionState)
//! - **Exact money**: decimal amounts become integer cents without floats
//! - **Authorization gate**: a pure decision over (signed in?, path)
//! - **View cache**: listing renders invalidated by every mutation
//! - **Storage backends**: in-memory (default) and PostgreSQL (`postgres`)
//! - **Configuration-Based**: routes, sessions and seed data from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dashboard::prelude::*;
//!
//! let sessions = InMemorySessionProvider::new();
//! let token = sessions.issue("user-1")?;
//!
//! DashboardBuilder::new()
//!     .with_config(DashboardConfig::from_yaml_file("dashboard.yaml")?)
//!     .with_store(InMemoryInvoiceStore::new())
//!     .with_session_provider(sessions)
//!     .serve()
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        actions::{ActionState, FailureReason, INVOICES_ROUTE, InvoiceActions},
        auth::{InMemorySessionProvider, NoSessionProvider, SessionContext, SessionProvider},
        cache::{NoRevalidate, Revalidate, ViewCache},
        error::{DashboardError, DashboardResult},
        gate::{AuthorizationGate, GateDecision},
        invoice::{CardData, Customer, Invoice, InvoiceDraft, InvoiceStatus, MonthlyRevenue},
        money::Cents,
        query::{InvoiceListItem, InvoiceQuery, PaginatedResponse},
        store::InvoiceStore,
        validation::{FormSubmission, InvoiceForm},
    };

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryInvoiceStore;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresInvoiceStore;

    // === Config ===
    pub use crate::config::{DashboardConfig, RouteConfig};

    // === Server ===
    pub use crate::server::{DashboardBuilder, DashboardHost, RestExposure};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::NaiveDate;
    pub use serde::{Deserialize, Serialize};
}
