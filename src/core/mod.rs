//! Core module containing the domain types, the mutation pipeline and the gate

pub mod actions;
pub mod auth;
pub mod cache;
pub mod error;
pub mod gate;
pub mod invoice;
pub mod money;
pub mod query;
pub mod store;
pub mod validation;

pub use actions::{ActionState, FailureReason, INVOICES_ROUTE, InvoiceActions};
pub use auth::{InMemorySessionProvider, NoSessionProvider, SessionContext, SessionProvider};
pub use cache::{NoRevalidate, Revalidate, ViewCache};
pub use error::{DashboardError, DashboardResult};
pub use gate::{AuthorizationGate, GateDecision};
pub use invoice::{CardData, Customer, Invoice, InvoiceDraft, InvoiceStatus, MonthlyRevenue};
pub use money::Cents;
pub use query::{ITEMS_PER_PAGE, InvoiceListItem, InvoiceQuery, PaginatedResponse, PaginationMeta};
pub use store::{InvoiceStore, LATEST_INVOICES};
pub use validation::{FormSubmission, InvoiceForm};
