//! Persistent store interface for invoices and customers
//!
//! Each mutating method issues exactly one statement against the backing
//! relation and is atomic on its own; nothing here wraps several
//! statements in a transaction.

use crate::core::error::DashboardResult;
use crate::core::invoice::{CardData, Customer, Invoice, InvoiceDraft, MonthlyRevenue};
use crate::core::query::{InvoiceListItem, InvoiceQuery, PaginatedResponse};
use async_trait::async_trait;

/// Number of invoices on the overview's "latest" panel
pub const LATEST_INVOICES: usize = 5;

/// Storage backend for the `invoices` and `customers` relations
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// INSERT a fully-formed invoice row
    async fn insert(&self, invoice: Invoice) -> DashboardResult<()>;

    /// UPDATE customer, amount and status of the row keyed by `id`
    ///
    /// The stored date is left untouched.
    async fn update(&self, id: &str, draft: &InvoiceDraft) -> DashboardResult<()>;

    /// DELETE the row keyed by `id`; deleting an absent row succeeds
    async fn delete(&self, id: &str) -> DashboardResult<()>;

    async fn get(&self, id: &str) -> DashboardResult<Option<Invoice>>;

    /// Search and paginate invoices, newest first
    async fn search(
        &self,
        query: &InvoiceQuery,
    ) -> DashboardResult<PaginatedResponse<InvoiceListItem>>;

    /// Most recent invoices, newest first
    async fn latest(&self, limit: usize) -> DashboardResult<Vec<InvoiceListItem>>;

    async fn card_data(&self) -> DashboardResult<CardData>;

    /// Paid totals per month, oldest first
    async fn revenue(&self) -> DashboardResult<Vec<MonthlyRevenue>>;

    /// All customers ordered by name
    async fn customers(&self) -> DashboardResult<Vec<Customer>>;
}
