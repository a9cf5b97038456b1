//! In-memory implementation of InvoiceStore for testing and development

use crate::core::error::{DashboardError, DashboardResult, InvoiceError, StorageError};
use crate::core::invoice::{CardData, Customer, Invoice, InvoiceDraft, MonthlyRevenue};
use crate::core::query::{
    ITEMS_PER_PAGE, InvoiceListItem, InvoiceQuery, PaginatedResponse, PaginationMeta,
};
use crate::core::store::InvoiceStore;
use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

const BACKEND: &str = "in-memory";

fn lock_failed(kind: &str, e: impl std::fmt::Display) -> DashboardError {
    DashboardError::Storage(StorageError::QueryError {
        backend: BACKEND.to_string(),
        message: format!("Failed to acquire {} lock: {}", kind, e),
    })
}

#[derive(Default)]
struct Tables {
    /// Invoice rows with their insertion sequence, which breaks date ties
    invoices: HashMap<String, (u64, Invoice)>,
    customers: HashMap<String, Customer>,
    next_seq: u64,
}

impl Tables {
    /// Invoices joined with customers, newest first
    fn joined(&self) -> Vec<InvoiceListItem> {
        let mut rows: Vec<&(u64, Invoice)> = self.invoices.values().collect();
        rows.sort_by_key(|(seq, invoice)| Reverse((invoice.date, *seq)));
        rows.into_iter()
            .map(|(_, invoice)| {
                InvoiceListItem::join(invoice.clone(), self.customers.get(&invoice.customer_id))
            })
            .collect()
    }
}

/// In-memory invoice store
///
/// Uses RwLock for thread-safe access. Each method takes the lock once,
/// so every mutation is atomic on its own.
#[derive(Clone, Default)]
pub struct InMemoryInvoiceStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with customers
    pub fn with_customers(self, customers: impl IntoIterator<Item = Customer>) -> Self {
        if let Ok(mut tables) = self.tables.write() {
            for customer in customers {
                tables.customers.insert(customer.id.clone(), customer);
            }
        }
        self
    }

    pub fn add_customer(&self, customer: Customer) -> DashboardResult<()> {
        self.tables
            .write()
            .map_err(|e| lock_failed("write", e))?
            .customers
            .insert(customer.id.clone(), customer);
        Ok(())
    }

    /// Number of stored invoices
    pub fn len(&self) -> usize {
        self.tables.read().map(|t| t.invoices.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    async fn insert(&self, invoice: Invoice) -> DashboardResult<()> {
        let mut tables = self.tables.write().map_err(|e| lock_failed("write", e))?;

        if tables.invoices.contains_key(&invoice.id) {
            return Err(DashboardError::Storage(StorageError::IntegrityError {
                message: format!("duplicate key value: invoice '{}' already exists", invoice.id),
            }));
        }

        let seq = tables.next_seq;
        tables.next_seq += 1;
        tables.invoices.insert(invoice.id.clone(), (seq, invoice));
        Ok(())
    }

    async fn update(&self, id: &str, draft: &InvoiceDraft) -> DashboardResult<()> {
        let mut tables = self.tables.write().map_err(|e| lock_failed("write", e))?;

        let (_, invoice) = tables
            .invoices
            .get_mut(id)
            .ok_or_else(|| InvoiceError::NotFound { id: id.to_string() })?;

        invoice.customer_id = draft.customer_id.clone();
        invoice.amount = draft.amount;
        invoice.status = draft.status;
        Ok(())
    }

    async fn delete(&self, id: &str) -> DashboardResult<()> {
        self.tables
            .write()
            .map_err(|e| lock_failed("write", e))?
            .invoices
            .remove(id);
        Ok(())
    }

    async fn get(&self, id: &str) -> DashboardResult<Option<Invoice>> {
        let tables = self.tables.read().map_err(|e| lock_failed("read", e))?;
        Ok(tables.invoices.get(id).map(|(_, invoice)| invoice.clone()))
    }

    async fn search(
        &self,
        query: &InvoiceQuery,
    ) -> DashboardResult<PaginatedResponse<InvoiceListItem>> {
        let tables = self.tables.read().map_err(|e| lock_failed("read", e))?;

        let mut rows = tables.joined();
        if let Some(term) = query.term() {
            let term = term.to_lowercase();
            rows.retain(|row| row.matches(&term));
        }

        let total = rows.len();
        let data = rows
            .into_iter()
            .skip(query.offset())
            .take(ITEMS_PER_PAGE)
            .collect();

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(query.page(), ITEMS_PER_PAGE, total),
        })
    }

    async fn latest(&self, limit: usize) -> DashboardResult<Vec<InvoiceListItem>> {
        let tables = self.tables.read().map_err(|e| lock_failed("read", e))?;
        Ok(tables.joined().into_iter().take(limit).collect())
    }

    async fn card_data(&self) -> DashboardResult<CardData> {
        let tables = self.tables.read().map_err(|e| lock_failed("read", e))?;
        CardData::from_invoices(
            tables.invoices.values().map(|(_, invoice)| invoice),
            tables.customers.len(),
        )
    }

    async fn revenue(&self) -> DashboardResult<Vec<MonthlyRevenue>> {
        let tables = self.tables.read().map_err(|e| lock_failed("read", e))?;
        MonthlyRevenue::from_invoices(tables.invoices.values().map(|(_, invoice)| invoice))
    }

    async fn customers(&self) -> DashboardResult<Vec<Customer>> {
        let tables = self.tables.read().map_err(|e| lock_failed("read", e))?;
        let mut customers: Vec<Customer> = tables.customers.values().cloned().collect();
        customers.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(customers)
    }
}
