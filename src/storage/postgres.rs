//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresInvoiceStore`, an `InvoiceStore` backed by a
//! PostgreSQL database via `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! invoice-dashboard = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! # Schema
//!
//! - `customers (id, name, email, image_url)`
//! - `invoices (id UUID, customer_id, amount BIGINT, status, date DATE, created_at)`
//!
//! `amount` holds minor units. `created_at` only orders invoices that share
//! a date.

use crate::config::DatabaseConfig;
use crate::core::error::{DashboardError, DashboardResult, InvoiceError, StorageError};
use crate::core::invoice::{
    CardData, Customer, Invoice, InvoiceDraft, InvoiceStatus, MonthlyRevenue,
};
use crate::core::money::Cents;
use crate::core::query::{
    ITEMS_PER_PAGE, InvoiceListItem, InvoiceQuery, PaginatedResponse, PaginationMeta,
};
use crate::core::store::InvoiceStore;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Apply the required tables and indexes (idempotent).
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> DashboardResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS customers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            image_url TEXT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS invoices (
            id UUID PRIMARY KEY,
            customer_id TEXT NOT NULL,
            amount BIGINT NOT NULL,
            status VARCHAR(255) NOT NULL,
            date DATE NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_invoices_date ON invoices (date DESC, created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

type InvoiceRow = (Uuid, String, i64, String, NaiveDate);

type ListRow = (
    Uuid,
    String,
    i64,
    String,
    NaiveDate,
    Option<String>,
    Option<String>,
    Option<String>,
);

const LIST_SELECT: &str = "SELECT i.id, i.customer_id, i.amount, i.status, i.date, \
     c.name, c.email, c.image_url \
     FROM invoices i LEFT JOIN customers c ON c.id = i.customer_id";

const SEARCH_FILTER: &str = "WHERE $1::TEXT IS NULL \
     OR c.name ILIKE $1 OR c.email ILIKE $1 \
     OR i.amount::TEXT ILIKE $1 OR i.date::TEXT ILIKE $1 OR i.status ILIKE $1";

fn invoice_from_row((id, customer_id, amount, status, date): InvoiceRow) -> DashboardResult<Invoice> {
    let status: InvoiceStatus = status.parse().map_err(|e: String| {
        DashboardError::Storage(StorageError::IntegrityError {
            message: format!("invoice {} has an unknown status: {}", id, e),
        })
    })?;

    Ok(Invoice {
        id: id.to_string(),
        customer_id,
        amount: Cents::new(amount),
        status,
        date,
    })
}

fn list_item_from_row(row: ListRow) -> DashboardResult<InvoiceListItem> {
    let (id, customer_id, amount, status, date, name, email, image_url) = row;
    Ok(InvoiceListItem {
        invoice: invoice_from_row((id, customer_id, amount, status, date))?,
        name,
        email,
        image_url,
    })
}

/// Substring pattern for `ILIKE`; `%`, `_` and `\` in the term match literally
/// (backslash is the default LIKE escape)
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// OFFSET/LIMIT values past `i64::MAX` clamp to it
fn sql_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Invoice ids are UUIDs in this backend; anything else names no row
fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

// ---------------------------------------------------------------------------
// PostgresInvoiceStore
// ---------------------------------------------------------------------------

/// Invoice store backed by PostgreSQL.
///
/// Every method runs a single parameterized statement (two for paginated
/// search: page and count).
///
/// # Example
///
/// ```rust,ignore
/// use sqlx::PgPool;
/// use dashboard::storage::PostgresInvoiceStore;
///
/// let pool = PgPool::connect("postgres://localhost/dashboard").await?;
/// dashboard::storage::postgres::ensure_schema(&pool).await?;
/// let store = PostgresInvoiceStore::new(pool);
/// ```
#[derive(Clone, Debug)]
pub struct PostgresInvoiceStore {
    pool: PgPool,
}

impl PostgresInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool from configuration and apply the schema
    pub async fn connect(config: &DatabaseConfig) -> DashboardResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;
        ensure_schema(&pool).await?;
        tracing::info!(max_connections = config.max_connections, "connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert or replace a customer row
    pub async fn upsert_customer(&self, customer: &Customer) -> DashboardResult<()> {
        sqlx::query(
            "INSERT INTO customers (id, name, email, image_url) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, email = EXCLUDED.email, \
             image_url = EXCLUDED.image_url",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.image_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl InvoiceStore for PostgresInvoiceStore {
    async fn insert(&self, invoice: Invoice) -> DashboardResult<()> {
        let id = parse_id(&invoice.id).ok_or_else(|| {
            DashboardError::Storage(StorageError::QueryError {
                backend: "PostgreSQL".to_string(),
                message: format!("invalid input syntax for type uuid: \"{}\"", invoice.id),
            })
        })?;

        sqlx::query(
            "INSERT INTO invoices (id, customer_id, amount, status, date) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(&invoice.customer_id)
        .bind(invoice.amount.get())
        .bind(invoice.status.as_str())
        .bind(invoice.date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, id: &str, draft: &InvoiceDraft) -> DashboardResult<()> {
        let not_found = || InvoiceError::NotFound { id: id.to_string() };
        let uuid = parse_id(id).ok_or_else(not_found)?;

        let result = sqlx::query(
            "UPDATE invoices SET customer_id = $1, amount = $2, status = $3 WHERE id = $4",
        )
        .bind(&draft.customer_id)
        .bind(draft.amount.get())
        .bind(draft.status.as_str())
        .bind(uuid)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found().into());
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> DashboardResult<()> {
        let Some(uuid) = parse_id(id) else {
            return Ok(());
        };

        sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, id: &str) -> DashboardResult<Option<Invoice>> {
        let Some(uuid) = parse_id(id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, InvoiceRow>(
            "SELECT id, customer_id, amount, status, date FROM invoices WHERE id = $1",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        row.map(invoice_from_row).transpose()
    }

    async fn search(
        &self,
        query: &InvoiceQuery,
    ) -> DashboardResult<PaginatedResponse<InvoiceListItem>> {
        let pattern = query.term().map(like_pattern);

        let rows = sqlx::query_as::<_, ListRow>(&format!(
            "{} {} ORDER BY i.date DESC, i.created_at DESC LIMIT $2 OFFSET $3",
            LIST_SELECT, SEARCH_FILTER
        ))
        .bind(&pattern)
        .bind(sql_count(ITEMS_PER_PAGE))
        .bind(sql_count(query.offset()))
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM invoices i LEFT JOIN customers c ON c.id = i.customer_id {}",
            SEARCH_FILTER
        ))
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let data = rows
            .into_iter()
            .map(list_item_from_row)
            .collect::<DashboardResult<Vec<_>>>()?;

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(query.page(), ITEMS_PER_PAGE, total.max(0) as usize),
        })
    }

    async fn latest(&self, limit: usize) -> DashboardResult<Vec<InvoiceListItem>> {
        let rows = sqlx::query_as::<_, ListRow>(&format!(
            "{} ORDER BY i.date DESC, i.created_at DESC LIMIT $1",
            LIST_SELECT
        ))
        .bind(sql_count(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(list_item_from_row).collect()
    }

    async fn card_data(&self) -> DashboardResult<CardData> {
        let (invoices, paid, pending): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
             COALESCE(SUM(CASE WHEN status = 'paid' THEN amount ELSE 0 END), 0)::BIGINT, \
             COALESCE(SUM(CASE WHEN status = 'pending' THEN amount ELSE 0 END), 0)::BIGINT \
             FROM invoices",
        )
        .fetch_one(&self.pool)
        .await?;

        let (customers,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(CardData {
            total_paid: Cents::new(paid),
            total_pending: Cents::new(pending),
            number_of_invoices: invoices.max(0) as usize,
            number_of_customers: customers.max(0) as usize,
        })
    }

    async fn revenue(&self) -> DashboardResult<Vec<MonthlyRevenue>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT to_char(date, 'YYYY-MM') AS month, SUM(amount)::BIGINT \
             FROM invoices WHERE status = 'paid' \
             GROUP BY month ORDER BY month ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(month, revenue)| MonthlyRevenue {
                month,
                revenue: Cents::new(revenue),
            })
            .collect())
    }

    async fn customers(&self) -> DashboardResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, (String, String, String, Option<String>)>(
            "SELECT id, name, email, image_url FROM customers ORDER BY name ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, email, image_url)| Customer {
                id,
                name,
                email,
                image_url,
            })
            .collect())
    }
}
