//! Listing queries and pagination

use crate::core::invoice::{Customer, Invoice};
use serde::{Deserialize, Serialize};

/// Invoices shown per listing page
pub const ITEMS_PER_PAGE: usize = 6;

/// Query parameters of the invoice listing
///
/// # Example
/// ```text
/// GET /dashboard/invoices?query=lee&page=2
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvoiceQuery {
    /// Case-insensitive search over customer name and email, amount, date
    /// and status
    pub query: Option<String>,

    /// Page number (starts at 1)
    pub page: Option<usize>,
}

impl InvoiceQuery {
    pub fn new(query: impl Into<String>, page: usize) -> Self {
        Self {
            query: Some(query.into()),
            page: Some(page),
        }
    }

    /// Get page number, ensuring minimum of 1
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    /// Trimmed search term, `None` when blank
    pub fn term(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// Cache key of this listing view under `route`
    ///
    /// Built from the normalized page and term only, so unknown parameters
    /// and case or whitespace differences share one entry.
    pub fn view_key(&self, route: &str) -> String {
        match self.term() {
            Some(term) => format!(
                "{}?page={}&query={}",
                route,
                self.page(),
                urlencoding::encode(&term.to_lowercase())
            ),
            None => format!("{}?page={}", route, self.page()),
        }
    }

    /// Rows skipped before this page; saturates for absurd page numbers
    pub fn offset(&self) -> usize {
        (self.page() - 1).saturating_mul(ITEMS_PER_PAGE)
    }
}

/// An invoice joined with the customer it is billed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceListItem {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
}

impl InvoiceListItem {
    pub fn join(invoice: Invoice, customer: Option<&Customer>) -> Self {
        Self {
            invoice,
            name: customer.map(|c| c.name.clone()),
            email: customer.map(|c| c.email.clone()),
            image_url: customer.and_then(|c| c.image_url.clone()),
        }
    }

    /// Whether a lowercase search term hits any searchable column
    pub fn matches(&self, term_lower: &str) -> bool {
        let hit = |s: &str| s.to_lowercase().contains(term_lower);
        self.name.as_deref().is_some_and(hit)
            || self.email.as_deref().is_some_and(hit)
            || hit(&self.invoice.amount.get().to_string())
            || hit(&self.invoice.date.to_string())
            || hit(self.invoice.status.as_str())
    }
}

/// Paginated response structure
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    /// The paginated data
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items (after search)
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    pub has_next: bool,

    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let limit = limit.max(1);
        let page = page.max(1);
        let total_pages = total.div_ceil(limit);
        let start = (page - 1).saturating_mul(limit);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: start.saturating_add(limit) < total,
            has_prev: page > 1,
        }
    }
}
