//! Router builder for the dashboard routes

use crate::server::exposure::rest::handlers::{
    create_invoice, delete_invoice, get_invoice, list_customers, list_invoices, overview,
    update_invoice,
};
use crate::server::host::DashboardHost;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

/// Build dashboard routes from the host's route layout
///
/// With the default layout:
/// - GET /dashboard - Overview (cards + latest invoices)
/// - GET /dashboard/invoices - Search and paginate invoices
/// - POST /dashboard/invoices - Create invoice
/// - GET /dashboard/invoices/{id} - Get invoice
/// - POST|PUT /dashboard/invoices/{id} - Update invoice
/// - DELETE /dashboard/invoices/{id} - Delete invoice
/// - POST /dashboard/invoices/{id}/delete - Delete invoice (form submit)
/// - GET /dashboard/customers - List customers
pub fn build_dashboard_routes(host: Arc<DashboardHost>) -> Router {
    let routes = host.routes.clone();
    let invoices = routes.invoices_route.as_str();

    Router::new()
        .route(&routes.entry_point, get(overview))
        .route(invoices, get(list_invoices).post(create_invoice))
        .route(
            &format!("{}/{{id}}", invoices),
            get(get_invoice)
                .post(update_invoice)
                .put(update_invoice)
                .delete(delete_invoice),
        )
        .route(&format!("{}/{{id}}/delete", invoices), post(delete_invoice))
        .route(
            &format!("{}/customers", routes.protected_prefix),
            get(list_customers),
        )
        .with_state(host)
}
