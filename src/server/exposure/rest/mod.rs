//! REST API exposure for the dashboard
//!
//! Consumes a `DashboardHost` and produces an Axum `Router` with the gate
//! middleware in front of every route.

pub mod handlers;
pub mod middleware;

use super::super::host::DashboardHost;
use crate::server::router::build_dashboard_routes;
use axum::{Router, middleware::from_fn_with_state, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// Returns a router with:
    /// - Health check routes
    /// - Login placeholder
    /// - Dashboard routes (overview, invoices, customers)
    /// - Custom routes
    ///
    /// Custom routes and the 404 fallback sit behind the gate as well.
    pub fn build_router(host: Arc<DashboardHost>, custom_routes: Vec<Router>) -> Router {
        let mut app = Self::health_routes()
            .route(&host.routes.login_path, get(handlers::login_page))
            .merge(build_dashboard_routes(host.clone()));

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        app.fallback(handlers::route_not_found)
            .layer(from_fn_with_state(host, middleware::authorize))
            .layer(TraceLayer::new_for_http())
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(handlers::health_check))
            .route("/healthz", get(handlers::health_check))
    }
}
