//! Server host holding the state shared by every request
//!
//! The host is agnostic to the transport; the REST exposure borrows it
//! through an `Arc`.

use crate::config::RouteConfig;
use crate::core::actions::InvoiceActions;
use crate::core::auth::SessionProvider;
use crate::core::cache::ViewCache;
use crate::core::gate::AuthorizationGate;
use crate::core::store::InvoiceStore;
use std::sync::Arc;

/// Host context containing all dashboard state
///
/// # Example
///
/// ```rust,ignore
/// let host = Arc::new(DashboardHost::new(routes, store, sessions, cache));
/// let app = RestExposure::build_router(host, Vec::new());
/// ```
#[derive(Clone)]
pub struct DashboardHost {
    /// Route layout (listing, login, entry point)
    pub routes: Arc<RouteConfig>,

    /// Read side of the invoice relations
    pub store: Arc<dyn InvoiceStore>,

    /// Mutation pipeline; shares `store` and invalidates `cache`
    pub actions: InvoiceActions,

    /// Rendered listing views
    pub cache: ViewCache,

    pub gate: Arc<AuthorizationGate>,

    pub sessions: Arc<dyn SessionProvider>,
}

impl DashboardHost {
    pub fn new(
        routes: RouteConfig,
        store: Arc<dyn InvoiceStore>,
        sessions: Arc<dyn SessionProvider>,
        cache: ViewCache,
    ) -> Self {
        let gate = AuthorizationGate::new(&routes.protected_prefix, &routes.entry_point)
            .with_public_paths(routes.public_paths.iter().cloned());
        let actions = InvoiceActions::new(store.clone(), Arc::new(cache.clone()))
            .with_listing_route(&routes.invoices_route);

        Self {
            routes: Arc::new(routes),
            store,
            actions,
            cache,
            gate: Arc::new(gate),
            sessions,
        }
    }

    /// Replace the mutation pipeline (e.g. to inject a clock)
    pub fn with_actions(mut self, actions: InvoiceActions) -> Self {
        self.actions = actions;
        self
    }
}
