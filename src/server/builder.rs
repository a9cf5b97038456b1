//! DashboardBuilder for fluent API to build the HTTP server

use super::exposure::RestExposure;
use super::host::DashboardHost;
use crate::config::DashboardConfig;
use crate::core::actions::{Clock, InvoiceActions};
use crate::core::auth::{NoSessionProvider, SessionProvider};
use crate::core::cache::ViewCache;
use crate::core::store::InvoiceStore;
use anyhow::Result;
use axum::Router;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the dashboard server
///
/// # Example
///
/// ```ignore
/// let app = DashboardBuilder::new()
///     .with_config(DashboardConfig::from_yaml_file("dashboard.yaml")?)
///     .with_store(InMemoryInvoiceStore::new())
///     .with_session_provider(sessions)
///     .build()?;
/// ```
pub struct DashboardBuilder {
    config: DashboardConfig,
    store: Option<Arc<dyn InvoiceStore>>,
    sessions: Option<Arc<dyn SessionProvider>>,
    cache: ViewCache,
    clock: Option<Clock>,
    custom_routes: Vec<Router>,
}

impl DashboardBuilder {
    pub fn new() -> Self {
        Self {
            config: DashboardConfig::default(),
            store: None,
            sessions: None,
            cache: ViewCache::new(),
            clock: None,
            custom_routes: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: DashboardConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the invoice store
    ///
    /// Without one, `build` falls back to an in-memory store seeded with
    /// the configured customers (when the `in-memory` feature is on).
    pub fn with_store(mut self, store: impl InvoiceStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    pub fn with_shared_store(mut self, store: Arc<dyn InvoiceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the session provider; defaults to [`NoSessionProvider`]
    pub fn with_session_provider(mut self, sessions: impl SessionProvider + 'static) -> Self {
        self.sessions = Some(Arc::new(sessions));
        self
    }

    /// Share a view cache with the caller (e.g. to inspect it in tests)
    pub fn with_view_cache(mut self, cache: ViewCache) -> Self {
        self.cache = cache;
        self
    }

    /// Override "today" for created invoices
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Add custom routes to the server
    ///
    /// They are merged before the gate is applied, so paths under the
    /// protected prefix still require a session.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    pub fn build_host(mut self) -> Result<DashboardHost> {
        self.config.validate()?;

        let store = match self.store.take() {
            Some(store) => store,
            None => self.default_store()?,
        };
        let sessions = self
            .sessions
            .take()
            .unwrap_or_else(|| Arc::new(NoSessionProvider));

        let routes = self.config.routes.clone();
        let mut host = DashboardHost::new(routes.clone(), store.clone(), sessions, self.cache.clone());

        if let Some(clock) = self.clock.take() {
            let actions = InvoiceActions::new(store, Arc::new(self.cache.clone()))
                .with_listing_route(&routes.invoices_route)
                .with_clock(move || clock());
            host = host.with_actions(actions);
        }

        tracing::debug!(
            protected_prefix = %routes.protected_prefix,
            invoices_route = %routes.invoices_route,
            "dashboard host built"
        );
        Ok(host)
    }

    #[cfg(feature = "in-memory")]
    fn default_store(&self) -> Result<Arc<dyn InvoiceStore>> {
        let store = crate::storage::InMemoryInvoiceStore::new()
            .with_customers(self.config.customers.iter().cloned());
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "in-memory"))]
    fn default_store(&self) -> Result<Arc<dyn InvoiceStore>> {
        Err(anyhow::anyhow!(
            "InvoiceStore is required. Call .with_store()"
        ))
    }

    /// Build the final REST router
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        Ok(RestExposure::build_router(host, custom_routes))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Binds the configured address and handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.bind;
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for DashboardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
