//! HTTP surface of the broker.
//!
//! Routing, credential extraction and status mapping live here; every
//! handler resolves its target, runs it past the [`AccessGuard`] and hands
//! off to the registry or the ledger.

mod auth;
mod osb;
mod stores;

pub use auth::basic_credentials;

use crate::guard::AccessGuard;
use crate::ledger::ProvisioningLedger;
use crate::store::StoreRegistry;
use axum::http::{header, HeaderMap};
use axum::routing::{get, put};
use axum::Router;
use broker_api::Catalog;
use log::info;
use std::sync::Arc;

// App State to share with routes
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub registry: Arc<StoreRegistry>,
    pub ledger: Arc<ProvisioningLedger>,
    pub guard: Arc<AccessGuard>,
    pub host_string: Option<Arc<str>>,
}

impl AppState {
    pub fn new(catalog: Catalog, guard: AccessGuard, host_string: Option<String>) -> Self {
        Self::with_registry(catalog, guard, host_string, StoreRegistry::new())
    }

    pub fn with_registry(
        catalog: Catalog,
        guard: AccessGuard,
        host_string: Option<String>,
        registry: StoreRegistry,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let registry = Arc::new(registry);
        let ledger = Arc::new(ProvisioningLedger::new(catalog.clone(), registry.clone()));
        Self {
            catalog,
            registry,
            ledger,
            guard: Arc::new(guard),
            host_string: host_string.map(Arc::from),
        }
    }

    /// Host used in store urls: the configured host string, else the
    /// request's Host header.
    fn host(&self, headers: &HeaderMap) -> String {
        if let Some(host) = &self.host_string {
            return host.to_string();
        }
        headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("localhost")
            .to_string()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(osb::info))
        .route("/info", get(osb::info))
        .route("/v2/catalog", get(osb::catalog))
        .route(
            "/v2/service_instances/:instance_id",
            put(osb::provision).delete(osb::deprovision),
        )
        .route(
            "/v2/service_instances/:instance_id/service_bindings/:binding_id",
            put(osb::bind).delete(osb::unbind),
        )
        .route("/db", get(stores::list).post(stores::create))
        .route("/db/", get(stores::list).post(stores::create))
        .route(
            "/db/:store_id",
            get(stores::get_store)
                .put(stores::create_with_id)
                .delete(stores::delete_store),
        )
        .route(
            "/db/:store_id/",
            get(stores::get_store)
                .put(stores::create_with_id)
                .delete(stores::delete_store),
        )
        .route(
            "/db/:store_id/*key",
            get(stores::get_value)
                .put(stores::set_value)
                .delete(stores::delete_value),
        )
        .with_state(state)
}

/// Serves until ctrl-c.
pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
