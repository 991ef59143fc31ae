//! Data service HTTP server.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up the shared middleware (request ID, tracing, metrics, panic boundary, timeout)
//! - Serve until shutdown, then close the connection pool

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::StackConfig;
use crate::data_service::error::{internal_error, timeout_error};
use crate::data_service::handlers;
use crate::data_service::store::CatalogStore;
use crate::http::middleware::{apply_common_layers, ErrorResponders};
use crate::lifecycle::shutdown;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
}

/// HTTP server for the data service.
pub struct DataServer {
    router: Router,
    store: Arc<dyn CatalogStore>,
}

impl DataServer {
    /// Create a new server over an already-opened store.
    pub fn new(config: &StackConfig, store: Arc<dyn CatalogStore>) -> Self {
        if config.observability.metrics_enabled {
            metrics::init_metrics();
        }

        let state = AppState {
            store: store.clone(),
        };
        let router = Self::build_router(config, state);
        Self { router, store }
    }

    fn build_router(config: &StackConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            .route("/data", get(handlers::list_items))
            .route("/footballClub", get(handlers::list_clubs))
            .with_state(state);

        if config.observability.metrics_enabled {
            router = router.route("/metrics", get(metrics::metrics_handler));
        }

        apply_common_layers(
            router,
            "backend",
            Duration::from_secs(config.timeouts.request_secs),
            ErrorResponders {
                timeout: timeout_error,
                internal: internal_error,
            },
        )
    }

    /// Serve on `listener` until `shutdown` fires, then close the pool.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %listener.local_addr()?, "Data service starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        self.store.close().await;
        tracing::info!("Data service stopped");
        Ok(())
    }
}
