//! Gateway HTTP server.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy handlers
//! - Build the shared retrying client once
//! - Wire up the shared middleware and serve until shutdown

use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::StackConfig;
use crate::gateway::client::{BackendClient, ClientBuildError};
use crate::gateway::error::{internal_error, timeout_error};
use crate::gateway::handlers;
use crate::http::middleware::{apply_common_layers, ErrorResponders};
use crate::lifecycle::shutdown;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: BackendClient,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    backend_url: String,
}

impl GatewayServer {
    /// Build the client from config and create the server.
    pub fn new(config: &StackConfig) -> Result<Self, ClientBuildError> {
        let client = BackendClient::new(&config.gateway, &config.retries)?;
        Ok(Self::with_client(config, client))
    }

    /// Create the server around a prepared client.
    pub fn with_client(config: &StackConfig, client: BackendClient) -> Self {
        if config.observability.metrics_enabled {
            metrics::init_metrics();
        }

        let backend_url = client.base_url().to_string();
        let router = Self::build_router(config, AppState { client });
        Self {
            router,
            backend_url,
        }
    }

    fn build_router(config: &StackConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/", get(handlers::home))
            .route("/clubs", get(handlers::clubs))
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            .with_state(state);

        if config.observability.metrics_enabled {
            router = router.route("/metrics", get(metrics::metrics_handler));
        }

        apply_common_layers(
            router,
            "frontend",
            Duration::from_secs(config.timeouts.request_secs),
            ErrorResponders {
                timeout: timeout_error,
                internal: internal_error,
            },
        )
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(
            address = %listener.local_addr()?,
            backend_url = %self.backend_url,
            "Gateway starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }
}
