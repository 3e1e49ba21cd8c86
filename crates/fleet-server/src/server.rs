//! `FleetServer`: axum router plus listener lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::response::Json;
use axum::routing::get;
use fleet_upstream::FleetApi;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::health::{self, LivenessResponse};
use crate::routes;
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Upstream operations the routes forward to.
    pub fleet: Arc<dyn FleetApi>,
}

/// The gateway's HTTP server.
pub struct FleetServer {
    config: ServerConfig,
    fleet: Arc<dyn FleetApi>,
    shutdown: Arc<ShutdownCoordinator>,
}

impl FleetServer {
    /// Create a server forwarding to `fleet`.
    pub fn new(config: ServerConfig, fleet: Arc<dyn FleetApi>) -> Self {
        Self {
            config,
            fleet,
            shutdown: Arc::new(ShutdownCoordinator::new()),
        }
    }

    /// Build the axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            fleet: Arc::clone(&self.fleet),
        };

        Router::new()
            .route("/", get(liveness_handler))
            .merge(routes::api_router())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind the configured address and serve in a background task.
    ///
    /// The task exits once the shutdown token is cancelled and in-flight
    /// requests have drained.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        let token = self.shutdown.token();

        let handle = tokio::spawn(async move {
            let serve = axum::serve(listener, app)
                .with_graceful_shutdown(async move { token.cancelled().await });
            if let Err(e) = serve.await {
                error!(error = %e, "server terminated with error");
            }
            info!("server stopped");
        });

        info!(%addr, "fleet gateway listening");
        Ok((addr, handle))
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// GET /
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(health::liveness())
}
