//! API server setup.
//!
//! # Responsibilities
//! - Create the Axum router with the JSON-RPC handler
//! - Wire up request tracing
//! - Bind the listen address from `app.apilisten`
//! - Serve until the done signal fires

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::post, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::api::handlers::handle_rpc;
use crate::api::{ApiError, ApiService, RPC_PATH};
use crate::config::validation::{self, ValidationError};
use crate::config::{keys, Config};
use crate::node::Pegnetd;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub node: Arc<Pegnetd>,
}

/// HTTP API server for the pegnet node.
pub struct ApiServer {
    router: Router,
    listen: Result<SocketAddr, ValidationError>,
}

impl ApiServer {
    /// Create the server. An invalid listen address is reported when the
    /// server is started.
    pub fn new(config: &Config, node: Arc<Pegnetd>) -> Self {
        let router = Router::new()
            .route(RPC_PATH, post(handle_rpc))
            .with_state(AppState { node })
            .layer(TraceLayer::new_for_http());

        Self {
            router,
            listen: validation::listen_address(config, keys::API_LISTEN),
        }
    }

    /// Serve on an already bound listener until `done` is cancelled.
    pub async fn serve(
        &self,
        listener: TcpListener,
        done: CancellationToken,
    ) -> Result<(), ApiError> {
        let addr = listener.local_addr().map_err(ApiError::Serve)?;
        tracing::info!(address = %addr, "API server starting");

        axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(async move { done.cancelled().await })
            .await
            .map_err(ApiError::Serve)?;

        tracing::info!("API server stopped");
        Ok(())
    }
}

#[async_trait]
impl ApiService for ApiServer {
    async fn start(&self, done: CancellationToken) -> Result<(), ApiError> {
        let addr = self.listen.clone()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiError::Bind { addr, source })?;
        self.serve(listener, done).await
    }
}
