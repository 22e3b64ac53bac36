//! HTTP server implementation

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::error::RpcResult;
use crate::handler::RpcHandler;
use crate::types::JsonRpcResponse;

/// Default listen address
pub const DEFAULT_LISTEN_ADDR: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST), 8645);

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address
    pub listen_addr: SocketAddr,
    /// Maximum request body size (default: 1MB)
    pub max_body_size: usize,
    /// Enable CORS (default: true)
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR,
            max_body_size: 1024 * 1024,
            enable_cors: true,
        }
    }
}

impl ServerConfig {
    /// Create a new server config with the given address
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            ..Default::default()
        }
    }
}

/// RPC server state
pub struct ServerState {
    /// RPC handler for processing requests
    pub handler: RpcHandler,
}

/// RPC HTTP server
pub struct RpcServer {
    config: ServerConfig,
    state: Arc<ServerState>,
}

impl RpcServer {
    /// Create a new RPC server
    pub fn new(config: ServerConfig, handler: RpcHandler) -> Self {
        Self {
            config,
            state: Arc::new(ServerState { handler }),
        }
    }

    /// Build the router
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/", post(handle_rpc))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(RequestBodyLimitLayer::new(self.config.max_body_size)),
            );

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        router.with_state(self.state.clone())
    }

    /// Run the server until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> RpcResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let app = self.router();

        let listener = TcpListener::bind(self.config.listen_addr).await?;
        tracing::info!("RPC server listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }

    /// Run the server
    pub async fn run(self) -> RpcResult<()> {
        self.run_until(std::future::pending()).await
    }

    /// Get the server listen address
    pub fn listen_addr(&self) -> SocketAddr {
        self.config.listen_addr
    }
}

/// Handle JSON-RPC requests
async fn handle_rpc(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> Json<JsonRpcResponse> {
    Json(state.handler.handle_body(&body).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr.port(), 8645);
        assert_eq!(config.max_body_size, 1024 * 1024);
        assert!(config.enable_cors);
    }

    #[test]
    fn test_server_config_new() {
        let addr: SocketAddr = "127.0.0.1:9545".parse().unwrap();
        let config = ServerConfig::new(addr);
        assert_eq!(config.listen_addr.port(), 9545);
        assert!(config.enable_cors);
    }
}
