//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum Router with the demo handlers
//! - Wire up middleware (correlation scope, tracing)
//! - Serve until the shutdown signal fires

use axum::{
    http::Uri,
    middleware,
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::http::middleware::correlation_middleware;
use crate::http::scope::{CorrelationId, RequestLogger};
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::logging::LoggerFactory;

/// Routes served by the demo server.
pub const ROUTES: [&str; 2] = ["/api/logs", "/api/test"];

/// Demo HTTP server with the correlation middleware installed.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(factory: LoggerFactory) -> Self {
        Self {
            router: Self::build_router(factory),
        }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(factory: LoggerFactory) -> Router {
        Router::new()
            .route(ROUTES[0], get(logs_handler))
            .route(ROUTES[1], any(test_handler))
            .with_state(factory.clone())
            .layer(middleware::from_fn_with_state(factory, correlation_middleware))
            .layer(TraceLayer::new_for_http())
    }

    /// Clone of the router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = ROUTES.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn logs_handler() -> Json<Value> {
    Json(json!({ "message": "Log endpoint is up" }))
}

/// Logs through the request-scoped logger.
async fn test_handler(
    RequestLogger(logger): RequestLogger,
    CorrelationId(correlation_id): CorrelationId,
    uri: Uri,
) -> Json<Value> {
    logger.info(
        "Endpoint exercised with the request logger",
        json!({
            "correlation_id": correlation_id,
            "path": uri.path(),
        }),
    );

    Json(json!({
        "message": "Request logger test completed",
        "correlation_id": correlation_id,
    }))
}
