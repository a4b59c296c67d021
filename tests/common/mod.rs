//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use correlation_logger::config::{Channel, LoggerConfig};
use correlation_logger::logging::{LoggerFactory, MemorySink};
use correlation_logger::{HttpServer, Shutdown};
use serde_json::Value;
use tokio::net::TcpListener;

/// Identity used across the integration tests.
pub fn test_identity() -> LoggerConfig {
    LoggerConfig {
        channel: Channel::Production,
        app_name: "checkout".into(),
        tag_name: "v3.1.0".into(),
    }
}

/// Factory writing into an in-memory sink.
pub fn memory_factory() -> (LoggerFactory, MemorySink) {
    let memory = MemorySink::new();
    let factory = LoggerFactory::new(test_identity(), Arc::new(memory.clone()));
    (factory, memory)
}

/// GET request with an optional correlation header.
pub fn get(uri: &str, correlation_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).header("host", "api.example.test");
    if let Some(id) = correlation_id {
        builder = builder.header("x-correlation-id", id);
    }
    builder.body(Body::empty()).unwrap()
}

/// Echoed correlation id of a response.
pub fn correlation_header<B>(response: &Response<B>) -> String {
    response
        .headers()
        .get("x-correlation-id")
        .expect("x-correlation-id missing")
        .to_str()
        .unwrap()
        .to_string()
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Start the demo server on an ephemeral port.
#[allow(dead_code)]
pub async fn start_server(factory: LoggerFactory) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = HttpServer::new(factory).run(listener, server_shutdown).await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;
    (addr, shutdown)
}
