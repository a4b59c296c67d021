//! Correlation middleware.
//!
//! For every inbound request:
//! 1. Reuse `x-correlation-id` if present, otherwise generate one
//! 2. Bind a new logger from the factory's identity snapshot
//! 3. Log "Request received" with method, path and host
//! 4. Publish the scope in extensions and the task-local, run the handler
//! 5. Echo the correlation id on the response

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use serde_json::json;

use crate::http::scope::{self, RequestScope};
use crate::logging::correlation::{self, X_CORRELATION_ID};
use crate::logging::LoggerFactory;
use crate::observability::metrics;

pub async fn correlation_middleware(
    State(factory): State<LoggerFactory>,
    mut request: Request,
    next: Next,
) -> Response {
    let inbound = request
        .headers()
        .get(X_CORRELATION_ID)
        .and_then(|value| value.to_str().ok());
    let (correlation_id, source) = correlation::inherit_or_generate(inbound);
    metrics::record_request(source);

    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| request.uri().host())
        .unwrap_or_default()
        .to_string();

    let logger = factory.logger_for(correlation_id.clone());
    logger.info(
        "Request received",
        json!({
            "method": request.method().as_str(),
            "path": request.uri().path(),
            "host": host,
        }),
    );

    let request_scope = RequestScope {
        correlation_id: correlation_id.clone(),
        logger,
    };
    request.extensions_mut().insert(request_scope.clone());

    let mut response = scope::with_scope(request_scope, next.run(request)).await;

    match HeaderValue::from_str(&correlation_id) {
        Ok(value) => {
            response.headers_mut().insert(X_CORRELATION_ID, value);
        }
        Err(e) => {
            tracing::warn!(correlation_id = %correlation_id, error = %e, "Correlation id not echoed");
        }
    }
    response
}
