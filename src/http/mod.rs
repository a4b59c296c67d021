//! HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → middleware.rs (inherit/generate correlation id, bind logger)
//!     → scope.rs (extensions + task-local publication)
//!     → handler (RequestLogger / CorrelationId extractors)
//!     → middleware.rs (echo x-correlation-id)
//!     → Send to client
//! ```

pub mod middleware;
pub mod scope;
pub mod server;

pub use middleware::correlation_middleware;
pub use scope::{current_correlation_id, current_logger, CorrelationId, RequestLogger, RequestScope};
pub use server::HttpServer;
