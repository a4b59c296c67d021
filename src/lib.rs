//! Structured JSON logger with per-request correlation tracking.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod logging;
pub mod observability;

pub use config::AppConfig;
pub use http::{CorrelationId, HttpServer, RequestLogger};
pub use lifecycle::shutdown::Shutdown;
pub use logging::{Level, LogRecord, Logger, LoggerFactory};
