//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! logging::sink::TracingSink + internal diagnostics
//!     → logging.rs (tracing subscriber, stderr)
//!
//! Logger / sinks / middleware
//!     → metrics.rs (counters)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - stdout carries only JSON log records; everything else goes to stderr
//! - Metrics are cheap counter increments

pub mod logging;
pub mod metrics;
