//! Structured application logging.
//!
//! # Data Flow
//! ```text
//! Logger::info / ::error / ...
//!     → record.rs (identity + fresh request id + timestamp + extra)
//!     → sink.rs (fan-out)
//!         → JSON line on stdout
//!         → mirrored tracing event
//! ```
//!
//! # Design Decisions
//! - Every emission gets a new request id; the correlation id is shared
//!   by all emissions of one logical request
//! - Error and above capture the caller's `file:line`
//! - Sink failures are reported and dropped, never returned to callers

pub mod correlation;
pub mod factory;
pub mod level;
pub mod logger;
pub mod record;
pub mod sink;

pub use correlation::{generate_id, X_CORRELATION_ID};
pub use factory::LoggerFactory;
pub use level::{level_name, Level};
pub use logger::Logger;
pub use record::{ExceptionInfo, LogRecord, RecordContext};
pub use sink::{FanoutSink, JsonLineSink, MemorySink, Sink, SinkError, TracingSink};
