//! Record sinks.
//!
//! # Responsibilities
//! - Serialize records as newline-delimited JSON (primary output)
//! - Mirror records into `tracing` (secondary output)
//! - Fan one record out to several sinks
//!
//! # Design Decisions
//! - A whole line is written with a single `write_all` under a mutex, so
//!   concurrent emitters never interleave partial JSON
//! - A failing sink drops its copy of the record; the remaining sinks in a
//!   fan-out still receive it

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crate::logging::level::Level;
use crate::logging::record::LogRecord;
use crate::observability::metrics;

/// Target used for records mirrored into `tracing`.
pub const MIRROR_TARGET: &str = "correlation_logger::record";

/// Error raised by a sink that could not accept a record.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write log line: {0}")]
    Io(#[from] io::Error),
}

impl SinkError {
    /// Short label used in metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            SinkError::Serialize(_) => "serialize",
            SinkError::Io(_) => "io",
        }
    }
}

/// Destination for built records.
pub trait Sink: Send + Sync {
    fn emit(&self, record: &LogRecord) -> Result<(), SinkError>;

    /// Name used when reporting failures.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Report a dropped record on the diagnostic stream.
pub(crate) fn report_failure(sink: &str, record: &LogRecord, error: &SinkError) {
    tracing::error!(
        sink = sink,
        correlation_id = %record.context.correlation_id,
        level = record.level,
        error = %error,
        "Log record dropped"
    );
    metrics::record_dropped(error.reason());
}

/// Writes each record as one JSON line.
pub struct JsonLineSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl JsonLineSink<io::Stdout> {
    /// Sink writing to process stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> Sink for JsonLineSink<W> {
    fn emit(&self, record: &LogRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(&line)?;
        writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json_line"
    }
}

/// Keeps serialized lines in memory. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every line emitted so far, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Emitted lines parsed back into records. Lines that fail to parse
    /// are skipped.
    pub fn records(&self) -> Vec<LogRecord> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }
}

impl Sink for MemorySink {
    fn emit(&self, record: &LogRecord) -> Result<(), SinkError> {
        let line = serde_json::to_string(record)?;
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Mirrors records into `tracing`.
///
/// `tracing` has five levels, so Notice folds into INFO and Critical,
/// Alert and Emergency fold into ERROR. The folded levels carry a
/// `severity` field naming the original level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl Sink for TracingSink {
    fn emit(&self, record: &LogRecord) -> Result<(), SinkError> {
        let message = record.message.as_str();
        let correlation_id = record.context.correlation_id.as_str();
        let request_id = record.context.request_id.as_str();
        let app_name = record.context.app_name.as_str();
        let channel = record.channel.as_str();

        match record.severity() {
            Some(Level::Debug) => tracing::debug!(
                target: MIRROR_TARGET,
                correlation_id, request_id, app_name, channel,
                "{message}"
            ),
            Some(Level::Info) => tracing::info!(
                target: MIRROR_TARGET,
                correlation_id, request_id, app_name, channel,
                "{message}"
            ),
            Some(Level::Notice) => tracing::info!(
                target: MIRROR_TARGET,
                severity = "notice",
                correlation_id, request_id, app_name, channel,
                "{message}"
            ),
            Some(Level::Warning) => tracing::warn!(
                target: MIRROR_TARGET,
                correlation_id, request_id, app_name, channel,
                "{message}"
            ),
            Some(Level::Error) => tracing::error!(
                target: MIRROR_TARGET,
                correlation_id, request_id, app_name, channel,
                "{message}"
            ),
            Some(Level::Critical) => tracing::error!(
                target: MIRROR_TARGET,
                severity = "critical",
                correlation_id, request_id, app_name, channel,
                "{message}"
            ),
            Some(Level::Alert) => tracing::error!(
                target: MIRROR_TARGET,
                severity = "alert",
                correlation_id, request_id, app_name, channel,
                "{message}"
            ),
            Some(Level::Emergency) => tracing::error!(
                target: MIRROR_TARGET,
                severity = "emergency",
                correlation_id, request_id, app_name, channel,
                "{message}"
            ),
            None => tracing::info!(
                target: MIRROR_TARGET,
                severity = record.level,
                correlation_id, request_id, app_name, channel,
                "{message}"
            ),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}

/// Hands each record to every inner sink in order.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn Sink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stdout JSON lines plus the `tracing` mirror.
    pub fn standard() -> Self {
        Self::new()
            .with(Arc::new(JsonLineSink::stdout()))
            .with(Arc::new(TracingSink))
    }

    pub fn with(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl Sink for FanoutSink {
    /// Failures are reported per inner sink and never stop the rest.
    fn emit(&self, record: &LogRecord) -> Result<(), SinkError> {
        for sink in &self.sinks {
            if let Err(e) = sink.emit(record) {
                report_failure(sink.name(), record, &e);
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fanout"
    }
}
