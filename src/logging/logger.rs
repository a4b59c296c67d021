//! Logger instance.
//!
//! A `Logger` is bound to one channel, application, tag and correlation id.
//! Each severity method builds a record and hands it to the logger's sink.
//! Sink failures are reported on the diagnostic stream and never reach the
//! caller.

use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use serde_json::Value;

use crate::config::schema::LoggerConfig;
use crate::logging::correlation;
use crate::logging::level::Level;
use crate::logging::record::{self, ExceptionInfo, Identity};
use crate::logging::sink::{self, Sink};
use crate::observability::metrics;

/// Handle that emits records for one correlation id.
#[derive(Clone)]
pub struct Logger {
    channel: String,
    app_name: String,
    tag_name: String,
    correlation_id: String,
    sink: Arc<dyn Sink>,
}

impl Logger {
    /// Create a logger from a resolved identity with a fresh correlation id.
    pub fn new(config: &LoggerConfig, sink: Arc<dyn Sink>) -> Self {
        Self {
            channel: config.channel.as_str().to_string(),
            app_name: config.app_name.clone(),
            tag_name: config.tag_name.clone(),
            correlation_id: correlation::generate_id(),
            sink,
        }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn set_correlation_id(&mut self, id: impl Into<String>) {
        self.correlation_id = id.into();
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn set_app_name(&mut self, name: impl Into<String>) {
        self.app_name = name.into();
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn set_tag_name(&mut self, name: impl Into<String>) {
        self.tag_name = name.into();
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Not validated; only construction normalizes the channel.
    pub fn set_channel(&mut self, channel: impl Into<String>) {
        self.channel = channel.into();
    }

    pub fn debug(&self, message: impl Into<String>, extra: impl Into<Value>) {
        self.emit(Level::Debug, message.into(), extra.into(), None);
    }

    pub fn info(&self, message: impl Into<String>, extra: impl Into<Value>) {
        self.emit(Level::Info, message.into(), extra.into(), None);
    }

    pub fn notice(&self, message: impl Into<String>, extra: impl Into<Value>) {
        self.emit(Level::Notice, message.into(), extra.into(), None);
    }

    pub fn warning(&self, message: impl Into<String>, extra: impl Into<Value>) {
        self.emit(Level::Warning, message.into(), extra.into(), None);
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>, extra: impl Into<Value>) {
        self.log(Level::Error, message, extra);
    }

    #[track_caller]
    pub fn critical(&self, message: impl Into<String>, extra: impl Into<Value>) {
        self.log(Level::Critical, message, extra);
    }

    #[track_caller]
    pub fn alert(&self, message: impl Into<String>, extra: impl Into<Value>) {
        self.log(Level::Alert, message, extra);
    }

    #[track_caller]
    pub fn emergency(&self, message: impl Into<String>, extra: impl Into<Value>) {
        self.log(Level::Emergency, message, extra);
    }

    /// Emit at an arbitrary level. Error and above capture the caller's
    /// location as exception info.
    #[track_caller]
    pub fn log(&self, level: Level, message: impl Into<String>, extra: impl Into<Value>) {
        // Closures do not inherit `#[track_caller]`.
        let location = Location::caller();
        let message = message.into();
        let exception = level
            .carries_exception()
            .then(|| ExceptionInfo::new(message.clone(), location));
        self.emit(level, message, extra.into(), exception);
    }

    fn identity(&self) -> Identity<'_> {
        Identity {
            channel: &self.channel,
            app_name: &self.app_name,
            tag_name: &self.tag_name,
            correlation_id: &self.correlation_id,
        }
    }

    fn emit(&self, level: Level, message: String, extra: Value, exception: Option<ExceptionInfo>) {
        let record = record::build(self.identity(), level, message, extra, exception);
        metrics::record_emitted(level);

        if let Err(e) = self.sink.emit(&record) {
            sink::report_failure(self.sink.name(), &record, &e);
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("channel", &self.channel)
            .field("app_name", &self.app_name)
            .field("tag_name", &self.tag_name)
            .field("correlation_id", &self.correlation_id)
            .field("sink", &self.sink.name())
            .finish()
    }
}
