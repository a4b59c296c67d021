//! Log record model and builder.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logging::correlation;
use crate::logging::level::Level;

/// Call-site information attached to Error-and-above records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    pub message: String,

    /// `file:line` of the code that emitted the record.
    #[serde(rename = "file")]
    pub location: String,
}

impl ExceptionInfo {
    pub fn new(message: impl Into<String>, location: &std::panic::Location<'_>) -> Self {
        Self {
            message: message.into(),
            location: format!("{}:{}", location.file(), location.line()),
        }
    }
}

/// Correlation context embedded by value in every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordContext {
    pub correlation_id: String,

    /// Unique per emission, unlike `correlation_id`.
    pub request_id: String,

    pub app_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionInfo>,
}

/// One canonical log entry, serialized as a single JSON line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub message: String,
    pub context: RecordContext,
    pub level: u16,
    pub level_name: String,
    pub channel: String,
    pub datetime: String,
    pub extra: Value,
}

impl LogRecord {
    /// Severity of this record, if `level` is a known weight.
    pub fn severity(&self) -> Option<Level> {
        Level::from_weight(self.level)
    }
}

/// Identity fields a logger contributes to each record.
#[derive(Debug, Clone, Copy)]
pub struct Identity<'a> {
    pub channel: &'a str,
    pub app_name: &'a str,
    pub tag_name: &'a str,
    pub correlation_id: &'a str,
}

/// Build a record stamped with the current time and a fresh request id.
pub fn build(
    identity: Identity<'_>,
    level: Level,
    message: impl Into<String>,
    extra: Value,
    exception: Option<ExceptionInfo>,
) -> LogRecord {
    build_at(identity, level, message, extra, exception, Utc::now())
}

/// Same as [`build`] with an explicit timestamp.
pub fn build_at(
    identity: Identity<'_>,
    level: Level,
    message: impl Into<String>,
    extra: Value,
    exception: Option<ExceptionInfo>,
    now: DateTime<Utc>,
) -> LogRecord {
    let tag_name = (!identity.tag_name.is_empty()).then(|| identity.tag_name.to_string());

    LogRecord {
        message: message.into(),
        context: RecordContext {
            correlation_id: identity.correlation_id.to_string(),
            request_id: correlation::generate_id(),
            app_name: identity.app_name.to_string(),
            tag_name,
            exception,
        },
        level: level.weight(),
        level_name: level.name().to_string(),
        channel: identity.channel.to_string(),
        datetime: format_datetime(now),
        extra,
    }
}

/// ISO-8601 UTC with exactly three fractional digits and a `Z` suffix.
/// Sub-millisecond precision is truncated, never rounded.
pub fn format_datetime(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}
