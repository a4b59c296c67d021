//! Configuration schema definitions.
//!
//! Every field has a hard default so an empty environment still yields a
//! usable configuration.

use std::fmt;

pub const DEFAULT_APP_NAME: &str = "logger";
pub const DEFAULT_TAG_NAME: &str = "latest";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Root configuration for the logger and the demo server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppConfig {
    /// Identity stamped on every record.
    pub logger: LoggerConfig,

    /// Demo HTTP server settings.
    pub server: ServerConfig,

    /// Diagnostics and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Deployment environment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Channel {
    Production,
    #[default]
    Development,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Production => "production",
            Channel::Development => "development",
        }
    }

    /// Parse a channel label. Anything other than `production` or
    /// `development` becomes the default channel.
    pub fn parse_or_default(value: &str) -> Channel {
        match value {
            "production" => Channel::Production,
            "development" => Channel::Development,
            _ => Channel::default(),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity attached to every record a logger emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub channel: Channel,
    pub app_name: String,
    pub tag_name: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            channel: Channel::default(),
            app_name: DEFAULT_APP_NAME.to_string(),
            tag_name: DEFAULT_TAG_NAME.to_string(),
        }
    }
}

/// Demo server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Filter directive for diagnostics (trace, debug, info, warn, error).
    pub log_level: String,

    /// Prometheus exporter bind address. Disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            metrics_address: None,
        }
    }
}
