//! Logger construction from a shared identity snapshot.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::schema::LoggerConfig;
use crate::logging::logger::Logger;
use crate::logging::sink::{FanoutSink, Sink};

/// Builds loggers that share one sink and one identity snapshot.
///
/// The identity is resolved once when the factory is created. It only
/// changes through [`LoggerFactory::replace_identity`], which the config
/// watcher calls after a successful reload.
#[derive(Clone)]
pub struct LoggerFactory {
    identity: Arc<ArcSwap<LoggerConfig>>,
    sink: Arc<dyn Sink>,
}

impl LoggerFactory {
    pub fn new(config: LoggerConfig, sink: Arc<dyn Sink>) -> Self {
        Self {
            identity: Arc::new(ArcSwap::from_pointee(config)),
            sink,
        }
    }

    /// Factory writing JSON lines to stdout and mirroring into `tracing`.
    pub fn standard(config: LoggerConfig) -> Self {
        Self::new(config, Arc::new(FanoutSink::standard()))
    }

    /// Current identity snapshot.
    pub fn identity(&self) -> Arc<LoggerConfig> {
        self.identity.load_full()
    }

    /// Swap in a new identity for loggers created from now on.
    pub fn replace_identity(&self, config: LoggerConfig) {
        self.identity.store(Arc::new(config));
    }

    pub fn sink(&self) -> Arc<dyn Sink> {
        self.sink.clone()
    }

    /// A default logger with its own fresh correlation id.
    pub fn logger(&self) -> Logger {
        Logger::new(&self.identity.load(), self.sink.clone())
    }

    /// A logger bound to an existing correlation id.
    pub fn logger_for(&self, correlation_id: impl Into<String>) -> Logger {
        let mut logger = self.logger();
        logger.set_correlation_id(correlation_id);
        logger
    }
}
