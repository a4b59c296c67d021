//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! CLI flags (explicit overrides)
//!     + process environment
//!     + .env / .toml file (loader.rs)
//!     + hard defaults (schema.rs)
//!     → AppConfig (resolved once at startup, immutable)
//!     → LoggerConfig handed to the LoggerFactory
//!
//! On file change (optional):
//!     watcher.rs detects change
//!     → loader.rs re-resolves the logger identity
//!     → atomic swap inside the LoggerFactory
//! ```
//!
//! # Design Decisions
//! - Empty values count as absent at every layer
//! - Invalid channels are normalized, never rejected
//! - A missing config file is a warning, not an error

pub mod loader;
pub mod schema;
pub mod watcher;

pub use loader::{load_config, load_config_with, resolve, ConfigError, ConfigOverrides, EnvFile, EnvSource, ProcessEnv};
pub use schema::{AppConfig, Channel, LoggerConfig, ObservabilityConfig, ServerConfig};
pub use watcher::ConfigWatcher;
