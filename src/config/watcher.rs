//! Config file watcher for hot reload of the logger identity.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::loader::{resolve_logger, ConfigOverrides, EnvFile, EnvSource, ProcessEnv};
use crate::logging::LoggerFactory;

/// Watches the config file and swaps a re-resolved identity into a
/// [`LoggerFactory`] when it changes.
///
/// Explicit overrides keep their precedence across reloads. A file that
/// fails to load leaves the current identity in place.
#[derive(Clone)]
pub struct ConfigWatcher {
    path: PathBuf,
    overrides: ConfigOverrides,
    env: Arc<dyn EnvSource + Send + Sync>,
    factory: LoggerFactory,
}

impl ConfigWatcher {
    pub fn new(path: &Path, overrides: ConfigOverrides, factory: LoggerFactory) -> Self {
        Self {
            path: path.to_path_buf(),
            overrides,
            env: Arc::new(ProcessEnv),
            factory,
        }
    }

    /// Resolve reloads against `env` instead of the process environment.
    pub fn with_env(mut self, env: impl EnvSource + Send + Sync + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Re-read the file and update the factory. Returns whether the
    /// identity was replaced.
    pub fn reload(&self) -> bool {
        match EnvFile::load(&self.path) {
            Ok(file) => {
                let identity = resolve_logger(&self.overrides, &*self.env, &file);
                tracing::info!(
                    channel = %identity.channel,
                    app_name = %identity.app_name,
                    tag_name = %identity.tag_name,
                    "Logger identity reloaded"
                );
                self.factory.replace_identity(identity);
                true
            }
            Err(e) => {
                tracing::error!("Failed to reload config: {}. Keeping current identity.", e);
                false
            }
        }
    }

    /// Start watching the file in a background thread. The returned watcher
    /// must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();
        let this = self.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, reloading...");
                        this.reload();
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}
