//! Layered configuration resolution.
//!
//! Each key resolves from the first layer that has a non-empty value:
//! explicit override, process environment, config file, hard default.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::{AppConfig, Channel, LoggerConfig, DEFAULT_PORT};

pub const KEY_CHANNEL: &str = "CHANNEL";
pub const KEY_APP_NAME: &str = "APPNAME";
pub const KEY_TAG_NAME: &str = "TAGNAME";
pub const KEY_HOST: &str = "HOST";
pub const KEY_PORT: &str = "PORT";
pub const KEY_LOG_LEVEL: &str = "LOG_LEVEL";
pub const KEY_METRICS_ADDRESS: &str = "METRICS_ADDRESS";

/// Default config file, looked up in the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Values supplied explicitly by the caller (CLI flags, middleware setup).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub channel: Option<String>,
    pub app_name: Option<String>,
    pub tag_name: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub metrics_address: Option<String>,
}

/// Source of environment variables.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Key/value entries read from a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    values: HashMap<String, String>,
}

impl EnvFile {
    /// Parse `.env` content: `KEY=VALUE` lines, `#` comments and blank
    /// lines skipped, split at the first `=`, surrounding quotes removed.
    pub fn parse(content: &str) -> Self {
        let values = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| {
                let value = value.trim().trim_matches(&['"', '\''][..]);
                (key.trim().to_string(), value.to_string())
            })
            .collect();
        Self { values }
    }

    /// Parse a flat TOML table. Keys are upper-cased; scalar values are
    /// kept as strings and nested tables or arrays are ignored.
    pub fn parse_toml(content: &str) -> Result<Self, toml::de::Error> {
        let table: toml::Table = toml::from_str(content)?;
        let values = table
            .into_iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    toml::Value::String(s) => s,
                    toml::Value::Integer(i) => i.to_string(),
                    toml::Value::Float(f) => f.to_string(),
                    toml::Value::Boolean(b) => b.to_string(),
                    _ => return None,
                };
                Some((key.to_ascii_uppercase(), value))
            })
            .collect();
        Ok(Self { values })
    }

    /// Read a config file. Paths ending in `.toml` are parsed as TOML,
    /// everything else as `.env`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if path.extension().is_some_and(|ext| ext == "toml") {
            Self::parse_toml(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
        } else {
            Ok(Self::parse(&content))
        }
    }

    /// Non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// The three non-default layers, highest precedence first.
struct Layers<'a> {
    overrides: &'a ConfigOverrides,
    env: &'a dyn EnvSource,
    file: &'a EnvFile,
}

impl Layers<'_> {
    fn string(&self, explicit: Option<&str>, key: &str) -> Option<String> {
        explicit
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .or_else(|| self.env.var(key).filter(|value| !value.is_empty()))
            .or_else(|| self.file.get(key).map(str::to_string))
    }

    fn port(&self) -> Option<u16> {
        self.overrides
            .port
            .or_else(|| self.env.var(KEY_PORT).and_then(|v| v.trim().parse().ok()))
            .or_else(|| self.file.get(KEY_PORT).and_then(|v| v.trim().parse().ok()))
    }
}

/// Resolve the full configuration from explicit values, an environment and
/// file entries.
pub fn resolve(overrides: &ConfigOverrides, env: &dyn EnvSource, file: &EnvFile) -> AppConfig {
    let layers = Layers {
        overrides,
        env,
        file,
    };
    let mut config = AppConfig {
        logger: resolve_logger(overrides, env, file),
        ..AppConfig::default()
    };

    if let Some(host) = layers.string(overrides.host.as_deref(), KEY_HOST) {
        config.server.host = host;
    }
    config.server.port = layers.port().unwrap_or(DEFAULT_PORT);

    if let Some(level) = layers.string(overrides.log_level.as_deref(), KEY_LOG_LEVEL) {
        config.observability.log_level = level;
    }
    config.observability.metrics_address =
        layers.string(overrides.metrics_address.as_deref(), KEY_METRICS_ADDRESS);

    config
}

/// Resolve only the logger identity.
pub fn resolve_logger(
    overrides: &ConfigOverrides,
    env: &dyn EnvSource,
    file: &EnvFile,
) -> LoggerConfig {
    let layers = Layers {
        overrides,
        env,
        file,
    };
    let defaults = LoggerConfig::default();

    let channel = layers
        .string(overrides.channel.as_deref(), KEY_CHANNEL)
        .map(|value| Channel::parse_or_default(&value))
        .unwrap_or_default();

    LoggerConfig {
        channel,
        app_name: layers
            .string(overrides.app_name.as_deref(), KEY_APP_NAME)
            .unwrap_or(defaults.app_name),
        tag_name: layers
            .string(overrides.tag_name.as_deref(), KEY_TAG_NAME)
            .unwrap_or(defaults.tag_name),
    }
}

/// Load configuration from the process environment and the file at
/// `path`.
///
/// A missing or unreadable file is not fatal: the configuration resolves
/// from the remaining layers and the file error is handed back so it can be
/// reported once diagnostics are initialized.
pub fn load_config(path: &Path, overrides: &ConfigOverrides) -> (AppConfig, Option<ConfigError>) {
    load_config_with(path, overrides, &ProcessEnv)
}

/// [`load_config`] against an explicit environment.
pub fn load_config_with(
    path: &Path,
    overrides: &ConfigOverrides,
    env: &dyn EnvSource,
) -> (AppConfig, Option<ConfigError>) {
    let (file, error) = match EnvFile::load(path) {
        Ok(file) => (file, None),
        Err(e) => (EnvFile::default(), Some(e)),
    };
    (resolve(overrides, env, &file), error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_env_file() {
        let file = EnvFile::parse(
            r#"
# identity
CHANNEL=production
APPNAME = "billing"
TAGNAME='v1.2'
BROKEN LINE
URL=http://example.com/?a=b
EMPTY=
"#,
        );

        assert_eq!(file.get("CHANNEL"), Some("production"));
        assert_eq!(file.get("APPNAME"), Some("billing"));
        assert_eq!(file.get("TAGNAME"), Some("v1.2"));
        assert_eq!(file.get("URL"), Some("http://example.com/?a=b"));
        assert_eq!(file.get("EMPTY"), None);
        assert_eq!(file.get("BROKEN LINE"), None);
    }

    #[test]
    fn test_parse_toml_file() {
        let file = EnvFile::parse_toml(
            r#"
channel = "production"
PORT = 9000
verbose = true

[nested]
ignored = "yes"
"#,
        )
        .unwrap();

        assert_eq!(file.get("CHANNEL"), Some("production"));
        assert_eq!(file.get("PORT"), Some("9000"));
        assert_eq!(file.get("VERBOSE"), Some("true"));
        assert_eq!(file.get("NESTED"), None);
    }

    #[test]
    fn test_defaults_when_everything_empty() {
        let config = resolve(&ConfigOverrides::default(), &env(&[]), &EnvFile::default());
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_precedence_explicit_env_file() {
        let file = EnvFile::parse("APPNAME=from-file\nTAGNAME=file-tag\nHOST=10.0.0.1\nCHANNEL=production");
        let env = env(&[("APPNAME", "from-env"), ("TAGNAME", "env-tag")]);
        let overrides = ConfigOverrides {
            app_name: Some("explicit".into()),
            ..Default::default()
        };

        let config = resolve(&overrides, &env, &file);
        assert_eq!(config.logger.app_name, "explicit");
        assert_eq!(config.logger.tag_name, "env-tag");
        assert_eq!(config.logger.channel, Channel::Production);
        assert_eq!(config.server.host, "10.0.0.1");
    }

    #[test]
    fn test_empty_values_fall_through() {
        let file = EnvFile::parse("APPNAME=from-file");
        let env = env(&[("APPNAME", "")]);
        let overrides = ConfigOverrides {
            app_name: Some(String::new()),
            ..Default::default()
        };

        let config = resolve(&overrides, &env, &file);
        assert_eq!(config.logger.app_name, "from-file");
    }

    #[test]
    fn test_invalid_channel_normalized() {
        let config = resolve(
            &ConfigOverrides::default(),
            &env(&[("CHANNEL", "staging")]),
            &EnvFile::parse("CHANNEL=production"),
        );
        assert_eq!(config.logger.channel, Channel::Development);
    }

    #[test]
    fn test_unparsable_port_falls_through() {
        let config = resolve(
            &ConfigOverrides::default(),
            &env(&[("PORT", "eighty")]),
            &EnvFile::parse("PORT=9090"),
        );
        assert_eq!(config.server.port, 9090);

        let config = resolve(
            &ConfigOverrides::default(),
            &env(&[("PORT", "70000")]),
            &EnvFile::default(),
        );
        assert_eq!(config.server.port, DEFAULT_PORT);
    }

    #[test]
    fn test_observability_keys() {
        let config = resolve(
            &ConfigOverrides::default(),
            &env(&[("LOG_LEVEL", "debug"), ("METRICS_ADDRESS", "127.0.0.1:9100")]),
            &EnvFile::default(),
        );
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(
            config.observability.metrics_address.as_deref(),
            Some("127.0.0.1:9100")
        );
    }

    #[test]
    fn test_load_missing_file_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(".env");

        assert!(matches!(EnvFile::load(&missing), Err(ConfigError::Io { .. })));

        let (config, error) = load_config_with(
            &missing,
            &ConfigOverrides::default(),
            &env(&[("APPNAME", "env-only")]),
        );
        assert!(matches!(error, Some(ConfigError::Io { .. })));
        assert_eq!(config.logger.app_name, "env-only");
        assert_eq!(config.logger.tag_name, "latest");
    }

    #[test]
    fn test_toml_file_with_unknown_channel_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logger.toml");
        fs::write(&path, "channel = \"staging\"\nappname = \"toml-app\"\n").unwrap();

        let (config, error) = load_config_with(&path, &ConfigOverrides::default(), &env(&[]));
        assert!(error.is_none());
        assert_eq!(config.logger.channel, Channel::Development);
        assert_eq!(config.logger.app_name, "toml-app");
    }

    #[test]
    fn test_load_from_disk() {
        let mut env_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(env_file, "APPNAME=disk-app").unwrap();
        let file = EnvFile::load(env_file.path()).unwrap();
        assert_eq!(file.get("APPNAME"), Some("disk-app"));

        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("logger.toml");
        fs::write(&toml_path, "tagname = \"rc-1\"\n").unwrap();
        let file = EnvFile::load(&toml_path).unwrap();
        assert_eq!(file.get("TAGNAME"), Some("rc-1"));

        fs::write(&toml_path, "this is = = not toml").unwrap();
        assert!(matches!(EnvFile::load(&toml_path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_config_applies_overrides_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "CHANNEL=production\nAPPNAME=file-app\n").unwrap();

        let overrides = ConfigOverrides {
            channel: Some("development".into()),
            app_name: Some("cli-app".into()),
            port: Some(7000),
            ..Default::default()
        };
        let (config, error) = load_config(&path, &overrides);
        assert!(error.is_none());
        assert_eq!(config.logger.channel, Channel::Development);
        assert_eq!(config.logger.app_name, "cli-app");
        assert_eq!(config.server.port, 7000);
    }
}
