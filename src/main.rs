//! correlation-logger
//!
//! Structured JSON logger with per-request correlation tracking.
//!
//! # Architecture Overview
//!
//! ```text
//!    Client Request
//!    ──────────────▶ correlation middleware ──▶ handler
//!                      │  inherit/generate id      │ RequestLogger
//!                      │  bind Logger              │ CorrelationId
//!                      ▼                           ▼
//!                   Logger ──▶ record builder ──▶ fan-out sink
//!                                                  ├─▶ stdout (JSON lines)
//!                                                  └─▶ tracing (stderr)
//!
//!    config: CLI flags > environment > .env file > defaults
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::net::TcpListener;

use correlation_logger::config::loader::DEFAULT_ENV_FILE;
use correlation_logger::config::{self, ConfigOverrides, ConfigWatcher};
use correlation_logger::http::HttpServer;
use correlation_logger::lifecycle::signals;
use correlation_logger::logging::{Level, Logger, LoggerFactory};
use correlation_logger::observability;
use correlation_logger::Shutdown;

#[derive(Parser)]
#[command(name = "correlation-logger")]
#[command(about = "Structured JSON logger with request correlation", long_about = None)]
struct Cli {
    /// Config file (.env style, or TOML when it ends in .toml).
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// production or development.
    #[arg(long)]
    channel: Option<String>,

    #[arg(long)]
    app_name: Option<String>,

    #[arg(long)]
    tag_name: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the demo HTTP server with the correlation middleware
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        /// Reload the logger identity when the config file changes
        #[arg(long)]
        watch: bool,
    },
    /// Emit one sample record per severity level
    Demo {
        /// Emit only this level
        #[arg(long)]
        level: Option<Level>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
        watch: false,
    });

    let mut overrides = ConfigOverrides {
        channel: cli.channel,
        app_name: cli.app_name,
        tag_name: cli.tag_name,
        ..Default::default()
    };
    if let Command::Serve { host, port, .. } = &command {
        overrides.host = host.clone();
        overrides.port = *port;
    }

    // Resolve before the subscriber exists; report file problems after.
    let (config, file_error) = config::load_config(&cli.env_file, &overrides);

    observability::logging::init(&config.observability);
    if let Some(e) = file_error {
        tracing::warn!(error = %e, "Config file unavailable, using environment and defaults");
    }

    tracing::info!(
        channel = %config.logger.channel,
        app_name = %config.logger.app_name,
        tag_name = %config.logger.tag_name,
        "Configuration loaded"
    );

    if let Some(metrics_address) = &config.observability.metrics_address {
        match metrics_address.parse::<SocketAddr>() {
            Ok(addr) => observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let factory = LoggerFactory::standard(config.logger.clone());

    match command {
        Command::Demo { level } => {
            let logger = factory.logger();
            match level {
                Some(level) => logger.log(level, format!("{} message", level.name().to_lowercase()), ()),
                None => emit_samples(&logger),
            }
        }
        Command::Serve { watch, .. } => {
            let _watcher = if watch {
                let watcher = ConfigWatcher::new(&cli.env_file, overrides.clone(), factory.clone());
                match watcher.run() {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        tracing::error!(error = %e, "Config watcher unavailable");
                        None
                    }
                }
            } else {
                None
            };

            let listener = TcpListener::bind(config.server.bind_address()).await?;
            let local_addr = listener.local_addr()?;
            tracing::info!(address = %local_addr, "Listening for connections");

            let shutdown = Shutdown::new();
            let server_shutdown = shutdown.subscribe();
            let signal_shutdown = shutdown.clone();
            tokio::spawn(async move {
                signals::shutdown_on_ctrl_c(&signal_shutdown).await;
            });

            HttpServer::new(factory).run(listener, server_shutdown).await?;
            tracing::info!("Shutdown complete");
        }
    }

    Ok(())
}

/// One record per severity, weights and syslog priorities in the extra.
fn emit_samples(logger: &Logger) {
    logger.debug("Debug message", "Level 100, Priority 0, Severity 0");
    logger.info("Info message", json!({ "addInfo": "Level 200, Priority 8, Severity 1" }));
    logger.notice("Notice message", json!({ "addInfo": "Level 250, Priority 16, Severity 2" }));
    logger.warning("Warning message", "Level 300, Priority 24, Severity 3");
    logger.error("Error message", json!({ "addInfo": "Level 400, Priority 32, Severity 4" }));
    logger.critical("Critical message", json!({ "addInfo": "Level 500, Priority 40, Severity 5" }));
    logger.alert("Alert message", "Level 550, Priority 48, Severity 6");
    logger.emergency("Emergency message", json!({ "addInfo": "Level 600, Priority 56, Severity 7" }));
}
