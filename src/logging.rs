//! Logging setup
//!
//! Installs the global `tracing` subscriber: an `EnvFilter` (`RUST_LOG`
//! wins over the configured directives), a console layer in plain or JSON
//! form, and an optional daily-rolling file sink.

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

fn default_filter() -> String {
    "info".to_string()
}

fn default_file_prefix() -> String {
    "authz.log".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,

    /// Directory for the rolling log file (no file sink if unset)
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// File name prefix inside `directory`
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Also write logs to a daily-rolling file under `directory`
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }
}

/// Parse filter directives
pub fn parse_filter(directives: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_new(directives)
        .with_context(|| format!("Invalid log filter directives: {}", directives))
}

/// Install the global subscriber
///
/// Returns the file writer guard when a file sink is configured; logs
/// buffered for the file are flushed when it is dropped, so keep it alive
/// for the life of the process.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => parse_filter(&config.filter)?,
    };

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if config.json {
        layers.push(fmt::layer().json().with_target(true).boxed());
    } else {
        layers.push(fmt::layer().with_target(true).compact().boxed());
    }

    let mut guard = None;
    if let Some(directory) = &config.directory {
        std::fs::create_dir_all(directory).with_context(|| {
            format!("Failed to create log directory {}", directory.display())
        })?;

        let appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        layers.push(fmt::layer().with_writer(writer).with_ansi(false).boxed());
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(
        "[Logging] Initialized (json={}, file={})",
        config.json,
        config.directory.is_some()
    );

    Ok(guard)
}
