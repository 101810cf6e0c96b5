//! Tracing setup for the shell.
//!
//! Logs go to stderr and, when `log_dir` is set, to a rolling file written
//! by a background worker. Stdout is left to command output.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{self, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

pub use tracing::{debug, error, info, instrument, trace, warn};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// The `[log]` section of the shell config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive, e.g. `warn` or `tfs_core=debug`. `RUST_LOG` wins
    /// when set.
    #[serde(default = "default_level")]
    pub level: String,

    /// Write rolling log files here; no file output when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    #[serde(default = "default_prefix")]
    pub file_prefix: String,

    /// `hourly`, `daily` or `never`.
    #[serde(default = "default_rotation")]
    pub rotation: String,

    #[serde(default)]
    pub json_format: bool,

    /// Mirror logs to stderr.
    #[serde(default = "default_console")]
    pub console_output: bool,
}

fn default_level() -> String {
    "warn".into()
}

fn default_prefix() -> String {
    "tfs".into()
}

fn default_rotation() -> String {
    "daily".into()
}

fn default_console() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_level(),
            log_dir: None,
            file_prefix: default_prefix(),
            rotation: default_rotation(),
            json_format: false,
            console_output: default_console(),
        }
    }
}

impl LogConfig {
    /// Same config with a different filter directive.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    fn rotation(&self) -> Rotation {
        match self.rotation.as_str() {
            "hourly" => Rotation::HOURLY,
            "never" => Rotation::NEVER,
            _ => Rotation::DAILY,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("cannot open log directory: {0}")]
    Appender(#[from] rolling::InitError),

    #[error("logging already initialized: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

fn console_layer(config: &LogConfig) -> Option<BoxedLayer> {
    if !config.console_output {
        return None;
    }
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    Some(if config.json_format {
        layer.json().boxed()
    } else {
        layer.boxed()
    })
}

fn file_writer(config: &LogConfig) -> Result<Option<(NonBlocking, WorkerGuard)>, LoggingError> {
    let Some(dir) = &config.log_dir else {
        return Ok(None);
    };
    let appender = RollingFileAppender::builder()
        .rotation(config.rotation())
        .filename_prefix(&config.file_prefix)
        .filename_suffix("log")
        .build(dir)?;
    Ok(Some(tracing_appender::non_blocking(appender)))
}

/// Install the global subscriber. Call once; keep the returned guard alive
/// until exit so buffered file output is flushed.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let (file_layer, guard) = match file_writer(config)? {
        Some((writer, guard)) => {
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            let layer: BoxedLayer = if config.json_format {
                layer.json().boxed()
            } else {
                layer.boxed()
            };
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let layers: Vec<BoxedLayer> = console_layer(config).into_iter().chain(file_layer).collect();
    tracing_subscriber::registry()
        .with(layers)
        .with(config.filter())
        .try_init()?;
    Ok(guard)
}
