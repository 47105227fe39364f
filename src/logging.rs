//! Logging configuration with optional file rotation
//!
//! The library only emits `tracing` events; binaries and applications decide
//! where they go by calling [`init_logging`] once at startup.

use crate::error::{Result, SensorError};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level used when `RUST_LOG` is not set
    pub level: Level,

    /// Log to a daily-rotated file
    pub file_path: Option<PathBuf>,

    /// Log to stderr
    pub stderr: bool,

    /// Emit JSON lines instead of human-readable text
    pub json: bool,

    /// Include thread IDs
    pub thread_ids: bool,

    /// Directives applied on top of `RUST_LOG`
    pub directives: Vec<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            file_path: None,
            stderr: true,
            json: false,
            thread_ids: false,
            directives: Vec::new(),
        }
    }
}

impl LogConfig {
    /// Create config from environment
    ///
    /// Reads `RUST_LOG`, `SENSOR_LOG_FILE`, `SENSOR_LOG_STDERR` and `SENSOR_LOG_JSON`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            config.level = level_hint(&rust_log).unwrap_or(config.level);
        }

        if let Ok(log_file) = std::env::var("SENSOR_LOG_FILE") {
            config.file_path = Some(PathBuf::from(log_file));
        }

        if let Ok(log_stderr) = std::env::var("SENSOR_LOG_STDERR") {
            config.stderr = log_stderr.to_lowercase() != "false";
        }

        if let Ok(json) = std::env::var("SENSOR_LOG_JSON") {
            config.json = matches!(json.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        config
    }

    /// Same config with a different default level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Add a filter directive that takes precedence over `RUST_LOG`
    pub fn with_directive<S: Into<String>>(mut self, directive: S) -> Self {
        self.directives.push(directive.into());
        self
    }
}

/// Most verbose level mentioned in a `RUST_LOG` directive
fn level_hint(directive: &str) -> Option<Level> {
    let directive = directive.to_lowercase();
    [
        ("trace", Level::TRACE),
        ("debug", Level::DEBUG),
        ("info", Level::INFO),
        ("warn", Level::WARN),
        ("error", Level::ERROR),
    ]
    .into_iter()
    .find(|(name, _)| directive.contains(name))
    .map(|(_, level)| level)
}

fn output_layer<W>(writer: W, ansi: bool, config: &LogConfig) -> BoxedLayer
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    if config.json {
        fmt::layer()
            .json()
            .with_writer(writer)
            .with_thread_ids(config.thread_ids)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(true)
            .with_thread_ids(config.thread_ids)
            .boxed()
    }
}

fn build_filter(config: &LogConfig) -> Result<EnvFilter> {
    config.directives.iter().try_fold(
        EnvFilter::builder()
            .with_default_directive(config.level.into())
            .from_env_lossy(),
        |filter, directive| {
            let directive = directive.parse().map_err(|e| {
                SensorError::configuration(format!("Invalid log directive '{directive}': {e}"))
            })?;
            Ok(filter.add_directive(directive))
        },
    )
}

/// Install the global subscriber described by `config`
pub fn init_logging(config: LogConfig) -> Result<()> {
    let env_filter = build_filter(&config)?;

    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.stderr {
        layers.push(output_layer(std::io::stderr, true, &config));
    }

    if let Some(file_path) = &config.file_path {
        let directory = file_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        std::fs::create_dir_all(directory)?;

        let file_appender = tracing_appender::rolling::daily(
            directory,
            file_path
                .file_name()
                .unwrap_or_else(|| std::ffi::OsStr::new("sensor-rtdb.log")),
        );
        layers.push(output_layer(file_appender, false, &config));
    }

    let subscriber = tracing_subscriber::registry().with(layers).with(env_filter);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| SensorError::configuration(format!("Failed to install logger: {e}")))
}
