//! Flexible Logging System.
//!
//! This module provides a configurable logging setup for applets using
//! this crate, built upon the `tracing` ecosystem. It supports console
//! output and optional file logging with configurable formats.
//!
//! The settings store itself only *emits* through `tracing` (its
//! "log and continue" initialization policy reports through
//! `tracing::error!`); installing a subscriber is the embedding
//! applet's choice, typically via [`init_logging`] at startup or
//! [`init_minimal_logging`] in tests.

use crate::error::{CoreError, LoggingError};
use crate::utils; // For utils::fs::ensure_dir_exists

use once_cell::sync::Lazy;
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Configuration for the logging subsystem.
///
/// Defines the minimum log level, an optional log file path, and the log
/// format. Used by [`init_logging`] to install the global subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// The minimum log level to record.
    /// Valid values (case-insensitive): "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Optional path to a file where logs should be written.
    /// If `None`, file logging is disabled.
    pub file_path: Option<PathBuf>,
    /// The format for log messages: "text" or "json".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            format: "text".to_string(),
        }
    }
}

/// Initializes a minimal logging setup, directing messages to `stderr`.
///
/// This function is intended for use in tests, early applet startup before
/// full configuration is loaded, or as a fallback if detailed logging
/// initialization fails. It filters messages based on the `RUST_LOG`
/// environment variable, defaulting to "info" level if `RUST_LOG` is not
/// set or is invalid. Errors during initialization (e.g., if a global
/// logger is already set) are ignored.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // Direct to stderr
        .with_ansi(atty::is(atty::Stream::Stderr)) // Colors if stderr is a TTY
        .try_init(); // Ignore error if already initialized
}

/// Creates a file logging layer.
///
/// Ensures the parent directory for the log file exists, sets up a daily
/// rolling file appender, and configures the log format (text or JSON).
///
/// # Arguments
///
/// * `log_path`: Path to the log file.
/// * `format`: Logging format ("text" or "json").
///
/// # Returns
///
/// A tuple containing the boxed `Layer` for file logging and its
/// `WorkerGuard`, or `CoreError` on failure.
fn create_file_layer(
    log_path: &Path,
    format: &str,
) -> Result<(Box<dyn Layer<Registry> + Send + Sync + 'static>, WorkerGuard), CoreError> {
    // Ensure parent directory exists
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            utils::fs::ensure_dir_exists(parent)?;
        }
    }

    let file_appender = tracing_appender::rolling::daily(
        log_path.parent().unwrap_or_else(|| Path::new(".")),
        log_path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("applet-settings.log")),
    );

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    match format.to_lowercase().as_str() {
        "json" => {
            let layer = fmt::layer()
                .json()
                .with_writer(non_blocking_writer)
                .with_ansi(false); // No ANSI colors in files
            Ok((Box::new(layer), guard))
        }
        _ => {
            // Default to text format
            let layer = fmt::layer()
                .with_writer(non_blocking_writer)
                .with_ansi(false); // No ANSI colors in files
            Ok((Box::new(layer), guard))
        }
    }
}

/// Global static to hold the WorkerGuard for the file logger.
/// This ensures that the guard is kept alive for the duration of the
/// application, allowing logs to be flushed properly.
static LOG_WORKER_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// Initializes the global logging system based on the provided [`LoggingConfig`].
///
/// Configures and sets the global `tracing` subscriber with a console layer
/// and an optional file logging layer.
///
/// # Arguments
///
/// * `config`: A reference to the [`LoggingConfig`].
/// * `is_reload`: If `true`, re-initialization attempts are tolerated and
///   reported at debug level; if `false`, an error is returned when a
///   logger is already set.
///
/// # Errors
///
/// Returns [`CoreError::Logging`] if the configured level is invalid or
/// setting the global subscriber fails on an initial setup.
pub fn init_logging(config: &LoggingConfig, is_reload: bool) -> Result<(), CoreError> {
    let level_filter_str = match config.level.to_lowercase().as_str() {
        "trace" => Level::TRACE.to_string(),
        "debug" => Level::DEBUG.to_string(),
        "info" => Level::INFO.to_string(),
        "warn" => Level::WARN.to_string(),
        "error" => Level::ERROR.to_string(),
        invalid_level => {
            return Err(CoreError::Logging(LoggingError::InitializationFailure(
                format!("Invalid log level in config: {}", invalid_level),
            )));
        }
    };

    // Stdout Layer
    let stdout_filter = EnvFilter::new(level_filter_str.clone());
    let stdout_layer = match config.format.to_lowercase().as_str() {
        "json" => fmt::layer()
            .json()
            .with_writer(stdout)
            .with_ansi(false) // No ANSI for JSON output to stdout
            .with_filter(stdout_filter)
            .boxed(),
        _ => fmt::layer() // Default to text
            .with_writer(stdout)
            .with_ansi(atty::is(atty::Stream::Stdout)) // ANSI if TTY for text
            .with_filter(stdout_filter)
            .boxed(),
    };

    // File Layer (Optional)
    let mut new_file_guard: Option<WorkerGuard> = None;
    let file_layer_opt: Option<Box<dyn Layer<Registry> + Send + Sync + 'static>> =
        if let Some(log_path) = &config.file_path {
            let file_filter = EnvFilter::new(level_filter_str);
            let (base_file_layer, guard) = create_file_layer(log_path, &config.format)?;
            new_file_guard = Some(guard);
            Some(base_file_layer.with_filter(file_filter).boxed())
        } else {
            None
        };

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync + 'static>> = Vec::new();
    layers.push(stdout_layer);
    if let Some(file_layer) = file_layer_opt {
        layers.push(file_layer);
    }

    let result = Registry::default().with(layers).try_init();

    // Store the new worker guard, dropping the old one (flushing its logs).
    if new_file_guard.is_some() || config.file_path.is_none() {
        match LOG_WORKER_GUARD.lock() {
            Ok(mut guard_slot) => {
                *guard_slot = new_file_guard;
            }
            Err(e) => {
                // Fallback to eprintln since tracing may not be working here.
                eprintln!(
                    "[ERROR] Failed to lock LOG_WORKER_GUARD to update: {}. Log flushing may be affected.",
                    e
                );
            }
        }
    }

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            if !is_reload {
                Err(CoreError::Logging(LoggingError::InitializationFailure(
                    format!(
                        "Failed to set global tracing subscriber. Was it already initialized? Error: {}",
                        e
                    ),
                )))
            } else {
                tracing::debug!("Logging re-initialization skipped, a subscriber is already set: {}", e);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.file_path, None);
        assert_eq!(config.format, "text");
    }

    #[test]
    fn test_init_logging_rejects_invalid_level() {
        let config = LoggingConfig {
            level: "superlog".to_string(),
            file_path: None,
            format: "text".to_string(),
        };
        let result = init_logging(&config, false);
        assert!(matches!(
            result,
            Err(CoreError::Logging(LoggingError::InitializationFailure(_)))
        ));
        if let Err(CoreError::Logging(LoggingError::InitializationFailure(msg))) = result {
            assert!(msg.contains("superlog"));
        }
    }

    #[test]
    fn test_init_logging_reload_tolerates_existing_subscriber() {
        // First install wins (or a subscriber from another test already
        // exists); the reload path must not report an error either way.
        init_minimal_logging();
        let config = LoggingConfig::default();
        let result = init_logging(&config, true);
        assert!(result.is_ok(), "reload init_logging failed: {:?}", result.err());
    }

    #[test]
    fn test_init_minimal_logging_is_idempotent() {
        init_minimal_logging();
        init_minimal_logging(); // Second call must not panic.
    }
}
