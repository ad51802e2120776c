//! Error handling for the applet-settings crate.
//!
//! This module provides error types and utilities for error handling
//! throughout the library. It defines a set of error types using the
//! `thiserror` crate for ergonomic error definition and handling.
//!
//! The main error type for this crate is [`CoreError`], which encapsulates
//! more specific errors like [`SettingsError`] and [`LoggingError`].
//!
//! # Examples
//!
//! ```rust,ignore
//! // Example of how a function might return a CoreError
//! use applet_settings::error::CoreError;
//!
//! fn do_something_risky() -> Result<(), CoreError> {
//!     // ... some operation ...
//!     // If something goes wrong:
//!     // return Err(CoreError::Internal("Something went wrong".to_string()));
//!     Ok(())
//! }
//! ```

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for the applet-settings library.
///
/// This enum represents all possible errors that can occur in the library.
/// It is designed to be used as a common error type throughout consuming
/// applets, often by wrapping more specific error types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Errors related to locating, seeding, reading, or watching a
    /// settings file. Wraps a [`SettingsError`].
    #[error("Settings Error: {0}")]
    Settings(#[from] SettingsError),

    /// Errors that occur during the initialization of the logging system.
    /// Wraps a [`LoggingError`].
    #[error("Logging Error: {0}")]
    Logging(#[from] LoggingError),

    /// Errors related to filesystem operations, such as creating directories
    /// or copying files, that are not covered by a more specific settings
    /// error. Includes a message, the path involved, and the source I/O error.
    #[error("Filesystem Error: {message} (Path: {path:?})")]
    Filesystem {
        message: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// General I/O errors not covered by other specific variants.
    /// Wraps a `std::io::Error`.
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for unexpected internal errors within the library.
    /// Contains a descriptive message.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Error type for settings-store operations.
///
/// This enum represents errors that can occur while resolving the
/// per-applet directory, seeding the settings file from the bundled
/// default, reading the file, or establishing the file watch. It is
/// typically wrapped by [`CoreError::Settings`].
///
/// Note that *parsing* has no error variant: the line format has no
/// failure path by construction — any input text produces some record
/// list.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An error occurred while attempting to read a settings file.
    /// Includes the path to the file and the source I/O error.
    #[error("Failed to read settings file from {path:?}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bundled default settings file could not be read when seeding a
    /// new per-user settings file.
    #[error("Bundled default settings file unavailable at {path:?}")]
    SeedUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required base directory (e.g. the user's home directory) could not
    /// be determined. Contains a string identifying the directory type.
    #[error("Could not determine base directory for {dir_type}")]
    DirectoryUnavailable { dir_type: String },

    /// The file-system watch on the settings file could not be established.
    /// Contains a descriptive message from the watch backend.
    #[error("Failed to watch settings file: {0}")]
    Watch(String),
}

/// Error type for logging-related operations.
///
/// This enum represents errors that can occur during logging
/// initialization or operation. It is typically wrapped by
/// [`CoreError::Logging`].
#[derive(Error, Debug)]
pub enum LoggingError {
    /// Failed to initialize the logging system, e.g. because a global
    /// subscriber was already installed.
    #[error("Failed to initialize logging: {0}")]
    InitializationFailure(String),

    /// Failed to set or parse a log filter (e.g., from a configuration string).
    #[error("Failed to set log filter: {0}")]
    FilterError(String),

    /// An I/O error occurred during logging, such as failing to open a log file.
    /// Wraps a `std::io::Error`.
    #[error("Logging I/O error: {0}")]
    IoError(#[from] io::Error),
}
