//! # Applet Settings Library (`applet-settings`)
//!
//! `applet-settings` is a small foundation library for desktop-shell
//! applets that keep their configuration in per-applet, human-editable
//! settings files. It provides the settings store, the surrounding
//! error and logging infrastructure, and the filesystem utilities the
//! store is built on.
//!
//! ## Purpose
//!
//! The primary purpose of this crate is to offer a stable, well-tested,
//! and ergonomic toolkit for one common applet task: owning a settings
//! file. This includes:
//!
//! - **Settings Store**: [`SettingsStore`] seeds a per-applet settings
//!   file from a bundled default on first run, parses its line-oriented
//!   comma-delimited format, and answers typed lookups
//!   (`get_array` / `get_string` / `get_boolean` / `raw_list`).
//! - **Change Notification**: a file-system watch on the settings file
//!   fires a single, payload-free "settings file changed" event per
//!   external modification. Detection is decoupled from reloading —
//!   observers re-read explicitly via [`SettingsStore::read_settings`].
//! - **Error Handling**: a unified error system through the
//!   [`CoreError`] enum and its associated specific error types
//!   [`SettingsError`] and [`LoggingError`].
//! - **Logging**: a flexible logging setup built on top of the
//!   `tracing` crate, configurable for console and file output in text
//!   or JSON format.
//! - **Utility Functions**: helpers for filesystem operations
//!   (`utils::fs`) and settings-directory resolution (`utils::paths`).
//!
//! ## Usage
//!
//! Add `applet-settings` as a dependency in your `Cargo.toml`. Key
//! components are re-exported at the crate root for ease of use.
//!
//! ```rust,ignore
//! use applet_settings::{init_minimal_logging, SettingsStore};
//! use std::path::Path;
//!
//! fn main() {
//!     init_minimal_logging();
//!
//!     let store = SettingsStore::new(
//!         "weather@example.org",
//!         Path::new("/usr/share/applets/weather@example.org/default-settings"),
//!         "settings.conf",
//!     );
//!
//!     let units = store.get_string("units", "metric");
//!     tracing::info!(units, "applet settings loaded");
//!
//!     let _subscription = store.on_changed(|| {
//!         tracing::info!("settings file changed on disk");
//!     });
//!     // ... applet logic; call store.read_settings() after a change ...
//! }
//! ```
//!
//! Initialization never raises: a store whose file could not be seeded
//! or read logs the failure and answers every lookup with the
//! caller-supplied default.

pub mod error;
pub mod logging;
pub mod settings;
pub mod utils;

// Re-export key types for convenience
pub use error::{CoreError, LoggingError, SettingsError};
pub use logging::{init_logging, init_minimal_logging, LoggingConfig};
pub use settings::{
    parse_document, ChangeNotifier, Record, SettingsStore, Subscription, SETTINGS_FILE_CHANGED,
};
pub use utils::{copy_file, ensure_dir_exists, read_to_string, write_string_to_file};
