//! Per-Applet Settings Management.
//!
//! This module provides the structures and mechanisms for owning one
//! small, human-editable, line-oriented settings file per applet and
//! answering typed lookups over its contents.
//!
//! ## Key Components:
//!
//! - **Submodules**:
//!   - [`types`]: [`Record`] (one parsed line) and [`parse_document`]
//!     (the full-file parser). These define the on-disk line format.
//!   - [`store`]: [`SettingsStore`], the owning component — seeding from
//!     a bundled default, re-reading, typed lookups, watch lifecycle.
//!   - [`notifier`]: [`ChangeNotifier`] and [`Subscription`], the
//!     explicit observer registration for the single
//!     "settings file changed" event.
//!   - [`watcher`]: the `notify`-backed file watch driving the notifier
//!     (crate-internal).
//!
//! ## Store Lifecycle:
//!
//! 1. [`SettingsStore::new`] resolves `<settings-root>/<uuid>/`,
//!    creating it if absent.
//! 2. If the target settings file does not exist there, it is seeded by
//!    copying the bundled default file's bytes verbatim.
//! 3. The file is parsed into the in-memory settings document and a
//!    watch is established on its directory.
//! 4. External modifications fire the change notification; observers
//!    call [`SettingsStore::read_settings`] to rebuild the document.
//!    Detection and reloading are deliberately decoupled.
//!
//! # Examples
//!
//! ```rust,ignore
//! use applet_settings::settings::SettingsStore;
//! use std::path::Path;
//!
//! let store = SettingsStore::new(
//!     "weather@example.org",
//!     Path::new("/usr/share/applets/weather@example.org/default-settings"),
//!     "settings.conf",
//! );
//!
//! let units = store.get_string("units", "metric");
//! let show_icon = store.get_boolean("show-icon", true);
//!
//! let _sub = store.on_changed(|| {
//!     // The file changed on disk; re-read when convenient and rebuild
//!     // any derived state.
//! });
//! ```

pub mod notifier;
pub mod store;
pub mod types;
pub(crate) mod watcher;

pub use notifier::{ChangeNotifier, Subscription, SETTINGS_FILE_CHANGED};
pub use store::SettingsStore;
pub use types::{parse_document, Record};
