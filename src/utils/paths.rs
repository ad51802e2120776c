//! Settings Directory Path Resolution.
//!
//! This module provides utility functions for resolving the dotfile root
//! under which every applet's settings directory lives, and the
//! per-applet directory itself. It relies on the `directories-next`
//! crate for home-directory discovery.
//!
//! # Key Functions
//!
//! - [`settings_root_dir()`]: the fixed dotfile root, `~/.cinnamon` by
//!   default, overridable via the `APPLET_SETTINGS_ROOT` environment
//!   variable (primarily a test hook).
//! - [`applet_settings_dir()`]: `<root>/<uuid>`, the user-writable
//!   directory scoped to one applet identifier.
//!
//! All functions return `Result<PathBuf, CoreError>`, yielding
//! [`CoreError::Settings`] with [`SettingsError::DirectoryUnavailable`]
//! when the home directory cannot be determined.

use crate::error::{CoreError, SettingsError};
use directories_next::BaseDirs;
use std::path::PathBuf;

/// Name of the dotfile directory under the user's home that holds all
/// per-applet settings directories.
const DOTFILE_ROOT: &str = ".cinnamon";

/// Environment variable overriding the resolved settings root. When set
/// to a non-empty value, its value is used verbatim instead of
/// `<home>/.cinnamon`. Intended for tests, which point it at a TempDir.
pub const SETTINGS_ROOT_ENV: &str = "APPLET_SETTINGS_ROOT";

/// Returns the dotfile root directory under which per-applet settings
/// directories are created.
///
/// Resolution order:
/// 1. `$APPLET_SETTINGS_ROOT`, if set and non-empty.
/// 2. `<home>/.cinnamon`, with the home directory resolved via
///    `directories-next`.
///
/// The directory is not created by this function; see
/// [`crate::utils::fs::ensure_dir_exists`].
///
/// # Errors
/// Returns [`SettingsError::DirectoryUnavailable`] (wrapped in
/// [`CoreError::Settings`]) if no override is set and the home directory
/// cannot be determined.
pub fn settings_root_dir() -> Result<PathBuf, CoreError> {
    match std::env::var(SETTINGS_ROOT_ENV) {
        Ok(root) if !root.is_empty() => Ok(PathBuf::from(root)),
        _ => BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(DOTFILE_ROOT))
            .ok_or_else(|| {
                CoreError::Settings(SettingsError::DirectoryUnavailable {
                    dir_type: "Home".to_string(),
                })
            }),
    }
}

/// Returns the settings directory for one applet identifier:
/// `<settings-root>/<uuid>`.
///
/// The directory is not created by this function.
///
/// # Errors
/// Propagates the error from [`settings_root_dir`] if the root cannot be
/// resolved.
pub fn applet_settings_dir(uuid: &str) -> Result<PathBuf, CoreError> {
    settings_root_dir().map(|root| root.join(uuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, PoisonError};
    use tempfile::TempDir;

    // Process environment is shared across test threads; every test that
    // touches SETTINGS_ROOT_ENV serializes on this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Sets an environment variable for the duration of a test and
    /// restores the previous value on drop.
    struct TestEnvVarGuard {
        name: String,
        original_value: Option<String>,
    }

    impl TestEnvVarGuard {
        fn new(name: &str, value: &str) -> Self {
            let original_value = std::env::var(name).ok();
            std::env::set_var(name, value);
            TestEnvVarGuard {
                name: name.to_string(),
                original_value,
            }
        }
    }

    impl Drop for TestEnvVarGuard {
        fn drop(&mut self) {
            if let Some(val) = &self.original_value {
                std::env::set_var(&self.name, val);
            } else {
                std::env::remove_var(&self.name);
            }
        }
    }

    #[test]
    fn test_settings_root_dir_honors_env_override() {
        let _env = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let temp = TempDir::new().unwrap();
        let _guard = TestEnvVarGuard::new(SETTINGS_ROOT_ENV, temp.path().to_str().unwrap());

        let root = settings_root_dir().expect("settings_root_dir failed with override set");
        assert_eq!(root, temp.path());
    }

    #[test]
    fn test_settings_root_dir_defaults_under_home() {
        let _env = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        // Clear the override for this test.
        let original = std::env::var(SETTINGS_ROOT_ENV).ok();
        std::env::remove_var(SETTINGS_ROOT_ENV);

        let result = settings_root_dir();
        if let Some(val) = original {
            std::env::set_var(SETTINGS_ROOT_ENV, val);
        }

        match result {
            Ok(root) => {
                assert!(root.is_absolute(), "Settings root is not absolute: {:?}", root);
                assert!(root.ends_with(DOTFILE_ROOT), "Settings root does not end with {}: {:?}", DOTFILE_ROOT, root);
            }
            // On some CI environments HOME might not be set; DirectoryUnavailable is acceptable there.
            Err(CoreError::Settings(SettingsError::DirectoryUnavailable { dir_type })) => {
                assert_eq!(dir_type, "Home");
            }
            Err(e) => panic!("Expected Ok or DirectoryUnavailable, got {:?}", e),
        }
    }

    #[test]
    fn test_applet_settings_dir_appends_uuid() {
        let _env = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let temp = TempDir::new().unwrap();
        let _guard = TestEnvVarGuard::new(SETTINGS_ROOT_ENV, temp.path().to_str().unwrap());

        let dir = applet_settings_dir("weather@example.org").unwrap();
        assert_eq!(dir, temp.path().join("weather@example.org"));
    }
}
