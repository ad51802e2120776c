//! The per-applet settings store.
//!
//! [`SettingsStore`] owns one settings file per (applet identifier,
//! file name) pair: it seeds the file from a bundled default on first
//! run, parses it into the in-memory settings document, answers typed
//! key lookups, and notifies observers when the file changes on disk.

use crate::error::{CoreError, SettingsError};
use crate::settings::notifier::{ChangeNotifier, Subscription};
use crate::settings::types::{parse_document, Record};
use crate::settings::watcher::{spawn_settings_watcher, SettingsWatcher};
use crate::utils::{fs as settings_fs, paths};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, error};

/// A settings store for one applet.
///
/// The store is `Send + Sync`: the document is replaced wholesale under a
/// write lock and lookups scan a consistent `Arc` snapshot, so readers
/// never observe a half-built document. The file watcher only emits
/// change notifications; re-reading is always an explicit
/// [`read_settings`](SettingsStore::read_settings) call by the owner.
///
/// # Failure policy
///
/// [`SettingsStore::new`] never fails: initialization errors (missing
/// bundled file, uncreatable directory, unreadable settings file) are
/// logged via `tracing::error!` and swallowed, leaving a store with an
/// empty document whose lookups all return their defaults. Use
/// [`SettingsStore::try_new`] to observe the error instead.
pub struct SettingsStore {
    uuid: String,
    settings_file: PathBuf,
    parsed_settings: RwLock<Arc<Vec<Record>>>,
    notifier: ChangeNotifier,
    watcher: Mutex<Option<SettingsWatcher>>,
}

impl SettingsStore {
    /// Creates a settings store for the applet identified by `uuid`,
    /// with log-and-continue error handling.
    ///
    /// Resolves the per-applet settings directory, creates it (and
    /// parents) if absent, seeds `<dir>/<target_name>` from
    /// `default_file` on first run, parses the file, and starts the file
    /// watcher. Every error in that sequence is logged and swallowed;
    /// the returned store is inert in the worst case but never panics
    /// and never raises.
    pub fn new(uuid: &str, default_file: &Path, target_name: &str) -> Self {
        match paths::applet_settings_dir(uuid) {
            Ok(dir) => Self::new_in(uuid, &dir, default_file, target_name),
            Err(e) => {
                error!(
                    uuid,
                    error = %e,
                    "Failed to resolve settings directory; lookups will return caller defaults"
                );
                Self::inert(uuid, PathBuf::from(target_name))
            }
        }
    }

    /// Log-and-continue construction with an explicit settings directory.
    pub(crate) fn new_in(uuid: &str, dir: &Path, default_file: &Path, target_name: &str) -> Self {
        match Self::try_new_in(uuid, dir, default_file, target_name) {
            Ok(store) => store,
            Err(e) => {
                error!(
                    uuid,
                    error = %e,
                    "Failed to initialize settings store; lookups will return caller defaults"
                );
                Self::inert(uuid, dir.join(target_name))
            }
        }
    }

    /// Fallible variant of [`SettingsStore::new`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] if the per-applet directory cannot be
    /// resolved or created, the bundled default file is unavailable when
    /// seeding, the settings file cannot be read, or the file watch
    /// cannot be established.
    pub fn try_new(uuid: &str, default_file: &Path, target_name: &str) -> Result<Self, CoreError> {
        let dir = paths::applet_settings_dir(uuid)?;
        Self::try_new_in(uuid, &dir, default_file, target_name)
    }

    /// Builds a store with its settings file inside `dir` (created if
    /// absent). `try_new` delegates here after resolving the per-applet
    /// directory; tests call it directly with a scratch directory.
    pub(crate) fn try_new_in(
        uuid: &str,
        dir: &Path,
        default_file: &Path,
        target_name: &str,
    ) -> Result<Self, CoreError> {
        settings_fs::ensure_dir_exists(dir)?;
        let settings_file = dir.join(target_name);

        if !settings_file.exists() {
            if !default_file.exists() {
                return Err(CoreError::Settings(SettingsError::SeedUnavailable {
                    path: default_file.to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "bundled default settings file does not exist",
                    ),
                }));
            }
            settings_fs::copy_file(default_file, &settings_file)?;
            debug!(
                "Seeded settings file {:?} from bundled default {:?}",
                settings_file, default_file
            );
        }

        let store = Self::inert(uuid, settings_file);
        store.read_settings()?;

        let watcher = spawn_settings_watcher(store.settings_file.clone(), store.notifier.clone())?;
        *store
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(watcher);

        Ok(store)
    }

    /// A store with an empty document and no watcher.
    fn inert(uuid: &str, settings_file: PathBuf) -> Self {
        SettingsStore {
            uuid: uuid.to_string(),
            settings_file,
            parsed_settings: RwLock::new(Arc::new(Vec::new())),
            notifier: ChangeNotifier::new(),
            watcher: Mutex::new(None),
        }
    }

    /// The applet identifier this store is scoped to.
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Path of the live settings file.
    pub fn settings_file(&self) -> &Path {
        &self.settings_file
    }

    /// Re-reads the settings file from disk and replaces the in-memory
    /// document wholesale.
    ///
    /// The file is always read fresh (no mtime or staleness check) and
    /// the previous document is discarded entirely. Parsing itself
    /// cannot fail; only the read can.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ReadError`] (wrapped in
    /// [`CoreError::Settings`]) if the file cannot be read. The previous
    /// document is left in place in that case.
    pub fn read_settings(&self) -> Result<(), CoreError> {
        let content = fs::read_to_string(&self.settings_file).map_err(|e| {
            CoreError::Settings(SettingsError::ReadError {
                path: self.settings_file.clone(),
                source: e,
            })
        })?;
        let records = parse_document(&content);
        *self
            .parsed_settings
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(records);
        Ok(())
    }

    /// Returns the **last** record whose key equals `key`, or `default`
    /// if the document is empty or no record matches.
    ///
    /// Later lines override earlier ones: the scan keeps overwriting its
    /// candidate instead of stopping at the first match.
    pub fn get_array(&self, key: &str, default: Record) -> Record {
        let snapshot = self.raw_list();
        let mut res: Option<&Record> = None;
        for record in snapshot.iter() {
            if record.key() == key {
                res = Some(record);
            }
        }
        match res {
            Some(record) => record.clone(),
            None => default,
        }
    }

    /// Returns the second field of the last record matching `key`, or
    /// `default` if no record matches.
    ///
    /// Known wart, preserved for compatibility: no-match is signalled
    /// internally by the sentinel record `["null", "null"]`, so a
    /// genuinely stored value whose key is the literal string `"null"`
    /// is indistinguishable from absence and also yields `default`. A
    /// matched record with fewer than two fields yields `""`.
    pub fn get_string(&self, key: &str, default: &str) -> String {
        let record = self.get_array(key, Record::from(["null", "null"]));
        if record.key() == "null" {
            default.to_string()
        } else {
            record.field(1).unwrap_or_default().to_string()
        }
    }

    /// Returns `true` iff the stored string value for `key` is exactly
    /// `"true"`; any other stored value yields `false`. If the key is
    /// absent (or its stored value is the sentinel `"null"`, see
    /// [`get_string`](SettingsStore::get_string)), `default` is returned
    /// untouched. The match is case-sensitive: `"TRUE"` and `"1"` are
    /// `false`, not errors.
    pub fn get_boolean(&self, key: &str, default: bool) -> bool {
        let value = self.get_string(key, "null");
        if value == "null" {
            default
        } else {
            value == "true"
        }
    }

    /// The current settings document: a shared snapshot of the full
    /// record list in file order. The snapshot is immutable; a
    /// subsequent [`read_settings`](SettingsStore::read_settings)
    /// replaces the store's document without affecting handed-out
    /// snapshots.
    pub fn raw_list(&self) -> Arc<Vec<Record>> {
        Arc::clone(
            &self
                .parsed_settings
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Registers `callback` to run once per detected external
    /// modification of the settings file.
    ///
    /// The notification carries no payload and does **not** reload the
    /// document; call [`read_settings`](SettingsStore::read_settings)
    /// from (or after) the callback to pick up the new contents.
    /// Callbacks run on the watcher thread.
    pub fn on_changed<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.subscribe(callback)
    }

    /// Stops watching the settings file. Idempotent; lookups and
    /// explicit re-reads keep working afterwards. Dropping the store
    /// has the same effect.
    pub fn close(&self) {
        let mut guard = self.watcher.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            debug!(uuid = %self.uuid, "Settings store closed; file watch released");
        }
    }

    /// Opens the settings file in an external editor: the program named
    /// by `$VISUAL` if set, otherwise `xdg-open`. Spawn-and-forget; the
    /// editor's exit status is not observed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if the process cannot be spawned.
    pub fn open_in_editor(&self) -> Result<(), CoreError> {
        let editor = std::env::var("VISUAL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "xdg-open".to_string());
        std::process::Command::new(editor)
            .arg(&self.settings_file)
            .spawn()
            .map(|_| ())
            .map_err(CoreError::Io)
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("uuid", &self.uuid)
            .field("settings_file", &self.settings_file)
            .field("records", &self.raw_list().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;
    use tempfile::TempDir;

    const UUID: &str = "weather@test";
    const TARGET: &str = "settings.conf";

    /// Creates a bundled default file and a store seeded from it inside
    /// a scratch directory. Returns the TempDir owner alongside.
    fn store_with_default(content: &str) -> (TempDir, SettingsStore) {
        let temp = TempDir::new().unwrap();
        let default_file = temp.path().join("default.conf");
        fs::write(&default_file, content).unwrap();
        let dir = temp.path().join(UUID);
        let store = SettingsStore::try_new_in(UUID, &dir, &default_file, TARGET)
            .expect("store construction failed");
        (temp, store)
    }

    #[test]
    fn test_seed_copies_default_byte_for_byte() {
        let content = "# header\nKEY,1,2\n\nOTHER, a , b \n";
        let (temp, store) = store_with_default(content);

        let seeded = fs::read(store.settings_file()).unwrap();
        assert_eq!(seeded, content.as_bytes());
        drop(temp);
    }

    #[test]
    fn test_existing_settings_file_is_not_overwritten() {
        let temp = TempDir::new().unwrap();
        let default_file = temp.path().join("default.conf");
        fs::write(&default_file, "DEFAULT,1\n").unwrap();

        let dir = temp.path().join(UUID);
        fs::create_dir_all(&dir).unwrap();
        let existing = dir.join(TARGET);
        fs::write(&existing, "USER,edited\n").unwrap();

        let store = SettingsStore::try_new_in(UUID, &dir, &default_file, TARGET).unwrap();
        assert_eq!(fs::read_to_string(store.settings_file()).unwrap(), "USER,edited\n");
        assert_eq!(store.get_array("USER", Record::from(["none"])).field(1), Some("edited"));
    }

    #[test]
    fn test_missing_default_file_yields_seed_unavailable() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(UUID);
        let missing_default = temp.path().join("no_such_default.conf");

        let result = SettingsStore::try_new_in(UUID, &dir, &missing_default, TARGET);
        match result.err().unwrap() {
            CoreError::Settings(SettingsError::SeedUnavailable { path, .. }) => {
                assert_eq!(path, missing_default);
            }
            e => panic!("Unexpected error type: {:?}", e),
        }
    }

    #[test]
    fn test_new_is_log_and_continue_on_failure() {
        // Missing bundled default: the infallible constructor must still
        // hand back a store whose lookups all fall through to the
        // caller-supplied defaults.
        let temp = TempDir::new().unwrap();
        let missing_default = temp.path().join("no_such_default.conf");
        let dir = temp.path().join(UUID);

        let store = SettingsStore::new_in(UUID, &dir, &missing_default, TARGET);

        assert!(store.raw_list().is_empty());
        assert_eq!(store.get_array("anything", Record::from(["D"])), Record::from(["D"]));
        assert_eq!(store.get_string("anything", "fallback"), "fallback");
        assert!(store.get_boolean("anything", true));
        assert!(store.read_settings().is_err(), "re-read of a missing file must error");
    }

    #[test]
    fn test_get_array_last_match_wins() {
        let (_temp, store) = store_with_default("K,1\nK,2\n");
        assert_eq!(store.get_array("K", Record::from(["none"])), Record::from(["K", "2"]));
    }

    #[test]
    fn test_get_array_default_on_empty_document() {
        let (_temp, store) = store_with_default("");
        assert!(store.raw_list().is_empty());
        assert_eq!(store.get_array("anything", Record::from(["D"])), Record::from(["D"]));
    }

    #[test]
    fn test_get_array_default_on_no_match_over_populated_document() {
        // The fallback must fire on the no-match path even when the scan
        // visited records, not only when the document is empty.
        let (_temp, store) = store_with_default("A,1\nB,2\n");
        assert!(!store.raw_list().is_empty());
        assert_eq!(store.get_array("missing", Record::from(["D"])), Record::from(["D"]));
    }

    #[test]
    fn test_get_string_returns_second_field() {
        let (_temp, store) = store_with_default("greeting,hello,extra\n");
        assert_eq!(store.get_string("greeting", "none"), "hello");
    }

    #[test]
    fn test_get_string_default_on_absent_key() {
        let (_temp, store) = store_with_default("other,1\n");
        assert_eq!(store.get_string("greeting", "none"), "none");
    }

    #[test]
    fn test_get_string_short_record_yields_empty_string() {
        let (_temp, store) = store_with_default("lonely\n");
        assert_eq!(store.get_string("lonely", "none"), "");
    }

    #[test]
    fn test_get_string_null_key_sentinel_wart() {
        // A record genuinely keyed "null" is indistinguishable from
        // absence; the default wins. Preserved compatibility behavior.
        let (_temp, store) = store_with_default("null,stored\n");
        assert_eq!(store.get_string("null", "fallback"), "fallback");
    }

    #[test]
    fn test_get_boolean_semantics() {
        let (_temp, store) =
            store_with_default("on,true\noff,false\nshouty,TRUE\nnumeric,1\n");
        assert!(store.get_boolean("on", false));
        assert!(!store.get_boolean("off", true));
        assert!(!store.get_boolean("shouty", true), "match is case-sensitive");
        assert!(!store.get_boolean("numeric", true));
        // Absent key: the default comes back untouched, whichever way it leans.
        assert!(store.get_boolean("absent", true));
        assert!(!store.get_boolean("absent", false));
    }

    #[test]
    fn test_raw_list_is_shared_snapshot() {
        let (_temp, store) = store_with_default("K,1\n");
        let before = store.raw_list();

        settings_fs::write_string_to_file(store.settings_file(), "K,2\n").unwrap();
        store.read_settings().unwrap();

        // The old snapshot is unaffected by the wholesale replacement.
        assert_eq!(*before, vec![Record::from(["K", "1"])]);
        assert_eq!(*store.raw_list(), vec![Record::from(["K", "2"])]);
    }

    #[test]
    fn test_read_settings_is_idempotent_without_modification() {
        let (_temp, store) = store_with_default("A,1\nB,2\n");
        store.read_settings().unwrap();
        let first = store.raw_list();
        store.read_settings().unwrap();
        let second = store.raw_list();
        assert_eq!(first.as_slice(), second.as_slice());
    }

    #[test]
    fn test_change_event_notifies_without_reloading() {
        let (_temp, store) = store_with_default("K,1\n");
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let _sub = store.on_changed(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        let before = store.raw_list();
        // Simulated change event, bypassing the file system.
        store.notifier.emit();

        assert_eq!(calls.load(Ordering::SeqCst), 1, "exactly one notification");
        assert_eq!(
            *before,
            *store.raw_list(),
            "notification must not reload the document"
        );
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let (_temp, store) = store_with_default("K,1\n");
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let sub = store.on_changed(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        store.notifier.emit();
        sub.unsubscribe();
        store.notifier.emit();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_is_idempotent_and_keeps_lookups_working() {
        let (_temp, store) = store_with_default("K,1\n");
        store.close();
        store.close();
        assert_eq!(store.get_string("K", "none"), "1");
        assert!(store.read_settings().is_ok());
    }

    #[test]
    fn test_external_modification_fires_watcher_notification() {
        let (_temp, store) = store_with_default("K,1\n");
        let (tx, rx) = mpsc::channel();
        // Sender is not Sync on older toolchains; the callback bound wants it.
        let tx = Mutex::new(tx);
        let _sub = store.on_changed(move || {
            let _ = tx.lock().unwrap().send(());
        });

        // Give the watch backend a moment to attach before modifying.
        std::thread::sleep(Duration::from_millis(200));
        settings_fs::write_string_to_file(store.settings_file(), "K,2\n").unwrap();

        rx.recv_timeout(Duration::from_secs(5))
            .expect("no change notification within timeout");

        // Detection only: the document still holds the old contents
        // until the owner explicitly re-reads.
        assert_eq!(store.get_string("K", "none"), "1");
        store.read_settings().unwrap();
        assert_eq!(store.get_string("K", "none"), "2");
    }
}
