//! Settings file watching.
//!
//! Watches one settings file for external modification via the `notify`
//! crate and drives the store's [`ChangeNotifier`]. Detection only: the
//! watcher never re-reads or replaces the in-memory document — observers
//! decide when to call `SettingsStore::read_settings`.

use crate::error::{CoreError, SettingsError};
use crate::settings::notifier::ChangeNotifier;
use notify::{event::EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{channel, Receiver},
    thread,
    time::Duration,
};
use tracing::{debug, error};

/// Holds the debounce state for one watched settings file.
struct DebounceState {
    settings_file: PathBuf,
    last_processed_event_time: Option<std::time::Instant>,
}

impl DebounceState {
    const DEBOUNCE_DURATION: Duration = Duration::from_millis(500);

    fn new(settings_file: PathBuf) -> Self {
        DebounceState {
            settings_file,
            last_processed_event_time: None,
        }
    }

    /// Checks whether an event for `event_path` should produce a
    /// notification. The parent directory counts as relevant because
    /// editors commonly replace files via rename, which surfaces as a
    /// directory-level event.
    fn should_process(&mut self, event_path: &Path) -> bool {
        if event_path != self.settings_file {
            let parent = self
                .settings_file
                .parent()
                .unwrap_or(&self.settings_file);
            if event_path != parent {
                debug!(
                    "Ignoring event for path not directly watched: {:?}",
                    event_path
                );
                return false;
            }
        }

        let now = std::time::Instant::now();
        if let Some(last_time) = self.last_processed_event_time {
            if now.duration_since(last_time) < Self::DEBOUNCE_DURATION {
                debug!("Debouncing event for path: {:?}", event_path);
                return false;
            }
        }
        self.last_processed_event_time = Some(now);
        true
    }
}

/// Handle owning the underlying file-system watch.
///
/// Dropping the handle tears down the watch; the event thread exits once
/// the watcher's channel disconnects.
pub(crate) struct SettingsWatcher {
    _watcher: RecommendedWatcher,
}

/// Starts watching `settings_file` for external modification.
///
/// The file's parent directory is watched non-recursively so that
/// atomic-replace saves (write temp file, rename over target) are
/// caught. Relevant create/modify/remove events, debounced, invoke
/// [`ChangeNotifier::emit`] on a dedicated thread.
///
/// # Errors
///
/// Returns [`SettingsError::Watch`] (wrapped in [`CoreError::Settings`])
/// if the watch backend cannot be created or the directory cannot be
/// watched.
pub(crate) fn spawn_settings_watcher(
    settings_file: PathBuf,
    notifier: ChangeNotifier,
) -> Result<SettingsWatcher, CoreError> {
    let watch_dir = settings_file
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            CoreError::Settings(SettingsError::Watch(format!(
                "Settings file {:?} has no parent directory",
                settings_file
            )))
        })?;

    let (tx, rx): (
        std::sync::mpsc::Sender<Result<notify::Event, notify::Error>>,
        Receiver<Result<notify::Event, notify::Error>>,
    ) = channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| {
            // The event thread may already have exited on teardown.
            let _ = tx.send(res);
        },
        notify::Config::default(),
    )
    .map_err(|e| {
        CoreError::Settings(SettingsError::Watch(format!(
            "Failed to create file watcher: {}",
            e
        )))
    })?;

    watcher
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .map_err(|e| {
            CoreError::Settings(SettingsError::Watch(format!(
                "Failed to watch settings directory {:?}: {}",
                watch_dir, e
            )))
        })?;
    debug!("Watching settings directory: {:?}", watch_dir);

    let mut state = DebounceState::new(settings_file);
    thread::spawn(move || loop {
        match rx.recv() {
            Ok(event_result) => match event_result {
                Ok(event) => {
                    let relevant_event = matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    );
                    if relevant_event {
                        // Events can carry several paths; one notification per event.
                        for path in event.paths {
                            if state.should_process(&path) {
                                debug!(
                                    "Settings file change detected for path: {:?}, event kind: {:?}",
                                    path, event.kind
                                );
                                notifier.emit();
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    error!("Error receiving file event: {}", e);
                }
            },
            Err(_) => {
                // Watcher dropped; channel closed.
                debug!("Settings watcher channel disconnected. Stopping watch thread.");
                break;
            }
        }
    });

    Ok(SettingsWatcher { _watcher: watcher })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_state_debounces_rapid_events() {
        let mut state = DebounceState::new(PathBuf::from("/settings/dir/settings.conf"));
        let event_path = PathBuf::from("/settings/dir/settings.conf");

        assert!(state.should_process(&event_path), "First event should be processed");
        assert!(
            !state.should_process(&event_path),
            "Second immediate event should be debounced"
        );

        state.last_processed_event_time = Some(
            std::time::Instant::now() - DebounceState::DEBOUNCE_DURATION - Duration::from_millis(100),
        );
        assert!(
            state.should_process(&event_path),
            "Event after debounce period should be processed"
        );
    }

    #[test]
    fn test_debounce_state_ignores_irrelevant_paths() {
        let mut state = DebounceState::new(PathBuf::from("/settings/dir/settings.conf"));

        let irrelevant_path = PathBuf::from("/other/file.txt");
        assert!(
            !state.should_process(&irrelevant_path),
            "Should ignore event for completely unrelated path"
        );

        let sibling_path = PathBuf::from("/settings/dir/other.conf");
        assert!(
            !state.should_process(&sibling_path),
            "Should ignore event for a sibling file"
        );

        let parent_path = PathBuf::from("/settings/dir");
        assert!(
            state.should_process(&parent_path),
            "Should process event for the parent directory of the watched file"
        );
    }

    #[test]
    fn test_spawn_watcher_on_real_directory() {
        let temp = tempfile::tempdir().unwrap();
        let settings_file = temp.path().join("settings.conf");
        std::fs::write(&settings_file, "KEY,1\n").unwrap();

        let notifier = ChangeNotifier::new();
        let watcher = spawn_settings_watcher(settings_file, notifier);
        assert!(watcher.is_ok(), "spawn_settings_watcher failed: {:?}", watcher.err());
    }

    #[test]
    fn test_spawn_watcher_missing_directory_errors() {
        let temp = tempfile::tempdir().unwrap();
        let settings_file = temp.path().join("no_such_dir").join("settings.conf");

        let notifier = ChangeNotifier::new();
        let result = spawn_settings_watcher(settings_file, notifier);
        assert!(result.is_err(), "watching a missing directory should fail");
        match result.err().unwrap() {
            CoreError::Settings(SettingsError::Watch(_)) => {}
            e => panic!("Unexpected error type: {:?}", e),
        }
    }
}
