//! Change Notification for Settings Stores.
//!
//! Explicit observer registration replacing the signal-mixin style of
//! event emission: callers register a callback with
//! [`ChangeNotifier::subscribe`] and receive a [`Subscription`] handle
//! that can be used to stop delivery. The store's file watcher invokes
//! [`ChangeNotifier::emit`] once per detected external modification.
//!
//! The notification carries no payload; it only means "the settings file
//! changed on disk". Observers are expected to call
//! `SettingsStore::read_settings` themselves if they want the new
//! contents — detection and reloading are deliberately decoupled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Conventional name of the single event emitted by a settings store.
pub const SETTINGS_FILE_CHANGED: &str = "settings-file-changed";

type Callback = Box<dyn Fn() + Send + Sync + 'static>;

#[derive(Default)]
struct NotifierInner {
    subscribers: Mutex<Vec<(u64, Callback)>>,
    next_id: AtomicU64,
}

/// A callback list for the "settings file changed" event.
///
/// Cloning a `ChangeNotifier` yields another handle to the same
/// subscriber list; the store keeps one handle and its watcher thread
/// another.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    inner: Arc<NotifierInner>,
}

impl ChangeNotifier {
    /// Creates a notifier with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` to be invoked on every emitted change event.
    ///
    /// Callbacks run on the emitting thread (for a store, the watcher
    /// thread) and must therefore be `Send + Sync + 'static`. The
    /// returned [`Subscription`] does **not** unsubscribe on drop;
    /// delivery continues for the lifetime of the notifier unless
    /// [`Subscription::unsubscribe`] is called.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Box::new(callback)));
        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Invokes every registered callback once, in subscription order.
    ///
    /// The subscriber list is locked for the duration of the emit;
    /// callbacks must not subscribe or unsubscribe from within.
    pub fn emit(&self) {
        tracing::debug!(event = SETTINGS_FILE_CHANGED, "Emitting settings change notification");
        let subscribers = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, callback) in subscribers.iter() {
            callback();
        }
    }

    /// Number of currently registered callbacks.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle for one registered callback.
///
/// Dropping the handle leaves the callback registered; call
/// [`Subscription::unsubscribe`] to stop delivery explicitly.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    inner: Weak<NotifierInner>,
}

impl Subscription {
    /// Removes the associated callback from the notifier. A no-op if the
    /// notifier has already been dropped.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}
