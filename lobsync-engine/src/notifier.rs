//! Synchronous change notification.

use crate::error::ListenerError;
use parking_lot::RwLock;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle identifying a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Returns the raw identifier.
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

type Listener<T> = Arc<dyn Fn(&T) -> Result<(), ListenerError> + Send + Sync>;

/// Ordered registry of listeners invoked after each mutation.
///
/// Listeners run on the mutating thread, in registration order, with no
/// registry lock held. A listener may therefore read the subject, register
/// or remove listeners. A listener that fails or panics is logged and the
/// remaining listeners still run.
pub struct ChangeNotifier<T: ?Sized> {
    listeners: RwLock<Vec<(ListenerId, Listener<T>)>>,
    next_id: AtomicU64,
}

impl<T: ?Sized> ChangeNotifier<T> {
    /// Creates an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers a listener and returns its handle.
    pub fn register<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let listener: Listener<T> = Arc::new(listener);
        self.listeners.write().push((id, listener));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    /// Returns true if no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invokes every listener with `subject`.
    pub fn notify(&self, subject: &T) {
        let listeners: Vec<(ListenerId, Listener<T>)> = self.listeners.read().clone();

        for (id, listener) in listeners {
            match panic::catch_unwind(AssertUnwindSafe(|| listener(subject))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!("Listener {} failed: {}", id.0, e);
                }
                Err(_) => {
                    tracing::error!("Listener {} panicked", id.0);
                }
            }
        }
    }
}

impl<T: ?Sized> Default for ChangeNotifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> std::fmt::Debug for ChangeNotifier<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.len())
            .finish()
    }
}
