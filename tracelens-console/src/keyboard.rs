//! Global key listener registry.
//!
//! Listeners are registered through [`KeyboardHub::add_listener`] and live
//! exactly as long as the returned [`ListenerGuard`]. Dropping the guard, on
//! any path including unwinding, removes the listener.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Where keyboard focus was when a key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    #[default]
    Body,
    TextInput,
    TextArea,
    ContentEditable,
    Other,
}

impl FocusTarget {
    /// True for surfaces that accept typed text.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::TextInput | Self::TextArea | Self::ContentEditable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub focus: FocusTarget,
}

impl KeyPress {
    pub fn new(key: impl Into<String>, focus: FocusTarget) -> Self {
        Self {
            key: key.into(),
            focus,
        }
    }
}

type KeyHandler = Arc<dyn Fn(&KeyPress) + Send + Sync>;

struct HubInner {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, KeyHandler)>>,
}

#[derive(Clone)]
pub struct KeyboardHub {
    inner: Arc<HubInner>,
}

impl Default for KeyboardHub {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HubInner {
                next_id: AtomicU64::new(1),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register a listener for every dispatched key press.
    pub fn add_listener<F>(&self, handler: F) -> ListenerGuard
    where
        F: Fn(&KeyPress) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(handler)));
        tracing::trace!(listener_id = id, "Key listener registered");
        ListenerGuard {
            hub: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Deliver a key press to all listeners. Returns how many were invoked.
    ///
    /// Handlers run outside the registry lock, so they may add or drop
    /// listeners themselves.
    pub fn dispatch(&self, press: &KeyPress) -> usize {
        let handlers: Vec<KeyHandler> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in &handlers {
            handler(press);
        }
        handlers.len()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }
}

/// Keeps a key listener registered until dropped.
#[must_use = "dropping the guard removes the listener immediately"]
pub struct ListenerGuard {
    hub: Weak<HubInner>,
    id: u64,
}

impl ListenerGuard {
    /// Remove the listener now.
    pub fn release(self) {}
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            inner.listeners.lock().retain(|(id, _)| *id != self.id);
            tracing::trace!(listener_id = self.id, "Key listener removed");
        }
    }
}
