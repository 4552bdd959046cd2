//! Single-slot, auto-expiring toast notifications.
//!
//! Cart mutations report their outcome through one shared slot: a new toast
//! always replaces the current one and restarts the display window, so the
//! most recent message is shown for a full fresh duration. There is no queue.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

/// Default toast display duration.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(2200);

/// Visual category of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// A visible toast message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub text: String,
    pub kind: ToastKind,
}

struct ActiveToast {
    toast: Toast,
    expires_at: Instant,
}

/// Handle to the shared toast slot.
///
/// Cheaply cloneable; every clone refers to the same slot.
#[derive(Clone, Default)]
pub struct Notifier {
    slot: Arc<Mutex<Option<ActiveToast>>>,
}

impl Notifier {
    /// Show a toast for the default duration, replacing any current one.
    pub fn show(&self, text: impl Into<String>, kind: ToastKind) {
        self.show_for(text, kind, DEFAULT_TOAST_DURATION);
    }

    /// Show a toast for a custom duration, replacing any current one.
    ///
    /// Replacement restarts the display window from now; the previous
    /// toast's remaining time is discarded.
    pub fn show_for(&self, text: impl Into<String>, kind: ToastKind, duration: Duration) {
        let active = ActiveToast {
            toast: Toast {
                text: text.into(),
                kind,
            },
            expires_at: Instant::now() + duration,
        };
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(active);
        }
    }

    /// The currently visible toast, if any.
    ///
    /// An expired toast is dropped on read; callers polling this see the
    /// slot auto-hide without any background timer task.
    #[must_use]
    pub fn current(&self) -> Option<Toast> {
        let mut slot = self.slot.lock().ok()?;
        match slot.as_ref() {
            Some(active) if active.expires_at > Instant::now() => Some(active.toast.clone()),
            Some(_) => {
                *slot = None;
                None
            }
            None => None,
        }
    }

    /// Hide the current toast immediately.
    pub fn close(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}
