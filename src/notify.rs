//! Toast-style notifications surfaced after an export settles

use std::time::{Duration, Instant};

use log::{error, info};

/// Toasts auto-dismiss after this long
pub const TOAST_DISMISS_AFTER: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    shown_at: Instant,
}

impl Toast {
    pub fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= TOAST_DISMISS_AFTER
    }
}

/// Receiver for (message, kind) pairs once a pipeline run settles
pub trait Notifier {
    fn notify(&mut self, message: &str, kind: ToastKind);
}

/// Notifier that forwards toasts to the log, used by the CLI
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, message: &str, kind: ToastKind) {
        match kind {
            ToastKind::Success => info!("{message}"),
            ToastKind::Error => error!("{message}"),
        }
    }
}

/// In-memory toast queue with auto-dismissal, for embedding in a UI shell
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired toasts and return the ones still visible
    pub fn visible(&mut self, now: Instant) -> &[Toast] {
        self.toasts.retain(|t| !t.expired(now));
        &self.toasts
    }
}

impl Notifier for ToastQueue {
    fn notify(&mut self, message: &str, kind: ToastKind) {
        self.toasts.push(Toast {
            message: message.to_string(),
            kind,
            shown_at: Instant::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_auto_dismiss_after_the_fixed_delay() {
        let mut queue = ToastQueue::new();
        queue.notify("PNG exported successfully", ToastKind::Success);

        let now = Instant::now();
        assert_eq!(queue.visible(now).len(), 1);
        assert_eq!(queue.visible(now)[0].kind, ToastKind::Success);

        let later = now + TOAST_DISMISS_AFTER + Duration::from_millis(1);
        assert!(queue.visible(later).is_empty());
    }
}
