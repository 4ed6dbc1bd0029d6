//! User-facing notifications.
//!
//! The editor reports outcomes (idea added, connection rejected, import
//! failed) through a `Notifier`. Delivery is fire-and-forget: nothing the
//! sink does feeds back into editor state.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NotifyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            NotifyLevel::Info => "info",
            NotifyLevel::Success => "success",
            NotifyLevel::Warning => "warning",
            NotifyLevel::Error => "error",
        }
    }
}

impl fmt::Display for NotifyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Notifier {
    fn notify(&self, message: &str, level: NotifyLevel);
}

/// Routes notifications to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, level: NotifyLevel) {
        match level {
            NotifyLevel::Info | NotifyLevel::Success => log::info!("{message}"),
            NotifyLevel::Warning => log::warn!("{message}"),
            NotifyLevel::Error => log::error!("{message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotifyLevel,
}

/// Keeps every notification in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    seen: Rc<RefCell<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notification> {
        self.seen.borrow().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.seen.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.seen.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.seen.borrow_mut().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, level: NotifyLevel) {
        self.seen.borrow_mut().push(Notification {
            message: message.to_string(),
            level,
        });
    }
}
