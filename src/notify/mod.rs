//! User-facing notifications raised by a [`CatalogSession`](crate::CatalogSession).
//!
//! The session reports outcomes through a [`Notifier`]: one aggregated
//! notification per failed commit, load or undo, and one per successful
//! commit.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[cfg(feature = "emitter")]
mod emitter;
#[cfg(feature = "emitter")]
pub use emitter::EmitterNotifier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Notification {
    Committed { writes: usize },
    CommitFailed { phase: String, message: String },
    LoadFailed { message: String },
    UndoFailed { entity: String, message: String },
}

impl Notification {
    pub fn event_type(&self) -> &'static str {
        match self {
            Notification::Committed { .. } => "catalog.committed",
            Notification::CommitFailed { .. } => "catalog.commit_failed",
            Notification::LoadFailed { .. } => "catalog.load_failed",
            Notification::UndoFailed { .. } => "catalog.undo_failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, Notification::Committed { .. })
    }
}

/// Sink for session notifications.
pub trait Notifier: Send {
    fn notify(&mut self, notification: &Notification);
}

/// Logs notifications through `tracing`, or collects them into a buffer.
#[derive(Default)]
pub struct LogNotifier {
    buffer: Option<Arc<Mutex<Vec<Notification>>>>,
}

impl LogNotifier {
    pub fn new() -> Self {
        LogNotifier { buffer: None }
    }

    pub fn with_buffer(buffer: Arc<Mutex<Vec<Notification>>>) -> Self {
        LogNotifier {
            buffer: Some(buffer),
        }
    }
}

impl Notifier for LogNotifier {
    fn notify(&mut self, notification: &Notification) {
        match &self.buffer {
            Some(buffer) => match buffer.lock() {
                Ok(mut buffer) => buffer.push(notification.clone()),
                Err(_) => warn!("notification buffer poisoned"),
            },
            None if notification.is_failure() => {
                warn!(event = notification.event_type(), ?notification, "catalog notification")
            }
            None => info!(event = notification.event_type(), ?notification, "catalog notification"),
        }
    }
}
