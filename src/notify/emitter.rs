use event_emitter_rs::EventEmitter;

use super::{Notification, Notifier};

/// Forwards notifications as JSON strings to in-process listeners.
///
/// Listeners are keyed by [`Notification::event_type`] and run on the
/// emitter's own threads.
pub struct EmitterNotifier {
    emitter: EventEmitter,
}

impl EmitterNotifier {
    pub fn new(emitter: EventEmitter) -> Self {
        EmitterNotifier { emitter }
    }

    /// Register a listener for one notification type.
    pub fn on<F>(&mut self, event_type: &str, listener: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.emitter.on(event_type, listener);
    }
}

impl Notifier for EmitterNotifier {
    fn notify(&mut self, notification: &Notification) {
        let payload = serde_json::to_string(notification).unwrap_or_default();
        self.emitter.emit(notification.event_type(), payload);
    }
}
