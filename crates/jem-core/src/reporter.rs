//! Reporter trait for dependency injection
//!
//! Core logic reports problems it recovers from (an unreadable descriptor
//! while listing, a dangling VM link) without knowing how the front end
//! prints them or tracks the exit status.

/// Sink for user-facing messages.
pub trait Reporter: Send + Sync {
    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a non-fatal warning.
    fn warning(&self, msg: &str);

    /// Log an error. Implementations record that the run failed but must not
    /// terminate the process.
    fn error(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
    fn error(&self, msg: &str) {
        (**self).error(msg);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn info(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn error(&self, _: &str) {}
}

/// Reporter that keeps every message, for assertions in tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    pub(crate) messages: std::sync::Mutex<Vec<(&'static str, String)>>,
}

#[cfg(test)]
impl RecordingReporter {
    pub(crate) fn count(&self, level: &str) -> usize {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }

    pub(crate) fn contains(&self, needle: &str) -> bool {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .any(|(_, m)| m.contains(needle))
    }
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn info(&self, msg: &str) {
        self.messages.lock().unwrap().push(("info", msg.to_string()));
    }
    fn warning(&self, msg: &str) {
        self.messages.lock().unwrap().push(("warning", msg.to_string()));
    }
    fn error(&self, msg: &str) {
        self.messages.lock().unwrap().push(("error", msg.to_string()));
    }
}
