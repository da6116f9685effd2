//! Reporter side channel for merge events
//!
//! The engine never terminates the process. Fatal errors are announced through
//! [`Reporter::error`] right before the merge returns `Err`; warnings go through
//! [`Reporter::warning`] and processing continues. Patch pointers that cannot be
//! applied are dropped, and [`Reporter::skipped`] lets callers observe them.

use std::cell::RefCell;

/// Receives fatal and warning events from a merge
pub trait Reporter {
    /// A fatal error; the merge is about to abort
    fn error(&self, message: &str);

    /// A non-fatal condition; the merge continues
    fn warning(&self, message: &str);

    /// A patch pointer was skipped without aborting
    fn skipped(&self, _pointer: &str, _reason: &str) {}
}

/// Reporter that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn error(&self, _message: &str) {}

    fn warning(&self, _message: &str) {}
}

/// An event recorded by [`CollectingReporter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Error(String),
    Warning(String),
    Skipped { pointer: String, reason: String },
}

/// Reporter that keeps every event in order
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: RefCell<Vec<Event>>,
}

impl CollectingReporter {
    /// Create an empty reporter
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, oldest first
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Recorded error messages
    pub fn errors(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Error(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    /// Recorded warning messages
    pub fn warnings(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Warning(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    /// Pointers that were skipped
    pub fn skipped_pointers(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Skipped { pointer, .. } => Some(pointer.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for CollectingReporter {
    fn error(&self, message: &str) {
        self.events.borrow_mut().push(Event::Error(message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.events
            .borrow_mut()
            .push(Event::Warning(message.to_string()));
    }

    fn skipped(&self, pointer: &str, reason: &str) {
        self.events.borrow_mut().push(Event::Skipped {
            pointer: pointer.to_string(),
            reason: reason.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_reporter_keeps_order() {
        let reporter = CollectingReporter::new();
        reporter.warning("first");
        reporter.skipped("/a", "missing parent");
        reporter.error("second");

        assert_eq!(reporter.events().len(), 3);
        assert_eq!(reporter.warnings(), vec!["first".to_string()]);
        assert_eq!(reporter.errors(), vec!["second".to_string()]);
        assert_eq!(reporter.skipped_pointers(), vec!["/a".to_string()]);
    }

    #[test]
    fn test_null_reporter_ignores_skips() {
        // default `skipped` is a no-op
        NullReporter.skipped("/a", "reason");
        NullReporter.warning("ignored");
    }
}
