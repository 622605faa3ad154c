//! Warning sinks
//!
//! The default sink prints to stderr in the familiar
//! `(raya:<pid>) [CODE] DeprecationWarning: message` shape.

use parking_lot::Mutex;
use raya_node_sdk::{ProcessWarning, WarningSink};

/// Writes warnings to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrWarningSink;

impl StderrWarningSink {
    /// Render a warning as printed
    pub fn format(warning: &ProcessWarning) -> String {
        format!("(raya:{}) {}", std::process::id(), warning)
    }
}

impl WarningSink for StderrWarningSink {
    fn emit(&self, warning: &ProcessWarning) {
        eprintln!("{}", Self::format(warning));
    }
}

/// Keeps every warning in memory, in delivery order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    warnings: Mutex<Vec<ProcessWarning>>,
}

impl RecordingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn warnings(&self) -> Vec<ProcessWarning> {
        self.warnings.lock().clone()
    }

    /// Messages recorded so far
    pub fn messages(&self) -> Vec<String> {
        self.warnings.lock().iter().map(|w| w.message.clone()).collect()
    }

    /// Number of warnings recorded with `code`
    pub fn count_code(&self, code: &str) -> usize {
        self.warnings
            .lock()
            .iter()
            .filter(|w| w.code.as_deref() == Some(code))
            .count()
    }

    /// Number of warnings recorded
    pub fn len(&self) -> usize {
        self.warnings.lock().len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.warnings.lock().is_empty()
    }

    /// Remove and return everything recorded
    pub fn take(&self) -> Vec<ProcessWarning> {
        std::mem::take(&mut *self.warnings.lock())
    }
}

impl WarningSink for RecordingSink {
    fn emit(&self, warning: &ProcessWarning) {
        self.warnings.lock().push(warning.clone());
    }
}
