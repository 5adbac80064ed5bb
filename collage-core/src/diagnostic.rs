//! Bounded log of user-visible failures.
//!
//! Every entry is also emitted as a `tracing` event at the matching level.

use std::collections::VecDeque;

/// Entries kept before the oldest is dropped.
pub const DIAGNOSTIC_CAPACITY: usize = 64;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    /// The action was refused; nothing changed.
    Warning,
    /// The action failed; nothing changed.
    Error,
}

/// One reported failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity.
    pub level: DiagnosticLevel,
    /// Human-readable description.
    pub message: String,
}

/// Ring buffer of recent diagnostics.
#[derive(Debug)]
pub struct Diagnostics {
    entries: VecDeque<Diagnostic>,
    capacity: usize,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::with_capacity(DIAGNOSTIC_CAPACITY)
    }
}

impl Diagnostics {
    /// A log holding at most `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Record a warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.push(DiagnosticLevel::Warning, message);
    }

    /// Record an error.
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{message}");
        self.push(DiagnosticLevel::Error, message);
    }

    fn push(&mut self, level: DiagnosticLevel, message: String) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Diagnostic { level, message });
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Most recent entry.
    #[must_use]
    pub fn last(&self) -> Option<&Diagnostic> {
        self.entries.back()
    }

    /// Number of entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
