//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all output
//! for later assertion, in call order and per category.

use super::{OutputMode, UserInterface};

/// Category of a captured line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Message,
    Success,
    Detail,
    Warning,
    Error,
}

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    lines: Vec<(LineKind, String)>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    fn of_kind(&self, kind: LineKind) -> Vec<String> {
        self.lines
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, line)| line.clone())
            .collect()
    }

    /// All captured lines in call order.
    pub fn lines(&self) -> &[(LineKind, String)] {
        &self.lines
    }

    /// Get all captured progress messages.
    pub fn messages(&self) -> Vec<String> {
        self.of_kind(LineKind::Message)
    }

    /// Get all captured success messages.
    pub fn successes(&self) -> Vec<String> {
        self.of_kind(LineKind::Success)
    }

    /// Get all captured warning messages.
    pub fn warnings(&self) -> Vec<String> {
        self.of_kind(LineKind::Warning)
    }

    /// Get all captured error messages.
    pub fn errors(&self) -> Vec<String> {
        self.of_kind(LineKind::Error)
    }

    /// Check if a specific success was shown.
    pub fn has_success(&self, msg: &str) -> bool {
        self.successes().iter().any(|m| m.contains(msg))
    }

    /// Check if a specific warning was shown.
    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings().iter().any(|m| m.contains(msg))
    }

    /// Check if a specific error was shown.
    pub fn has_error(&self, msg: &str) -> bool {
        self.errors().iter().any(|m| m.contains(msg))
    }

    /// Check if a specific detail was shown.
    pub fn has_detail(&self, msg: &str) -> bool {
        self.of_kind(LineKind::Detail).iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.lines.push((LineKind::Message, msg.to_string()));
    }

    fn success(&mut self, msg: &str) {
        self.lines.push((LineKind::Success, msg.to_string()));
    }

    fn detail(&mut self, msg: &str) {
        self.lines.push((LineKind::Detail, msg.to_string()));
    }

    fn warning(&mut self, msg: &str) {
        self.lines.push((LineKind::Warning, msg.to_string()));
    }

    fn error(&mut self, msg: &str) {
        self.lines.push((LineKind::Error, msg.to_string()));
    }
}
