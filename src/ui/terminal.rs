//! Terminal UI writing to stdout and stderr.

use super::theme::{should_use_colors, CheckTheme};
use super::{OutputMode, UserInterface};

/// UI that prints themed lines.
///
/// Progress and success go to stdout; warnings and errors go to stderr.
pub struct TerminalUI {
    mode: OutputMode,
    theme: CheckTheme,
}

impl TerminalUI {
    /// Create a terminal UI, choosing colors from the environment.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            CheckTheme::new()
        } else {
            CheckTheme::plain()
        };
        Self { mode, theme }
    }

    /// Create with an explicit theme.
    pub fn with_theme(mode: OutputMode, theme: CheckTheme) -> Self {
        Self { mode, theme }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_progress() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn detail(&mut self, msg: &str) {
        if self.mode.shows_details() {
            println!("{}", self.theme.format_detail(msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("{}", self.theme.format_warning(msg));
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }
}

/// Create the UI for a run.
pub fn create_ui(mode: OutputMode, no_color: bool) -> Box<dyn UserInterface> {
    if no_color {
        Box::new(TerminalUI::with_theme(mode, CheckTheme::plain()))
    } else {
        Box::new(TerminalUI::new(mode))
    }
}
