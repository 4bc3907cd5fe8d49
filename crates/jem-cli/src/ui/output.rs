//! Message sink used by every command.
//!
//! Results go to stdout uncolored so they can be captured by scripts.
//! Errors and warnings go to stderr. Any reported error marks the run as
//! failed without stopping it.

use super::theme::{Theme, indent};
use crossterm::style::{Color, Stylize};
use jem_core::Reporter;
use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct Output {
    theme: Theme,
    color: bool,
    failed: AtomicBool,
}

impl Output {
    /// Colors are used only when requested and stdout is a terminal.
    pub fn new(color: bool) -> Self {
        Self {
            theme: Theme::default(),
            color: color && std::io::stdout().is_terminal(),
            failed: AtomicBool::new(false),
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Whether any error has been reported.
    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }

    /// `text` in `color` when colors are on.
    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    /// Print one result line to stdout.
    pub fn line(&self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{text}");
    }

    fn message(&self, prefix: &str, msg: &str, color: Color, to_stderr: bool) {
        let text = indent(prefix, msg);
        let text = if self.color {
            text.with(color).bold().to_string()
        } else {
            text
        };
        if to_stderr {
            let _ = writeln!(std::io::stderr().lock(), "{text}");
        } else {
            self.line(&text);
        }
    }
}

impl Reporter for Output {
    fn info(&self, msg: &str) {
        self.message(self.theme.marks.info, msg, self.theme.colors.info, false);
    }

    fn warning(&self, msg: &str) {
        self.message(self.theme.marks.warning, msg, self.theme.colors.warning, true);
    }

    fn error(&self, msg: &str) {
        self.failed.store(true, Ordering::Relaxed);
        self.message(self.theme.marks.error, msg, self.theme.colors.error, true);
    }
}
