//! UI Theme - colors and column widths
//!
//! Every color and width the listings and messages use lives here so the
//! output stays consistent across commands.

use crossterm::style::Color;

/// Default theme for jem output
#[derive(Debug, Clone, Default)]
pub struct Theme {
    /// Colors for different UI elements
    pub colors: ColorScheme,
    /// Message prefixes and list markers
    pub marks: Marks,
    /// Listing column widths
    pub layout: Layout,
}

/// Color scheme for UI elements
#[derive(Debug, Clone)]
pub struct ColorScheme {
    /// VM and package names
    pub name: Color,
    /// Descriptions, paths and other secondary text
    pub secondary: Color,
    /// The active VM marker and row
    pub active: Color,
    /// Informational messages
    pub info: Color,
    /// Warnings and the build-only flag
    pub warning: Color,
    /// Errors
    pub error: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            name: Color::Cyan,
            secondary: Color::DarkGrey,
            active: Color::Green,
            info: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }
}

/// Message prefixes and list markers
#[derive(Debug, Clone)]
pub struct Marks {
    pub info: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
    /// Marks the active VM in `list-vms`
    pub active: &'static str,
    /// Appended to build-only VMs in `list-vms`
    pub build_only: &'static str,
}

impl Default for Marks {
    fn default() -> Self {
        Self {
            info: ">>> ",
            warning: "!!! WARNING: ",
            error: "!!! ERROR: ",
            active: "*",
            build_only: "(build only)",
        }
    }
}

/// Listing column widths
#[derive(Debug, Clone)]
pub struct Layout {
    /// Width of the VM number column
    pub index_width: usize,
    /// Width allocated for VM names
    pub vm_width: usize,
    /// Width allocated for package names, brackets included
    pub package_width: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            index_width: 3,
            vm_width: 28,
            package_width: 26,
        }
    }
}

/// Prefix `msg` with `prefix`, lining continuation lines up under the
/// first line's text.
pub fn indent(prefix: &str, msg: &str) -> String {
    let pad = " ".repeat(prefix.chars().count());
    let mut out = String::with_capacity(prefix.len() + msg.len());
    for (i, line) in msg.lines().enumerate() {
        if i == 0 {
            out.push_str(prefix);
        } else {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(&pad);
            }
        }
        out.push_str(line);
    }
    if out.is_empty() {
        out.push_str(prefix);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_single_line() {
        assert_eq!(indent(">>> ", "hello"), ">>> hello");
    }

    #[test]
    fn test_indent_multi_line() {
        assert_eq!(
            indent("!!! ERROR: ", "first\nsecond"),
            "!!! ERROR: first\n           second"
        );
    }

    #[test]
    fn test_indent_empty_message() {
        assert_eq!(indent(">>> ", ""), ">>> ");
    }

    #[test]
    fn test_theme_defaults() {
        let theme = Theme::default();
        assert_eq!(theme.marks.active, "*");
        assert_eq!(theme.marks.error, "!!! ERROR: ");
        assert_eq!(theme.layout.index_width, 3);
    }
}
