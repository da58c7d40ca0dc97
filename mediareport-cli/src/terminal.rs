// ============================================================================
// mediareport-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: Styled lines for command results
//
// Command results go to stdout so they can be piped; diagnostics go through
// the log facade. Styling is dropped by `console` when stdout is not a tty.

use std::fmt::Display;
use std::path::Path;

use console::style;

/// Styling constants for terminal output
pub mod styling {
    pub const SUCCESS_SYMBOL: &str = "✓";
    pub const ERROR_SYMBOL: &str = "✗";
    pub const SECTION_PREFIX: &str = "===== ";
    pub const SECTION_SUFFIX: &str = " =====";
    pub const STATUS_INDENT: &str = "  ";
}

use styling::*;

pub fn print_section(title: &str) {
    println!("{}", style(format!("{SECTION_PREFIX}{title}{SECTION_SUFFIX}")).cyan().bold());
}

/// One produced artifact: its key and where it was written.
pub fn print_produced(name: &str, path: &Path) {
    println!("{STATUS_INDENT}{:<24} {}", style(name).bold(), path.display());
}

/// Label/value line of a listing.
pub fn print_status(label: &str, value: impl Display) {
    println!("{STATUS_INDENT}{:<12} {}", style(label).bold(), value);
}

pub fn print_success(message: &str) {
    println!("{} {}", style(SUCCESS_SYMBOL).green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", style(ERROR_SYMBOL).red().bold(), style(message).red());
}
