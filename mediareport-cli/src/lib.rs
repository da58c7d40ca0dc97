// ============================================================================
// mediareport-cli/src/lib.rs
// ============================================================================
//
// MEDIAREPORT CLI: Library portion
//
// Argument definitions and command logic, shared by the binary and the
// integration tests.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod progress;
pub mod terminal;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, ExportArgs, ExtractArgs};
pub use commands::export::run_export;
pub use commands::extract::run_extract;
pub use commands::formats::run_formats;
