// ============================================================================
// mediareport-cli/src/commands/mod.rs
// ============================================================================
//
// COMMANDS: One submodule per subcommand
//
// Shared helpers load analysis results and build the format manager.

pub mod export;
pub mod extract;
pub mod formats;

use std::path::Path;

use mediareport_core::{DataResult, ExportConfig, ExportFormatManager};

use crate::error::{CliErrorContext, CliResult, CliStep};

/// Loads one serialized analysis result.
pub fn load_result(path: &Path) -> CliResult<DataResult> {
    DataResult::from_json_file(path).during(CliStep::LoadInput(path))
}

/// Manager with every built-in format.
pub fn default_manager(config: ExportConfig) -> CliResult<ExportFormatManager> {
    ExportFormatManager::with_defaults(config)
}
