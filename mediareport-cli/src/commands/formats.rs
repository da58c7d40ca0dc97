// ============================================================================
// mediareport-cli/src/commands/formats.rs
// ============================================================================
//
// FORMATS COMMAND: Lists every registered export format
//
// Each entry shows the long name, the description and the files the format
// can produce on its own.

use mediareport_core::ExportConfig;

use super::default_manager;
use crate::error::CliResult;
use crate::terminal::{print_section, print_status};

pub fn run_formats() -> CliResult<()> {
    let manager = default_manager(ExportConfig::default())?;
    for format in manager.formats() {
        print_section(&format!("{} ({})", format.format_name(), format.format_long_name()));
        let description = format.format_description();
        if !description.is_empty() {
            print_status("About", description);
        }
        let names = format.internal_produced_file_names();
        if !names.is_empty() {
            print_status("Produces", names.into_iter().collect::<Vec<_>>().join(", "));
        }
    }
    Ok(())
}
