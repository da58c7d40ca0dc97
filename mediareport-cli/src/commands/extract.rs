// ============================================================================
// mediareport-cli/src/commands/extract.rs
// ============================================================================
//
// EXTRACT COMMAND: One named artifact of one format
//
// The artifact goes to the output file or to stdout; a format with nothing
// for the name prints "no content" and still succeeds.

use std::fs;
use std::io::{self, Write};

use log::{info, warn};
use mediareport_core::ExportConfig;

use super::{default_manager, load_result};
use crate::cli::ExtractArgs;
use crate::error::{CliErrorContext, CliResult, CliStep};

/// Writes one artifact to the output file or to stdout. A format with no
/// content for the name is not an error.
pub fn run_extract(args: ExtractArgs) -> CliResult<()> {
    let manager = default_manager(ExportConfig::default())?;
    manager.get(&args.format).during(CliStep::SelectFormat(&args.format))?;
    let result = load_result(&args.input)?;

    let Some(bytes) = manager.make_single_export(&args.format, &result, &args.name)? else {
        warn!("{} from {}: no content", args.name, args.format);
        eprintln!("no content");
        return Ok(());
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &bytes).during(CliStep::WriteArtifact(path))?;
            info!("{} written to {} ({} bytes)", args.name, path.display(), bytes.len());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes).during(CliStep::WriteStdout)?;
            stdout.flush().during(CliStep::WriteStdout)?;
        }
    }
    Ok(())
}
