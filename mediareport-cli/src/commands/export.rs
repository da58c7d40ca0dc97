// ============================================================================
// mediareport-cli/src/commands/export.rs
// ============================================================================
//
// EXPORT COMMAND: Full export of one or more analysis results
//
// Loads every analysis result, then runs the requested formats on each one
// in parallel and prints the files written.

use std::time::Instant;

use log::{debug, info};
use mediareport_core::ExportConfigBuilder;

use super::{default_manager, load_result};
use crate::cli::ExportArgs;
use crate::error::{CliErrorContext, CliResult, CliStep};
use crate::progress::export_progress;
use crate::terminal::{print_produced, print_section, print_success};

pub fn run_export(args: ExportArgs) -> CliResult<()> {
    let start = Instant::now();

    let mut builder = ExportConfigBuilder::new()
        .export_directory(args.output_dir.clone())
        .add_source_ext(args.add_source_ext);
    if let Some(base_name) = &args.base_name {
        builder = builder.base_file_name(base_name.as_str());
    }
    let manager = default_manager(builder.build())?;

    let formats: Vec<String> = if args.formats.is_empty() {
        manager.registered().keys().map(|name| name.to_string()).collect()
    } else {
        args.formats.clone()
    };
    // Fail on an unknown format before reading any input
    for name in &formats {
        manager.get(name).during(CliStep::SelectFormat(name))?;
    }
    debug!("Formats: {}", formats.join(", "));

    let results = args
        .inputs
        .iter()
        .map(|path| load_result(path))
        .collect::<CliResult<Vec<_>>>()?;
    info!("{} analysis result(s) loaded", results.len());

    let progress = export_progress(results.len());
    let produced = manager
        .export_batch(&formats, &results, |result| {
            progress.set_message(result.source_name().to_string());
            progress.inc(1);
        })
        .during(CliStep::ExportTo(&args.output_dir))?;
    progress.finish_and_clear();

    let mut total = 0;
    for (result, files) in results.iter().zip(&produced) {
        print_section(&result.source);
        for (name, path) in files {
            print_produced(name, path);
        }
        total += files.len();
    }
    print_success(&format!(
        "{total} file(s) exported in {:.2}s",
        start.elapsed().as_secs_f64()
    ));
    Ok(())
}
