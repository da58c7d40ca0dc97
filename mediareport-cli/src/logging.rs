// ============================================================================
// mediareport-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console or file logging for the CLI
//
// Console logging uses env_logger with a compact formatter; RUST_LOG still
// overrides the level chosen by --verbose. With --log-dir, records go to a
// timestamped log4rs file instead, so the console only shows the command's
// own output.

use std::io::Write;
use std::path::{Path, PathBuf};

use log::LevelFilter;

use crate::error::{CliErrorContext, CliResult, CliStep};

/// Log level selected by the `--verbose` flag.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose { LevelFilter::Debug } else { LevelFilter::Info }
}

/// Installs the console logger.
pub fn init_console_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level_for(verbose))
        .parse_default_env()
        .format(|buf, record| {
            let level_style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                record.level(),
                record.args()
            )
        });
    // A logger may already be installed by tests
    let _ = builder.try_init();
}

/// Installs a file logger in `log_dir` and returns the log file path.
pub fn init_file_logging(log_dir: &Path, verbose: bool) -> CliResult<PathBuf> {
    let log_file = mediareport_core::logging::session_log_file(log_dir);
    mediareport_core::logging::setup_file_logging(&log_file, level_for(verbose))
        .map_err(|e| mediareport_core::CoreError::Config(e.to_string()))
        .during(CliStep::SetupLogging(log_dir))?;
    Ok(log_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_selects_debug() {
        assert_eq!(level_for(true), LevelFilter::Debug);
        assert_eq!(level_for(false), LevelFilter::Info);
    }
}
