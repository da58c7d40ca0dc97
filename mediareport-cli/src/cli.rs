// ============================================================================
// mediareport-cli/src/cli.rs
// ============================================================================
//
// COMMAND LINE INTERFACE: Argument Definitions
//
// Defines the command-line argument structures using clap derive. Each
// subcommand has its own args struct consumed by a `run_*` function in
// the commands module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

// ---- CLI Argument Definition ----

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "mediareport: media analysis exporter",
    long_about = "Exports media analysis results to delimited text, XML, JSON, XLSX, ODS, SQLite and HTML reports."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug level logs)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Write logs to a timestamped file in this directory instead of the console
    #[arg(long, global = true, value_name = "LOG_DIR", env = "MEDIAREPORT_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Exports analysis results to one or more formats
    Export(ExportArgs),

    /// Extracts a single artifact of one format
    Extract(ExtractArgs),

    /// Lists the registered export formats
    Formats,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Analysis result files (JSON)
    #[arg(short = 'i', long = "input", required = true, num_args = 1.., value_name = "RESULT_JSON")]
    pub inputs: Vec<PathBuf>,

    /// Directory where exported files will be written
    #[arg(short = 'o', long = "output", value_name = "OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Formats to export (defaults to every registered format)
    #[arg(short = 'f', long = "format", value_delimiter = ',', value_name = "FORMAT")]
    pub formats: Vec<String>,

    /// Base name put in front of every exported file name
    #[arg(long, value_name = "NAME")]
    pub base_name: Option<String>,

    /// Keep the source file extension in batch file name prefixes
    #[arg(long, default_value_t = false)]
    pub add_source_ext: bool,
}

#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Analysis result file (JSON)
    #[arg(short = 'i', long = "input", required = true, value_name = "RESULT_JSON")]
    pub input: PathBuf,

    /// Format producing the artifact
    #[arg(short = 'f', long = "format", required = true, value_name = "FORMAT")]
    pub format: String,

    /// Internal name of the artifact (see `mediareport formats`)
    #[arg(short = 'n', long = "name", required = true, value_name = "NAME")]
    pub name: String,

    /// Output file (defaults to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}
