// ============================================================================
// mediareport-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Failure context for the command steps
//
// The CLI reuses the core error type. A failing step (picking a format,
// loading an input, exporting to the output directory, writing an extracted
// artifact, setting up logging) prefixes the core message with what the
// command was doing, so the single line printed by main is self-explanatory.

// ---- Internal crate imports ----
use mediareport_core::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::fmt;
use std::path::Path;

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// What a command was doing when a core call failed.
#[derive(Debug, Clone, Copy)]
pub enum CliStep<'a> {
    SelectFormat(&'a str),
    LoadInput(&'a Path),
    ExportTo(&'a Path),
    WriteArtifact(&'a Path),
    WriteStdout,
    SetupLogging(&'a Path),
}

impl fmt::Display for CliStep<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliStep::SelectFormat(name) => write!(f, "Can't use export format {name}"),
            CliStep::LoadInput(path) => write!(f, "Can't load analysis result {}", path.display()),
            CliStep::ExportTo(dir) => write!(f, "Can't export to {}", dir.display()),
            CliStep::WriteArtifact(path) => write!(f, "Can't write {}", path.display()),
            CliStep::WriteStdout => f.write_str("Can't write to stdout"),
            CliStep::SetupLogging(dir) => write!(f, "Can't set up logging in {}", dir.display()),
        }
    }
}

/// Tags a failure with the step it happened in.
pub trait CliErrorContext<T> {
    fn during(self, step: CliStep<'_>) -> CliResult<T>;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn during(self, step: CliStep<'_>) -> CliResult<T> {
        self.map_err(|e| CoreError::OperationFailed(format!("{step}: {}", e.into())))
    }
}
