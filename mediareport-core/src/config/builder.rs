// ============================================================================
// mediareport-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for ExportConfig
//
// Fluent construction of ExportConfig. Every setter is optional; unset
// values fall back to the DEFAULT_* constants of the parent module.

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::ExportConfig;

/// Builder for [`ExportConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    /// Creates a builder holding the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory receiving the exported files.
    #[must_use]
    pub fn export_directory(mut self, directory: PathBuf) -> Self {
        self.config.export_directory = directory;
        self
    }

    /// Sets the name placed before every produced suffix.
    #[must_use]
    pub fn base_file_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.config.base_file_name = (!name.is_empty()).then_some(name);
        self
    }

    #[must_use]
    pub fn add_source_ext(mut self, add: bool) -> Self {
        self.config.add_source_ext = add;
        self
    }

    #[must_use]
    pub fn batch_mode(mut self, batch: bool) -> Self {
        self.config.batch_mode = batch;
        self
    }

    #[must_use]
    pub fn html_report_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.html_report_file_name = name.into();
        self
    }

    #[must_use]
    pub fn json_report_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.json_report_file_name = name.into();
        self
    }

    #[must_use]
    pub fn json_table_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.json_table_file_name = name.into();
        self
    }

    #[must_use]
    pub fn xml_table_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.xml_table_file_name = name.into();
        self
    }

    #[must_use]
    pub fn xlsx_table_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.xlsx_table_file_name = name.into();
        self
    }

    #[must_use]
    pub fn sqlite_table_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.sqlite_table_file_name = name.into();
        self
    }

    #[must_use]
    pub fn ods_table_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.ods_table_file_name = name.into();
        self
    }

    #[must_use]
    pub fn ffprobe_xml_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.ffprobe_xml_file_name = name.into();
        self
    }

    #[must_use]
    pub fn significant_snapshot_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.significant_snapshot_file_name = name.into();
        self
    }

    #[must_use]
    pub fn snapshot_strip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.snapshot_strip_prefix = prefix.into();
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ExportConfig {
        self.config
    }
}
