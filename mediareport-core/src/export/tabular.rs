//! Delimited text formats: one file per engine document.

use std::sync::Arc;

use indexmap::IndexSet;

use super::{ExportFormat, ExportedFiles, OutputNaming};
use crate::engine::EngineRegistry;
use crate::error::CoreResult;
use crate::model::DataResult;
use crate::table::TabularDialect;

pub struct TabularExportFormat {
    dialect: TabularDialect,
    registry: Arc<EngineRegistry>,
}

impl TabularExportFormat {
    pub fn new(dialect: TabularDialect, registry: Arc<EngineRegistry>) -> Self {
        Self { dialect, registry }
    }

    /// Accepts a base name (`events`) or a file name (`events.txt`).
    fn base_name<'a>(&self, internal_name: &'a str) -> &'a str {
        internal_name
            .strip_suffix(self.dialect.extension())
            .and_then(|name| name.strip_suffix('.'))
            .unwrap_or(internal_name)
    }
}

impl ExportFormat for TabularExportFormat {
    fn format_name(&self) -> &'static str {
        self.dialect.format_name()
    }

    fn format_long_name(&self) -> &'static str {
        self.dialect.format_long_name()
    }

    fn format_description(&self) -> &'static str {
        self.dialect.format_description()
    }

    fn internal_produced_file_names(&self) -> IndexSet<String> {
        self.registry
            .tabular_names()
            .into_iter()
            .map(|name| format!("{name}.{}", self.dialect.extension()))
            .collect()
    }

    fn export_result(&self, result: &DataResult, naming: &OutputNaming) -> CoreResult<ExportedFiles> {
        let mut produced = ExportedFiles::new();
        // Keyed by file name so the three dialects can share one result map
        for document in self.registry.make_tabular_documents(result, self.dialect)? {
            if let Some(path) = document.write(naming)? {
                produced.insert(document.file_name(), path);
            }
        }
        Ok(produced)
    }

    fn make_single_export(&self, result: &DataResult, internal_name: &str) -> CoreResult<Option<Vec<u8>>> {
        match self
            .registry
            .make_single_tabular(result, self.dialect, self.base_name(internal_name))?
        {
            Some(document) => document.to_bytes(),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;

    fn format(dialect: TabularDialect) -> TabularExportFormat {
        TabularExportFormat::new(dialect, Arc::new(EngineRegistry::with_defaults(&ExportConfig::default())))
    }

    #[test]
    fn internal_names_carry_the_extension() {
        let names = format(TabularDialect::CsvFr).internal_produced_file_names();
        assert!(names.contains("media-summary.fr.csv"));
        assert!(names.contains("about.fr.csv"));
    }

    #[test]
    fn base_name_from_file_name() {
        let csvfr = format(TabularDialect::CsvFr);
        assert_eq!(csvfr.base_name("events.fr.csv"), "events");
        assert_eq!(csvfr.base_name("events"), "events");
        assert_eq!(format(TabularDialect::Txt).base_name("events.csv"), "events.csv");
    }

    #[test]
    fn produced_files_are_keyed_by_file_name() {
        let temp = tempfile::tempdir().unwrap();
        let config = crate::config::ExportConfigBuilder::new()
            .export_directory(temp.path().to_path_buf())
            .build();
        let naming = OutputNaming::new(&config, "clip.mkv");
        let produced = format(TabularDialect::CsvFr)
            .export_result(&DataResult::default(), &naming)
            .unwrap();
        assert_eq!(produced.keys().collect::<Vec<_>>(), vec!["about.fr.csv"]);
        assert!(produced["about.fr.csv"].is_file());
    }

    #[test]
    fn about_is_always_available() {
        let bytes = format(TabularDialect::Txt)
            .make_single_export(&DataResult::default(), "about.txt")
            .unwrap()
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("Type\tValue\n"));
        assert!(text.contains("Report created by\tmediareport "));
    }
}
