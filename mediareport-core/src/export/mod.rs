//! Export formats and the manager dispatching to them.
//!
//! A format turns one [`DataResult`] into files (full export) or into the
//! bytes of one named artifact (single export). Formats share one
//! [`EngineRegistry`], so they all see the same engines in the same order.

pub mod output;

mod ffprobe_xml;
mod ods;
mod report;
mod snapshots;
mod sqlite;
mod table;
mod table_json;
mod tabular;
mod xlsx;
mod xml;

use std::path::PathBuf;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use log::{debug, error, info};
use rayon::prelude::*;

pub use ffprobe_xml::FfprobeXmlExportFormat;
pub use ods::OdsSerializer;
pub use output::OutputNaming;
pub use report::{ReportExportFormat, ReportKind};
pub use snapshots::SnapshotExportFormat;
pub use sqlite::SqliteSerializer;
pub use table::{TableExportFormat, TableSerializer, field_name};
pub use table_json::JsonSerializer;
pub use tabular::TabularExportFormat;
pub use xlsx::{XlsxSerializer, sheet_name};
pub use xml::XmlSerializer;

use crate::config::ExportConfig;
use crate::engine::EngineRegistry;
use crate::error::{CoreError, CoreResult};
use crate::model::DataResult;
use crate::table::TabularDialect;

/// Produced artifact name mapped to the file written for it.
pub type ExportedFiles = IndexMap<String, PathBuf>;

pub trait ExportFormat: Send + Sync {
    fn format_name(&self) -> &'static str;

    fn format_long_name(&self) -> &'static str;

    fn format_description(&self) -> &'static str {
        ""
    }

    /// Names accepted by [`ExportFormat::make_single_export`].
    fn internal_produced_file_names(&self) -> IndexSet<String>;

    fn export_result(&self, result: &DataResult, naming: &OutputNaming) -> CoreResult<ExportedFiles>;

    /// Bytes of one artifact, `None` when the result has nothing for it.
    fn make_single_export(&self, result: &DataResult, internal_name: &str) -> CoreResult<Option<Vec<u8>>>;
}

/// Ordered registry of export formats.
pub struct ExportFormatManager {
    config: ExportConfig,
    formats: IndexMap<String, Box<dyn ExportFormat>>,
}

impl ExportFormatManager {
    /// An empty manager.
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            formats: IndexMap::new(),
        }
    }

    /// Every built-in format, sharing the default engines.
    pub fn with_defaults(config: ExportConfig) -> CoreResult<Self> {
        let registry = Arc::new(EngineRegistry::with_defaults(&config));
        let mut manager = Self::new(config);
        manager.register_defaults(registry)?;
        Ok(manager)
    }

    fn register_defaults(&mut self, registry: Arc<EngineRegistry>) -> CoreResult<()> {
        let config = self.config.clone();
        for dialect in TabularDialect::ALL {
            self.register(Box::new(TabularExportFormat::new(dialect, Arc::clone(&registry))))?;
        }
        self.register(Box::new(TableExportFormat::new(
            XmlSerializer,
            Arc::clone(&registry),
            &config.xml_table_file_name,
        )))?;
        self.register(Box::new(TableExportFormat::new(
            JsonSerializer,
            Arc::clone(&registry),
            &config.json_table_file_name,
        )))?;
        self.register(Box::new(TableExportFormat::new(
            XlsxSerializer,
            Arc::clone(&registry),
            &config.xlsx_table_file_name,
        )))?;
        self.register(Box::new(TableExportFormat::new(
            OdsSerializer,
            Arc::clone(&registry),
            &config.ods_table_file_name,
        )))?;
        self.register(Box::new(TableExportFormat::new(
            SqliteSerializer,
            Arc::clone(&registry),
            &config.sqlite_table_file_name,
        )))?;
        self.register(Box::new(ReportExportFormat::new(
            ReportKind::Html,
            Arc::clone(&registry),
            &config.html_report_file_name,
        )))?;
        self.register(Box::new(ReportExportFormat::new(
            ReportKind::Json,
            Arc::clone(&registry),
            &config.json_report_file_name,
        )))?;
        self.register(Box::new(FfprobeXmlExportFormat::new(&config.ffprobe_xml_file_name)))?;
        self.register(Box::new(SnapshotExportFormat::new(registry)))
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Adds a format under its own name.
    pub fn register(&mut self, format: Box<dyn ExportFormat>) -> CoreResult<()> {
        let name = format.format_name();
        if self.formats.contains_key(name) {
            return Err(CoreError::DuplicateFormat(name.to_string()));
        }
        debug!("Add {name} to internal list");
        self.formats.insert(name.to_string(), format);
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    pub fn get(&self, name: &str) -> CoreResult<&dyn ExportFormat> {
        self.formats
            .get(name)
            .map(|format| format.as_ref())
            .ok_or_else(|| CoreError::UnknownFormat(name.to_string()))
    }

    /// Format name to long name, in registration order.
    pub fn registered(&self) -> IndexMap<&str, &'static str> {
        self.formats
            .iter()
            .map(|(name, format)| (name.as_str(), format.format_long_name()))
            .collect()
    }

    pub fn formats(&self) -> impl Iterator<Item = &dyn ExportFormat> {
        self.formats.values().map(|format| format.as_ref())
    }

    /// Runs each named format for one result. The produced maps are merged
    /// in the order the formats are given.
    pub fn export<S: AsRef<str>>(&self, names: &[S], result: &DataResult) -> CoreResult<ExportedFiles> {
        self.export_with(&self.config, names, result)
    }

    fn export_with<S: AsRef<str>>(
        &self,
        config: &ExportConfig,
        names: &[S],
        result: &DataResult,
    ) -> CoreResult<ExportedFiles> {
        let formats = names
            .iter()
            .map(|name| self.get(name.as_ref()))
            .collect::<CoreResult<Vec<_>>>()?;
        let naming = OutputNaming::new(config, &result.source);
        let mut produced = ExportedFiles::new();
        for format in formats {
            debug!("Export {} for {}", format.format_name(), result.source);
            let files = format.export_result(result, &naming).inspect_err(|e| {
                error!("Can't export {} for {}: {}", format.format_name(), result.source, e);
            })?;
            produced.extend(files);
        }
        info!("{} file(s) exported for {}", produced.len(), result.source);
        Ok(produced)
    }

    /// Exports several results, one rayon task per result. With more than
    /// one result, file names carry the source name so they can't collide.
    pub fn export_batch<S, F>(&self, names: &[S], results: &[DataResult], on_done: F) -> CoreResult<Vec<ExportedFiles>>
    where
        S: AsRef<str> + Sync,
        F: Fn(&DataResult) + Sync,
    {
        let config = if results.len() > 1 {
            self.config.for_batch()
        } else {
            self.config.clone()
        };
        results
            .par_iter()
            .map(|result| {
                let produced = self.export_with(&config, names, result)?;
                on_done(result);
                Ok(produced)
            })
            .collect()
    }

    /// Bytes of one artifact of one format.
    pub fn make_single_export(
        &self,
        format_name: &str,
        result: &DataResult,
        internal_name: &str,
    ) -> CoreResult<Option<Vec<u8>>> {
        let format = self.get(format_name)?;
        let bytes = format.make_single_export(result, internal_name)?;
        if bytes.is_none() {
            debug!("No {internal_name} content from {format_name} for {}", result.source);
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy(&'static str);

    impl ExportFormat for Dummy {
        fn format_name(&self) -> &'static str {
            self.0
        }

        fn format_long_name(&self) -> &'static str {
            "Dummy format"
        }

        fn internal_produced_file_names(&self) -> IndexSet<String> {
            IndexSet::new()
        }

        fn export_result(&self, _: &DataResult, naming: &OutputNaming) -> CoreResult<ExportedFiles> {
            Ok(IndexMap::from([(self.0.to_string(), PathBuf::from(naming.file_name(self.0)))]))
        }

        fn make_single_export(&self, _: &DataResult, _: &str) -> CoreResult<Option<Vec<u8>>> {
            Ok(None)
        }
    }

    #[test]
    fn duplicate_and_unknown_names() {
        let mut manager = ExportFormatManager::new(ExportConfig::default());
        manager.register(Box::new(Dummy("a"))).unwrap();
        let err = manager.register(Box::new(Dummy("a"))).unwrap_err();
        assert_eq!(err.to_string(), "a was previously registered");
        let err = manager.get("pdf").err().unwrap();
        assert_eq!(err.to_string(), "Can't found pdf format");
    }

    #[test]
    fn defaults_are_ordered() {
        let manager = ExportFormatManager::with_defaults(ExportConfig::default()).unwrap();
        let names: Vec<_> = manager.registered().keys().copied().collect();
        assert_eq!(
            names,
            vec![
                "txt",
                "csv",
                "csvfr",
                "xml",
                "json",
                "xlsx",
                "ods",
                "sqlite",
                "report",
                "jsonreport",
                "ffprobexml",
                "snapshots"
            ]
        );
        assert_eq!(manager.registered()["sqlite"], "SQLite database");
    }

    #[test]
    fn export_merges_in_order() {
        let mut manager = ExportFormatManager::new(ExportConfig::default());
        manager.register(Box::new(Dummy("b"))).unwrap();
        manager.register(Box::new(Dummy("a"))).unwrap();
        let produced = manager.export(&["a", "b"], &DataResult::default()).unwrap();
        let keys: Vec<_> = produced.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn batch_prefixes_each_source() {
        let mut manager = ExportFormatManager::new(ExportConfig::default());
        manager.register(Box::new(Dummy("x.txt"))).unwrap();
        let results: Vec<_> = ["/m/one.mkv", "/m/two.mkv"]
            .iter()
            .map(|source| DataResult {
                source: source.to_string(),
                ..Default::default()
            })
            .collect();
        let done = std::sync::atomic::AtomicUsize::new(0);
        let produced = manager
            .export_batch(&["x.txt"], &results, |_| {
                done.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            })
            .unwrap();
        assert_eq!(done.into_inner(), 2);
        assert_eq!(produced[0]["x.txt"], PathBuf::from("one_x.txt"));
        assert_eq!(produced[1]["x.txt"], PathBuf::from("two_x.txt"));
    }
}
