//! The report as a single HTML page or JSON tree.
//!
//! Besides the whole document, each report engine's part can be extracted
//! alone under `<engine name>.html` or `<engine name>.json`.

use std::fs;
use std::sync::Arc;

use indexmap::IndexSet;
use log::info;

use super::{ExportFormat, ExportedFiles, OutputNaming};
use crate::engine::EngineRegistry;
use crate::error::{CoreResult, ExportContext};
use crate::model::DataResult;
use crate::report::{ReportDocument, to_html, to_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Html,
    Json,
}

impl ReportKind {
    /// Key of the produced file in the export result map.
    fn produced_key(self) -> &'static str {
        match self {
            ReportKind::Html => "html_report",
            ReportKind::Json => "json_report",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ReportKind::Html => "html",
            ReportKind::Json => "json",
        }
    }
}

pub struct ReportExportFormat {
    kind: ReportKind,
    registry: Arc<EngineRegistry>,
    file_name: String,
}

impl ReportExportFormat {
    pub fn new(kind: ReportKind, registry: Arc<EngineRegistry>, file_name: &str) -> Self {
        Self {
            kind,
            registry,
            file_name: file_name.to_string(),
        }
    }

    fn render(&self, document: &ReportDocument) -> CoreResult<Vec<u8>> {
        Ok(match self.kind {
            ReportKind::Html => to_html(document).into_bytes(),
            ReportKind::Json => serde_json::to_vec_pretty(&to_json(document))?,
        })
    }

    fn engine_part_name(&self, engine_name: &str) -> String {
        format!("{engine_name}.{}", self.kind.extension())
    }

    /// Report of the single engine named by `internal_name`, if any.
    fn render_engine_part(&self, result: &DataResult, internal_name: &str) -> CoreResult<Option<Vec<u8>>> {
        let Some(engine_name) = internal_name
            .strip_suffix(self.kind.extension())
            .and_then(|name| name.strip_suffix('.'))
        else {
            return Ok(None);
        };
        match self.registry.make_engine_report(result, engine_name)? {
            Some(document) if !(document.is_empty() && document.about().is_empty()) => {
                self.render(&document).map(Some)
            }
            _ => Ok(None),
        }
    }
}

impl ExportFormat for ReportExportFormat {
    fn format_name(&self) -> &'static str {
        match self.kind {
            ReportKind::Html => "report",
            ReportKind::Json => "jsonreport",
        }
    }

    fn format_long_name(&self) -> &'static str {
        match self.kind {
            ReportKind::Html => "HTML document report",
            ReportKind::Json => "JSON document report",
        }
    }

    fn format_description(&self) -> &'static str {
        match self.kind {
            ReportKind::Html => "with file and signal stats, event detection, codecs, GOP stats...",
            ReportKind::Json => "with the same informations as the HTML report",
        }
    }

    fn internal_produced_file_names(&self) -> IndexSet<String> {
        std::iter::once(self.file_name.clone())
            .chain(
                self.registry
                    .report_engine_names()
                    .into_iter()
                    .map(|name| self.engine_part_name(name)),
            )
            .collect()
    }

    fn export_result(&self, result: &DataResult, naming: &OutputNaming) -> CoreResult<ExportedFiles> {
        let document = self.registry.make_report_document(result)?;
        let bytes = self.render(&document)?;
        let path = naming.make_output_file(&self.file_name)?;
        info!("Export {} to {}", self.format_name(), path.display());
        fs::write(&path, bytes).export_context(&path)?;
        Ok(ExportedFiles::from([(self.kind.produced_key().to_string(), path)]))
    }

    fn make_single_export(&self, result: &DataResult, internal_name: &str) -> CoreResult<Option<Vec<u8>>> {
        if internal_name == self.file_name {
            let document = self.registry.make_report_document(result)?;
            return self.render(&document).map(Some);
        }
        self.render_engine_part(result, internal_name)
    }
}
