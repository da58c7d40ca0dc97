//! Formats writing the whole table document into a single file.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexSet;
use log::{debug, info};

use super::{ExportFormat, ExportedFiles, OutputNaming};
use crate::engine::EngineRegistry;
use crate::error::CoreResult;
use crate::model::DataResult;
use crate::report::json_header;
use crate::table::TableDocument;

/// Identifier used for table and column names in structured formats.
pub fn field_name(name: &str) -> String {
    json_header(name)
}

/// Serializes a [`TableDocument`] to one file.
pub trait TableSerializer: Send + Sync {
    fn format_name(&self) -> &'static str;

    fn format_long_name(&self) -> &'static str;

    fn format_description(&self) -> &'static str {
        ""
    }

    fn write_file(&self, document: &TableDocument, path: &Path) -> CoreResult<()>;

    /// Bytes of the file `file_name` would hold.
    fn to_bytes(&self, document: &TableDocument, file_name: &str) -> CoreResult<Vec<u8>>;
}

pub struct TableExportFormat<S> {
    serializer: S,
    registry: Arc<EngineRegistry>,
    file_name: String,
}

impl<S: TableSerializer> TableExportFormat<S> {
    pub fn new(serializer: S, registry: Arc<EngineRegistry>, file_name: &str) -> Self {
        Self {
            serializer,
            registry,
            file_name: file_name.to_string(),
        }
    }

    fn document(&self, result: &DataResult) -> CoreResult<Option<TableDocument>> {
        let document = self.registry.make_table_document(result)?;
        if document.is_empty() {
            debug!("No table to export to {} for {}", self.serializer.format_name(), result.source);
            return Ok(None);
        }
        Ok(Some(document))
    }
}

impl<S: TableSerializer> ExportFormat for TableExportFormat<S> {
    fn format_name(&self) -> &'static str {
        self.serializer.format_name()
    }

    fn format_long_name(&self) -> &'static str {
        self.serializer.format_long_name()
    }

    fn format_description(&self) -> &'static str {
        self.serializer.format_description()
    }

    fn internal_produced_file_names(&self) -> IndexSet<String> {
        IndexSet::from([self.file_name.clone()])
    }

    fn export_result(&self, result: &DataResult, naming: &OutputNaming) -> CoreResult<ExportedFiles> {
        let mut produced = ExportedFiles::new();
        let Some(document) = self.document(result)? else {
            return Ok(produced);
        };
        let path = naming.make_output_file(&self.file_name)?;
        info!("Export {} to {}", self.format_name(), path.display());
        self.serializer.write_file(&document, &path)?;
        produced.insert(self.format_name().to_string(), path);
        Ok(produced)
    }

    fn make_single_export(&self, result: &DataResult, internal_name: &str) -> CoreResult<Option<Vec<u8>>> {
        if internal_name != self.file_name {
            return Ok(None);
        }
        self.document(result)?
            .map(|document| self.serializer.to_bytes(&document, &self.file_name))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names() {
        assert_eq!(field_name("Scope/Channel"), "scope_channel");
        assert_eq!(field_name("Pts time"), "pts_time");
        assert_eq!(field_name("EBU R 128 Summary"), "ebu_r_128_summary");
        assert_eq!(field_name("Range (LRA)"), "range_lra");
    }
}
