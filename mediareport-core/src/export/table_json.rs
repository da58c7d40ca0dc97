//! JSON table document: `{"report": {"<table>": [{"<column>": value}]}}`.

use std::fs;
use std::path::Path;

use log::debug;
use serde_json::{Map, Value};

use super::table::TableSerializer;
use crate::error::{CoreResult, ExportContext};
use crate::report::json_float;
use crate::table::{Cell, Table, TableDocument};

pub struct JsonSerializer;

fn cell_value(cell: &Cell) -> Value {
    match cell {
        Cell::String(value) => Value::String(value.clone()),
        Cell::Float(value) => json_float(*value),
        Cell::Integer(value) => Value::from(*value),
        Cell::Long(value) => Value::from(*value),
        Cell::Null => Value::Null,
    }
}

fn table_value(table: &Table) -> Value {
    debug!("Add {} rows to \"{}\" table in JSON", table.rows().len(), table.name());
    let rows = (0..table.rows().len())
        .map(|row| {
            let object: Map<String, Value> = table
                .header()
                .iter()
                .enumerate()
                .map(|(col, name)| (name.clone(), cell_value(table.cell(row, col))))
                .collect();
            Value::Object(object)
        })
        .collect();
    Value::Array(rows)
}

fn document_value(document: &TableDocument) -> Value {
    let tables: Map<String, Value> = document
        .tables()
        .map(|table| (table.name().to_string(), table_value(table)))
        .collect();
    let mut root = Map::new();
    root.insert("report".into(), Value::Object(tables));
    Value::Object(root)
}

impl TableSerializer for JsonSerializer {
    fn format_name(&self) -> &'static str {
        "json"
    }

    fn format_long_name(&self) -> &'static str {
        "JSON document"
    }

    fn format_description(&self) -> &'static str {
        "one array of row objects per table"
    }

    fn write_file(&self, document: &TableDocument, path: &Path) -> CoreResult<()> {
        let bytes = serde_json::to_vec(&document_value(document)).export_context(path)?;
        fs::write(path, bytes).export_context(path)
    }

    fn to_bytes(&self, document: &TableDocument, file_name: &str) -> CoreResult<Vec<u8>> {
        serde_json::to_vec(&document_value(document)).export_context(Path::new(file_name))
    }
}
