//! XLSX workbook, one sheet per table.

use std::collections::HashSet;
use std::path::Path;

use log::debug;
use rust_xlsxwriter::{Workbook, XlsxError};

use super::table::TableSerializer;
use crate::error::{CoreResult, ExportContext};
use crate::numbers::storable_float;
use crate::table::{Cell, Table, TableDocument};

/// Longest sheet name a workbook accepts.
const MAX_SHEET_NAME_LEN: usize = 31;

const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// A valid sheet name for `name`: forbidden characters replaced and the
/// length capped.
pub fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim();
    if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Sheet names compare case-insensitively; clashes get a numbered tail.
pub(crate) fn unique_sheet_name(name: &str, used: &mut HashSet<String>) -> String {
    let base = sheet_name(name);
    let mut candidate = base.clone();
    let mut counter = 2;
    while !used.insert(candidate.to_lowercase()) {
        let tail = format!(" {counter}");
        let head: String = base.chars().take(MAX_SHEET_NAME_LEN - tail.len()).collect();
        candidate = format!("{head}{tail}");
        counter += 1;
    }
    candidate
}

fn add_sheet(workbook: &mut Workbook, table: &Table, name: &str) -> Result<(), XlsxError> {
    debug!("Add {} rows to \"{}\" sheet in XLSX", table.rows().len(), table.name());
    let sheet = workbook.add_worksheet();
    sheet.set_name(name)?;

    for (col, header) in table.header().iter().enumerate() {
        sheet.write_string(0, col as u16, header)?;
    }
    for row in 0..table.rows().len() {
        let sheet_row = u32::try_from(row + 1).unwrap_or(u32::MAX);
        for col in 0..table.header().len() {
            let sheet_col = col as u16;
            match table.cell(row, col) {
                Cell::String(value) => {
                    sheet.write_string(sheet_row, sheet_col, value)?;
                }
                Cell::Float(value) => {
                    if let Some(value) = storable_float(*value) {
                        sheet.write_number(sheet_row, sheet_col, value)?;
                    }
                }
                Cell::Integer(value) => {
                    sheet.write_number(sheet_row, sheet_col, *value)?;
                }
                Cell::Long(value) => {
                    sheet.write_number(sheet_row, sheet_col, *value as f64)?;
                }
                Cell::Null => {}
            }
        }
    }
    sheet.autofit();
    Ok(())
}

fn make_workbook(document: &TableDocument) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let mut used = HashSet::new();
    for table in document.tables() {
        let name = unique_sheet_name(table.name(), &mut used);
        add_sheet(&mut workbook, table, &name)?;
    }
    Ok(workbook)
}

pub struct XlsxSerializer;

impl TableSerializer for XlsxSerializer {
    fn format_name(&self) -> &'static str {
        "xlsx"
    }

    fn format_long_name(&self) -> &'static str {
        "Excel spreadsheet"
    }

    fn format_description(&self) -> &'static str {
        "one typed sheet per table"
    }

    fn write_file(&self, document: &TableDocument, path: &Path) -> CoreResult<()> {
        let mut workbook = make_workbook(document).export_context(path)?;
        workbook.save(path).export_context(path)
    }

    fn to_bytes(&self, document: &TableDocument, file_name: &str) -> CoreResult<Vec<u8>> {
        let path = Path::new(file_name);
        let mut workbook = make_workbook(document).export_context(path)?;
        workbook.save_to_buffer().export_context(path)
    }
}
