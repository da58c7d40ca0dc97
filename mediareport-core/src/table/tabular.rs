//! Flat text documents for the delimited dialects (txt, csv, csvfr).
//!
//! A [`TabularDocument`] holds already formatted strings: cells are turned
//! into text when the row is added, with the dialect's locale and the
//! document's precision tier. Rows whose width differs from the header are
//! kept in memory but skipped, with a warning, when the file is written.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use log::{debug, info, warn};

use super::cell::{Cell, TypedCell};
use crate::error::{CoreResult, ExportContext};
use crate::export::output::OutputNaming;
use crate::numbers::{Locale, NUMBER_UTILS, NumberFormat, Precision};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabularDialect {
    Txt,
    Csv,
    CsvFr,
}

impl TabularDialect {
    pub const ALL: [TabularDialect; 3] = [TabularDialect::Txt, TabularDialect::Csv, TabularDialect::CsvFr];

    pub fn format_name(self) -> &'static str {
        match self {
            TabularDialect::Txt => "txt",
            TabularDialect::Csv => "csv",
            TabularDialect::CsvFr => "csvfr",
        }
    }

    pub fn format_long_name(self) -> &'static str {
        match self {
            TabularDialect::Txt => "Values separated by tabs in text files",
            TabularDialect::Csv => "Classic CSV files",
            TabularDialect::CsvFr => "French flavor CSV files",
        }
    }

    pub fn format_description(self) -> &'static str {
        match self {
            TabularDialect::Txt => "tab separated, \".\" decimal separator",
            TabularDialect::Csv => "comma separated, \".\" decimal separator",
            TabularDialect::CsvFr => "semicolon separated, \",\" decimal separator",
        }
    }

    /// File extension. French files get their own so both CSV flavors can
    /// share an export directory.
    pub fn extension(self) -> &'static str {
        match self {
            TabularDialect::Txt => "txt",
            TabularDialect::Csv => "csv",
            TabularDialect::CsvFr => "fr.csv",
        }
    }

    pub fn locale(self) -> Locale {
        match self {
            TabularDialect::Txt | TabularDialect::Csv => Locale::English,
            TabularDialect::CsvFr => Locale::French,
        }
    }

    fn writer_builder(self) -> WriterBuilder {
        let mut builder = WriterBuilder::new();
        match self {
            TabularDialect::Txt => builder
                .delimiter(b'\t')
                .quote_style(QuoteStyle::Never)
                .terminator(Terminator::Any(b'\n')),
            TabularDialect::Csv => builder
                .delimiter(b',')
                .quote_style(QuoteStyle::Necessary)
                .terminator(Terminator::CRLF),
            TabularDialect::CsvFr => builder
                .delimiter(b';')
                .quote_style(QuoteStyle::Necessary)
                .terminator(Terminator::CRLF),
        };
        builder.flexible(true);
        builder
    }
}

#[derive(Debug, Clone)]
pub struct TabularDocument {
    dialect: TabularDialect,
    base_file_name: String,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    precision: Precision,
}

impl TabularDocument {
    pub fn new<I, S>(dialect: TabularDialect, base_file_name: &str, header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dialect,
            base_file_name: base_file_name.to_string(),
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            precision: Precision::High,
        }
    }

    /// Floats added from now on use one fraction digit.
    #[must_use]
    pub fn with_low_precision(mut self) -> Self {
        self.precision = Precision::Low;
        self
    }

    pub fn dialect(&self) -> TabularDialect {
        self.dialect
    }

    pub fn base_file_name(&self) -> &str {
        &self.base_file_name
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.base_file_name, self.dialect.extension())
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Formats and appends a row.
    pub fn row(&mut self, cells: &[TypedCell]) {
        let format = NUMBER_UTILS.formatter(self.dialect.locale(), self.precision);
        let row = cells.iter().map(|cell| format_cell(format, &cell.value)).collect();
        self.rows.push(row);
    }

    /// Appends a row of raw text.
    pub fn text_row(&mut self, values: Vec<String>) {
        self.rows.push(values);
    }

    /// Writes the header and every well-formed row.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = self.dialect.writer_builder().from_writer(writer);
        writer.write_record(&self.header)?;
        for (pos, row) in self.rows.iter().enumerate() {
            if row.len() != self.header.len() {
                warn!(
                    "Skip row {} of {}: {} values for {} columns",
                    pos,
                    self.base_file_name,
                    row.len(),
                    self.header.len()
                );
                continue;
            }
            if self.dialect == TabularDialect::Txt {
                if let Some(col) = row.iter().position(|value| breaks_txt_layout(value)) {
                    debug!(
                        "Row {} of {} has a tab or line break in column {}, txt output is unquoted",
                        pos, self.base_file_name, self.header[col]
                    );
                }
            }
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// In-memory rendition, `None` when there is nothing to export.
    pub fn to_bytes(&self) -> CoreResult<Option<Vec<u8>>> {
        if self.is_empty() {
            return Ok(None);
        }
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)
            .export_context(std::path::Path::new(&self.file_name()))?;
        Ok(Some(buffer))
    }

    /// Writes the document next to the other exports. Empty documents
    /// produce no file.
    pub fn write(&self, naming: &OutputNaming) -> CoreResult<Option<PathBuf>> {
        if self.is_empty() {
            debug!("Nothing to export for {}", self.base_file_name);
            return Ok(None);
        }
        let path = naming.make_output_file(&self.file_name())?;
        info!("Export {} to {}", self.dialect.format_name(), path.display());
        let file = File::create(&path).export_context(&path)?;
        self.write_to(BufWriter::new(file)).export_context(&path)?;
        Ok(Some(path))
    }
}

/// The txt dialect never quotes, so these characters shift columns or rows.
fn breaks_txt_layout(value: &str) -> bool {
    value.contains(['\t', '\n', '\r'])
}

fn format_cell(format: &NumberFormat, cell: &Cell) -> String {
    match cell {
        Cell::String(value) => value.clone(),
        Cell::Float(value) => format.format_float(*value),
        Cell::Integer(value) => value.to_string(),
        Cell::Long(value) => value.to_string(),
        Cell::Null => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells;
    use pretty_assertions::assert_eq;

    fn render(doc: &TabularDocument) -> String {
        String::from_utf8(doc.to_bytes().unwrap().unwrap()).unwrap()
    }

    #[test]
    fn txt_low_precision() {
        let mut doc = TabularDocument::new(TabularDialect::Txt, "t", ["a", "b"]).with_low_precision();
        doc.row(&cells!["x", 3.14159]);
        assert_eq!(render(&doc), "a\tb\nx\t3.1\n");
    }

    #[test]
    fn csv_quotes_and_crlf() {
        let mut doc = TabularDocument::new(TabularDialect::Csv, "t", ["name", "value"]);
        doc.row(&cells!["a,b", 2.5]);
        assert_eq!(render(&doc), "name,value\r\n\"a,b\",2.5\r\n");
    }

    #[test]
    fn csvfr_decimal_comma() {
        let mut doc = TabularDocument::new(TabularDialect::CsvFr, "t", ["n", "v"]);
        doc.row(&cells![1_i32, -23.25]);
        assert_eq!(render(&doc), "n;v\r\n1;-23,25\r\n");
    }

    #[test]
    fn edge_values() {
        let mut doc = TabularDocument::new(TabularDialect::Txt, "t", ["a", "b", "c", "d"]);
        doc.row(&cells![f64::NEG_INFINITY, f64::NAN, None::<String>, 1_234_567_i64]);
        assert_eq!(render(&doc), "a\tb\tc\td\n-144\t\t\t1234567\n");
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let mut doc = TabularDocument::new(TabularDialect::Txt, "t", ["a", "b"]);
        doc.row(&cells!["only one"]);
        doc.row(&cells!["ok", 1_i32]);
        assert_eq!(render(&doc), "a\tb\nok\t1\n");
    }

    #[test]
    fn txt_keeps_separators_unquoted() {
        assert!(breaks_txt_layout("a\tb"));
        assert!(breaks_txt_layout("line\r\n"));
        assert!(!breaks_txt_layout("plain, text"));

        let mut doc = TabularDocument::new(TabularDialect::Txt, "t", ["a", "b"]);
        doc.row(&cells!["x\ty", 1_i32]);
        assert_eq!(render(&doc), "a\tb\nx\ty\t1\n");
    }

    #[test]
    fn empty_document_has_no_content() {
        let doc = TabularDocument::new(TabularDialect::Csv, "t", ["a"]);
        assert!(doc.to_bytes().unwrap().is_none());
        assert_eq!(doc.file_name(), "t.csv");
    }
}
