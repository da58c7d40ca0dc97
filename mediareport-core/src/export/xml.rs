//! XML table document.
//!
//! ```xml
//! <report>
//!   <table name="media_summary" long-name="Media summary">
//!     <headers>
//!       <header name="type" long-name="Type" type="string"/>
//!     </headers>
//!     <entry type="File format"/>
//!   </table>
//! </report>
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use super::table::{TableSerializer, field_name};
use crate::error::{BoxedError, CoreResult, ExportContext};
use crate::numbers::{Locale, NUMBER_UTILS, Precision};
use crate::table::{Cell, Table, TableDocument};

pub struct XmlSerializer;

impl XmlSerializer {
    fn write_document<W: Write>(document: &TableDocument, output: W) -> Result<(), BoxedError> {
        let mut writer = Writer::new_with_indent(output, b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("report")))?;
        for table in document.tables() {
            write_table(&mut writer, table)?;
        }
        writer.write_event(Event::End(BytesEnd::new("report")))?;
        writer.into_inner().flush()?;
        Ok(())
    }
}

fn write_table<W: Write>(writer: &mut Writer<W>, table: &Table) -> Result<(), BoxedError> {
    debug!("Add {} rows to \"{}\" table in XML", table.rows().len(), table.name());
    let mut start = BytesStart::new("table");
    start.push_attribute(("name", field_name(table.name()).as_str()));
    start.push_attribute(("long-name", table.name()));
    writer.write_event(Event::Start(start))?;

    let names: Vec<String> = table.header().iter().map(|h| field_name(h)).collect();
    writer.write_event(Event::Start(BytesStart::new("headers")))?;
    for ((name, long_name), kind) in names.iter().zip(table.header()).zip(table.row_types()) {
        let mut header = BytesStart::new("header");
        header.push_attribute(("name", name.as_str()));
        header.push_attribute(("long-name", long_name.as_str()));
        header.push_attribute(("type", kind.name()));
        writer.write_event(Event::Empty(header))?;
    }
    writer.write_event(Event::End(BytesEnd::new("headers")))?;

    let format = NUMBER_UTILS.formatter(Locale::English, Precision::High);
    for row in 0..table.rows().len() {
        let mut entry = BytesStart::new("entry");
        for (col, name) in names.iter().enumerate() {
            let value = match table.cell(row, col) {
                Cell::String(value) => value.clone(),
                Cell::Float(value) => format.format_float(*value),
                Cell::Integer(value) => value.to_string(),
                Cell::Long(value) => value.to_string(),
                Cell::Null => String::new(),
            };
            entry.push_attribute((name.as_str(), value.as_str()));
        }
        writer.write_event(Event::Empty(entry))?;
    }

    writer.write_event(Event::End(BytesEnd::new("table")))?;
    Ok(())
}

impl TableSerializer for XmlSerializer {
    fn format_name(&self) -> &'static str {
        "xml"
    }

    fn format_long_name(&self) -> &'static str {
        "XML document"
    }

    fn format_description(&self) -> &'static str {
        "one entry element per row, values as attributes"
    }

    fn write_file(&self, document: &TableDocument, path: &Path) -> CoreResult<()> {
        let file = File::create(path).export_context(path)?;
        Self::write_document(document, BufWriter::new(file)).export_context(path)
    }

    fn to_bytes(&self, document: &TableDocument, file_name: &str) -> CoreResult<Vec<u8>> {
        let mut buffer = Vec::new();
        Self::write_document(document, &mut buffer).export_context(Path::new(file_name))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells;
    use crate::table::{CellType, TypedCell};

    #[test]
    fn rows_become_attributes() {
        let mut document = TableDocument::new();
        let table = document.create_table("Audio phase", ["Frame", "Pts time", "Value"]).unwrap();
        table.push_row(cells![1_i32, 0.04, 0.123456789]).unwrap();
        table.push_row(cells![2_i32, None::<f64>, "a<b"]).unwrap();

        let xml = String::from_utf8(XmlSerializer.to_bytes(&document, "media-datas.xml").unwrap()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<table name=\"audio_phase\" long-name=\"Audio phase\">"));
        assert!(xml.contains("<header name=\"pts_time\" long-name=\"Pts time\" type=\"float\"/>"));
        assert!(xml.contains("<entry frame=\"1\" pts_time=\"0.04\" value=\"0.12346\"/>"));
        assert!(xml.contains("<entry frame=\"2\" pts_time=\"\" value=\"a&lt;b\"/>"));
    }

    #[test]
    fn empty_tables_are_left_out() {
        let mut document = TableDocument::new();
        document.create_table("Nothing", ["a"]).unwrap();
        let xml = String::from_utf8(XmlSerializer.to_bytes(&document, "media-datas.xml").unwrap()).unwrap();
        assert!(!xml.contains("<table"));
    }

    #[test]
    fn non_finite_floats_are_written_as_sentinels() {
        let mut document = TableDocument::new();
        let table = document.create_table("Peaks", ["Low", "High", "Unknown"]).unwrap();
        let float = |value: f64| TypedCell {
            value: Cell::Float(value),
            kind: CellType::Float,
        };
        table
            .push_row(vec![float(f64::NEG_INFINITY), float(f64::INFINITY), float(f64::NAN)])
            .unwrap();

        let xml = String::from_utf8(XmlSerializer.to_bytes(&document, "media-datas.xml").unwrap()).unwrap();
        assert!(xml.contains("<entry low=\"-144\" high=\"144\" unknown=\"\"/>"), "{xml}");
    }
}
