//! OpenDocument spreadsheet, one sheet per table.
//!
//! The package is a zip holding an uncompressed `mimetype` entry first, the
//! manifest and a single `content.xml` with every sheet.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;

use log::debug;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::table::TableSerializer;
use super::xlsx::unique_sheet_name;
use crate::error::{BoxedError, CoreResult, ExportContext};
use crate::numbers::storable_float;
use crate::table::{Cell, Table, TableDocument};

const MIME_TYPE: &str = "application/vnd.oasis.opendocument.spreadsheet";

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.2">
 <manifest:file-entry manifest:full-path="/" manifest:version="1.2" manifest:media-type="application/vnd.oasis.opendocument.spreadsheet"/>
 <manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/>
</manifest:manifest>
"#;

const NAMESPACES: [(&str, &str); 4] = [
    ("xmlns:office", "urn:oasis:names:tc:opendocument:xmlns:office:1.0"),
    ("xmlns:table", "urn:oasis:names:tc:opendocument:xmlns:table:1.0"),
    ("xmlns:text", "urn:oasis:names:tc:opendocument:xmlns:text:1.0"),
    ("office:version", "1.2"),
];

fn write_paragraph<W: Write>(writer: &mut Writer<W>, text: &str) -> Result<(), BoxedError> {
    writer.write_event(Event::Start(BytesStart::new("text:p")))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("text:p")))?;
    Ok(())
}

fn write_cell<W: Write>(writer: &mut Writer<W>, cell: &Cell) -> Result<(), BoxedError> {
    let number = match cell {
        Cell::String(value) => {
            let mut start = BytesStart::new("table:table-cell");
            start.push_attribute(("office:value-type", "string"));
            writer.write_event(Event::Start(start))?;
            write_paragraph(writer, value)?;
            writer.write_event(Event::End(BytesEnd::new("table:table-cell")))?;
            return Ok(());
        }
        Cell::Float(value) => storable_float(*value),
        Cell::Integer(value) => Some(f64::from(*value)),
        Cell::Long(value) => Some(*value as f64),
        Cell::Null => None,
    };
    let Some(number) = number else {
        writer.write_event(Event::Empty(BytesStart::new("table:table-cell")))?;
        return Ok(());
    };
    let text = number.to_string();
    let mut start = BytesStart::new("table:table-cell");
    start.push_attribute(("office:value-type", "float"));
    start.push_attribute(("office:value", text.as_str()));
    writer.write_event(Event::Start(start))?;
    write_paragraph(writer, &text)?;
    writer.write_event(Event::End(BytesEnd::new("table:table-cell")))?;
    Ok(())
}

fn write_sheet<W: Write>(writer: &mut Writer<W>, table: &Table, name: &str) -> Result<(), BoxedError> {
    debug!("Add {} rows to \"{}\" sheet in ODS", table.rows().len(), table.name());
    let mut start = BytesStart::new("table:table");
    start.push_attribute(("table:name", name));
    writer.write_event(Event::Start(start))?;

    writer.write_event(Event::Start(BytesStart::new("table:table-row")))?;
    for header in table.header() {
        write_cell(writer, &Cell::String(header.clone()))?;
    }
    writer.write_event(Event::End(BytesEnd::new("table:table-row")))?;

    for row in 0..table.rows().len() {
        writer.write_event(Event::Start(BytesStart::new("table:table-row")))?;
        for col in 0..table.header().len() {
            write_cell(writer, table.cell(row, col))?;
        }
        writer.write_event(Event::End(BytesEnd::new("table:table-row")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("table:table")))?;
    Ok(())
}

fn write_content<W: Write>(document: &TableDocument, output: W) -> Result<(), BoxedError> {
    let mut writer = Writer::new(output);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let mut root = BytesStart::new("office:document-content");
    for attribute in NAMESPACES {
        root.push_attribute(attribute);
    }
    writer.write_event(Event::Start(root))?;
    writer.write_event(Event::Start(BytesStart::new("office:body")))?;
    writer.write_event(Event::Start(BytesStart::new("office:spreadsheet")))?;

    let mut used = HashSet::new();
    for table in document.tables() {
        let name = unique_sheet_name(table.name(), &mut used);
        write_sheet(&mut writer, table, &name)?;
    }

    writer.write_event(Event::End(BytesEnd::new("office:spreadsheet")))?;
    writer.write_event(Event::End(BytesEnd::new("office:body")))?;
    writer.write_event(Event::End(BytesEnd::new("office:document-content")))?;
    Ok(())
}

fn write_package<W: Write + Seek>(document: &TableDocument, output: W) -> Result<W, BoxedError> {
    let mut package = ZipWriter::new(output);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    package.start_file(
        "mimetype",
        SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
    )?;
    package.write_all(MIME_TYPE.as_bytes())?;
    package.start_file("META-INF/manifest.xml", deflated)?;
    package.write_all(MANIFEST.as_bytes())?;
    package.start_file("content.xml", deflated)?;
    write_content(document, &mut package)?;

    Ok(package.finish()?)
}

pub struct OdsSerializer;

impl TableSerializer for OdsSerializer {
    fn format_name(&self) -> &'static str {
        "ods"
    }

    fn format_long_name(&self) -> &'static str {
        "OpenDocument Spreadsheet"
    }

    fn format_description(&self) -> &'static str {
        "one typed sheet per table"
    }

    fn write_file(&self, document: &TableDocument, path: &Path) -> CoreResult<()> {
        let file = File::create(path).export_context(path)?;
        let mut output = write_package(document, BufWriter::new(file)).export_context(path)?;
        output.flush().export_context(path)
    }

    fn to_bytes(&self, document: &TableDocument, file_name: &str) -> CoreResult<Vec<u8>> {
        let output = write_package(document, Cursor::new(Vec::new())).export_context(Path::new(file_name))?;
        Ok(output.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells;
    use crate::table::{CellType, TypedCell};
    use std::io::Read;

    fn entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut text = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn package_layout() {
        let mut document = TableDocument::new();
        document
            .create_table("Media summary", ["Type", "Value"])
            .unwrap()
            .push_row(cells!["File size", 1024_i64])
            .unwrap();
        let bytes = OdsSerializer.to_bytes(&document, "media-datas.ods").unwrap();

        assert_eq!(&bytes[..2], b"PK");
        assert_eq!(&bytes[30..38], b"mimetype");
        assert_eq!(entry(&bytes, "mimetype"), MIME_TYPE);
        assert!(entry(&bytes, "META-INF/manifest.xml").contains("content.xml"));

        let content = entry(&bytes, "content.xml");
        assert!(content.contains("<table:table table:name=\"Media summary\">"), "{content}");
        assert!(content.contains("<text:p>File size</text:p>"), "{content}");
        assert!(
            content.contains("office:value-type=\"float\" office:value=\"1024\""),
            "{content}"
        );
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

        let content = entry(&OdsSerializer.to_bytes(&document, "media-datas.ods").unwrap(), "content.xml");
        assert!(content.contains("office:value=\"-144\""), "{content}");
        assert!(content.contains("office:value=\"144\""), "{content}");
        assert!(content.contains("<table:table-cell/></table:table-row>"), "{content}");
    }

    #[test]
    fn file_is_written() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("media-datas.ods");
        let mut document = TableDocument::new();
        document
            .create_table("Events", ["Name"])
            .unwrap()
            .push_row(cells!["silence"])
            .unwrap();
        OdsSerializer.write_file(&document, &path).unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }
}
