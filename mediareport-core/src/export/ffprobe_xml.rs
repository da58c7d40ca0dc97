//! The prober's XML output, written as received.

use std::fs;

use indexmap::IndexSet;
use log::{debug, info};

use super::{ExportFormat, ExportedFiles, OutputNaming};
use crate::error::{CoreResult, ExportContext};
use crate::model::DataResult;

pub struct FfprobeXmlExportFormat {
    file_name: String,
}

impl FfprobeXmlExportFormat {
    pub fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
        }
    }

    fn content<'a>(&self, result: &'a DataResult) -> Option<&'a str> {
        let content = result.probe_xml.as_deref().filter(|xml| !xml.trim().is_empty());
        if content.is_none() {
            debug!("No ffprobe XML for {}", result.source);
        }
        content
    }
}

impl ExportFormat for FfprobeXmlExportFormat {
    fn format_name(&self) -> &'static str {
        "ffprobexml"
    }

    fn format_long_name(&self) -> &'static str {
        "Media file headers on FFprobe XML"
    }

    fn format_description(&self) -> &'static str {
        "the raw ffprobe output, untouched"
    }

    fn internal_produced_file_names(&self) -> IndexSet<String> {
        IndexSet::from([self.file_name.clone()])
    }

    fn export_result(&self, result: &DataResult, naming: &OutputNaming) -> CoreResult<ExportedFiles> {
        let mut produced = ExportedFiles::new();
        let Some(content) = self.content(result) else {
            return Ok(produced);
        };
        let path = naming.make_output_file(&self.file_name)?;
        info!("Export {} to {}", self.format_name(), path.display());
        fs::write(&path, content).export_context(&path)?;
        produced.insert(self.format_name().to_string(), path);
        Ok(produced)
    }

    fn make_single_export(&self, result: &DataResult, internal_name: &str) -> CoreResult<Option<Vec<u8>>> {
        if internal_name != self.file_name {
            return Ok(None);
        }
        Ok(self.content(result).map(|content| content.as_bytes().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfigBuilder;

    const PROBE_XML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<ffprobe><format format_name=\"mpegts\"/></ffprobe>\n";

    fn result(xml: Option<&str>) -> DataResult {
        DataResult {
            source: "/media/clip.mpg".into(),
            probe_xml: xml.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn content_is_written_verbatim() {
        let temp = tempfile::tempdir().unwrap();
        let config = ExportConfigBuilder::new()
            .export_directory(temp.path().to_path_buf())
            .base_file_name("mpg")
            .build();
        let naming = OutputNaming::new(&config, "/media/clip.mpg");

        let produced = FfprobeXmlExportFormat::new("ffprobe.xml")
            .export_result(&result(Some(PROBE_XML)), &naming)
            .unwrap();
        let path = &produced["ffprobexml"];
        assert_eq!(path, &temp.path().join("mpg_ffprobe.xml"));
        assert_eq!(fs::read_to_string(path).unwrap(), PROBE_XML);
    }

    #[test]
    fn nothing_without_probe_output() {
        let temp = tempfile::tempdir().unwrap();
        let config = ExportConfigBuilder::new()
            .export_directory(temp.path().to_path_buf())
            .build();
        let naming = OutputNaming::new(&config, "clip.mpg");
        let format = FfprobeXmlExportFormat::new("ffprobe.xml");

        assert!(format.export_result(&result(None), &naming).unwrap().is_empty());
        assert!(format.make_single_export(&result(Some(" \n")), "ffprobe.xml").unwrap().is_none());
        assert_eq!(
            format.make_single_export(&result(Some(PROBE_XML)), "ffprobe.xml").unwrap(),
            Some(PROBE_XML.as_bytes().to_vec())
        );
        assert!(format.make_single_export(&result(Some(PROBE_XML)), "other.xml").unwrap().is_none());
    }
}
