//! Image snapshots written as they were captured.

use std::fs;
use std::sync::Arc;

use indexmap::IndexSet;
use log::info;

use super::{ExportFormat, ExportedFiles, OutputNaming};
use crate::engine::EngineRegistry;
use crate::error::{CoreResult, ExportContext};
use crate::model::DataResult;

pub struct SnapshotExportFormat {
    registry: Arc<EngineRegistry>,
}

impl SnapshotExportFormat {
    pub fn new(registry: Arc<EngineRegistry>) -> Self {
        Self { registry }
    }
}

impl ExportFormat for SnapshotExportFormat {
    fn format_name(&self) -> &'static str {
        "snapshots"
    }

    fn format_long_name(&self) -> &'static str {
        "Image snapshots"
    }

    fn format_description(&self) -> &'static str {
        "significant and strip images from the media file"
    }

    /// Strip image names depend on the result, so only fixed names are listed.
    fn internal_produced_file_names(&self) -> IndexSet<String> {
        self.registry.graphic_names().into_iter().collect()
    }

    fn export_result(&self, result: &DataResult, naming: &OutputNaming) -> CoreResult<ExportedFiles> {
        let mut produced = ExportedFiles::new();
        for image in self.registry.make_graphics(result) {
            let path = naming.make_output_file(&image.name)?;
            info!("Export {} to {}", image.name, path.display());
            fs::write(&path, &image.data).export_context(&path)?;
            produced.insert(image.name, path);
        }
        Ok(produced)
    }

    fn make_single_export(&self, result: &DataResult, internal_name: &str) -> CoreResult<Option<Vec<u8>>> {
        Ok(self
            .registry
            .make_single_graphic(result, internal_name)
            .map(|image| image.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_SIGNIFICANT_SNAPSHOT_FILE_NAME, ExportConfig, ExportConfigBuilder};
    use crate::model::{ImageArtifact, SnapshotImages};

    fn result() -> DataResult {
        let image = ImageArtifact {
            name: "raw".into(),
            content_type: "image/jpeg".into(),
            width: 1,
            height: 1,
            data: vec![0xFF, 0xD8],
        };
        DataResult {
            source: "/media/clip.mkv".into(),
            snapshots: Some(SnapshotImages {
                significant: Some(image.clone()),
                strip: vec![image.clone(), image],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn every_image_is_written() {
        let temp = tempfile::tempdir().unwrap();
        let config = ExportConfigBuilder::new()
            .export_directory(temp.path().to_path_buf())
            .build();
        let format = SnapshotExportFormat::new(Arc::new(EngineRegistry::with_defaults(&config)));
        let produced = format
            .export_result(&result(), &OutputNaming::new(&config, "clip.mkv"))
            .unwrap();
        let names: Vec<_> = produced.keys().cloned().collect();
        assert_eq!(
            names,
            vec![
                DEFAULT_SIGNIFICANT_SNAPSHOT_FILE_NAME.to_string(),
                "snapshot-strip-0.jpg".to_string(),
                "snapshot-strip-1.jpg".to_string(),
            ]
        );
        assert_eq!(fs::read(&produced["snapshot-strip-1.jpg"]).unwrap(), vec![0xFF, 0xD8]);
    }

    #[test]
    fn single_significant_image() {
        let format = SnapshotExportFormat::new(Arc::new(EngineRegistry::with_defaults(&ExportConfig::default())));
        assert!(format
            .internal_produced_file_names()
            .contains(DEFAULT_SIGNIFICANT_SNAPSHOT_FILE_NAME));
        let bytes = format
            .make_single_export(&result(), DEFAULT_SIGNIFICANT_SNAPSHOT_FILE_NAME)
            .unwrap();
        assert_eq!(bytes, Some(vec![0xFF, 0xD8]));
        assert_eq!(format.make_single_export(&result(), "nope.jpg").unwrap(), None);
    }
}
