//! Snapshot images: one significant frame and a strip of evenly spaced ones.

use crate::config::ExportConfig;
use crate::engine::{GraphicRendererEngine, ReportRendererEngine, SingleGraphicEngine};
use crate::error::CoreResult;
use crate::model::{DataResult, ImageArtifact};
use crate::report::{ReportDocument, ReportEntry, ReportSection, ReportSectionCategory};

fn extension(image: &ImageArtifact) -> &'static str {
    if image.content_type == "image/png" { "png" } else { "jpg" }
}

fn significant(result: &DataResult) -> Option<&ImageArtifact> {
    result.snapshots.as_ref().and_then(|s| s.significant.as_ref())
}

fn strip(result: &DataResult) -> &[ImageArtifact] {
    result
        .snapshots
        .as_ref()
        .map(|s| s.strip.as_slice())
        .unwrap_or_default()
}

pub struct SignificantSnapshotEngine {
    file_name: String,
}

impl SignificantSnapshotEngine {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            file_name: config.significant_snapshot_file_name.clone(),
        }
    }
}

renderer_engine!(SignificantSnapshotEngine, "SignificantSnapshot", report, graphic);

impl SingleGraphicEngine for SignificantSnapshotEngine {
    fn graphic_name(&self) -> String {
        self.file_name.clone()
    }

    fn make_graphic(&self, result: &DataResult) -> Option<ImageArtifact> {
        significant(result).map(|image| ImageArtifact {
            name: self.file_name.clone(),
            ..image.clone()
        })
    }
}

impl ReportRendererEngine for SignificantSnapshotEngine {
    fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()> {
        let strip = strip(result);
        let mut section = ReportSection::new(ReportSectionCategory::Summary, "Snapshots images");
        if let Some(image) = self.make_graphic(result) {
            section.add(ReportEntry::image(image, "Significant image"));
        }
        if !strip.is_empty() {
            section.add(ReportEntry::ImageStrip(strip.to_vec()));
        }
        document.add(section);
        Ok(())
    }
}

pub struct SnapshotStripEngine {
    prefix: String,
}

impl SnapshotStripEngine {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            prefix: config.snapshot_strip_prefix.clone(),
        }
    }

    fn image_name(&self, position: usize, image: &ImageArtifact) -> String {
        format!("{}-{position}.{}", self.prefix, extension(image))
    }

    fn named_strip(&self, result: &DataResult) -> Vec<ImageArtifact> {
        strip(result)
            .iter()
            .enumerate()
            .map(|(position, image)| ImageArtifact {
                name: self.image_name(position, image),
                ..image.clone()
            })
            .collect()
    }
}

renderer_engine!(SnapshotStripEngine, "SnapshotStrip", graphic);

impl GraphicRendererEngine for SnapshotStripEngine {
    fn to_graphic(&self, result: &DataResult) -> Vec<ImageArtifact> {
        self.named_strip(result)
    }

    /// Names depend on the result; without one the strip is unknown.
    fn graphic_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn to_single_graphic(&self, result: &DataResult, name: &str) -> Option<ImageArtifact> {
        if !name.starts_with(&self.prefix) {
            return None;
        }
        self.named_strip(result).into_iter().find(|image| image.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SnapshotImages;
    use crate::report::to_html;

    fn image(name: &str, content_type: &str) -> ImageArtifact {
        ImageArtifact {
            name: name.into(),
            content_type: content_type.into(),
            width: 4,
            height: 3,
            data: vec![1, 2, 3],
        }
    }

    fn snapshot_result() -> DataResult {
        DataResult {
            source: "/media/clip.mkv".into(),
            snapshots: Some(SnapshotImages {
                significant: Some(image("frame-1234.jpg", "image/jpeg")),
                strip: vec![image("a", "image/jpeg"), image("b", "image/png")],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn significant_image_is_renamed() {
        let engine = SignificantSnapshotEngine::new(&ExportConfig::default());
        let result = snapshot_result();
        let name = engine.graphic_name();
        let image = engine.to_single_graphic(&result, &name).unwrap();
        assert_eq!(image.name, name);
        assert_eq!(image.data, vec![1, 2, 3]);
        assert!(engine.to_single_graphic(&result, "other.jpg").is_none());
    }

    #[test]
    fn strip_names_follow_position_and_type() {
        let config = ExportConfig::default();
        let engine = SnapshotStripEngine::new(&config);
        let names: Vec<_> = engine
            .to_graphic(&snapshot_result())
            .into_iter()
            .map(|image| image.name)
            .collect();
        let prefix = &config.snapshot_strip_prefix;
        assert_eq!(names, vec![format!("{prefix}-0.jpg"), format!("{prefix}-1.png")]);

        let second = engine
            .to_single_graphic(&snapshot_result(), &format!("{prefix}-1.png"))
            .unwrap();
        assert_eq!(second.content_type, "image/png");
    }

    #[test]
    fn nothing_without_snapshots() {
        let config = ExportConfig::default();
        let result = DataResult::default();
        assert!(SnapshotStripEngine::new(&config).to_graphic(&result).is_empty());

        let mut document = ReportDocument::new("clip");
        SignificantSnapshotEngine::new(&config)
            .add_to_report(&result, &mut document)
            .unwrap();
        assert!(document.active_sections().is_empty());
    }

    #[test]
    fn report_embeds_images() {
        let mut document = ReportDocument::new("clip");
        SignificantSnapshotEngine::new(&ExportConfig::default())
            .add_to_report(&snapshot_result(), &mut document)
            .unwrap();
        let html = to_html(&document);
        assert!(html.contains("Snapshots images"));
        assert!(html.contains("data:image/png;base64,AQID"));
    }
}
