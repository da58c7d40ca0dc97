//! Engine ordering and dispatch.

use std::collections::HashSet;
use std::sync::Mutex;

use log::{debug, warn};
use once_cell::sync::Lazy;

use super::RendererEngine;
use crate::config::ExportConfig;
use crate::error::CoreResult;
use crate::model::{DataResult, ImageArtifact};
use crate::report::ReportDocument;
use crate::table::{TableDocument, TabularDialect, TabularDocument};

/// Display order of the known engines.
pub const DISPLAY_ORDER: &[&str] = &[
    "MediaSummary",
    "Ebur128Summary",
    "Ebur128",
    "Events",
    "APhaseMeter",
    "AStats",
    "Block",
    "Blur",
    "Crop",
    "Idet",
    "Siti",
    "SitiReport",
    "FramesDuration",
    "AConsts",
    "VConsts",
    "Packets",
    "AFrames",
    "GopStats",
    "VFrames",
    "RawStderrFilters",
    "AboutMeasure",
];

static ENGINE_ORDERING: Lazy<EngineOrdering> = Lazy::new(|| EngineOrdering::new(DISPLAY_ORDER));

/// Maps engine names to their rank. Names missing from the list rank last
/// and are reported once.
#[derive(Debug)]
pub struct EngineOrdering {
    order: Vec<&'static str>,
    warned: Mutex<HashSet<String>>,
}

impl EngineOrdering {
    pub fn new(order: &[&'static str]) -> Self {
        Self {
            order: order.to_vec(),
            warned: Mutex::new(HashSet::new()),
        }
    }

    /// Rank of an engine. Unlisted engines all share the last rank.
    pub fn position(&self, name: &str) -> usize {
        if let Some(pos) = self.order.iter().position(|known| *known == name) {
            return pos;
        }
        let first_time = match self.warned.lock() {
            Ok(mut warned) => warned.insert(name.to_string()),
            Err(poisoned) => poisoned.into_inner().insert(name.to_string()),
        };
        if first_time {
            warn!("Renderer engine {name} is missing from the display order, it will be placed last");
        }
        self.order.len()
    }

    /// Names already reported as unlisted.
    pub fn warned_names(&self) -> Vec<String> {
        let warned = match self.warned.lock() {
            Ok(warned) => warned,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut names: Vec<_> = warned.iter().cloned().collect();
        names.sort();
        names
    }
}

/// The ordered set of engines used by every export format.
pub struct EngineRegistry {
    engines: Vec<Box<dyn RendererEngine>>,
}

impl EngineRegistry {
    /// Sorts with the process-wide display order.
    pub fn new(engines: Vec<Box<dyn RendererEngine>>) -> Self {
        Self::with_ordering(engines, &ENGINE_ORDERING)
    }

    /// Stable sort: engines sharing a rank keep their registration order.
    pub fn with_ordering(mut engines: Vec<Box<dyn RendererEngine>>, ordering: &EngineOrdering) -> Self {
        engines.sort_by_cached_key(|engine| ordering.position(engine.name()));
        Self { engines }
    }

    /// Every built-in engine.
    pub fn with_defaults(config: &ExportConfig) -> Self {
        Self::new(super::components::default_engines(config))
    }

    pub fn engines(&self) -> impl Iterator<Item = &dyn RendererEngine> {
        self.engines.iter().map(|engine| engine.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.engines.iter().map(|engine| engine.name()).collect()
    }

    pub fn make_table_document(&self, result: &DataResult) -> CoreResult<TableDocument> {
        let mut document = TableDocument::new();
        for engine in self.engines() {
            if let Some(table_engine) = engine.as_table() {
                debug!("Add {} to table document", engine.name());
                table_engine.add_to_table(result, &mut document)?;
            }
        }
        Ok(document)
    }

    pub fn make_report_document(&self, result: &DataResult) -> CoreResult<ReportDocument> {
        let mut document = ReportDocument::new(&result.source);
        for engine in self.engines() {
            if let Some(report_engine) = engine.as_report() {
                debug!("Add {} to report document", engine.name());
                report_engine.add_to_report(result, &mut document)?;
            }
        }
        Ok(document)
    }

    /// Engines contributing to the report, in display order.
    pub fn report_engine_names(&self) -> Vec<&'static str> {
        self.engines()
            .filter(|engine| engine.as_report().is_some())
            .map(|engine| engine.name())
            .collect()
    }

    /// The report contribution of a single engine. `None` when no report
    /// engine carries this name.
    pub fn make_engine_report(&self, result: &DataResult, engine_name: &str) -> CoreResult<Option<ReportDocument>> {
        let Some(report_engine) = self
            .engines()
            .filter(|engine| engine.name() == engine_name)
            .find_map(|engine| engine.as_report())
        else {
            return Ok(None);
        };
        let mut document = ReportDocument::new(&result.source);
        report_engine.add_to_report(result, &mut document)?;
        Ok(Some(document))
    }

    pub fn make_tabular_documents(
        &self,
        result: &DataResult,
        dialect: TabularDialect,
    ) -> CoreResult<Vec<TabularDocument>> {
        let mut documents = Vec::new();
        for engine in self.engines() {
            if let Some(tabular_engine) = engine.as_tabular() {
                documents.extend(tabular_engine.to_tabular(result, dialect)?);
            }
        }
        Ok(documents)
    }

    /// Every tabular base name an engine can produce, in engine order.
    pub fn tabular_names(&self) -> Vec<&'static str> {
        self.engines()
            .filter_map(|engine| engine.as_tabular())
            .flat_map(|engine| engine.tabular_names())
            .collect()
    }

    pub fn make_single_tabular(
        &self,
        result: &DataResult,
        dialect: TabularDialect,
        base_file_name: &str,
    ) -> CoreResult<Option<TabularDocument>> {
        for engine in self.engines().filter_map(|engine| engine.as_tabular()) {
            if let Some(document) = engine.to_single_tabular(result, dialect, base_file_name)? {
                return Ok(Some(document));
            }
        }
        Ok(None)
    }

    pub fn make_graphics(&self, result: &DataResult) -> Vec<ImageArtifact> {
        self.engines()
            .filter_map(|engine| engine.as_graphic())
            .flat_map(|engine| engine.to_graphic(result))
            .collect()
    }

    pub fn graphic_names(&self) -> Vec<String> {
        self.engines()
            .filter_map(|engine| engine.as_graphic())
            .flat_map(|engine| engine.graphic_names())
            .collect()
    }

    pub fn make_single_graphic(&self, result: &DataResult, name: &str) -> Option<ImageArtifact> {
        self.engines()
            .filter_map(|engine| engine.as_graphic())
            .find_map(|engine| engine.to_single_graphic(result, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl RendererEngine for Named {
        fn name(&self) -> &'static str {
            self.0
        }
    }

    #[test]
    fn unlisted_engines_go_last_and_warn_once() {
        let ordering = EngineOrdering::new(&["A", "B"]);
        let engines: Vec<Box<dyn RendererEngine>> = vec![
            Box::new(Named("Extra1")),
            Box::new(Named("B")),
            Box::new(Named("Extra2")),
            Box::new(Named("A")),
        ];
        let registry = EngineRegistry::with_ordering(engines, &ordering);
        assert_eq!(registry.names(), vec!["A", "B", "Extra1", "Extra2"]);

        assert_eq!(ordering.position("Extra1"), 2);
        assert_eq!(ordering.warned_names(), vec!["Extra1", "Extra2"]);
    }

    #[test]
    fn default_order_is_known() {
        let config = ExportConfig::default();
        let registry = EngineRegistry::with_defaults(&config);
        let names = registry.names();
        assert_eq!(&names[..DISPLAY_ORDER.len()], DISPLAY_ORDER);
        assert!(names.contains(&"SignificantSnapshot"));
    }

    #[test]
    fn single_engine_report() {
        use crate::model::{Ebur128Summary, MediaAnalysis};

        let registry = EngineRegistry::with_defaults(&ExportConfig::default());
        let result = DataResult {
            source: "clip.wav".into(),
            media_analysis: Some(MediaAnalysis {
                ebur128_summary: Some(Ebur128Summary {
                    integrated: -23.0,
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        let document = registry
            .make_engine_report(&result, "Ebur128Summary")
            .unwrap()
            .unwrap();
        assert_eq!(document.active_sections().len(), 1);
        assert!(document.about().is_empty());

        assert!(registry.make_engine_report(&result, "Ebur128").unwrap().is_none());
        assert!(registry.make_engine_report(&result, "Nope").unwrap().is_none());

        let names = registry.report_engine_names();
        assert!(names.contains(&"Ebur128Summary"));
        assert!(!names.contains(&"Ebur128"));
    }
}
