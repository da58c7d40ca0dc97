//! Renderer engines: one per analysis facet.
//!
//! An engine contributes to any subset of the output kinds (table document,
//! tabular documents, report sections, graphics). The capability accessors
//! on [`RendererEngine`] expose what an engine supports, so the registry can
//! dispatch without knowing concrete types.

pub mod components;
mod registry;

pub use registry::{DISPLAY_ORDER, EngineOrdering, EngineRegistry};

use crate::error::CoreResult;
use crate::model::{DataResult, ImageArtifact};
use crate::report::ReportDocument;
use crate::table::{TableDocument, TabularDialect, TabularDocument};

pub trait RendererEngine: Send + Sync {
    /// Stable engine name, used for ordering.
    fn name(&self) -> &'static str;

    fn as_report(&self) -> Option<&dyn ReportRendererEngine> {
        None
    }

    fn as_table(&self) -> Option<&dyn TableRendererEngine> {
        None
    }

    fn as_tabular(&self) -> Option<&dyn TabularRendererEngine> {
        None
    }

    fn as_graphic(&self) -> Option<&dyn GraphicRendererEngine> {
        None
    }
}

pub trait ReportRendererEngine {
    fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()>;
}

pub trait TableRendererEngine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()>;
}

pub trait TabularRendererEngine {
    fn to_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Vec<TabularDocument>>;

    /// Base file names this engine can produce.
    fn tabular_names(&self) -> Vec<&'static str>;

    fn to_single_tabular(
        &self,
        result: &DataResult,
        dialect: TabularDialect,
        base_file_name: &str,
    ) -> CoreResult<Option<TabularDocument>> {
        if !self.tabular_names().contains(&base_file_name) {
            return Ok(None);
        }
        Ok(self
            .to_tabular(result, dialect)?
            .into_iter()
            .find(|doc| doc.base_file_name() == base_file_name))
    }
}

pub trait GraphicRendererEngine {
    fn to_graphic(&self, result: &DataResult) -> Vec<ImageArtifact>;

    /// File names this engine can produce.
    fn graphic_names(&self) -> Vec<String>;

    fn to_single_graphic(&self, result: &DataResult, name: &str) -> Option<ImageArtifact> {
        if !self.graphic_names().iter().any(|n| n == name) {
            return None;
        }
        self.to_graphic(result).into_iter().find(|image| image.name == name)
    }
}

/// Engines producing exactly one tabular document.
pub trait SingleTabularEngine {
    fn tabular_base_name(&self) -> &'static str;

    fn make_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Option<TabularDocument>>;
}

impl<T: SingleTabularEngine> TabularRendererEngine for T {
    fn to_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Vec<TabularDocument>> {
        Ok(self.make_tabular(result, dialect)?.into_iter().collect())
    }

    fn tabular_names(&self) -> Vec<&'static str> {
        vec![self.tabular_base_name()]
    }

    fn to_single_tabular(
        &self,
        result: &DataResult,
        dialect: TabularDialect,
        base_file_name: &str,
    ) -> CoreResult<Option<TabularDocument>> {
        if base_file_name != self.tabular_base_name() {
            return Ok(None);
        }
        self.make_tabular(result, dialect)
    }
}

/// Engines producing exactly one graphic artifact.
pub trait SingleGraphicEngine {
    fn graphic_name(&self) -> String;

    fn make_graphic(&self, result: &DataResult) -> Option<ImageArtifact>;
}

impl<T: SingleGraphicEngine> GraphicRendererEngine for T {
    fn to_graphic(&self, result: &DataResult) -> Vec<ImageArtifact> {
        self.make_graphic(result).into_iter().collect()
    }

    fn graphic_names(&self) -> Vec<String> {
        vec![self.graphic_name()]
    }

    fn to_single_graphic(&self, result: &DataResult, name: &str) -> Option<ImageArtifact> {
        if name != self.graphic_name() {
            return None;
        }
        self.make_graphic(result)
    }
}
