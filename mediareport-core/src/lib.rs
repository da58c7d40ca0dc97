//! Export pipeline for media analysis results.
//!
//! A [`DataResult`] (probe data, filter measures, container frames and
//! snapshots of one media file) is turned into several artifacts: delimited
//! text files, a typed table document serialized to XML, JSON, XLSX, ODS or
//! SQLite, a hierarchical HTML/JSON report and the raw prober XML.
//!
//! Renderer engines (one per analysis facet) fill the documents; export
//! formats serialize them. Both are dispatched in a fixed order.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use mediareport_core::{DataResult, ExportConfigBuilder, ExportFormatManager};
//! use std::path::{Path, PathBuf};
//!
//! let config = ExportConfigBuilder::new()
//!     .export_directory(PathBuf::from("/tmp/reports"))
//!     .build();
//! let manager = ExportFormatManager::with_defaults(config).unwrap();
//!
//! let result = DataResult::from_json_file(Path::new("clip.json")).unwrap();
//! let produced = manager.export(&["csv", "report"], &result).unwrap();
//! for (name, path) in produced {
//!     println!("{name}: {}", path.display());
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod numbers;
pub mod report;
pub mod table;

// Re-exports for public API
pub use config::{ExportConfig, ExportConfigBuilder};
pub use engine::{EngineRegistry, RendererEngine};
pub use error::{CoreError, CoreResult};
pub use export::{ExportFormat, ExportFormatManager, ExportedFiles, OutputNaming};
pub use model::{DataResult, ImageArtifact};
pub use table::{Cell, CellType, TableDocument, TabularDialect, TabularDocument};
