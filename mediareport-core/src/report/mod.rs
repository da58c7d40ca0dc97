//! The hierarchical report: sections of entries, rendered to HTML or JSON.

mod document;
mod entry;
mod html;
mod json;

pub use document::{
    ABOUT_THIS_DOCUMENT, DOCUMENT_CREATION_DATE, REPORT_TITLE, ReportDocument, ReportSection,
    ReportSectionCategory, TARGET_SOURCE, json_header,
};
pub use entry::{
    ChapterEntry, EventEntry, ImageEntry, Numeric, NumericUnitValue, ReportEntry, StatItem, Statistics,
    StatisticsUnitValue, StreamEntry, StreamList, with_plural,
};
pub(crate) use entry::json_float;
pub use html::to_html;
pub use json::to_json;
