//! What was measured and with what: filters, tool versions, raw filter output.

use super::{NAME, Rows, TYPE, VALUE, fill_table, fill_tabular};
use crate::engine::{ReportRendererEngine, SingleTabularEngine, TableRendererEngine, TabularRendererEngine};
use crate::error::CoreResult;
use crate::model::{DataResult, FilterDescription, RawStderrFilterLine};
use crate::report::{DOCUMENT_CREATION_DATE, ReportDocument, ReportEntry, ReportSection, ReportSectionCategory};
use crate::table::{TableDocument, TabularDialect, TabularDocument};

const HEAD_FILTERS: &[&str] = &[TYPE, NAME, "Setup", "Class"];
const HEAD_ABOUT: &[&str] = &[TYPE, VALUE];
const HEAD_RAW_STDERR: &[&str] = &["Filter name", "Chain pos", "Line"];

const FILTERS_BASE_NAME: &str = "filters";
const ABOUT_BASE_NAME: &str = "about";
const REPORT_CREATED_BY: &str = "Report created by";

/// cropdetect lines are already exported as crop measures.
const SKIPPED_RAW_FILTER: &str = "cropdetect";

fn app_name_version() -> String {
    format!("mediareport {}", env!("CARGO_PKG_VERSION"))
}

fn filters(result: &DataResult) -> &[FilterDescription] {
    result
        .media_analysis
        .as_ref()
        .map(|analysis| analysis.filters.as_slice())
        .unwrap_or_default()
}

fn filter_rows(filters: &[FilterDescription]) -> Rows {
    filters
        .iter()
        .map(|f| crate::cells![f.kind.as_str(), f.name.as_str(), f.setup.as_str(), f.class.as_str()])
        .collect()
}

fn about_rows(result: &DataResult) -> Rows {
    result
        .versions
        .iter()
        .map(|(name, version)| crate::cells![name, version])
        .chain(std::iter::once(crate::cells![REPORT_CREATED_BY, app_name_version()]))
        .collect()
}

pub struct AboutMeasureEngine;

renderer_engine!(AboutMeasureEngine, "AboutMeasure", report, table, tabular);

impl TabularRendererEngine for AboutMeasureEngine {
    fn to_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Vec<TabularDocument>> {
        let mut documents = Vec::with_capacity(2);
        let filters = filters(result);
        if !filters.is_empty() {
            let document = TabularDocument::new(dialect, FILTERS_BASE_NAME, HEAD_FILTERS.iter().copied());
            documents.push(fill_tabular(document, &filter_rows(filters)));
        }
        let document = TabularDocument::new(dialect, ABOUT_BASE_NAME, HEAD_ABOUT.iter().copied());
        documents.push(fill_tabular(document, &about_rows(result)));
        Ok(documents)
    }

    fn tabular_names(&self) -> Vec<&'static str> {
        vec![FILTERS_BASE_NAME, ABOUT_BASE_NAME]
    }
}

impl TableRendererEngine for AboutMeasureEngine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
        let filters = filters(result);
        if !filters.is_empty() {
            fill_table(document, "Filters", HEAD_FILTERS, filter_rows(filters))?;
        }
        fill_table(document, "About app", HEAD_ABOUT, about_rows(result))
    }
}

impl ReportRendererEngine for AboutMeasureEngine {
    fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()> {
        let mut sorted: Vec<_> = filters(result).iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        let mut section = ReportSection::new(ReportSectionCategory::About, "Filters used in this measure");
        for filter in sorted {
            section.add(ReportEntry::pre_value(&filter.name, filter.setup.as_str()));
        }
        document.add(section);

        for (name, version) in &result.versions {
            document.add_about(ReportEntry::key_value(name, version.as_str()));
        }
        let created = document.created().format("%Y-%m-%d %H:%M:%S").to_string();
        document.add_about(ReportEntry::key_value(DOCUMENT_CREATION_DATE, created));
        document.add_about(ReportEntry::key_value(REPORT_CREATED_BY, app_name_version()));
        Ok(())
    }
}

pub struct RawStderrFiltersEngine;

renderer_engine!(RawStderrFiltersEngine, "RawStderrFilters", table, tabular);

fn raw_lines(result: &DataResult) -> Vec<&RawStderrFilterLine> {
    result
        .media_analysis
        .iter()
        .flat_map(|analysis| &analysis.raw_stderr_filters)
        .filter(|line| line.filter_name != SKIPPED_RAW_FILTER)
        .collect()
}

fn raw_rows(lines: &[&RawStderrFilterLine]) -> Rows {
    lines
        .iter()
        .map(|l| crate::cells![l.filter_name.as_str(), l.chain_pos, l.line.as_str()])
        .collect()
}

impl SingleTabularEngine for RawStderrFiltersEngine {
    fn tabular_base_name(&self) -> &'static str {
        "rawstderrfilters"
    }

    fn make_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Option<TabularDocument>> {
        let lines = raw_lines(result);
        if lines.is_empty() {
            return Ok(None);
        }
        let document = TabularDocument::new(dialect, self.tabular_base_name(), HEAD_RAW_STDERR.iter().copied());
        Ok(Some(fill_tabular(document, &raw_rows(&lines))))
    }
}

impl TableRendererEngine for RawStderrFiltersEngine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
        let lines = raw_lines(result);
        if lines.is_empty() {
            return Ok(());
        }
        fill_table(document, "rawstderrfilters", HEAD_RAW_STDERR, raw_rows(&lines))
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::with_media;
    use super::*;
    use crate::model::MediaAnalysis;
    use crate::report::to_json;
    use crate::table::Cell;

    fn about_result() -> DataResult {
        let mut result = with_media(MediaAnalysis {
            filters: vec![
                FilterDescription {
                    kind: "video".into(),
                    name: "idet".into(),
                    setup: "idet".into(),
                    class: "lavfi".into(),
                },
                FilterDescription {
                    kind: "audio".into(),
                    name: "ebur128".into(),
                    setup: "ebur128=peak=true".into(),
                    class: "lavfi".into(),
                },
            ],
            raw_stderr_filters: vec![
                RawStderrFilterLine {
                    filter_name: "cropdetect".into(),
                    chain_pos: 0,
                    line: "x1:0".into(),
                },
                RawStderrFilterLine {
                    filter_name: "ebur128".into(),
                    chain_pos: 1,
                    line: "Summary:".into(),
                },
            ],
            ..Default::default()
        });
        result.versions.insert("ffmpeg".into(), "7.1".into());
        result
    }

    #[test]
    fn about_table_ends_with_creator() {
        let mut document = TableDocument::new();
        AboutMeasureEngine.add_to_table(&about_result(), &mut document).unwrap();
        assert_eq!(document.table("Filters").unwrap().rows().len(), 2);
        let about = document.table("About app").unwrap();
        assert_eq!(about.cell(0, 0), &Cell::String("ffmpeg".into()));
        assert_eq!(about.cell(1, 1), &Cell::String(app_name_version()));
    }

    #[test]
    fn two_tabulars_one_by_name() {
        let result = about_result();
        let docs = AboutMeasureEngine.to_tabular(&result, TabularDialect::Txt).unwrap();
        assert_eq!(docs.len(), 2);
        let about = AboutMeasureEngine
            .to_single_tabular(&result, TabularDialect::Txt, "about")
            .unwrap()
            .unwrap();
        assert_eq!(about.rows().len(), 2);
        assert!(AboutMeasureEngine
            .to_single_tabular(&result, TabularDialect::Txt, "media-summary")
            .unwrap()
            .is_none());
    }

    #[test]
    fn raw_lines_skip_cropdetect() {
        let mut document = TableDocument::new();
        RawStderrFiltersEngine.add_to_table(&about_result(), &mut document).unwrap();
        let table = document.table("rawstderrfilters").unwrap();
        assert_eq!(table.rows().len(), 1);
        assert_eq!(table.cell(0, 0), &Cell::String("ebur128".into()));
    }

    #[test]
    fn report_sorts_filters_and_fills_about() {
        let mut document = ReportDocument::new("clip");
        AboutMeasureEngine.add_to_report(&about_result(), &mut document).unwrap();
        let json = to_json(&document);
        let filters = json["about"]["filters_used_in_this_measure"].as_object().unwrap();
        let keys: Vec<_> = filters.keys().cloned().collect();
        assert_eq!(keys, vec!["_section_title", "ebur128", "idet"]);
        assert_eq!(json["about"]["about_this_document"]["ffmpeg"], "7.1");
        assert_eq!(json["about"]["about_this_document"]["report_created_by"], app_name_version());
    }
}
