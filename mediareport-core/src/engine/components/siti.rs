//! Spatial and temporal information (ITU-T P.910).

use super::{FRAME, PTS, PTS_TIME, Rows, TYPE, fill_table, fill_tabular};
use crate::engine::{ReportRendererEngine, SingleTabularEngine, TableRendererEngine};
use crate::error::CoreResult;
use crate::model::{DataResult, FrameMeasure, SitiValue};
use crate::report::{ReportDocument, ReportEntry, ReportSection, ReportSectionCategory};
use crate::table::{TableDocument, TabularDialect, TabularDocument};

const SPATIAL_INFO: &str = "Spatial Info";
const TEMPORAL_INFO: &str = "Temporal Info";

const HEAD_SITI: &[&str] = &[FRAME, PTS, PTS_TIME, SPATIAL_INFO, TEMPORAL_INFO];
const HEAD_SITI_STATS: &[&str] = &[TYPE, "Average", "Max", "Min"];

fn siti(result: &DataResult) -> &[FrameMeasure<SitiValue>] {
    result
        .media_analysis
        .as_ref()
        .map(|analysis| analysis.siti.as_slice())
        .unwrap_or_default()
}

fn siti_rows(measures: &[FrameMeasure<SitiValue>]) -> Rows {
    measures
        .iter()
        .map(|m| crate::cells![m.frame, m.pts, m.pts_time, m.value.si, m.value.ti])
        .collect()
}

/// Average, max and min of a non-empty series.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SeriesStats {
    average: f64,
    max: f64,
    min: f64,
}

impl SeriesStats {
    fn compute(values: impl Iterator<Item = f64>) -> Self {
        let (mut sum, mut count) = (0.0, 0_usize);
        let (mut max, mut min) = (f64::NEG_INFINITY, f64::INFINITY);
        for value in values {
            sum += value;
            count += 1;
            max = max.max(value);
            min = min.min(value);
        }
        Self {
            average: sum / count as f64,
            max,
            min,
        }
    }
}

fn stats_rows(measures: &[FrameMeasure<SitiValue>]) -> Rows {
    let si = SeriesStats::compute(measures.iter().map(|m| m.value.si));
    let ti = SeriesStats::compute(measures.iter().map(|m| m.value.ti));
    vec![
        crate::cells![SPATIAL_INFO, si.average, si.max, si.min],
        crate::cells![TEMPORAL_INFO, ti.average, ti.max, ti.min],
    ]
}

pub struct SitiEngine;

renderer_engine!(SitiEngine, "Siti", table, tabular);

impl SingleTabularEngine for SitiEngine {
    fn tabular_base_name(&self) -> &'static str {
        "video-siti-ITU-T_P-910"
    }

    fn make_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Option<TabularDocument>> {
        let measures = siti(result);
        if measures.is_empty() {
            return Ok(None);
        }
        let document = TabularDocument::new(dialect, self.tabular_base_name(), HEAD_SITI.iter().copied());
        Ok(Some(fill_tabular(document, &siti_rows(measures))))
    }
}

impl TableRendererEngine for SitiEngine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
        let measures = siti(result);
        if measures.is_empty() {
            return Ok(());
        }
        fill_table(document, "SITI", HEAD_SITI, siti_rows(measures))
    }
}

pub struct SitiReportEngine;

renderer_engine!(SitiReportEngine, "SitiReport", report, table, tabular);

impl SingleTabularEngine for SitiReportEngine {
    fn tabular_base_name(&self) -> &'static str {
        "video-siti-stats-ITU-T_P-910"
    }

    fn make_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Option<TabularDocument>> {
        let measures = siti(result);
        if measures.is_empty() {
            return Ok(None);
        }
        let document = TabularDocument::new(dialect, self.tabular_base_name(), HEAD_SITI_STATS.iter().copied());
        Ok(Some(fill_tabular(document, &stats_rows(measures))))
    }
}

impl TableRendererEngine for SitiReportEngine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
        let measures = siti(result);
        if measures.is_empty() {
            return Ok(());
        }
        fill_table(document, "SITI Stats", HEAD_SITI_STATS, stats_rows(measures))
    }
}

impl ReportRendererEngine for SitiReportEngine {
    fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()> {
        let measures = siti(result);
        if measures.is_empty() {
            return Ok(());
        }
        let mut section = ReportSection::new(ReportSectionCategory::Video, "Image and motion complexity");
        section.add_subset([
            ReportEntry::float_stats("Spatial Information", measures.iter().map(|m| m.value.si), ""),
            ReportEntry::float_stats("Temporal Information", measures.iter().map(|m| m.value.ti), ""),
        ]);
        document.add(section);
        Ok(())
    }
}
