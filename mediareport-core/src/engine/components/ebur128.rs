//! EBU R 128 loudness: the overall summary and the per-position measures.

use super::{DBFS, Rows, fill_table, fill_tabular};
use crate::engine::{ReportRendererEngine, SingleTabularEngine, TableRendererEngine};
use crate::error::CoreResult;
use crate::model::{DataResult, Ebur128Event, Ebur128Summary};
use crate::report::{ReportDocument, ReportEntry, ReportSection, ReportSectionCategory};
use crate::table::{TableDocument, TabularDialect, TabularDocument};

const HEAD_SUMMARY: &[&str] = &[
    "Integrated",
    "Loudness Range",
    "Loudness Range Low",
    "Loudness Range High",
    "Sample Peak",
    "True Peak",
];

const HEAD_EVENTS: &[&str] = &[
    "Position",
    "Integrated",
    "Momentary",
    "Short-term",
    "Loudness Range",
    "Sample-peak L",
    "Sample-peak R",
    "True-peak per frame L",
    "True-peak per frame R",
    "True-peak L",
    "True-peak R",
];

fn summary(result: &DataResult) -> Option<&Ebur128Summary> {
    result.media_analysis.as_ref()?.ebur128_summary.as_ref()
}

fn events(result: &DataResult) -> &[Ebur128Event] {
    result
        .media_analysis
        .as_ref()
        .map(|analysis| analysis.ebur128.as_slice())
        .unwrap_or_default()
}

fn summary_rows(summary: &Ebur128Summary) -> Rows {
    vec![crate::cells![
        summary.integrated,
        summary.loudness_range,
        summary.loudness_range_low,
        summary.loudness_range_high,
        summary.sample_peak,
        summary.true_peak,
    ]]
}

fn event_rows(events: &[Ebur128Event]) -> Rows {
    events
        .iter()
        .map(|event| {
            crate::cells![
                event.position,
                event.integrated,
                event.momentary,
                event.short_term,
                event.loudness_range,
                event.sample_peak.left,
                event.sample_peak.right,
                event.true_peak_per_frame.left,
                event.true_peak_per_frame.right,
                event.true_peak.left,
                event.true_peak.right,
            ]
        })
        .collect()
}

pub struct Ebur128SummaryEngine;

renderer_engine!(Ebur128SummaryEngine, "Ebur128Summary", report, table, tabular);

impl SingleTabularEngine for Ebur128SummaryEngine {
    fn tabular_base_name(&self) -> &'static str {
        "audio-ebur128-summary"
    }

    fn make_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Option<TabularDocument>> {
        Ok(summary(result).map(|summary| {
            let document = TabularDocument::new(dialect, self.tabular_base_name(), HEAD_SUMMARY.iter().copied())
                .with_low_precision();
            fill_tabular(document, &summary_rows(summary))
        }))
    }
}

impl TableRendererEngine for Ebur128SummaryEngine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
        match summary(result) {
            Some(summary) => fill_table(document, "EBU R 128 Summary", HEAD_SUMMARY, summary_rows(summary)),
            None => Ok(()),
        }
    }
}

impl ReportRendererEngine for Ebur128SummaryEngine {
    fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()> {
        let Some(summary) = summary(result) else {
            return Ok(());
        };
        let mut section = ReportSection::new(ReportSectionCategory::Audio, "Loudness EBU-R128");
        section
            .add(ReportEntry::numeric("Integrated", summary.integrated, DBFS))
            .add(ReportEntry::numeric("Range (LRA)", summary.loudness_range, "dB"))
            .add(ReportEntry::numeric("High range", summary.loudness_range_high, DBFS))
            .add(ReportEntry::numeric("Low range", summary.loudness_range_low, DBFS))
            .add(ReportEntry::numeric("True peak", summary.true_peak, "dBTPK"))
            .add(ReportEntry::numeric("Sample peak", summary.sample_peak, DBFS));
        document.add(section);
        Ok(())
    }
}

pub struct Ebur128Engine;

renderer_engine!(Ebur128Engine, "Ebur128", table, tabular);

impl SingleTabularEngine for Ebur128Engine {
    fn tabular_base_name(&self) -> &'static str {
        "audio-ebur128"
    }

    fn make_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Option<TabularDocument>> {
        let events = events(result);
        if events.is_empty() {
            return Ok(None);
        }
        let document =
            TabularDocument::new(dialect, self.tabular_base_name(), HEAD_EVENTS.iter().copied()).with_low_precision();
        Ok(Some(fill_tabular(document, &event_rows(events))))
    }
}

impl TableRendererEngine for Ebur128Engine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
        let events = events(result);
        if events.is_empty() {
            return Ok(());
        }
        fill_table(document, "EBU R 128", HEAD_EVENTS, event_rows(events))
    }
}
