//! Audio signal measures: phase correlation and per-channel statistics.

use super::{DBFS, FRAME, PTS, PTS_TIME, Rows, SAMPLE_S, VALUE, fill_table, fill_tabular, value_measure_rows};
use crate::engine::{ReportRendererEngine, SingleTabularEngine, TableRendererEngine};
use crate::error::CoreResult;
use crate::model::{AStatsChannel, DataResult, FrameMeasure};
use crate::report::{ReportDocument, ReportEntry, ReportSection, ReportSectionCategory};
use crate::table::{TableDocument, TabularDialect, TabularDocument};

const HEAD_PHASE: &[&str] = &[FRAME, PTS, PTS_TIME, VALUE];

const HEAD_ASTATS: &[&str] = &[
    FRAME,
    PTS,
    PTS_TIME,
    "Channel",
    "DC Offset",
    "Entropy",
    "Flat factor",
    "Noise floor",
    "Noise floor count",
    "Peak level",
    "Peak count",
    "RMS level",
    "Dynamic range",
    "Crest factor",
    "Other",
];

fn aphasemeter(result: &DataResult) -> &[FrameMeasure<f64>] {
    result
        .media_analysis
        .as_ref()
        .map(|analysis| analysis.aphasemeter.as_slice())
        .unwrap_or_default()
}

fn astats(result: &DataResult) -> &[FrameMeasure<Vec<AStatsChannel>>] {
    result
        .media_analysis
        .as_ref()
        .map(|analysis| analysis.astats.as_slice())
        .unwrap_or_default()
}

pub struct APhaseMeterEngine;

renderer_engine!(APhaseMeterEngine, "APhaseMeter", report, table, tabular);

impl SingleTabularEngine for APhaseMeterEngine {
    fn tabular_base_name(&self) -> &'static str {
        "audio-phase-meter"
    }

    fn make_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Option<TabularDocument>> {
        let measures = aphasemeter(result);
        if measures.is_empty() {
            return Ok(None);
        }
        let document = TabularDocument::new(dialect, self.tabular_base_name(), HEAD_PHASE.iter().copied());
        Ok(Some(fill_tabular(document, &value_measure_rows(measures))))
    }
}

impl TableRendererEngine for APhaseMeterEngine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
        let measures = aphasemeter(result);
        if measures.is_empty() {
            return Ok(());
        }
        fill_table(document, "Audio phase", HEAD_PHASE, value_measure_rows(measures))
    }
}

impl ReportRendererEngine for APhaseMeterEngine {
    fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()> {
        let measures = aphasemeter(result);
        if measures.is_empty() {
            return Ok(());
        }
        let percents = measures.iter().map(|m| (m.value * 100.0).round() as i64);
        let mut section = ReportSection::new(ReportSectionCategory::Audio, "Phase correlation");
        section.add(ReportEntry::long_stats("Phase correlation (L/R)", percents, "%"));
        document.add(section);
        Ok(())
    }
}

pub struct AStatsEngine;

renderer_engine!(AStatsEngine, "AStats", report, table, tabular);

/// One row per channel and measure. Channels count from 1.
fn astats_rows(measures: &[FrameMeasure<Vec<AStatsChannel>>]) -> Rows {
    measures
        .iter()
        .flat_map(|measure| {
            measure.value.iter().enumerate().map(move |(pos, channel)| {
                crate::cells![
                    measure.frame,
                    measure.pts,
                    measure.pts_time,
                    pos + 1,
                    channel.dc_offset,
                    channel.entropy,
                    channel.flat_factor,
                    channel.noise_floor,
                    channel.noise_floor_count,
                    channel.peak_level,
                    channel.peak_count,
                    channel.rms_level,
                    channel.dynamic_range,
                    channel.crest_factor,
                    channel.other_to_string(),
                ]
            })
        })
        .collect()
}

/// Values of one channel across every measure.
fn channel_values<'a>(
    measures: &'a [FrameMeasure<Vec<AStatsChannel>>],
    channel: usize,
    extract: impl Fn(&AStatsChannel) -> Option<f64> + 'a,
) -> impl Iterator<Item = f64> + 'a {
    measures
        .iter()
        .filter_map(move |m| m.value.get(channel))
        .filter_map(extract)
}

fn channel_count(measures: &[FrameMeasure<Vec<AStatsChannel>>]) -> usize {
    measures.iter().map(|m| m.value.len()).max().unwrap_or(0)
}

impl SingleTabularEngine for AStatsEngine {
    fn tabular_base_name(&self) -> &'static str {
        "audio-stats"
    }

    fn make_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Option<TabularDocument>> {
        let measures = astats(result);
        if measures.is_empty() {
            return Ok(None);
        }
        let document = TabularDocument::new(dialect, self.tabular_base_name(), HEAD_ASTATS.iter().copied());
        Ok(Some(fill_tabular(document, &astats_rows(measures))))
    }
}

impl TableRendererEngine for AStatsEngine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
        let measures = astats(result);
        if measures.is_empty() {
            return Ok(());
        }
        fill_table(document, "Audio Stats", HEAD_ASTATS, astats_rows(measures))
    }
}

impl ReportRendererEngine for AStatsEngine {
    fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()> {
        let measures = astats(result);
        let channels = channel_count(measures);
        if channels == 0 {
            return Ok(());
        }
        let mut section = ReportSection::new(ReportSectionCategory::Audio, "Signal stats");

        let per_channel = |label: &str, unit: &str, extract: fn(&AStatsChannel) -> Option<f64>| {
            (0..channels)
                .map(|channel| {
                    ReportEntry::float_stats(
                        &format!("{label} channel {}", channel + 1),
                        channel_values(measures, channel, extract).collect::<Vec<_>>(),
                        unit,
                    )
                })
                .collect::<Vec<_>>()
        };

        section
            .add_subset(per_channel("RMS Level", DBFS, |c| c.rms_level))
            .add_subset(per_channel("Peak level", DBFS, |c| Some(c.peak_level)))
            .add_subset(per_channel("Noise floor", DBFS, |c| Some(c.noise_floor)))
            .add_subset(per_channel("Dynamic Range", "dB", |c| c.dynamic_range))
            .add_subset(per_channel("DC offset", "%", |c| Some(c.dc_offset * 100.0)))
            .add_subset(per_channel("Entropy (complexity)", "%", |c| Some(c.entropy * 100.0)))
            .add_subset(per_channel("Crest Factor", "", |c| c.crest_factor))
            .add_subset(per_channel("Flat factor", "", |c| Some(c.flat_factor)));

        // Counts are cumulative: only the last measure matters.
        let last_counts = |label: &str, extract: fn(&AStatsChannel) -> i64| {
            (0..channels)
                .filter_map(|channel| {
                    let count = measures
                        .iter()
                        .rev()
                        .find_map(|m| m.value.get(channel))
                        .map(extract)?;
                    let key = format!("{label} channel {}", channel + 1);
                    (count != 0).then(|| ReportEntry::numeric(&key, count, SAMPLE_S))
                })
                .collect::<Vec<_>>()
        };
        section
            .add_subset(last_counts("Peak count", |c| c.peak_count))
            .add_subset(last_counts("Noise floor count", |c| c.noise_floor_count));

        document.add(section);
        Ok(())
    }
}
