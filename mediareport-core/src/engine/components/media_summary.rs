//! Container and stream overview from the probe result.

use std::time::Duration;

use super::{Rows, TYPE, VALUE, fill_table, fill_tabular};
use crate::engine::{ReportRendererEngine, SingleTabularEngine, TableRendererEngine};
use crate::error::CoreResult;
use crate::model::{DataResult, ProbeFormat, ProbeResult, ProbeStream};
use crate::numbers::{NUMBER_UTILS, duration_to_string};
use crate::report::{ChapterEntry, Numeric, ReportDocument, ReportEntry, ReportSection, ReportSectionCategory, StreamList};
use crate::table::{TableDocument, TabularDialect, TabularDocument};

const HEAD_MEDIA_SUMMARY: &[&str] = &[TYPE, VALUE];
const FILE_FORMAT: &str = "File format";

pub struct MediaSummaryEngine;

renderer_engine!(MediaSummaryEngine, "MediaSummary", report, table, tabular);

fn seconds_to_duration(seconds: f64) -> Option<Duration> {
    (seconds.is_finite() && seconds >= 0.0).then(|| Duration::from_millis((seconds * 1000.0).round() as u64))
}

/// One-line container description, e.g. `Matroska / WebM, 00:01:00, 1,234 bytes`.
fn format_summary(format: &ProbeFormat) -> String {
    let mut parts = vec![
        format
            .format_long_name
            .clone()
            .unwrap_or_else(|| format.format_name.clone()),
    ];
    if let Some(duration) = format.duration.and_then(seconds_to_duration) {
        parts.push(duration_to_string(duration));
    }
    if let Some(size) = format.size {
        parts.push(format!("{} bytes", NUMBER_UTILS.long_to_string(size as i64)));
    }
    if let Some(bit_rate) = format.bit_rate {
        parts.push(format!("{} kbps", NUMBER_UTILS.long_to_string((bit_rate / 1000) as i64)));
    }
    parts.join(", ")
}

fn summary_rows(probe: &ProbeResult) -> Rows {
    let mut rows: Rows = probe
        .streams
        .iter()
        .map(|stream| crate::cells!["Stream", stream.summary()])
        .collect();
    if let Some(format) = &probe.format {
        rows.push(crate::cells!["Format", format_summary(format)]);
    }
    rows
}

fn add_stream(list: &mut StreamList, stream: &ProbeStream) -> CoreResult<()> {
    let entry = list.add_stream(stream.id.as_deref(), &stream.codec_type, stream.index);
    entry
        .add("Codec name", stream.codec_long_name.as_deref())?
        .add("Codec internal name", stream.codec_name.as_deref())?
        .add("Codec Profile", stream.profile.as_deref())?
        .add_numeric("Width", stream.width.map(Numeric::from), "pixel(s)")?
        .add_numeric("Height", stream.height.map(Numeric::from), "pixel(s)")?
        .add("Pixel format", stream.pix_fmt.as_deref())?
        .add_unless_default("Average frame rate", stream.avg_frame_rate.as_deref(), "0/0")?
        .add_numeric("Sample rate", stream.sample_rate.map(Numeric::from), "Hz/sec")?
        .add_numeric("Channel count", stream.channels.map(Numeric::from), "channel(s)")?
        .add("Channel layout", stream.channel_layout.as_deref())?
        .add_numeric("Bitrate (indicated)", stream.bit_rate.map(Numeric::from), "bit(s)/sec")?
        .add("Language", stream.language.as_deref())?
        .add("Disposition", stream.default.then_some("default"))?;
    for (key, value) in &stream.properties {
        entry.add(key, Some(value.as_str()))?;
    }
    Ok(())
}

impl SingleTabularEngine for MediaSummaryEngine {
    fn tabular_base_name(&self) -> &'static str {
        "media-summary"
    }

    fn make_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Option<TabularDocument>> {
        Ok(result.probe.as_ref().map(|probe| {
            fill_tabular(
                TabularDocument::new(dialect, self.tabular_base_name(), HEAD_MEDIA_SUMMARY.iter().copied()),
                &summary_rows(probe),
            )
        }))
    }
}

impl TableRendererEngine for MediaSummaryEngine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
        match &result.probe {
            Some(probe) => fill_table(document, "Media summary", HEAD_MEDIA_SUMMARY, summary_rows(probe)),
            None => Ok(()),
        }
    }
}

impl ReportRendererEngine for MediaSummaryEngine {
    fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()> {
        let Some(probe) = &result.probe else {
            return Ok(());
        };
        if let Some(format) = &probe.format {
            document.add_summary(ReportEntry::key_value(FILE_FORMAT, format_summary(format)));
        }
        document.add_summary(ReportEntry::key_values(
            "File stream(s)",
            probe.streams.iter().map(ProbeStream::summary),
        ));

        let mut section = ReportSection::new(ReportSectionCategory::Container, "Media container");
        if let Some(format) = &probe.format {
            let names = format
                .format_long_name
                .iter()
                .cloned()
                .chain(std::iter::once(format.format_name.clone()))
                .filter(|name| !name.is_empty());
            section.add(ReportEntry::key_values(FILE_FORMAT, names));
            if let Some(size) = format.size {
                section.add(ReportEntry::numeric("File size", size, "byte(s)"));
            }
            if let Some(bit_rate) = format.bit_rate {
                section.add(ReportEntry::numeric("Container declared bitrate", bit_rate, "bit(s)/sec"));
            }
            if let Some(start) = format.start_time.and_then(seconds_to_duration) {
                section.add(ReportEntry::key_value("Container start time", duration_to_string(start)));
            }
            section.add(ReportEntry::numeric("Program count", format.nb_programs, "program(s)"));
            section.add(ReportEntry::numeric("All stream count", format.nb_streams, "stream(s)"));
        }

        let mut streams = StreamList::new();
        for stream in &probe.streams {
            add_stream(&mut streams, stream)?;
        }
        section.add(ReportEntry::Streams(streams));

        let chapters = probe
            .chapters
            .iter()
            .map(|chapter| ChapterEntry {
                title: chapter.title.clone().unwrap_or_default(),
                position: Duration::from_millis(chapter.start_ms),
            })
            .collect();
        section.add(ReportEntry::Chapters(chapters));
        document.add(section);
        Ok(())
    }
}
