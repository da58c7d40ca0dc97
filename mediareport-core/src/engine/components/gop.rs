//! Group-of-pictures statistics for the first video stream.

use super::{BYTES, FRAME_S, FRAMES, Rows, fill_table, fill_tabular, first_stream_frames};
use crate::engine::{ReportRendererEngine, SingleTabularEngine, TableRendererEngine};
use crate::error::CoreResult;
use crate::model::{DataResult, PictType, VideoFrame};
use crate::report::{ReportDocument, ReportEntry, ReportSection, ReportSectionCategory};
use crate::table::{TableDocument, TabularDialect, TabularDocument};

const HEAD_GOP: &[&str] = &[
    "GOP frame count",
    "P frames count",
    "B frames count",
    "GOP data size",
    "I frame data size",
    "P frames data size",
    "B frames data size",
];

/// One GOP: a key frame and every frame up to the next key frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GopStat {
    pub frame_count: i64,
    pub p_count: i64,
    pub b_count: i64,
    pub data_size: i64,
    /// Bytes of the frames that are neither P nor B.
    pub i_size: i64,
    pub p_size: i64,
    pub b_size: i64,
}

impl GopStat {
    fn push(&mut self, frame: &VideoFrame) {
        self.frame_count += 1;
        self.data_size += frame.pkt_size;
        match frame.pict_type {
            PictType::P => {
                self.p_count += 1;
                self.p_size += frame.pkt_size;
            }
            PictType::B => {
                self.b_count += 1;
                self.b_size += frame.pkt_size;
            }
            PictType::I | PictType::Unknown => self.i_size += frame.pkt_size,
        }
    }
}

/// Splits the first video stream on key frames. Frames before the first key
/// frame belong to no GOP and are dropped.
pub fn extract_gop_stats(frames: &[VideoFrame]) -> Vec<GopStat> {
    let mut gops: Vec<GopStat> = Vec::new();
    for frame in first_stream_frames(frames) {
        if frame.key_frame {
            gops.push(GopStat::default());
        }
        if let Some(current) = gops.last_mut() {
            current.push(frame);
        }
    }
    gops
}

fn gop_rows(gops: &[GopStat]) -> Rows {
    gops.iter()
        .map(|g| crate::cells![g.frame_count, g.p_count, g.b_count, g.data_size, g.i_size, g.p_size, g.b_size])
        .collect()
}

fn video_frames(result: &DataResult) -> &[VideoFrame] {
    result
        .container_analysis
        .as_ref()
        .map(|c| c.video_frames.as_slice())
        .unwrap_or_default()
}

fn percent(part: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    (part as f64 * 100.0 / total as f64).round() as i64
}

pub struct GopStatsEngine;

renderer_engine!(GopStatsEngine, "GopStats", report, table, tabular);

impl SingleTabularEngine for GopStatsEngine {
    fn tabular_base_name(&self) -> &'static str {
        "container-video-gop"
    }

    fn make_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Option<TabularDocument>> {
        let gops = extract_gop_stats(video_frames(result));
        if gops.is_empty() {
            return Ok(None);
        }
        let document = TabularDocument::new(dialect, self.tabular_base_name(), HEAD_GOP.iter().copied());
        Ok(Some(fill_tabular(document, &gop_rows(&gops))))
    }
}

impl TableRendererEngine for GopStatsEngine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
        let gops = extract_gop_stats(video_frames(result));
        if gops.is_empty() {
            return Ok(());
        }
        fill_table(document, "Container GOP", HEAD_GOP, gop_rows(&gops))
    }
}

impl ReportRendererEngine for GopStatsEngine {
    fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()> {
        let all_frames = video_frames(result);
        let gops = extract_gop_stats(all_frames);
        if gops.is_empty() {
            return Ok(());
        }
        let frames = first_stream_frames(all_frames);
        let frame_count = frames.len() as i64;
        let key_frame_count = frames.iter().filter(|f| f.key_frame).count() as i64;
        let all_frames_size: i64 = frames.iter().map(|f| f.pkt_size).sum();
        let count_of = |kind: PictType| frames.iter().filter(|f| f.pict_type == kind).count() as i64;
        let size_of = |kind: PictType| -> i64 {
            frames
                .iter()
                .filter(|f| f.pict_type == kind)
                .map(|f| f.pkt_size)
                .sum()
        };

        let mut section = ReportSection::new(ReportSectionCategory::Container, "Video compression group-of-pictures");
        section
            .add(ReportEntry::numeric("Count", gops.len(), "GOPs"))
            .add(ReportEntry::long_stats("GOPs length", gops.iter().map(|g| g.frame_count), FRAME_S))
            .add(ReportEntry::long_stats("GOPs size", gops.iter().map(|g| g.data_size), BYTES));

        let i_count = count_of(PictType::I);
        if key_frame_count > 0 && i_count != key_frame_count {
            section.add(ReportEntry::numeric("I frames count", i_count, FRAMES));
        }
        section
            .add(ReportEntry::long_stats("I frames size in GOPs", gops.iter().map(|g| g.i_size), BYTES))
            .add(ReportEntry::numeric("All I size", size_of(PictType::I), BYTES));

        for (kind, letter) in [(PictType::P, "P"), (PictType::B, "B")] {
            let count = count_of(kind);
            if count == 0 {
                section.add(ReportEntry::key_value(
                    &format!("{letter} frame presence"),
                    format!("no {letter} frames"),
                ));
                continue;
            }
            let size = size_of(kind);
            let (sizes, lengths): (Vec<i64>, Vec<i64>) = gops
                .iter()
                .map(|g| match kind {
                    PictType::P => (g.p_size, g.p_count),
                    _ => (g.b_size, g.b_count),
                })
                .unzip();
            section
                .add(ReportEntry::numeric(&format!("{letter} frames count on media"), count, FRAMES))
                .add(ReportEntry::numeric(
                    &format!("{letter} frames repartition count"),
                    percent(count, frame_count),
                    "%",
                ))
                .add(ReportEntry::numeric(&format!("Size sum for all {letter} frames"), size, BYTES))
                .add(ReportEntry::numeric(
                    &format!("All {letter} frames repartition by size"),
                    percent(size, all_frames_size),
                    "%",
                ))
                .add_subset([
                    ReportEntry::long_stats(&format!("{letter} frames size in GOPs"), sizes, BYTES),
                    ReportEntry::long_stats(&format!("{letter} frames length in GOPs"), lengths, FRAME_S),
                ]);
        }

        document.add(section);
        Ok(())
    }
}
