//! Built-in renderer engines.
//!
//! Most engines build their rows once and hand the same typed cells to the
//! table document and to the tabular documents, so every format sees the
//! same values.

use crate::config::ExportConfig;
use crate::error::CoreResult;
use crate::model::{FrameMeasure, VideoFrame};
use crate::table::{TableDocument, TabularDocument, TypedCell};

use super::RendererEngine;

/// Implements [`RendererEngine`] with the listed capabilities.
macro_rules! renderer_engine {
    ($engine:ty, $name:literal $(, $capability:ident)* $(,)?) => {
        impl $crate::engine::RendererEngine for $engine {
            fn name(&self) -> &'static str {
                $name
            }
            $(renderer_engine!(@$capability);)*
        }
    };
    (@report) => {
        fn as_report(&self) -> Option<&dyn $crate::engine::ReportRendererEngine> {
            Some(self)
        }
    };
    (@table) => {
        fn as_table(&self) -> Option<&dyn $crate::engine::TableRendererEngine> {
            Some(self)
        }
    };
    (@tabular) => {
        fn as_tabular(&self) -> Option<&dyn $crate::engine::TabularRendererEngine> {
            Some(self)
        }
    };
    (@graphic) => {
        fn as_graphic(&self) -> Option<&dyn $crate::engine::GraphicRendererEngine> {
            Some(self)
        }
    };
}

mod about;
mod audio;
mod container;
mod ebur128;
mod events;
mod gop;
mod media_summary;
mod siti;
mod snapshots;
mod video;

pub use about::{AboutMeasureEngine, RawStderrFiltersEngine};
pub use audio::{APhaseMeterEngine, AStatsEngine};
pub use container::{AConstsEngine, AFramesEngine, FramesDurationEngine, PacketsEngine, VConstsEngine, VFramesEngine};
pub use ebur128::{Ebur128Engine, Ebur128SummaryEngine};
pub use events::EventsEngine;
pub use gop::{GopStat, GopStatsEngine, extract_gop_stats};
pub use media_summary::MediaSummaryEngine;
pub use siti::{SitiEngine, SitiReportEngine};
pub use snapshots::{SignificantSnapshotEngine, SnapshotStripEngine};
pub use video::{BlockEngine, BlurEngine, CropEngine, IdetEngine};

pub(crate) const FRAME: &str = "Frame";
pub(crate) const PTS: &str = "Pts";
pub(crate) const PTS_TIME: &str = "Pts time";
pub(crate) const VALUE: &str = "Value";
pub(crate) const TYPE: &str = "Type";
pub(crate) const NAME: &str = "Name";

pub(crate) const BYTES: &str = "bytes";
pub(crate) const FRAMES: &str = "frames";
pub(crate) const FRAME_S: &str = "frame(s)";
pub(crate) const MILLISECOND_S: &str = "millisecond(s)";
pub(crate) const PIXEL_S: &str = "pixel(s)";
pub(crate) const SAMPLE_S: &str = "sample(s)";
pub(crate) const DBFS: &str = "dBFS";

pub(crate) type Rows = Vec<Vec<TypedCell>>;

/// Every built-in engine, in registration order.
pub fn default_engines(config: &ExportConfig) -> Vec<Box<dyn RendererEngine>> {
    vec![
        Box::new(MediaSummaryEngine),
        Box::new(Ebur128SummaryEngine),
        Box::new(Ebur128Engine),
        Box::new(EventsEngine),
        Box::new(APhaseMeterEngine),
        Box::new(AStatsEngine),
        Box::new(BlockEngine),
        Box::new(BlurEngine),
        Box::new(CropEngine),
        Box::new(IdetEngine),
        Box::new(SitiEngine),
        Box::new(SitiReportEngine),
        Box::new(FramesDurationEngine),
        Box::new(AConstsEngine),
        Box::new(VConstsEngine),
        Box::new(PacketsEngine),
        Box::new(AFramesEngine),
        Box::new(GopStatsEngine),
        Box::new(VFramesEngine),
        Box::new(RawStderrFiltersEngine),
        Box::new(AboutMeasureEngine),
        Box::new(SignificantSnapshotEngine::new(config)),
        Box::new(SnapshotStripEngine::new(config)),
    ]
}

pub(crate) fn fill_table(document: &mut TableDocument, name: &str, header: &[&str], rows: Rows) -> CoreResult<()> {
    let table = document.create_table(name, header.iter().copied())?;
    for row in rows {
        table.push_row(row)?;
    }
    Ok(())
}

pub(crate) fn fill_tabular(mut document: TabularDocument, rows: &Rows) -> TabularDocument {
    for row in rows {
        document.row(row);
    }
    document
}

/// Rows of `[Frame, Pts, Pts time, Value]` measures.
pub(crate) fn value_measure_rows(measures: &[FrameMeasure<f64>]) -> Rows {
    measures
        .iter()
        .map(|m| crate::cells![m.frame, m.pts, m.pts_time, m.value])
        .collect()
}

/// Frames of the first video stream seen.
pub(crate) fn first_stream_frames(frames: &[VideoFrame]) -> Vec<&VideoFrame> {
    let Some(first) = frames.first() else {
        return Vec::new();
    };
    frames
        .iter()
        .filter(|f| f.stream_index == first.stream_index)
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small analysis results shared by the engine tests.

    use crate::model::*;

    pub fn measure<T>(frame: u64, value: T) -> FrameMeasure<T> {
        FrameMeasure {
            frame,
            pts: frame as i64 * 1000,
            pts_time: frame as f64 * 0.04,
            value,
        }
    }

    pub fn video_frame(key_frame: bool, pict_type: PictType, pkt_size: i64) -> VideoFrame {
        VideoFrame {
            key_frame,
            pict_type,
            pkt_size,
            ..Default::default()
        }
    }

    pub fn with_media(analysis: MediaAnalysis) -> DataResult {
        DataResult {
            source: "/media/clip.mkv".into(),
            source_duration_ms: Some(10_000),
            media_analysis: Some(analysis),
            ..Default::default()
        }
    }

    pub fn with_container(analysis: ContainerAnalysis) -> DataResult {
        DataResult {
            source: "/media/clip.mkv".into(),
            container_analysis: Some(analysis),
            ..Default::default()
        }
    }
}
