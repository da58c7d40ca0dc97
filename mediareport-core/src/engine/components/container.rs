//! Container level data: packets, decoded frames and the stream constants.

use super::{BYTES, FRAMES, MILLISECOND_S, PIXEL_S, Rows, fill_table, fill_tabular, first_stream_frames};
use crate::engine::{ReportRendererEngine, SingleTabularEngine, TableRendererEngine};
use crate::error::CoreResult;
use crate::model::{
    AudioConst, AudioFrame, BaseFrame, ContainerAnalysis, ContainerPacket, DataResult, VideoConst, VideoFrame,
};
use crate::numbers::{NumberFormat, sec_to_ms, time_derivative};
use crate::report::{ReportDocument, ReportEntry, ReportSection, ReportSectionCategory};
use crate::table::{TableDocument, TabularDialect, TabularDocument, TypedCell};

const HEAD_BASE_FRAME: &[&str] = &[
    "Pts",
    "Pts time",
    "Pkt dts",
    "Pkt dts time",
    "Best effort timestamp",
    "Best effort timestamp time",
    "Pkt duration",
    "Pkt duration time",
    "Pkt pos",
];

const HEAD_REF_FRAME: &[&str] = &[
    "Ref pts",
    "Ref pts time",
    "Ref pkt dts",
    "Ref pkt dts time",
    "Ref best effort timestamp",
    "Ref best effort timestamp time",
    "Ref pkt duration",
    "Ref pkt duration time",
    "Ref pkt pos",
];

const HEAD_PACKETS: &[&str] = &[
    "Codec type",
    "Stream index",
    "Pts",
    "Pts time",
    "Dts",
    "Dts time",
    "Duration",
    "Duration time",
    "Size",
    "Pos",
    "Flags",
];

const HEAD_VCONSTS: &[&str] = &[
    "Width",
    "Height",
    "Sample aspect ratio",
    "Top field first",
    "Interlaced frame",
    "Pix fmt",
    "Color range",
    "Color primaries",
    "Color transfer",
    "Color space",
    "Coded picture number",
    "Display picture number",
];

const HEAD_ACONSTS: &[&str] = &["Channel layout", "Channels", "Sample format"];

const COUNT: &str = "Count";
const FRAME_SIZE: &str = "Frame size";
const MILLISECONDS: &str = "milliseconds";
const BYTES_SECONDS: &str = "bytes/seconds";
const INTERLACING_FRAME_STATUS: &str = "Interlacing frame status";
const UNKNOWN: &str = "(unknown)";

/// Ratios are shown with three fraction digits.
static RATIO_FORMAT: NumberFormat = NumberFormat::new('.', None, 3);

fn container(result: &DataResult) -> Option<&ContainerAnalysis> {
    result.container_analysis.as_ref()
}

fn header(parts: &[&[&'static str]]) -> Vec<&'static str> {
    parts.iter().flat_map(|part| part.iter().copied()).collect()
}

fn base_frame_cells(frame: &BaseFrame) -> Vec<TypedCell> {
    crate::cells![
        frame.pts,
        frame.pts_time,
        frame.pkt_dts,
        frame.pkt_dts_time,
        frame.best_effort_timestamp,
        frame.best_effort_timestamp_time,
        frame.pkt_duration,
        frame.pkt_duration_time,
        frame.pkt_pos,
    ]
}

/// Frame to frame spacing of a timestamp series, in milliseconds. Negative
/// timestamps (`-1` and below) stand for a missing value.
fn timestamp_derivative(times: impl Iterator<Item = f64>) -> Vec<f64> {
    let ms: Vec<f64> = times
        .map(|t| if t > -1.0 { t } else { f64::NAN })
        .map(sec_to_ms)
        .collect();
    time_derivative(&ms)
}

/// `x:y (ratio)` with `x:y` reduced. `None` for a degenerate ratio.
fn ratio_label(x: i64, y: i64) -> Option<String> {
    if x < 1 || y < 1 {
        return None;
    }
    let gcd = gcd(x, y);
    Some(format!(
        "{}:{} ({})",
        x / gcd,
        y / gcd,
        RATIO_FORMAT.format_float(x as f64 / y as f64)
    ))
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

// ---- Frames duration ----

pub struct FramesDurationEngine;

renderer_engine!(FramesDurationEngine, "FramesDuration", report);

impl ReportRendererEngine for FramesDurationEngine {
    fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()> {
        let frames = container(result).map(|c| first_stream_frames(&c.video_frames)).unwrap_or_default();
        if frames.is_empty() {
            return Ok(());
        }
        let dts = timestamp_derivative(frames.iter().map(|f| f.frame.pkt_dts_time));
        let best_effort = timestamp_derivative(frames.iter().map(|f| f.frame.best_effort_timestamp_time));
        let durations = dts.into_iter().chain(best_effort).filter(|d| *d > 0.0);

        let mut section = ReportSection::new(ReportSectionCategory::Container, "Video frame duration");
        section.add(ReportEntry::float_stats("Frame duration", durations, MILLISECOND_S));
        document.add(section);
        Ok(())
    }
}

// ---- Audio consts ----

pub struct AConstsEngine;

renderer_engine!(AConstsEngine, "AConsts", report, table, tabular);

fn aconsts(result: &DataResult) -> &[AudioConst] {
    container(result).map(|c| c.audio_consts.as_slice()).unwrap_or_default()
}

fn aconsts_rows(consts: &[AudioConst]) -> Rows {
    consts
        .iter()
        .map(|c| {
            let mut row = crate::cells![c.channel_layout.as_str(), c.channels, c.sample_fmt.as_str()];
            row.extend(base_frame_cells(&c.reference));
            row
        })
        .collect()
}

impl SingleTabularEngine for AConstsEngine {
    fn tabular_base_name(&self) -> &'static str {
        "container-audio-consts"
    }

    fn make_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Option<TabularDocument>> {
        let consts = aconsts(result);
        if consts.is_empty() {
            return Ok(None);
        }
        let document = TabularDocument::new(dialect, self.tabular_base_name(), header(&[HEAD_ACONSTS, HEAD_REF_FRAME]));
        Ok(Some(fill_tabular(document, &aconsts_rows(consts))))
    }
}

impl TableRendererEngine for AConstsEngine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
        let consts = aconsts(result);
        if consts.is_empty() {
            return Ok(());
        }
        fill_table(
            document,
            "Container audio consts",
            &header(&[HEAD_ACONSTS, HEAD_REF_FRAME]),
            aconsts_rows(consts),
        )
    }
}

impl ReportRendererEngine for AConstsEngine {
    fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()> {
        let Some(first) = aconsts(result).first() else {
            return Ok(());
        };
        let layout = if first.channel_layout.is_empty() {
            UNKNOWN
        } else {
            first.channel_layout.as_str()
        };
        let mut section = ReportSection::new(ReportSectionCategory::Container, "Audio media file information");
        section
            .add(ReportEntry::key_value("Channel count", first.channels.to_string()))
            .add(ReportEntry::key_value("Channel layout", layout))
            .add(ReportEntry::key_value("Audio sample format", first.sample_fmt.as_str()));
        document.add(section);
        Ok(())
    }
}

// ---- Video consts ----

pub struct VConstsEngine;

renderer_engine!(VConstsEngine, "VConsts", report, table, tabular);

fn vconsts(result: &DataResult) -> &[VideoConst] {
    container(result).map(|c| c.video_consts.as_slice()).unwrap_or_default()
}

fn vconsts_rows(consts: &[VideoConst]) -> Rows {
    consts
        .iter()
        .map(|c| {
            let mut row = crate::cells![
                c.width,
                c.height,
                c.sample_aspect_ratio.as_str(),
                c.top_field_first,
                c.interlaced_frame,
                c.pix_fmt.as_str(),
                c.color_range.as_str(),
                c.color_primaries.as_str(),
                c.color_transfer.as_str(),
                c.color_space.as_str(),
                c.coded_picture_number,
                c.display_picture_number,
            ];
            row.extend(base_frame_cells(&c.reference));
            row
        })
        .collect()
}

/// Pixel aspect ratio from a `num:den` sample aspect ratio.
fn pixel_aspect_ratio(video: &VideoConst) -> Option<String> {
    let (num, den) = video.sample_aspect_ratio.split_once(':')?;
    let num: i64 = num.trim().parse().ok()?;
    let den: i64 = den.trim().parse().ok()?;
    ratio_label(den * i64::from(video.width), num * i64::from(video.height))
}

fn interlacing_status(video: &VideoConst) -> &'static str {
    match (video.interlaced_frame, video.top_field_first) {
        (true, true) => "Interlaced, top field first",
        (true, false) => "Interlaced, bottom field first",
        (false, _) => "progressive",
    }
}

impl SingleTabularEngine for VConstsEngine {
    fn tabular_base_name(&self) -> &'static str {
        "container-video-consts"
    }

    fn make_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Option<TabularDocument>> {
        let consts = vconsts(result);
        if consts.is_empty() {
            return Ok(None);
        }
        let document = TabularDocument::new(dialect, self.tabular_base_name(), header(&[HEAD_VCONSTS, HEAD_REF_FRAME]));
        Ok(Some(fill_tabular(document, &vconsts_rows(consts))))
    }
}

impl TableRendererEngine for VConstsEngine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
        let consts = vconsts(result);
        if consts.is_empty() {
            return Ok(());
        }
        fill_table(
            document,
            "Container video consts",
            &header(&[HEAD_VCONSTS, HEAD_REF_FRAME]),
            vconsts_rows(consts),
        )
    }
}

impl ReportRendererEngine for VConstsEngine {
    fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()> {
        let Some(video) = vconsts(result).first() else {
            return Ok(());
        };
        let (width, height) = (i64::from(video.width), i64::from(video.height));
        let mut section = ReportSection::new(ReportSectionCategory::Container, "Video media file information");
        section
            .add(ReportEntry::key_value("Image resolution", format!("{width} × {height}")))
            .add(ReportEntry::numeric("Pixel surface", width * height, PIXEL_S))
            .add(ReportEntry::key_value("Sample aspect ratio", video.sample_aspect_ratio.as_str()))
            .add(ReportEntry::key_value(
                "Storage aspect ratio (w/y)",
                ratio_label(width, height).unwrap_or_else(|| UNKNOWN.to_string()),
            ))
            .add(ReportEntry::key_value(
                "Pixel aspect ratio",
                pixel_aspect_ratio(video).unwrap_or_else(|| UNKNOWN.to_string()),
            ))
            .add(ReportEntry::key_value(INTERLACING_FRAME_STATUS, interlacing_status(video)))
            .add(ReportEntry::key_value("Pixel format", video.pix_fmt.as_str()))
            .add(ReportEntry::key_value("Color primaries", video.color_primaries.as_str()))
            .add(ReportEntry::key_value("Color range", video.color_range.as_str()))
            .add(ReportEntry::key_value("Color space", video.color_space.as_str()))
            .add(ReportEntry::key_value("Color transfer", video.color_transfer.as_str()));
        document.add(section);
        Ok(())
    }
}

// ---- Packets ----

pub struct PacketsEngine;

renderer_engine!(PacketsEngine, "Packets", report, table, tabular);

/// Codec types a packet byte count is accounted to, in report order.
const CODEC_KINDS: [&str; 4] = ["video", "audio", "data", "other"];

fn codec_slot(codec_type: &str) -> usize {
    match codec_type {
        "video" => 0,
        "audio" => 1,
        "data" => 2,
        _ => 3,
    }
}

fn packets(result: &DataResult) -> &[ContainerPacket] {
    container(result).map(|c| c.packets.as_slice()).unwrap_or_default()
}

fn packets_rows(packets: &[ContainerPacket]) -> Rows {
    packets
        .iter()
        .map(|p| {
            crate::cells![
                p.codec_type.as_str(),
                p.stream_index,
                p.pts,
                p.pts_time,
                p.dts,
                p.dts_time,
                p.duration,
                p.duration_time,
                p.size,
                p.pos,
                p.flags.as_str(),
            ]
        })
        .collect()
}

/// Packet bytes summed per second of media, by codec kind.
///
/// A packet lands in a new bucket when its time reaches past the current
/// one, otherwise it is added to the last bucket.
fn bytes_per_second(packets: &[ContainerPacket]) -> Vec<[Option<i64>; 4]> {
    let mut buckets: Vec<[Option<i64>; 4]> = Vec::new();
    for packet in packets {
        let time = if packet.pts_time < 0.0 {
            packet.dts_time
        } else {
            packet.pts_time
        };
        let slot = codec_slot(&packet.codec_type);
        if time.ceil() >= buckets.len() as f64 {
            let mut bucket = [None; 4];
            bucket[slot] = Some(packet.size);
            buckets.push(bucket);
        } else if let Some(last) = buckets.last_mut() {
            *last[slot].get_or_insert(0) += packet.size;
        }
    }
    buckets
}

impl SingleTabularEngine for PacketsEngine {
    fn tabular_base_name(&self) -> &'static str {
        "container-packets"
    }

    fn make_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Option<TabularDocument>> {
        let packets = packets(result);
        if packets.is_empty() {
            return Ok(None);
        }
        let document = TabularDocument::new(dialect, self.tabular_base_name(), HEAD_PACKETS.iter().copied());
        Ok(Some(fill_tabular(document, &packets_rows(packets))))
    }
}

impl TableRendererEngine for PacketsEngine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
        let packets = packets(result);
        if packets.is_empty() {
            return Ok(());
        }
        fill_table(document, "Container packets", HEAD_PACKETS, packets_rows(packets))
    }
}

impl ReportRendererEngine for PacketsEngine {
    fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()> {
        let packets = packets(result);
        if packets.is_empty() {
            return Ok(());
        }
        let buckets = bytes_per_second(packets);
        let slot_values = |slot: usize| buckets.iter().filter_map(move |bucket| bucket[slot]);

        let mut section = ReportSection::new(ReportSectionCategory::Container, "Stream packets");
        for (slot, label) in ["Video bitrate", "Audio bitrate", "Data bitrate", "Other bitrate"]
            .into_iter()
            .enumerate()
        {
            section.add(ReportEntry::long_stats(label, slot_values(slot), BYTES_SECONDS));
        }
        section.add(ReportEntry::long_stats(
            "All streams bitrates",
            (0..CODEC_KINDS.len()).flat_map(slot_values),
            BYTES_SECONDS,
        ));
        document.add(section);
        Ok(())
    }
}

// ---- Audio frames ----

pub struct AFramesEngine;

renderer_engine!(AFramesEngine, "AFrames", report, table, tabular);

const HEAD_AFRAMES_START: &[&str] = &["Stream index", "Nb samples"];

fn aframes(result: &DataResult) -> &[AudioFrame] {
    container(result).map(|c| c.audio_frames.as_slice()).unwrap_or_default()
}

fn aframes_rows(frames: &[AudioFrame]) -> Rows {
    frames
        .iter()
        .map(|f| {
            let mut row = crate::cells![f.stream_index, f.nb_samples];
            row.extend(base_frame_cells(&f.frame));
            row.extend(crate::cells![f.pkt_size]);
            row
        })
        .collect()
}

impl SingleTabularEngine for AFramesEngine {
    fn tabular_base_name(&self) -> &'static str {
        "container-audio-frames"
    }

    fn make_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Option<TabularDocument>> {
        let frames = aframes(result);
        if frames.is_empty() {
            return Ok(None);
        }
        let head = header(&[HEAD_AFRAMES_START, HEAD_BASE_FRAME, &["Pkt size"]]);
        let document = TabularDocument::new(dialect, self.tabular_base_name(), head);
        Ok(Some(fill_tabular(document, &aframes_rows(frames))))
    }
}

impl TableRendererEngine for AFramesEngine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
        let frames = aframes(result);
        if frames.is_empty() {
            return Ok(());
        }
        let head = header(&[HEAD_AFRAMES_START, HEAD_BASE_FRAME, &["Pkt size"]]);
        fill_table(document, "Container audio frames", &head, aframes_rows(frames))
    }
}

impl ReportRendererEngine for AFramesEngine {
    fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()> {
        let frames = aframes(result);
        if frames.is_empty() {
            return Ok(());
        }
        let durations = frames
            .iter()
            .map(|f| f.frame.pkt_duration_time)
            .filter(|d| *d > 0.0)
            .map(sec_to_ms);

        let mut section = ReportSection::new(ReportSectionCategory::Container, "Audio frames");
        section
            .add(ReportEntry::numeric(COUNT, frames.len(), FRAMES))
            .add(ReportEntry::long_stats(FRAME_SIZE, frames.iter().map(|f| f.pkt_size), BYTES))
            .add(ReportEntry::long_stats(
                "Frame length",
                frames.iter().map(|f| i64::from(f.nb_samples)),
                "samples",
            ))
            .add(ReportEntry::float_stats("Frame duration", durations, MILLISECONDS));
        document.add(section);
        Ok(())
    }
}

// ---- Video frames ----

pub struct VFramesEngine;

renderer_engine!(VFramesEngine, "VFrames", report, table, tabular);

const HEAD_VFRAMES_START: &[&str] = &["Stream index", "Key frame", "Pict type", "Repeat pict"];

fn vframes(result: &DataResult) -> &[VideoFrame] {
    container(result).map(|c| c.video_frames.as_slice()).unwrap_or_default()
}

fn pict_type_label(frame: &VideoFrame) -> &'static str {
    use crate::model::PictType;
    match frame.pict_type {
        PictType::I => "I",
        PictType::P => "P",
        PictType::B => "B",
        PictType::Unknown => "?",
    }
}

fn vframes_rows(frames: &[VideoFrame]) -> Rows {
    frames
        .iter()
        .map(|f| {
            let mut row = crate::cells![f.stream_index, f.key_frame, pict_type_label(f), f.repeat_pict];
            row.extend(base_frame_cells(&f.frame));
            row.extend(crate::cells![f.pkt_size]);
            row
        })
        .collect()
}

impl SingleTabularEngine for VFramesEngine {
    fn tabular_base_name(&self) -> &'static str {
        "container-video-frames"
    }

    fn make_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Option<TabularDocument>> {
        let frames = vframes(result);
        if frames.is_empty() {
            return Ok(None);
        }
        let head = header(&[HEAD_VFRAMES_START, HEAD_BASE_FRAME, &["Pkt size"]]);
        let document = TabularDocument::new(dialect, self.tabular_base_name(), head);
        Ok(Some(fill_tabular(document, &vframes_rows(frames))))
    }
}

impl TableRendererEngine for VFramesEngine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
        let frames = vframes(result);
        if frames.is_empty() {
            return Ok(());
        }
        let head = header(&[HEAD_VFRAMES_START, HEAD_BASE_FRAME, &["Pkt size"]]);
        fill_table(document, "Container video frames", &head, vframes_rows(frames))
    }
}

impl ReportRendererEngine for VFramesEngine {
    fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()> {
        let frames = first_stream_frames(vframes(result));
        if frames.is_empty() {
            return Ok(());
        }
        let mut section = ReportSection::new(ReportSectionCategory::Container, "Video frames");
        section.add(ReportEntry::long_stats(FRAME_SIZE, frames.iter().map(|f| f.pkt_size), BYTES));

        let frame_count = frames.len();
        let key_frame_count = frames.iter().filter(|f| f.key_frame).count();
        if key_frame_count == frame_count {
            section.add(ReportEntry::numeric(
                COUNT,
                frame_count,
                "frames (all are key frames, no GOP)",
            ));
            document.add(section);
            return Ok(());
        }
        section.add(ReportEntry::numeric(COUNT, frame_count, FRAMES));
        if key_frame_count > 0 {
            section.add(ReportEntry::numeric("Key count", key_frame_count, "key frames"));
        }
        let repeat_count = frames.iter().filter(|f| f.repeat_pict).count();
        if repeat_count > 0 {
            section.add(ReportEntry::numeric("Repeat count", repeat_count, FRAMES));
        }

        let declared = frames
            .iter()
            .map(|f| f.frame.pkt_duration_time)
            .filter(|d| *d > 0.0)
            .map(sec_to_ms);
        section
            .add(ReportEntry::float_stats("Frame duration (declared)", declared, MILLISECOND_S))
            .add(ReportEntry::float_stats(
                "Frame PTS time",
                timestamp_derivative(frames.iter().map(|f| f.frame.pts_time)),
                MILLISECOND_S,
            ))
            .add(ReportEntry::float_stats(
                "Frame DTS time",
                timestamp_derivative(frames.iter().map(|f| f.frame.pkt_dts_time)),
                MILLISECOND_S,
            ))
            .add(ReportEntry::float_stats(
                "Frame best effort time",
                timestamp_derivative(frames.iter().map(|f| f.frame.best_effort_timestamp_time)),
                MILLISECOND_S,
            ));
        document.add(section);
        Ok(())
    }
}
