//! The finished analysis payload handed to the export pipeline.
//!
//! Every structure deserializes from JSON with missing fields defaulted, so
//! a partial analysis (probe only, container only) is still a valid input.

use std::fs;
use std::path::Path;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::artifact::ImageArtifact;
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataResult {
    /// Source identifier, usually the analyzed file path.
    pub source: String,
    pub source_duration_ms: Option<u64>,
    /// Tool name to version string.
    pub versions: IndexMap<String, String>,
    pub probe: Option<ProbeResult>,
    /// The prober's own XML output, kept verbatim.
    pub probe_xml: Option<String>,
    pub media_analysis: Option<MediaAnalysis>,
    pub container_analysis: Option<ContainerAnalysis>,
    pub snapshots: Option<SnapshotImages>,
}

impl DataResult {
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::PathError(format!("Can't read analysis result '{}': {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn source_duration(&self) -> Option<Duration> {
        self.source_duration_ms.map(Duration::from_millis)
    }

    /// File name of the source, without its directory.
    pub fn source_name(&self) -> &str {
        Path::new(&self.source)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.source)
    }
}

// ---- Probe ----

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeResult {
    pub format: Option<ProbeFormat>,
    pub streams: Vec<ProbeStream>,
    pub chapters: Vec<ProbeChapter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeFormat {
    pub format_name: String,
    pub format_long_name: Option<String>,
    pub size: Option<u64>,
    pub bit_rate: Option<u64>,
    pub start_time: Option<f64>,
    pub duration: Option<f64>,
    pub nb_programs: u32,
    pub nb_streams: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeStream {
    pub index: u32,
    pub id: Option<String>,
    pub codec_type: String,
    pub codec_name: Option<String>,
    pub codec_long_name: Option<String>,
    pub profile: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub pix_fmt: Option<String>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u32>,
    pub channel_layout: Option<String>,
    pub bit_rate: Option<u64>,
    pub avg_frame_rate: Option<String>,
    pub language: Option<String>,
    pub default: bool,
    /// Any further property, shown as-is in stream lists.
    pub properties: IndexMap<String, String>,
}

impl ProbeStream {
    /// One-line description, e.g. `video: H.264 1920×1080 yuv420p`.
    pub fn summary(&self) -> String {
        let codec = self
            .codec_long_name
            .as_deref()
            .or(self.codec_name.as_deref())
            .unwrap_or("unknown codec");
        let mut parts = vec![format!("{}: {}", self.codec_type, codec)];
        if let Some(profile) = &self.profile {
            parts.push(profile.clone());
        }
        if let (Some(width), Some(height)) = (self.width, self.height) {
            parts.push(format!("{width}×{height}"));
        }
        if let Some(pix_fmt) = &self.pix_fmt {
            parts.push(pix_fmt.clone());
        }
        if let Some(layout) = &self.channel_layout {
            parts.push(layout.clone());
        } else if let Some(channels) = self.channels {
            parts.push(format!("{channels} channel(s)"));
        }
        if let Some(sample_rate) = self.sample_rate {
            parts.push(format!("{sample_rate} Hz"));
        }
        if let Some(language) = &self.language {
            parts.push(format!("[{language}]"));
        }
        parts.join(" ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeChapter {
    pub title: Option<String>,
    pub start_ms: u64,
    pub end_ms: u64,
}

// ---- Media analysis ----

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaAnalysis {
    pub filters: Vec<FilterDescription>,
    pub ebur128_summary: Option<Ebur128Summary>,
    pub ebur128: Vec<Ebur128Event>,
    pub events: Vec<MediaEvent>,
    pub aphasemeter: Vec<FrameMeasure<f64>>,
    pub astats: Vec<FrameMeasure<Vec<AStatsChannel>>>,
    pub block: Vec<FrameMeasure<f64>>,
    pub blur: Vec<FrameMeasure<f64>>,
    pub crop: Vec<FrameMeasure<CropValue>>,
    pub idet: Vec<FrameMeasure<IdetValue>>,
    pub siti: Vec<FrameMeasure<SitiValue>>,
    pub raw_stderr_filters: Vec<RawStderrFilterLine>,
}

/// A filter of the measure graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterDescription {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub setup: String,
    pub class: String,
}

/// One metadata sample emitted for a frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameMeasure<T> {
    pub frame: u64,
    pub pts: i64,
    pub pts_time: f64,
    pub value: T,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ebur128Summary {
    pub integrated: f64,
    pub integrated_threshold: f64,
    pub loudness_range: f64,
    pub loudness_range_threshold: f64,
    pub loudness_range_low: f64,
    pub loudness_range_high: f64,
    pub sample_peak: f64,
    pub true_peak: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Stereo {
    pub left: f64,
    pub right: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ebur128Event {
    /// Position in seconds.
    pub position: f64,
    pub integrated: f64,
    pub momentary: f64,
    pub short_term: f64,
    pub loudness_range: f64,
    pub sample_peak: Stereo,
    pub true_peak_per_frame: Stereo,
    pub true_peak: Stereo,
}

/// A detected event (silence, mono, black frames, freeze...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaEvent {
    pub name: String,
    pub scope: Option<String>,
    pub start_ms: u64,
    pub end_ms: Option<u64>,
}

impl MediaEvent {
    pub fn start(&self) -> Duration {
        Duration::from_millis(self.start_ms)
    }

    /// The event end, or the given fallback for an event still running at EOF.
    pub fn end_or(&self, fallback: Duration) -> Duration {
        self.end_ms
            .filter(|end| *end > 0)
            .map_or(fallback, Duration::from_millis)
    }

    pub fn has_scope(&self) -> bool {
        self.scope.as_deref().is_some_and(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AStatsChannel {
    pub dc_offset: f64,
    pub entropy: f64,
    pub flat_factor: f64,
    pub noise_floor: f64,
    pub noise_floor_count: i64,
    pub peak_level: f64,
    pub peak_count: i64,
    pub rms_level: Option<f64>,
    pub dynamic_range: Option<f64>,
    pub crest_factor: Option<f64>,
    pub other: IndexMap<String, String>,
}

impl AStatsChannel {
    /// Remaining keys as `key=value` pairs, empty when there is none.
    pub fn other_to_string(&self) -> String {
        self.other
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CropValue {
    pub x1: i32,
    pub x2: i32,
    pub y1: i32,
    pub y2: i32,
    pub w: i32,
    pub h: i32,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdetFrameCounts {
    pub tff: i32,
    pub bff: i32,
    /// Detected type of the current frame: tff, bff, progressive or undetermined.
    pub current_frame: Option<String>,
    pub progressive: i32,
    pub undetermined: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdetRepeated {
    /// Repeated field of the current frame: top, bottom or neither.
    pub current_frame: Option<String>,
    pub top: i32,
    pub bottom: i32,
    pub neither: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdetValue {
    pub single: IdetFrameCounts,
    pub multiple: IdetFrameCounts,
    pub repeated: IdetRepeated,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SitiValue {
    pub si: f64,
    pub ti: f64,
}

/// A raw line a filter wrote on stderr.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawStderrFilterLine {
    pub filter_name: String,
    pub chain_pos: i32,
    pub line: String,
}

// ---- Container analysis ----

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerAnalysis {
    pub packets: Vec<ContainerPacket>,
    pub video_frames: Vec<VideoFrame>,
    pub audio_frames: Vec<AudioFrame>,
    pub video_consts: Vec<VideoConst>,
    pub audio_consts: Vec<AudioConst>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerPacket {
    pub codec_type: String,
    pub stream_index: i32,
    pub pts: i64,
    pub pts_time: f64,
    pub dts: i64,
    pub dts_time: f64,
    pub duration: i64,
    pub duration_time: f64,
    pub size: i64,
    pub pos: i64,
    pub flags: String,
}

/// Timing fields shared by audio and video frames.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseFrame {
    pub pts: i64,
    pub pts_time: f64,
    pub pkt_dts: i64,
    pub pkt_dts_time: f64,
    pub best_effort_timestamp: i64,
    pub best_effort_timestamp_time: f64,
    pub pkt_duration: i64,
    pub pkt_duration_time: f64,
    pub pkt_pos: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PictType {
    I,
    P,
    B,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoFrame {
    pub stream_index: i32,
    pub key_frame: bool,
    pub pict_type: PictType,
    pub repeat_pict: bool,
    pub frame: BaseFrame,
    pub pkt_size: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioFrame {
    pub stream_index: i32,
    pub nb_samples: i32,
    pub frame: BaseFrame,
    pub pkt_size: i64,
}

/// Video properties valid from `reference` until the next change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConst {
    pub width: i32,
    pub height: i32,
    pub sample_aspect_ratio: String,
    pub top_field_first: bool,
    pub interlaced_frame: bool,
    pub pix_fmt: String,
    pub color_range: String,
    pub color_primaries: String,
    pub color_transfer: String,
    pub color_space: String,
    pub coded_picture_number: i32,
    pub display_picture_number: i32,
    pub reference: BaseFrame,
}

/// Audio properties valid from `reference` until the next change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConst {
    pub channel_layout: String,
    pub channels: i32,
    pub sample_fmt: String,
    pub reference: BaseFrame,
}

// ---- Snapshots ----

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotImages {
    pub significant: Option<ImageArtifact>,
    pub strip: Vec<ImageArtifact>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_is_accepted() {
        let result: DataResult = serde_json::from_str(
            r#"{
                "source": "/media/clip.mkv",
                "source_duration_ms": 5000,
                "media_analysis": {
                    "events": [{"name": "Audio silence", "start_ms": 1000}]
                },
                "container_analysis": {
                    "video_frames": [{"key_frame": true, "pict_type": "I", "pkt_size": 10}]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(result.source_name(), "clip.mkv");
        assert_eq!(result.source_duration(), Some(Duration::from_secs(5)));
        let event = &result.media_analysis.unwrap().events[0];
        assert_eq!(event.end_or(Duration::from_secs(5)), Duration::from_secs(5));
        let frame = &result.container_analysis.unwrap().video_frames[0];
        assert_eq!(frame.pict_type, PictType::I);
    }

    #[test]
    fn unknown_pict_type() {
        let frame: VideoFrame = serde_json::from_str(r#"{"pict_type": "S"}"#).unwrap();
        assert_eq!(frame.pict_type, PictType::Unknown);
    }

    #[test]
    fn stream_summary() {
        let stream = ProbeStream {
            codec_type: "video".into(),
            codec_name: Some("h264".into()),
            width: Some(1920),
            height: Some(1080),
            pix_fmt: Some("yuv420p".into()),
            ..Default::default()
        };
        assert_eq!(stream.summary(), "video: h264 1920×1080 yuv420p");
    }
}
