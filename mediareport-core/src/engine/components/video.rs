//! Video image measures: blockiness, blurriness, black borders and interlacing.

use indexmap::IndexSet;

use super::{FRAME, PTS, PTS_TIME, Rows, VALUE, fill_table, fill_tabular, value_measure_rows};
use crate::engine::{ReportRendererEngine, SingleTabularEngine, TableRendererEngine};
use crate::error::CoreResult;
use crate::model::{CropValue, DataResult, FrameMeasure, IdetValue, MediaAnalysis};
use crate::report::{ReportDocument, ReportEntry, ReportSection, ReportSectionCategory};
use crate::table::{TableDocument, TabularDialect, TabularDocument};

const HEAD_VALUE: &[&str] = &[FRAME, PTS, PTS_TIME, VALUE];
const HEAD_CROP: &[&str] = &[FRAME, PTS, PTS_TIME, "x1", "x2", "y1", "y2", "w", "h", "x", "y"];
const HEAD_IDET: &[&str] = &[
    FRAME,
    PTS,
    PTS_TIME,
    "Single top field first",
    "Single bottom field first",
    "Single current frame",
    "Single progressive",
    "Single undetermined",
    "Multiple top field first",
    "Multiple bottom field first",
    "Multiple current frame",
    "Multiple progressive",
    "Multiple undetermined",
    "Repeated current frame",
    "Repeated top",
    "Repeated bottom",
    "Repeated neither",
];

/// How many distinct crop values the report lists.
const FIRST_CROP_VALUES: usize = 10;

fn measures<T>(result: &DataResult, select: impl Fn(&MediaAnalysis) -> &[FrameMeasure<T>]) -> &[FrameMeasure<T>] {
    result.media_analysis.as_ref().map(select).unwrap_or_default()
}

/// Engines rendering a plain `[Frame, Pts, Pts time, Value]` series, with a
/// statistics line in the video section of the report.
macro_rules! value_series_engine {
    ($engine:ident, $name:literal, $field:ident, $table:literal, $tabular:literal, $section:literal, $key:literal) => {
        pub struct $engine;

        renderer_engine!($engine, $name, report, table, tabular);

        impl SingleTabularEngine for $engine {
            fn tabular_base_name(&self) -> &'static str {
                $tabular
            }

            fn make_tabular(
                &self,
                result: &DataResult,
                dialect: TabularDialect,
            ) -> CoreResult<Option<TabularDocument>> {
                let measures = measures(result, |a| a.$field.as_slice());
                if measures.is_empty() {
                    return Ok(None);
                }
                let document = TabularDocument::new(dialect, $tabular, HEAD_VALUE.iter().copied());
                Ok(Some(fill_tabular(document, &value_measure_rows(measures))))
            }
        }

        impl TableRendererEngine for $engine {
            fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
                let measures = measures(result, |a| a.$field.as_slice());
                if measures.is_empty() {
                    return Ok(());
                }
                fill_table(document, $table, HEAD_VALUE, value_measure_rows(measures))
            }
        }

        impl ReportRendererEngine for $engine {
            fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()> {
                let measures = measures(result, |a| a.$field.as_slice());
                if measures.is_empty() {
                    return Ok(());
                }
                let mut section = ReportSection::new(ReportSectionCategory::Video, $section);
                section.add(ReportEntry::float_stats($key, measures.iter().map(|m| m.value), ""));
                document.add(section);
                Ok(())
            }
        }
    };
}

value_series_engine!(
    BlockEngine,
    "Block",
    block,
    "Block detect",
    "video-block-detect",
    "Image compression artifact detection",
    "Blockiness detection"
);

value_series_engine!(
    BlurEngine,
    "Blur",
    blur,
    "Blur detect",
    "video-blur-detect",
    "Image blur detection",
    "Blurriness detection"
);

pub struct CropEngine;

renderer_engine!(CropEngine, "Crop", report, table, tabular);

fn crop_rows(measures: &[FrameMeasure<CropValue>]) -> Rows {
    measures
        .iter()
        .map(|m| {
            let v = &m.value;
            crate::cells![m.frame, m.pts, m.pts_time, v.x1, v.x2, v.y1, v.y2, v.w, v.h, v.x, v.y]
        })
        .collect()
}

fn crop_label(v: &CropValue) -> String {
    format!(
        "x1: {}, x2: {}, y1: {}, y2: {}, X: {}, Y: {}, Width: {}, Height: {}",
        v.x1, v.x2, v.y1, v.y2, v.x, v.y, v.w, v.h
    )
}

impl SingleTabularEngine for CropEngine {
    fn tabular_base_name(&self) -> &'static str {
        "video-crop-detect"
    }

    fn make_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Option<TabularDocument>> {
        let measures = measures(result, |a| a.crop.as_slice());
        if measures.is_empty() {
            return Ok(None);
        }
        let document = TabularDocument::new(dialect, self.tabular_base_name(), HEAD_CROP.iter().copied());
        Ok(Some(fill_tabular(document, &crop_rows(measures))))
    }
}

impl TableRendererEngine for CropEngine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
        let measures = measures(result, |a| a.crop.as_slice());
        if measures.is_empty() {
            return Ok(());
        }
        fill_table(document, "Crop detect", HEAD_CROP, crop_rows(measures))
    }
}

impl ReportRendererEngine for CropEngine {
    fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()> {
        let measures = measures(result, |a| a.crop.as_slice());
        if measures.is_empty() {
            return Ok(());
        }
        let distinct: IndexSet<&CropValue> = measures.iter().map(|m| &m.value).collect();
        let mut section = ReportSection::new(ReportSectionCategory::Video, "Black borders / crop detection");
        section
            .add(ReportEntry::numeric("Crop detection activity", distinct.len(), "event(s)"))
            .add(ReportEntry::key_values(
                "First crop values",
                distinct.iter().take(FIRST_CROP_VALUES).map(|v| crop_label(v)),
            ));
        document.add(section);
        Ok(())
    }
}

pub struct IdetEngine;

renderer_engine!(IdetEngine, "Idet", report, table, tabular);

fn idet_rows(measures: &[FrameMeasure<IdetValue>]) -> Rows {
    measures
        .iter()
        .map(|m| {
            let (single, multiple, repeated) = (&m.value.single, &m.value.multiple, &m.value.repeated);
            crate::cells![
                m.frame,
                m.pts,
                m.pts_time,
                single.tff,
                single.bff,
                single.current_frame.as_deref(),
                single.progressive,
                single.undetermined,
                multiple.tff,
                multiple.bff,
                multiple.current_frame.as_deref(),
                multiple.progressive,
                multiple.undetermined,
                repeated.current_frame.as_deref(),
                repeated.top,
                repeated.bottom,
                repeated.neither,
            ]
        })
        .collect()
}

impl SingleTabularEngine for IdetEngine {
    fn tabular_base_name(&self) -> &'static str {
        "video-interlace-detect"
    }

    fn make_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Option<TabularDocument>> {
        let measures = measures(result, |a| a.idet.as_slice());
        if measures.is_empty() {
            return Ok(None);
        }
        let document = TabularDocument::new(dialect, self.tabular_base_name(), HEAD_IDET.iter().copied());
        Ok(Some(fill_tabular(document, &idet_rows(measures))))
    }
}

impl TableRendererEngine for IdetEngine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
        let measures = measures(result, |a| a.idet.as_slice());
        if measures.is_empty() {
            return Ok(());
        }
        fill_table(document, "Interlace detect", HEAD_IDET, idet_rows(measures))
    }
}

impl ReportRendererEngine for IdetEngine {
    fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()> {
        let measures = measures(result, |a| a.idet.as_slice());
        let Some(last) = measures.last() else {
            return Ok(());
        };
        // idet counters are cumulative, the last sample holds the totals.
        let frame_count = measures.len() as i64;
        let (single, multiple, repeated) = (&last.value.single, &last.value.multiple, &last.value.repeated);
        let show_repeated = i64::from(repeated.neither) != frame_count;

        let mut section = ReportSection::new(ReportSectionCategory::Video, "Interlacing detection");
        let mut status = |name: &str, value: i32, shown: bool| {
            if shown && value != 0 {
                let percent = (f64::from(value) * 100.0 / frame_count as f64).round() as i64;
                section.add(ReportEntry::numeric(name, percent, "%"));
            }
        };
        status("Detected as progressive", single.progressive, true);
        status(
            "Detected as progressive, using multiple-frame detection",
            multiple.progressive,
            true,
        );
        status("Detected as top field first", single.tff, true);
        status(
            "Detected as top field first, using multiple-frame detection",
            multiple.tff,
            true,
        );
        status(
            "With the top field repeated from the previous frame’s top field",
            repeated.top,
            show_repeated,
        );
        status("Detected as bottom field first", single.bff, true);
        status(
            "Detected as bottom field first, using multiple-frame detection",
            multiple.bff,
            true,
        );
        status(
            "With the bottom field repeated from the previous frame’s bottom field",
            repeated.bottom,
            show_repeated,
        );
        status(
            "Could not be classified using single-frame detection",
            single.undetermined,
            true,
        );
        status(
            "Could not be classified using multiple-frame detection",
            multiple.undetermined,
            true,
        );
        status("No repeated field", repeated.neither, show_repeated);

        document.add(section);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{measure, with_media};
    use super::*;
    use crate::engine::TabularRendererEngine;
    use crate::model::{IdetFrameCounts, IdetRepeated};
    use crate::report::to_json;
    use crate::table::Cell;

    fn crop(x1: i32) -> CropValue {
        CropValue {
            x1,
            x2: 1919,
            y1: 140,
            y2: 939,
            w: 1920,
            h: 800,
            x: 0,
            y: 140,
        }
    }

    fn idet(progressive: i32, tff: i32, neither: i32) -> IdetValue {
        IdetValue {
            single: IdetFrameCounts {
                tff,
                progressive,
                current_frame: Some("progressive".into()),
                ..Default::default()
            },
            multiple: IdetFrameCounts {
                progressive,
                ..Default::default()
            },
            repeated: IdetRepeated {
                neither,
                ..Default::default()
            },
        }
    }

    fn video_result() -> DataResult {
        with_media(MediaAnalysis {
            block: vec![measure(0, 1.5), measure(1, 2.5)],
            crop: vec![measure(0, crop(0)), measure(1, crop(0)), measure(2, crop(4))],
            idet: vec![measure(0, idet(1, 0, 1)), measure(1, idet(1, 1, 2)), measure(2, idet(2, 1, 3))],
            ..Default::default()
        })
    }

    #[test]
    fn block_series() {
        let result = video_result();
        let docs = BlockEngine.to_tabular(&result, TabularDialect::Txt).unwrap();
        assert_eq!(docs[0].base_file_name(), "video-block-detect");
        assert_eq!(docs[0].rows().len(), 2);
        assert!(BlurEngine.to_tabular(&result, TabularDialect::Txt).unwrap().is_empty());

        let mut document = ReportDocument::new("clip");
        BlockEngine.add_to_report(&result, &mut document).unwrap();
        let json = to_json(&document);
        assert_eq!(
            json["video"]["image_compression_artifact_detection"]["blockiness_detection"]["average"],
            2.0
        );
    }

    #[test]
    fn crop_report_lists_distinct_values() {
        let mut document = ReportDocument::new("clip");
        CropEngine.add_to_report(&video_result(), &mut document).unwrap();
        let json = to_json(&document);
        let section = &json["video"]["black_borders_crop_detection"];
        assert_eq!(section["crop_detection_activity"]["value"], 2);
        assert_eq!(section["crop_detection_activity"]["unit"], "events");
        assert_eq!(
            section["first_crop_values"][1],
            "x1: 4, x2: 1919, y1: 140, y2: 939, X: 0, Y: 140, Width: 1920, Height: 800"
        );
    }

    #[test]
    fn idet_table_columns() {
        let mut document = TableDocument::new();
        IdetEngine.add_to_table(&video_result(), &mut document).unwrap();
        let table = document.table("Interlace detect").unwrap();
        assert_eq!(table.header().len(), 17);
        assert_eq!(table.cell(0, 5), &Cell::String("progressive".into()));
        assert_eq!(table.cell(0, 10), &Cell::Null);
    }

    #[test]
    fn idet_report_uses_last_totals() {
        let mut document = ReportDocument::new("clip");
        IdetEngine.add_to_report(&video_result(), &mut document).unwrap();
        let json = to_json(&document);
        let section = &json["video"]["interlacing_detection"];
        assert_eq!(section["detected_as_progressive"]["value"], 67);
        assert_eq!(section["detected_as_top_field_first"]["value"], 33);
        assert!(section.get("detected_as_bottom_field_first").is_none());
        assert!(section.get("no_repeated_field").is_none());
    }
}
