//! End-to-end exports of one analysis result through the format manager.

use std::fs;

use indexmap::IndexMap;
use mediareport_core::model::{
    Ebur128Event, Ebur128Summary, FilterDescription, MediaAnalysis, MediaEvent, ProbeFormat, ProbeResult,
    ProbeStream, Stereo,
};
use mediareport_core::{CoreError, DataResult, ExportConfigBuilder, ExportFormatManager};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn sample_result() -> DataResult {
    DataResult {
        source: "/media/show/clip.mkv".into(),
        source_duration_ms: Some(60_000),
        versions: IndexMap::from([("ffmpeg".to_string(), "7.1".to_string())]),
        probe: Some(ProbeResult {
            format: Some(ProbeFormat {
                format_name: "matroska,webm".into(),
                format_long_name: Some("Matroska / WebM".into()),
                size: Some(1_234_567),
                duration: Some(60.0),
                nb_streams: 1,
                ..Default::default()
            }),
            streams: vec![ProbeStream {
                codec_type: "audio".into(),
                codec_name: Some("aac".into()),
                channels: Some(2),
                sample_rate: Some(48_000),
                ..Default::default()
            }],
            chapters: Vec::new(),
        }),
        probe_xml: Some("<ffprobe><format format_name=\"matroska,webm\"/></ffprobe>\n".into()),
        media_analysis: Some(MediaAnalysis {
            filters: vec![FilterDescription {
                kind: "audio".into(),
                name: "ebur128".into(),
                setup: "peak=true".into(),
                class: "AVFilter".into(),
            }],
            ebur128_summary: Some(Ebur128Summary {
                integrated: -23.04,
                loudness_range: 7.5,
                sample_peak: -1.2,
                true_peak: f64::NEG_INFINITY,
                ..Default::default()
            }),
            ebur128: vec![Ebur128Event {
                position: 0.4,
                integrated: -70.0,
                momentary: -31.25,
                short_term: -33.0,
                sample_peak: Stereo { left: -3.0, right: -3.5 },
                ..Default::default()
            }],
            events: vec![MediaEvent {
                name: "silence".into(),
                scope: Some("1".into()),
                start_ms: 10_000,
                end_ms: None,
            }],
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn manager_in(dir: &std::path::Path) -> ExportFormatManager {
    let config = ExportConfigBuilder::new()
        .export_directory(dir.to_path_buf())
        .build();
    ExportFormatManager::with_defaults(config).unwrap()
}

#[test]
fn test_full_export_writes_every_format() {
    let dir = tempdir().unwrap();
    let manager = manager_in(dir.path());
    let names: Vec<String> = manager.registered().keys().map(|name| name.to_string()).collect();

    let produced = manager.export(&names, &sample_result()).unwrap();

    for key in [
        "media-summary.txt",
        "audio-ebur128-summary.csv",
        "events.fr.csv",
        "about.txt",
        "filters.csv",
        "xml",
        "json",
        "xlsx",
        "ods",
        "sqlite",
        "html_report",
        "json_report",
        "ffprobexml",
    ] {
        let path = produced.get(key).unwrap_or_else(|| panic!("{key} missing from {produced:?}"));
        assert!(path.is_file(), "{} was not written", path.display());
        assert!(path.starts_with(dir.path()));
    }
    assert_eq!(
        produced["html_report"].file_name().unwrap().to_str().unwrap(),
        "report.html"
    );
    assert!(!produced.keys().any(|key| key.starts_with("snapshot")));
}

#[test]
fn test_txt_loudness_uses_low_precision_and_clamps_infinity() {
    let dir = tempdir().unwrap();
    let manager = manager_in(dir.path());
    let bytes = manager
        .make_single_export("txt", &sample_result(), "audio-ebur128-summary.txt")
        .unwrap()
        .unwrap();

    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        "Integrated\tLoudness Range\tLoudness Range Low\tLoudness Range High\tSample Peak\tTrue Peak\n\
         -23\t7.5\t0\t0\t-1.2\t-144\n"
    );
}

#[test]
fn test_event_without_end_lasts_until_source_end() {
    let manager = manager_in(tempdir().unwrap().path());
    let bytes = manager
        .make_single_export("csv", &sample_result(), "events")
        .unwrap()
        .unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Name,Scope/Channel,Start,End,Duration"));
    let row = lines.next().unwrap();
    assert!(row.starts_with("silence,1,"), "{row}");
    assert!(row.contains("00:01:00"), "{row}");
}

#[test]
fn test_json_table_document() {
    let manager = manager_in(tempdir().unwrap().path());
    let bytes = manager
        .make_single_export("json", &sample_result(), "media-datas.json")
        .unwrap()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    let summary = &json["report"]["EBU R 128 Summary"][0];
    assert_eq!(summary["integrated"], serde_json::json!(-23.04));
    assert_eq!(summary["true_peak"], serde_json::json!(-144.0));
    assert_eq!(json["report"]["About app"][0]["type"], "ffmpeg");
}

#[test]
fn test_sqlite_columns_are_typed() {
    let dir = tempdir().unwrap();
    let manager = manager_in(dir.path());
    let produced = manager.export(&["sqlite"], &sample_result()).unwrap();

    let connection = rusqlite::Connection::open(&produced["sqlite"]).unwrap();
    let (integrated, true_peak): (f64, f64) = connection
        .query_row(
            "SELECT \"integrated\", \"true_peak\" FROM \"ebu_r_128_summary\"",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(integrated, -23.04);
    assert_eq!(true_peak, -144.0);

    let id_type: String = connection
        .query_row(
            "SELECT type FROM pragma_table_info('ebu_r_128_summary') WHERE name = 'id'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(id_type, "INTEGER");
}

#[test]
fn test_html_report_embeds_sections() {
    let manager = manager_in(tempdir().unwrap().path());
    let bytes = manager
        .make_single_export("report", &sample_result(), "report.html")
        .unwrap()
        .unwrap();
    let html = String::from_utf8(bytes).unwrap();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("/media/show/clip.mkv :: Media analysis report"));
    assert!(html.contains("Loudness EBU-R128"));
    assert!(html.contains("Filters used in this measure"));
}

#[test]
fn test_base_name_prefixes_every_file() {
    let dir = tempdir().unwrap();
    let config = ExportConfigBuilder::new()
        .export_directory(dir.path().join("nested"))
        .base_file_name("run-")
        .build();
    let manager = ExportFormatManager::with_defaults(config).unwrap();

    let produced = manager.export(&["txt", "jsonreport"], &sample_result()).unwrap();
    assert_eq!(
        produced["json_report"],
        dir.path().join("nested").join("run-report.json")
    );
    assert_eq!(
        produced["about.txt"],
        dir.path().join("nested").join("run-about.txt")
    );
}

#[test]
fn test_batch_export_prefixes_with_source_names() {
    let dir = tempdir().unwrap();
    let manager = manager_in(dir.path());
    let other = DataResult {
        source: "/media/show/other.mov".into(),
        ..sample_result()
    };

    let produced = manager
        .export_batch(&["json"], &[sample_result(), other], |_| {})
        .unwrap();

    assert_eq!(produced.len(), 2);
    assert_eq!(produced[0]["json"], dir.path().join("clip_media-datas.json"));
    assert_eq!(produced[1]["json"], dir.path().join("other_media-datas.json"));
    assert!(fs::metadata(&produced[1]["json"]).unwrap().len() > 0);
}

#[test]
fn test_unknown_format_is_rejected() {
    let manager = manager_in(tempdir().unwrap().path());
    let err = manager.export(&["pdf"], &sample_result()).unwrap_err();
    assert_eq!(err.to_string(), "Can't found pdf format");
}

#[test]
fn test_single_export_of_unknown_name_has_no_content() {
    let manager = manager_in(tempdir().unwrap().path());
    assert!(manager
        .make_single_export("xml", &sample_result(), "nothing.xml")
        .unwrap()
        .is_none());
    assert!(manager
        .make_single_export("txt", &DataResult::default(), "audio-ebur128")
        .unwrap()
        .is_none());
}

#[test]
fn test_blocked_export_directory_is_an_export_failure() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file");
    fs::write(&file, b"").unwrap();
    let config = ExportConfigBuilder::new()
        .export_directory(file.join("sub"))
        .build();
    let manager = ExportFormatManager::with_defaults(config).unwrap();

    let err = manager.export(&["jsonreport"], &sample_result()).unwrap_err();
    assert!(
        matches!(err, CoreError::Export { ref path, .. } if path.starts_with(file.join("sub"))),
        "{err:?}"
    );
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_single_engine_report_through_the_manager() {
    let manager = manager_in(tempdir().unwrap().path());
    let bytes = manager
        .make_single_export("report", &sample_result(), "Ebur128Summary.html")
        .unwrap()
        .unwrap();
    let html = String::from_utf8(bytes).unwrap();
    assert!(html.contains("Loudness EBU-R128"));
    assert!(!html.contains("Filters used in this measure"));

    let bytes = manager
        .make_single_export("jsonreport", &sample_result(), "AboutMeasure.json")
        .unwrap()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["about"]["filters_used_in_this_measure"].is_object());
    assert!(json.get("audio").is_none());
}

#[test]
fn test_infinite_true_peak_is_a_sentinel_in_every_typed_format() {
    let manager = manager_in(tempdir().unwrap().path());
    let result = sample_result();

    let xml = manager
        .make_single_export("xml", &result, "media-datas.xml")
        .unwrap()
        .unwrap();
    let xml = String::from_utf8(xml).unwrap();
    assert!(xml.contains("true_peak=\"-144\""), "{xml}");

    for (format, name) in [("xlsx", "media-datas.xlsx"), ("ods", "media-datas.ods")] {
        let bytes = manager.make_single_export(format, &result, name).unwrap().unwrap();
        let text = zip_text(&bytes);
        assert!(text.contains("-144"), "{format}");
        assert!(!text.to_lowercase().contains("inf<"), "{format}");
    }
}

#[test]
fn test_sqlite_export_twice_restarts_ids() {
    let dir = tempdir().unwrap();
    let manager = manager_in(dir.path());
    manager.export(&["sqlite"], &sample_result()).unwrap();

    let other = DataResult {
        media_analysis: Some(MediaAnalysis {
            events: vec![MediaEvent {
                name: "black".into(),
                scope: None,
                start_ms: 2_000,
                end_ms: Some(4_000),
            }],
            ..Default::default()
        }),
        ..sample_result()
    };
    let produced = manager.export(&["sqlite"], &other).unwrap();

    let connection = rusqlite::Connection::open(&produced["sqlite"]).unwrap();
    let rows: Vec<(i64, String)> = connection
        .prepare("SELECT \"id\", \"name\" FROM \"events\" ORDER BY \"id\"")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows, vec![(1, "black".to_string())]);
}

/// Every entry of a zip package, concatenated as text.
fn zip_text(bytes: &[u8]) -> String {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let mut text = String::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).unwrap();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        text.push_str(&String::from_utf8_lossy(&content));
    }
    text
}
