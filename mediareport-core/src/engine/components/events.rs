//! Detected events (silences, black frames, freezes...) on the source timeline.

use std::time::Duration;

use log::debug;

use super::{NAME, Rows, fill_table, fill_tabular};
use crate::engine::{ReportRendererEngine, SingleTabularEngine, TableRendererEngine};
use crate::error::CoreResult;
use crate::model::{DataResult, MediaEvent};
use crate::report::{EventEntry, ReportDocument, ReportEntry, ReportSection, ReportSectionCategory};
use crate::table::{TableDocument, TabularDialect, TabularDocument};

const HEAD_EVENTS: &[&str] = &[NAME, "Scope/Channel", "Start", "End", "Duration"];

pub struct EventsEngine;

renderer_engine!(EventsEngine, "Events", report, table, tabular);

/// Events by start, then by name. Without a known source duration, open
/// events can't be bounded and nothing is rendered.
fn sorted_events(result: &DataResult) -> Option<(Vec<&MediaEvent>, Duration)> {
    let analysis = result.media_analysis.as_ref()?;
    if analysis.events.is_empty() {
        return None;
    }
    let Some(source_duration) = result.source_duration() else {
        debug!("Skip events of {}: unknown source duration", result.source);
        return None;
    };
    let mut events: Vec<_> = analysis.events.iter().collect();
    events.sort_by(|a, b| a.start_ms.cmp(&b.start_ms).then_with(|| a.name.cmp(&b.name)));
    Some((events, source_duration))
}

fn event_rows(events: &[&MediaEvent], source_duration: Duration) -> Rows {
    events
        .iter()
        .map(|event| {
            let start = event.start();
            let end = event.end_or(source_duration);
            crate::cells![
                event.name.as_str(),
                event.scope.as_deref().unwrap_or_default(),
                start,
                end,
                end.saturating_sub(start),
            ]
        })
        .collect()
}

impl SingleTabularEngine for EventsEngine {
    fn tabular_base_name(&self) -> &'static str {
        "events"
    }

    fn make_tabular(&self, result: &DataResult, dialect: TabularDialect) -> CoreResult<Option<TabularDocument>> {
        Ok(sorted_events(result).map(|(events, duration)| {
            fill_tabular(
                TabularDocument::new(dialect, self.tabular_base_name(), HEAD_EVENTS.iter().copied()),
                &event_rows(&events, duration),
            )
        }))
    }
}

impl TableRendererEngine for EventsEngine {
    fn add_to_table(&self, result: &DataResult, document: &mut TableDocument) -> CoreResult<()> {
        match sorted_events(result) {
            Some((events, duration)) => fill_table(document, "Events", HEAD_EVENTS, event_rows(&events, duration)),
            None => Ok(()),
        }
    }
}

impl ReportRendererEngine for EventsEngine {
    fn add_to_report(&self, result: &DataResult, document: &mut ReportDocument) -> CoreResult<()> {
        let Some((events, duration)) = sorted_events(result) else {
            return Ok(());
        };
        let owned: Vec<MediaEvent> = events.iter().map(|event| (*event).clone()).collect();
        let mut section = ReportSection::new(ReportSectionCategory::Events, "Events");
        section.add(ReportEntry::event_header(&owned, Some(duration)));
        for event in &owned {
            section.add(ReportEntry::Event(EventEntry::new(event, Some(duration))));
        }
        document.add(section);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::with_media;
    use super::*;
    use crate::model::MediaAnalysis;
    use crate::table::Cell;

    fn event(name: &str, start_ms: u64, end_ms: Option<u64>) -> MediaEvent {
        MediaEvent {
            name: name.into(),
            scope: None,
            start_ms,
            end_ms,
        }
    }

    fn events_result() -> DataResult {
        with_media(MediaAnalysis {
            events: vec![
                event("Video freeze", 4000, Some(6000)),
                event("Black frame", 4000, Some(4500)),
                event("Audio silence", 8000, None),
            ],
            ..Default::default()
        })
    }

    #[test]
    fn sorted_by_start_then_name() {
        let mut document = TableDocument::new();
        EventsEngine.add_to_table(&events_result(), &mut document).unwrap();
        let table = document.table("Events").unwrap();
        assert_eq!(table.cell(0, 0), &Cell::String("Black frame".into()));
        assert_eq!(table.cell(1, 0), &Cell::String("Video freeze".into()));
        assert_eq!(table.cell(2, 3), &Cell::String("00:00:10".into()));
        assert_eq!(table.cell(2, 4), &Cell::String("00:00:02".into()));
    }

    #[test]
    fn unknown_duration_skips_events() {
        let mut result = events_result();
        result.source_duration_ms = None;
        let mut document = TableDocument::new();
        EventsEngine.add_to_table(&result, &mut document).unwrap();
        assert!(document.is_empty());

        let mut report = ReportDocument::new("clip");
        EventsEngine.add_to_report(&result, &mut report).unwrap();
        assert!(report.active_sections().is_empty());
    }

    #[test]
    fn report_lists_every_event() {
        let mut report = ReportDocument::new("clip");
        EventsEngine.add_to_report(&events_result(), &mut report).unwrap();
        let json = crate::report::to_json(&report);
        let events = json["events"]["events"]["events"].as_array().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[2]["duration"], 2000);
    }
}
