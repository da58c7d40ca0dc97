//! JSON rendition of a [`ReportDocument`].
//!
//! Sections are grouped by category, summary first and about last. Images
//! are not written here; they stay available as graphic artifacts.

use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use super::document::{
    DOCUMENT_CREATION_DATE, REPORT_TITLE, ReportDocument, ReportSection, ReportSectionCategory, TARGET_SOURCE,
    json_header,
};
use super::entry::{ReportEntry, json_float, with_plural};

pub fn to_json(document: &ReportDocument) -> Value {
    let mut root = Map::new();
    root.insert("title".into(), REPORT_TITLE.into());
    root.insert(json_header(TARGET_SOURCE), document.source().into());
    root.insert(
        json_header(DOCUMENT_CREATION_DATE),
        document.created().to_rfc3339().into(),
    );

    let all_sections = std::iter::once(document.summary())
        .chain(document.active_sections())
        .chain(std::iter::once(document.about()));

    let mut by_category: IndexMap<ReportSectionCategory, Map<String, Value>> = IndexMap::new();
    for section in all_sections {
        by_category
            .entry(section.category())
            .or_default()
            .insert(json_header(section.title()), section_to_json(section));
    }
    for (category, sections) in by_category {
        root.insert(json_header(category.name()), Value::Object(sections));
    }
    Value::Object(root)
}

fn section_to_json(section: &ReportSection) -> Value {
    let mut map = Map::new();
    map.insert("_section_title".into(), section.title().into());
    for entry in section.entries() {
        write_entry(entry, &mut map);
    }
    Value::Object(map)
}

fn write_entry(entry: &ReportEntry, map: &mut Map<String, Value>) {
    match entry {
        ReportEntry::KeyValue { key, value } | ReportEntry::KeyPreValue { key, value } => {
            map.insert(json_header(key), value.as_str().into());
        }
        ReportEntry::KeyValueList { key, values } => {
            map.insert(json_header(key), json!(values));
        }
        ReportEntry::NumericUnit(entry) => {
            let plural = entry.value.long_value() > 1;
            map.insert(
                json_header(&entry.key),
                json!({
                    "value": entry.value.to_json(),
                    "unit": with_plural(&entry.unit, plural),
                }),
            );
        }
        ReportEntry::Statistics(entry) => {
            if let Some(stats) = &entry.stats {
                map.insert(
                    json_header(&entry.key),
                    json!({
                        "min": json_float(stats.min.value),
                        "average": json_float(stats.average.value),
                        "median": json_float(stats.median.value),
                        "max": json_float(stats.max.value),
                        "unit": with_plural(&entry.unit, stats.max.plural),
                    }),
                );
            }
        }
        ReportEntry::Subset(entries) => {
            for child in entries.iter().filter(|e| !e.is_empty()) {
                write_entry(child, map);
            }
        }
        ReportEntry::Streams(list) => {
            let first = list.first_items_to_display();
            let mut by_codec: IndexMap<String, Vec<Value>> = IndexMap::new();
            for stream in list.sorted_streams() {
                let mut object = Map::new();
                object.insert("index".into(), stream.index.into());
                if let Some(id) = &stream.id {
                    object.insert("id".into(), id.as_str().into());
                }
                for item in stream.ordered_entries(&first) {
                    write_entry(item, &mut object);
                }
                by_codec
                    .entry(json_header(&stream.codec_type))
                    .or_default()
                    .push(Value::Object(object));
            }
            let streams: Map<String, Value> = by_codec
                .into_iter()
                .map(|(codec, list)| (codec, Value::Array(list)))
                .collect();
            map.insert("streams".into(), Value::Object(streams));
        }
        ReportEntry::Chapters(chapters) => {
            let list: Vec<Value> = chapters
                .iter()
                .map(|c| json!({"title": c.title, "position": c.position.as_millis() as u64}))
                .collect();
            map.insert("chapters".into(), Value::Array(list));
        }
        ReportEntry::Event(event) => {
            let mut object = Map::new();
            object.insert("name".into(), event.name.as_str().into());
            if let Some(scope) = &event.scope {
                object.insert("scope".into(), scope.as_str().into());
            }
            object.insert("start".into(), (event.start.as_millis() as u64).into());
            if let (Some(end), Some(duration)) = (event.end, event.duration()) {
                object.insert("end".into(), (end.as_millis() as u64).into());
                object.insert("duration".into(), (duration.as_millis() as u64).into());
            }
            if let Value::Array(events) = map
                .entry("events")
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                events.push(Value::Object(object));
            }
        }
        ReportEntry::EventHeader { .. } | ReportEntry::Image(_) | ReportEntry::ImageStrip(_) => {}
    }
}
