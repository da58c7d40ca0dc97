//! Report entries: the leaves of a report section.

use std::collections::HashSet;
use std::time::Duration;

use indexmap::IndexMap;

use crate::error::{CoreError, CoreResult};
use crate::model::{ImageArtifact, MediaEvent};
use crate::numbers::{Locale, NUMBER_UTILS, Precision};

/// Applies the `(s)` plural marker of a label.
pub fn with_plural(label: &str, plural: bool) -> String {
    if plural {
        label.replace("(s)", "s")
    } else {
        label.replace("(s)", "")
    }
}

/// A number that remembers whether it was integral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Long(i64),
    Float(f64),
}

impl Numeric {
    pub fn is_nan(self) -> bool {
        matches!(self, Numeric::Float(v) if v.is_nan())
    }

    /// Truncated integral value, used for the "no" and plural rules.
    pub fn long_value(self) -> i64 {
        match self {
            Numeric::Long(v) => v,
            Numeric::Float(v) => v as i64,
        }
    }

    pub fn to_display(self) -> String {
        match self {
            Numeric::Long(v) => NUMBER_UTILS.long_to_string(v),
            Numeric::Float(v) => NUMBER_UTILS.value_to_string(Some(v)),
        }
    }

    pub fn to_json(self) -> serde_json::Value {
        match self {
            Numeric::Long(v) => v.into(),
            Numeric::Float(v) => json_float(v),
        }
    }
}

/// JSON number rounded to five decimals; `null` for NaN.
pub(crate) fn json_float(value: f64) -> serde_json::Value {
    let value = crate::numbers::clamp_infinity(value);
    if value.is_nan() {
        return serde_json::Value::Null;
    }
    let rounded = (value * 100_000.0).round() / 100_000.0;
    serde_json::Number::from_f64(rounded).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

macro_rules! numeric_from {
    ($variant:ident, $cast:ty, $($t:ty),*) => {
        $(impl From<$t> for Numeric {
            fn from(value: $t) -> Self {
                Numeric::$variant(value as $cast)
            }
        })*
    };
}

numeric_from!(Long, i64, i32, i64, u32, u64, usize);
numeric_from!(Float, f64, f32, f64);

#[derive(Debug, Clone, PartialEq)]
pub struct NumericUnitValue {
    pub key: String,
    pub value: Numeric,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatItem {
    pub text: String,
    pub value: f64,
    pub plural: bool,
}

impl StatItem {
    fn new(text: String, value: f64) -> Self {
        Self {
            text,
            value,
            plural: value > 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub min: StatItem,
    pub average: StatItem,
    pub median: StatItem,
    pub max: StatItem,
}

/// Min, average, median and max of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsUnitValue {
    pub key: String,
    pub unit: String,
    pub stats: Option<Statistics>,
}

impl StatisticsUnitValue {
    /// Float series; NaN samples are ignored.
    pub fn from_floats(key: &str, values: impl IntoIterator<Item = f64>, unit: &str) -> Self {
        let mut values: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
        let format = NUMBER_UTILS.formatter(Locale::English, Precision::Full);
        let stats = if values.is_empty() {
            None
        } else {
            values.sort_by(f64::total_cmp);
            let average = values.iter().sum::<f64>() / values.len() as f64;
            let min = values[0];
            let max = values[values.len() - 1];
            let median = values[values.len() / 2];
            Some(Statistics {
                min: StatItem::new(format.format_float(min), min),
                average: StatItem::new(format.format_float(average), average),
                median: StatItem::new(format.format_float(median), median),
                max: StatItem::new(format.format_float(max), max),
            })
        };
        Self {
            key: key.to_string(),
            unit: unit.to_string(),
            stats,
        }
    }

    /// Integer series.
    pub fn from_longs(key: &str, values: impl IntoIterator<Item = i64>, unit: &str) -> Self {
        let mut values: Vec<i64> = values.into_iter().collect();
        let stats = if values.is_empty() {
            None
        } else {
            values.sort_unstable();
            let average = values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64;
            let min = values[0];
            let max = values[values.len() - 1];
            let median = values[values.len() / 2];
            let long_item = |v: i64| StatItem::new(NUMBER_UTILS.long_to_string(v), v as f64);
            Some(Statistics {
                min: long_item(min),
                average: StatItem::new(NUMBER_UTILS.value_to_string(Some(average)), average),
                median: long_item(median),
                max: long_item(max),
            })
        };
        Self {
            key: key.to_string(),
            unit: unit.to_string(),
            stats,
        }
    }
}

/// One stream of a [`StreamList`]: an ordered set of unique keys.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEntry {
    pub id: Option<String>,
    pub codec_type: String,
    pub index: u32,
    entries: IndexMap<String, ReportEntry>,
}

impl StreamEntry {
    fn insert(&mut self, key: &str, entry: ReportEntry) -> CoreResult<&mut Self> {
        if self.entries.contains_key(key) {
            return Err(CoreError::Schema(format!(
                "{key} was previously added to stream #{}",
                self.index
            )));
        }
        self.entries.insert(key.to_string(), entry);
        Ok(self)
    }

    /// Adds a text value. Absent values are skipped.
    pub fn add(&mut self, key: &str, value: Option<&str>) -> CoreResult<&mut Self> {
        match value {
            Some(value) => self.insert(key, ReportEntry::key_value(key, value)),
            None => Ok(self),
        }
    }

    /// Adds a text value unless it matches the usual default (case-insensitive).
    pub fn add_unless_default(&mut self, key: &str, value: Option<&str>, by_default: &str) -> CoreResult<&mut Self> {
        match value {
            Some(value) if !value.eq_ignore_ascii_case(by_default) => {
                self.insert(key, ReportEntry::key_value(key, value))
            }
            _ => Ok(self),
        }
    }

    pub fn add_numeric(&mut self, key: &str, value: Option<Numeric>, unit: &str) -> CoreResult<&mut Self> {
        match value {
            Some(value) => self.insert(key, ReportEntry::numeric(key, value, unit)),
            None => Ok(self),
        }
    }

    pub fn add_list(&mut self, key: &str, values: Vec<String>) -> CoreResult<&mut Self> {
        self.insert(key, ReportEntry::KeyValueList { key: key.to_string(), values })
    }

    fn item_keys(&self) -> HashSet<&str> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_empty())
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// Non-empty entries, the ones named in `first` ahead of the others.
    pub fn ordered_entries<'a>(&'a self, first: &HashSet<String>) -> Vec<&'a ReportEntry> {
        let visible = self.entries.iter().filter(|(_, entry)| !entry.is_empty());
        let (head, tail): (Vec<_>, Vec<_>) = visible.partition(|(key, _)| first.contains(key.as_str()));
        head.into_iter().chain(tail).map(|(_, entry)| entry).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamList {
    streams: Vec<StreamEntry>,
}

impl StreamList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stream(&mut self, id: Option<&str>, codec_type: &str, index: u32) -> &mut StreamEntry {
        self.streams.push(StreamEntry {
            id: id.map(str::to_string),
            codec_type: codec_type.to_string(),
            index,
            entries: IndexMap::new(),
        });
        let last = self.streams.len() - 1;
        &mut self.streams[last]
    }

    /// Keys shared by every stream, shown first. Only meaningful from two streams.
    pub fn first_items_to_display(&self) -> HashSet<String> {
        if self.streams.len() < 2 {
            return HashSet::new();
        }
        let mut shared: HashSet<&str> = self.streams[0].item_keys();
        for stream in &self.streams[1..] {
            let keys = stream.item_keys();
            shared.retain(|key| keys.contains(key));
        }
        shared.into_iter().map(str::to_string).collect()
    }

    /// Streams by index.
    pub fn sorted_streams(&self) -> Vec<&StreamEntry> {
        let mut streams: Vec<_> = self.streams.iter().collect();
        streams.sort_by_key(|s| s.index);
        streams
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChapterEntry {
    pub title: String,
    pub position: Duration,
}

/// A detected event, its end resolved against the source duration.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEntry {
    pub name: String,
    pub scope: Option<String>,
    pub start: Duration,
    pub end: Option<Duration>,
}

impl EventEntry {
    pub fn new(event: &MediaEvent, source_duration: Option<Duration>) -> Self {
        let end = event
            .end_ms
            .filter(|end| *end > 0)
            .map(Duration::from_millis)
            .or(source_duration);
        Self {
            name: event.name.clone(),
            scope: event.scope.clone().filter(|s| !s.is_empty()),
            start: event.start(),
            end,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|end| end.saturating_sub(self.start))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageEntry {
    pub image: ImageArtifact,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportEntry {
    KeyValue { key: String, value: String },
    KeyValueList { key: String, values: Vec<String> },
    /// Preformatted text, like a command line.
    KeyPreValue { key: String, value: String },
    NumericUnit(NumericUnitValue),
    Statistics(StatisticsUnitValue),
    Subset(Vec<ReportEntry>),
    Streams(StreamList),
    Chapters(Vec<ChapterEntry>),
    EventHeader { has_scope: bool, has_end: bool },
    Event(EventEntry),
    Image(ImageEntry),
    ImageStrip(Vec<ImageArtifact>),
}

impl ReportEntry {
    pub fn key_value(key: &str, value: impl Into<String>) -> Self {
        ReportEntry::KeyValue {
            key: key.to_string(),
            value: value.into(),
        }
    }

    pub fn key_values(key: &str, values: impl IntoIterator<Item = String>) -> Self {
        ReportEntry::KeyValueList {
            key: key.to_string(),
            values: values.into_iter().collect(),
        }
    }

    pub fn pre_value(key: &str, value: impl Into<String>) -> Self {
        ReportEntry::KeyPreValue {
            key: key.to_string(),
            value: value.into(),
        }
    }

    pub fn numeric(key: &str, value: impl Into<Numeric>, unit: &str) -> Self {
        ReportEntry::NumericUnit(NumericUnitValue {
            key: key.to_string(),
            value: value.into(),
            unit: unit.to_string(),
        })
    }

    pub fn float_stats(key: &str, values: impl IntoIterator<Item = f64>, unit: &str) -> Self {
        ReportEntry::Statistics(StatisticsUnitValue::from_floats(key, values, unit))
    }

    pub fn long_stats(key: &str, values: impl IntoIterator<Item = i64>, unit: &str) -> Self {
        ReportEntry::Statistics(StatisticsUnitValue::from_longs(key, values, unit))
    }

    pub fn image(image: ImageArtifact, caption: &str) -> Self {
        ReportEntry::Image(ImageEntry {
            image,
            caption: caption.to_string(),
        })
    }

    /// Header line of an event list; columns depend on the events shown.
    pub fn event_header(events: &[MediaEvent], source_duration: Option<Duration>) -> Self {
        ReportEntry::EventHeader {
            has_scope: events.iter().any(MediaEvent::has_scope),
            has_end: source_duration.is_some() || events.iter().any(|e| e.end_ms.is_some_and(|end| end > 0)),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ReportEntry::KeyValue { value, .. } | ReportEntry::KeyPreValue { value, .. } => value.is_empty(),
            ReportEntry::KeyValueList { values, .. } => values.is_empty(),
            ReportEntry::NumericUnit(entry) => entry.value.is_nan(),
            ReportEntry::Statistics(entry) => entry.stats.is_none(),
            ReportEntry::Subset(entries) => entries.iter().all(ReportEntry::is_empty),
            ReportEntry::Streams(list) => list.is_empty(),
            ReportEntry::ImageStrip(images) => images.is_empty(),
            ReportEntry::Chapters(_)
            | ReportEntry::EventHeader { .. }
            | ReportEntry::Event(_)
            | ReportEntry::Image(_) => false,
        }
    }
}
