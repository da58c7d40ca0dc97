//! Report sections and the document that orders them.

use chrono::{DateTime, Local};

use super::entry::ReportEntry;

pub const REPORT_TITLE: &str = "Media analysis report";
pub const TARGET_SOURCE: &str = "Target source";
pub const DOCUMENT_CREATION_DATE: &str = "Document creation date";
pub const ABOUT_THIS_DOCUMENT: &str = "About this document";

/// Normalizes a label into a JSON key: `"File stream(s)"` gives `file_streams`.
pub fn json_header(text: &str) -> String {
    let replaced = text
        .trim()
        .replace([' ', ',', '/', '-'], "_")
        .replace("(s)", "s")
        .replace(['(', ')'], "_");

    let mut collapsed = String::with_capacity(replaced.len());
    for c in replaced.chars() {
        if c == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.extend(c.to_lowercase());
    }

    let trimmed = collapsed.strip_prefix('_').unwrap_or(&collapsed);
    trimmed.strip_suffix('_').unwrap_or(trimmed).to_string()
}

/// Section categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportSectionCategory {
    Summary,
    Audio,
    Video,
    Events,
    Container,
    About,
}

impl ReportSectionCategory {
    pub fn emoji(self) -> &'static str {
        match self {
            ReportSectionCategory::Summary => "📋",
            ReportSectionCategory::Audio => "🔊",
            ReportSectionCategory::Video => "🖼",
            ReportSectionCategory::Events => "🚩",
            ReportSectionCategory::Container => "📦",
            ReportSectionCategory::About => "ℹ",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ReportSectionCategory::Summary => "SUMMARY",
            ReportSectionCategory::Audio => "AUDIO",
            ReportSectionCategory::Video => "VIDEO",
            ReportSectionCategory::Events => "EVENTS",
            ReportSectionCategory::Container => "CONTAINER",
            ReportSectionCategory::About => "ABOUT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    category: ReportSectionCategory,
    title: String,
    entries: Vec<ReportEntry>,
}

impl ReportSection {
    pub fn new(category: ReportSectionCategory, title: &str) -> Self {
        Self {
            category,
            title: title.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, entry: ReportEntry) -> &mut Self {
        self.entries.push(entry);
        self
    }

    /// Wraps entries into a single visual group.
    pub fn add_subset(&mut self, entries: impl IntoIterator<Item = ReportEntry>) -> &mut Self {
        self.add(ReportEntry::Subset(entries.into_iter().collect()))
    }

    pub fn category(&self) -> ReportSectionCategory {
        self.category
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Non-empty entries, in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| !e.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(ReportEntry::is_empty)
    }

    pub fn anchor_name(&self) -> String {
        json_header(&format!(
            "{}_{}",
            self.category.name().to_lowercase(),
            self.title
        ))
    }
}

/// The whole report of one source.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    source: String,
    created: DateTime<Local>,
    sections: Vec<ReportSection>,
    summary: ReportSection,
    about: ReportSection,
}

impl ReportDocument {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            created: Local::now(),
            sections: Vec::new(),
            summary: ReportSection::new(ReportSectionCategory::Summary, "Media summary"),
            about: ReportSection::new(ReportSectionCategory::About, ABOUT_THIS_DOCUMENT),
        }
    }

    pub fn add(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn add_summary(&mut self, entry: ReportEntry) {
        self.summary.add(entry);
    }

    pub fn add_about(&mut self, entry: ReportEntry) {
        self.about.add(entry);
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn created(&self) -> DateTime<Local> {
        self.created
    }

    pub fn summary(&self) -> &ReportSection {
        &self.summary
    }

    pub fn about(&self) -> &ReportSection {
        &self.about
    }

    /// Non-empty sections, stable-sorted by category.
    pub fn active_sections(&self) -> Vec<&ReportSection> {
        let mut sections: Vec<_> = self.sections.iter().filter(|s| !s.is_empty()).collect();
        sections.sort_by_key(|s| s.category());
        sections
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.active_sections().is_empty()
    }
}
