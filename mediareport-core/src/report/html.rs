//! Self-contained HTML rendition of a [`ReportDocument`].

use maud::{Markup, PreEscaped, html};

use super::document::{DOCUMENT_CREATION_DATE, REPORT_TITLE, ReportDocument, ReportSection, TARGET_SOURCE};
use super::entry::{NumericUnitValue, Numeric, ReportEntry, StatItem, StatisticsUnitValue, StreamList, with_plural};
use crate::numbers::duration_to_string;

const STYLE: &str = include_str!("style.css");
const TO_TOP_ICON: &str = "⬆";
const END_OF_MEDIA: &str = "EOF / end of media";

/// Renders the full page, inline CSS included.
pub fn to_html(document: &ReportDocument) -> String {
    let sections = document.active_sections();
    let about = document.about();
    let created = document.created().format("%Y-%m-%d %H:%M:%S %Z").to_string();

    let page = html! {
        html lang="en" {
            head {
                title { (document.source()) " :: " (REPORT_TITLE) }
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta http-equiv="Content-Type" content="text/html; charset=UTF-8";
                style type="text/css" { (PreEscaped(STYLE)) }
            }
            body {
                header {
                    h1 { (REPORT_TITLE) }
                    (render_entry(&ReportEntry::key_value(TARGET_SOURCE, document.source())))
                    (render_entry(&ReportEntry::key_value(DOCUMENT_CREATION_DATE, created)))
                    (render_section_content(document.summary()))
                }
                nav {
                    a id="top" {}
                    h2 { "🗃 Table of content" }
                    ul {
                        @for section in &sections {
                            li { a href=(format!("#{}", section.anchor_name())) { (section_heading(section)) } }
                        }
                        li { a href=(format!("#{}", about.anchor_name())) { (section_heading(about)) } }
                    }
                }
                main {
                    @for section in &sections {
                        (render_article(section))
                    }
                }
                footer {
                    (render_article(about))
                }
            }
        }
    };
    format!("<!DOCTYPE html>\r\n{}", page.into_string())
}

fn section_heading(section: &ReportSection) -> String {
    format!("{} {}", section.category().emoji(), section.title())
}

fn render_article(section: &ReportSection) -> Markup {
    html! {
        article {
            a id=(section.anchor_name()) {}
            h2 {
                (section_heading(section))
                a.backtotop href="#top" { (TO_TOP_ICON) }
            }
            (render_section_content(section))
        }
    }
}

fn render_section_content(section: &ReportSection) -> Markup {
    html! {
        section.reportsection {
            @for entry in section.entries() {
                (render_entry(entry))
            }
        }
    }
}

pub(crate) fn render_entry(entry: &ReportEntry) -> Markup {
    match entry {
        ReportEntry::KeyValue { key, value } => html! {
            div.entry {
                span.key { (key) }
                span.value { (value) }
            }
        },
        ReportEntry::KeyValueList { key, values } => html! {
            div.entry {
                span.key { (with_plural(key, values.len() > 1)) }
                ul.value {
                    @for value in values { li { (value) } }
                }
            }
        },
        ReportEntry::KeyPreValue { key, value } => html! {
            div.entry {
                span.key { (key) }
                pre.value { (value) }
            }
        },
        ReportEntry::NumericUnit(numeric) => render_numeric(numeric),
        ReportEntry::Statistics(stats) => render_statistics(stats),
        ReportEntry::Subset(entries) => html! {
            div.subset {
                @for entry in entries.iter().filter(|e| !e.is_empty()) {
                    (render_entry(entry))
                }
            }
        },
        ReportEntry::Streams(list) => render_streams(list),
        ReportEntry::Chapters(chapters) => {
            let count = NumericUnitValue {
                key: "Chapters".to_string(),
                value: Numeric::from(chapters.len()),
                unit: "chapter(s)".to_string(),
            };
            html! {
                (render_numeric(&count))
                @if !chapters.is_empty() {
                    div.entry.chapters {
                        @for chapter in chapters {
                            div.entry {
                                span.key { (chapter.title) }
                                span.value { (duration_to_string(chapter.position)) }
                            }
                        }
                    }
                }
            }
        }
        ReportEntry::EventHeader { has_scope, has_end } => html! {
            div.entry.event {
                span.key.name.value { "Event" }
                @if *has_scope { span.key.scope.value { "Scope/channel" } }
                span.key.start.value { "Start time" }
                @if *has_end {
                    span.key.end.value { "End time" }
                    span.key.duration.value { "Event duration" }
                }
            }
        },
        ReportEntry::Event(event) => html! {
            div.entry.event {
                span.name.value { (event.name) }
                span.scope.value { (event.scope.as_deref().unwrap_or_default()) }
                span.start.value { (duration_to_string(event.start)) }
                @match (event.end, event.duration()) {
                    (Some(end), Some(duration)) => {
                        span.end.value { (duration_to_string(end)) }
                        span.duration.value { (duration_to_string(duration)) }
                    }
                    _ => {
                        span.end.value { (END_OF_MEDIA) }
                        span {}
                    }
                }
            }
        },
        ReportEntry::Image(entry) => html! {
            figure.image {
                img src=(entry.image.to_data_uri())
                    width=(entry.image.width)
                    height=(entry.image.height)
                    alt=(entry.caption);
                figcaption { (entry.caption) }
            }
        },
        ReportEntry::ImageStrip(images) => html! {
            div.entry.imagestrip {
                @for image in images {
                    img src=(image.to_data_uri()) alt=(image.name);
                }
            }
        },
    }
}

fn render_numeric(entry: &NumericUnitValue) -> Markup {
    let long_value = entry.value.long_value();
    let plural = long_value > 1;
    let value = if long_value == 0 {
        "no".to_string()
    } else {
        entry.value.to_display()
    };
    html! {
        div.entry {
            span.key { (with_plural(&entry.key, plural)) }
            span.value { (value) }
            span.unit { " " (with_plural(&entry.unit, plural)) }
        }
    }
}

fn render_stat_item(label: &str, item: &StatItem, unit: &str) -> Markup {
    html! {
        li {
            span.key { (label) }
            span.value { (item.text) }
            span.unit { " " (with_plural(unit, item.plural)) }
        }
    }
}

fn render_statistics(entry: &StatisticsUnitValue) -> Markup {
    let Some(stats) = &entry.stats else {
        return html! {};
    };
    if stats.min.text == stats.max.text {
        return html! {
            div.entry.stats {
                span.key { (entry.key) }
                span.value { (stats.min.text) }
                span.unit { " " (with_plural(&entry.unit, stats.min.plural)) }
            }
        };
    }
    html! {
        div.entry.stats {
            span.key { (entry.key) }
            ul.value {
                (render_stat_item("Minimum", &stats.min, &entry.unit))
                (render_stat_item("Average", &stats.average, &entry.unit))
                (render_stat_item("Median", &stats.median, &entry.unit))
                (render_stat_item("Maximum", &stats.max, &entry.unit))
            }
        }
    }
}

fn render_streams(list: &StreamList) -> Markup {
    let first = list.first_items_to_display();
    html! {
        div.entry.streamentries {
            span.key { "Stream list" }
            div.streamlist {
                @for stream in list.sorted_streams() {
                    div.streamentry {
                        div class=(format!("streamindex {}", stream.codec_type)) {
                            (stream.codec_type) " #" (stream.index)
                            @if let Some(id) = &stream.id { ", " (id) }
                        }
                        @for entry in stream.ordered_entries(&first) {
                            (render_entry(entry))
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageArtifact;
    use crate::report::{ReportSection, ReportSectionCategory};

    fn sample_document() -> ReportDocument {
        let mut doc = ReportDocument::new("clip <1>.mkv");
        doc.add_summary(ReportEntry::key_value("File format", "Matroska"));
        let mut section = ReportSection::new(ReportSectionCategory::Audio, "Loudness EBU R128");
        section.add(ReportEntry::numeric("Integrated", -23.4, "dBFS"));
        doc.add(section);
        doc.add_about(ReportEntry::key_value("mediareport", "0.1.0"));
        doc
    }

    #[test]
    fn page_skeleton() {
        let page = to_html(&sample_document());
        assert!(page.starts_with("<!DOCTYPE html>\r\n<html lang=\"en\">"));
        assert!(page.contains("<title>clip &lt;1&gt;.mkv :: Media analysis report</title>"));
        assert!(page.contains("<a id=\"top\"></a>"));
        assert!(page.contains("href=\"#audio_loudness_ebu_r128\""));
        assert!(page.contains("<a id=\"audio_loudness_ebu_r128\"></a>"));
        assert!(page.contains("<a class=\"backtotop\" href=\"#top\">"));
        assert!(page.contains("href=\"#about_about_this_document\""));
        assert!(page.contains("<footer>"));
    }

    #[test]
    fn numeric_zero_reads_no() {
        let markup = render_entry(&ReportEntry::numeric("Program(s)", 0_i64, "program(s)")).into_string();
        assert!(markup.contains("<span class=\"key\">Program</span>"));
        assert!(markup.contains("<span class=\"value\">no</span>"));

        let markup = render_entry(&ReportEntry::numeric("Stream(s)", 3_i64, "stream(s)")).into_string();
        assert!(markup.contains("<span class=\"key\">Streams</span>"));
        assert!(markup.contains("<span class=\"unit\"> streams</span>"));
    }

    #[test]
    fn statistics_collapse_when_constant() {
        let markup = render_entry(&ReportEntry::float_stats("Phase", [0.5, 0.5], "%")).into_string();
        assert!(!markup.contains("Minimum"));
        let markup = render_entry(&ReportEntry::float_stats("Phase", [0.5, 0.7], "%")).into_string();
        assert!(markup.contains("Minimum"));
        assert!(markup.contains("Maximum"));
    }

    #[test]
    fn images_are_inlined() {
        let image = ImageArtifact {
            name: "snap.jpg".into(),
            content_type: "image/jpeg".into(),
            width: 4,
            height: 3,
            data: vec![1, 2, 3],
        };
        let markup = render_entry(&ReportEntry::image(image, "Snapshot")).into_string();
        assert!(markup.contains("src=\"data:image/jpeg;base64,AQID\""));
        assert!(markup.contains("<figcaption>Snapshot</figcaption>"));
    }
}
