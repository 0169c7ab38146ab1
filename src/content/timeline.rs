use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::fence::scan_lines;
use super::strip::strip_markdown;

static H2_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^##\s+(.+)").unwrap());
static ANY_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#{1,6}\s+").unwrap());
static HEADING_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s[–—-]\s").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub id: String,
    pub time_label: String,
    pub title: String,
    pub description: String,
}

/// One entry per `## ` heading, in document order.
///
/// Each description is the stripped text of the non-blank lines between the
/// heading and the next heading of any level. Fenced code is left out.
pub fn extract_timeline(markdown: &str) -> Vec<TimelineEntry> {
    let lines = scan_lines(markdown);
    let mut items = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if line.fenced {
            continue;
        }
        let Some(caps) = H2_RE.captures(line.text) else {
            continue;
        };
        let heading = caps[1].trim();
        let (time_label, title) = split_timeline_heading(heading);

        let description: Vec<&str> = lines[i + 1..]
            .iter()
            .take_while(|l| l.fenced || !ANY_HEADING_RE.is_match(l.text))
            .filter(|l| !l.fenced)
            .map(|l| l.text.trim())
            .filter(|t| !t.is_empty())
            .collect();

        items.push(TimelineEntry {
            id: format!("timeline-{}", items.len()),
            time_label,
            title,
            description: strip_markdown(&description.join(" ")),
        });
    }

    items
}

/// Split `"2021 – Launch"` into `("2021", "Launch")`.
///
/// Headings without a spaced dash separator use the whole text for both.
pub fn split_timeline_heading(heading: &str) -> (String, String) {
    let Some(sep) = HEADING_SEPARATOR_RE.find(heading) else {
        return (heading.to_string(), heading.to_string());
    };
    let before = heading[..sep.start()].trim();
    let after = heading[sep.end()..].trim();
    let title = if after.is_empty() { heading } else { after };
    (before.to_string(), title.to_string())
}
