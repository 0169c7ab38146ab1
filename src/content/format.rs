use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::RegexBuilder;
use serde::Serialize;

use crate::api::Blog;

const WORDS_PER_MINUTE: f64 = 180.0;

/// Reading time in whole minutes, never below one.
pub fn estimate_read_time(content: &str) -> u32 {
    // An empty body still counts as one word.
    let words = content.split_whitespace().count().max(1);
    let minutes = (words as f64 / WORDS_PER_MINUTE).round() as u32;
    minutes.max(1)
}

/// `"2024-01-05T10:00:00Z"` → `"January 5, 2024"`, in UTC.
pub fn format_published_date(date: Option<&str>) -> Option<String> {
    let date = date?.trim();
    if date.is_empty() {
        return None;
    }
    let parsed = parse_timestamp(date)?;
    Some(parsed.format("%B %-d, %Y").to_string())
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// HTML-escape `text` and wrap case-insensitive matches of `query` in `<mark>`.
pub fn highlight_query(text: &str, query: &str) -> String {
    let escaped = escape_html(text);
    if query.trim().is_empty() {
        return escaped;
    }
    match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.replace_all(&escaped, "<mark>$0</mark>").into_owned(),
        Err(_) => escaped,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardData {
    pub read_time: u32,
    pub published: Option<String>,
}

pub fn blog_card_data(blog: &Blog) -> CardData {
    let read_time = blog.read_time_minutes.unwrap_or_else(|| {
        let source = if blog.content_md.is_empty() {
            blog.excerpt.as_deref().unwrap_or("")
        } else {
            &blog.content_md
        };
        estimate_read_time(source)
    });
    let published = format_published_date(
        blog.published_at
            .as_deref()
            .or(Some(blog.created_at.as_str())),
    );
    CardData {
        read_time,
        published,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blog(content: &str) -> Blog {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Night Notes",
            "slug": "night-notes",
            "content_md": content,
            "created_at": "2024-03-01T08:00:00Z",
            "updated_at": "2024-03-01T08:00:00Z",
        }))
        .unwrap()
    }

    #[test]
    fn read_time_minimum_one() {
        assert_eq!(estimate_read_time(""), 1);
        assert_eq!(estimate_read_time("a few words"), 1);
    }

    #[test]
    fn read_time_rounds() {
        assert_eq!(estimate_read_time(&"word ".repeat(360)), 2);
        assert_eq!(estimate_read_time(&"word ".repeat(450)), 3);
        assert_eq!(estimate_read_time(&"word ".repeat(440)), 2);
    }

    #[test]
    fn published_date_formats() {
        assert_eq!(
            format_published_date(Some("2024-01-05T10:00:00Z")).as_deref(),
            Some("January 5, 2024")
        );
        assert_eq!(
            format_published_date(Some("2023-12-31T23:30:00-02:00")).as_deref(),
            Some("January 1, 2024")
        );
        assert_eq!(
            format_published_date(Some("2022-07-09T12:00:00.123456")).as_deref(),
            Some("July 9, 2022")
        );
        assert_eq!(format_published_date(Some("2021-02-03")).as_deref(), Some("February 3, 2021"));
    }

    #[test]
    fn published_date_missing_or_bad() {
        assert_eq!(format_published_date(None), None);
        assert_eq!(format_published_date(Some("")), None);
        assert_eq!(format_published_date(Some("yesterday")), None);
    }

    #[test]
    fn escapes_all_specials() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn highlight_escapes_then_marks() {
        assert_eq!(highlight_query("Tom & Jerry", "jerry"), "Tom &amp; <mark>Jerry</mark>");
    }

    #[test]
    fn highlight_blank_query() {
        assert_eq!(highlight_query("<b>", "  "), "&lt;b&gt;");
    }

    #[test]
    fn highlight_regex_chars_literal() {
        assert_eq!(highlight_query("cost (a+b)?", "(a+b)"), "cost <mark>(a+b)</mark>?");
    }

    #[test]
    fn card_prefers_stored_read_time() {
        let mut b = blog("short");
        b.read_time_minutes = Some(7);
        assert_eq!(blog_card_data(&b).read_time, 7);
    }

    #[test]
    fn card_estimates_and_falls_back_to_created() {
        let b = blog(&"word ".repeat(540));
        let card = blog_card_data(&b);
        assert_eq!(card.read_time, 3);
        assert_eq!(card.published.as_deref(), Some("March 1, 2024"));
    }
}
