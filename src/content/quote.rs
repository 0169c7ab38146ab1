use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::fence::{join_lines, scan_lines, Line};

static QUOTE_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"—|--").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedQuote {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
}

#[derive(Debug, Clone)]
pub struct QuoteExtract {
    pub quote: Option<ExtractedQuote>,
    pub pruned_markdown: String,
}

/// Pull the first contiguous blockquote run out of `markdown`.
///
/// Without a blockquote the input comes back untouched. Later blockquotes
/// stay in the body.
pub fn extract_quote(markdown: &str) -> QuoteExtract {
    let lines = scan_lines(markdown);
    let is_quote_line = |l: &Line| !l.fenced && l.text.trim().starts_with('>');

    let Some(start) = lines.iter().position(is_quote_line) else {
        return QuoteExtract {
            quote: None,
            pruned_markdown: markdown.to_string(),
        };
    };
    let end = lines[start..]
        .iter()
        .position(|l| !is_quote_line(l))
        .map_or(lines.len(), |offset| start + offset);

    let flattened = lines[start..end]
        .iter()
        .map(|l| strip_quote_marker(l.text))
        .collect::<Vec<_>>()
        .join(" ");
    let (text, attribution) = normalize_quote(flattened.trim());

    let remaining: Vec<Line> = lines[..start].iter().chain(&lines[end..]).copied().collect();

    QuoteExtract {
        quote: text.map(|text| ExtractedQuote { text, attribution }),
        pruned_markdown: join_lines(&remaining),
    }
}

/// Split flattened quote text into `(text, attribution)` on `—` or `--`.
pub fn normalize_quote(content: &str) -> (Option<String>, Option<String>) {
    if content.is_empty() {
        return (None, None);
    }
    let mut parts = QUOTE_SEPARATOR_RE.split(content);
    let non_empty = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    let text = non_empty(parts.next());
    let attribution = non_empty(parts.next());
    (text, attribution)
}

fn strip_quote_marker(line: &str) -> &str {
    let rest = line.trim_start();
    let rest = rest.strip_prefix('>').unwrap_or(rest);
    rest.strip_prefix(' ').unwrap_or(rest)
}
