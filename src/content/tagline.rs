use std::sync::LazyLock;

use regex::Regex;

use super::strip::strip_markdown;

static PARAGRAPH_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

pub const DEFAULT_TAGLINE: &str = "A lyrical storyteller weaving poetry, pigment, and commerce.";

/// First paragraph of `markdown` that still has text after stripping.
pub fn derive_tagline(markdown: &str) -> Option<String> {
    PARAGRAPH_BREAK_RE
        .split(markdown)
        .map(strip_markdown)
        .find(|p| !p.is_empty())
}
