use std::sync::LazyLock;

use regex::Regex;

static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[.*?\]\(.*?\)").unwrap());
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static QUOTE_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[ \t]*>[ \t]?").unwrap());
static HEADING_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+").unwrap());
static BOLD_STAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(^|\s)\*\*([^*]+)\*\*").unwrap());
static BOLD_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(^|\s)__([^_]+)__").unwrap());
static ITALIC_STAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(^|\s)\*([^*]+)\*").unwrap());
static ITALIC_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(^|\s)_([^_]+)_").unwrap());
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Backend-generated excerpts are capped at this many characters.
pub const DEFAULT_EXCERPT_LEN: usize = 240;

/// Reduce markdown to a single line of plain text for excerpts and taglines.
///
/// Best-effort: unbalanced markers are left in place rather than rejected.
pub fn strip_markdown(value: &str) -> String {
    let text = IMAGE_RE.replace_all(value, "");
    let text = LINK_RE.replace_all(&text, "$1");
    let text = QUOTE_MARKER_RE.replace_all(&text, "");
    let text = HEADING_MARKER_RE.replace_all(&text, "");
    let text = BOLD_STAR_RE.replace_all(&text, "${1}${2}");
    let text = BOLD_UNDERSCORE_RE.replace_all(&text, "${1}${2}");
    let text = ITALIC_STAR_RE.replace_all(&text, "${1}${2}");
    let text = ITALIC_UNDERSCORE_RE.replace_all(&text, "${1}${2}");
    let text = CODE_RE.replace_all(&text, "$1");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}

/// Plain-text excerpt of at most `max_len` characters, ellipsized when cut.
pub fn generate_excerpt(content: &str, max_len: usize) -> String {
    let text = strip_markdown(content);
    if text.chars().count() <= max_len {
        return text;
    }
    let cut: String = text.chars().take(max_len.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}
