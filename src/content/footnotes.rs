use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::fence::scan_lines;
use super::format::escape_html;

static DEFINITION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[\^([^\]]+)\]:\s*(.*)$").unwrap());
static CONTINUATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s{2,}.+").unwrap());
static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\^([^\]]+)\]").unwrap());
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<Footnote id="([^"]*)" />"#).unwrap());

/// Footnote id → text, iterated in the order ids were first defined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FootnoteMap {
    entries: Vec<(String, String)>,
}

impl FootnoteMap {
    /// A repeated id replaces the earlier text but keeps its position.
    pub fn insert(&mut self, id: String, text: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == id) {
            Some(entry) => entry.1 = text,
            None => self.entries.push((id, text)),
        }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// End-of-article list, document order.
    pub fn notes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Reference for `id`; unknown ids resolve to empty content.
    pub fn resolve(&self, id: &str) -> FootnoteReference {
        FootnoteReference {
            label: id.to_string(),
            content: self.get(id).unwrap_or_default().to_string(),
        }
    }
}

impl Serialize for FootnoteMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FootnoteReference {
    pub label: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct FootnoteExtract {
    pub markdown: String,
    pub footnotes: FootnoteMap,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedBody {
    pub body: String,
    pub references: Vec<FootnoteReference>,
}

/// Move `[^id]: text` definitions out of the body into a [`FootnoteMap`].
///
/// Lines indented by two or more spaces directly after a definition continue it.
pub fn extract_footnotes(markdown: &str) -> FootnoteExtract {
    let lines = scan_lines(markdown);
    let mut footnotes = FootnoteMap::default();
    let mut body = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let caps = if line.fenced {
            None
        } else {
            DEFINITION_RE.captures(line.text)
        };
        let Some(caps) = caps else {
            body.push(line.text);
            i += 1;
            continue;
        };

        let mut definition = vec![caps[2].to_string()];
        i += 1;
        while i < lines.len() && !lines[i].fenced && CONTINUATION_RE.is_match(lines[i].text) {
            definition.push(lines[i].text.trim().to_string());
            i += 1;
        }
        footnotes.insert(caps[1].to_string(), definition.join(" ").trim().to_string());
    }

    FootnoteExtract {
        markdown: body.join("\n").trim().to_string(),
        footnotes,
    }
}

/// Rewrite inline `[^id]` markers into `<Footnote id="id" />` placeholders.
pub fn replace_footnote_references(markdown: &str) -> String {
    scan_lines(markdown)
        .iter()
        .map(|line| {
            if line.fenced {
                line.text.to_string()
            } else {
                REFERENCE_RE
                    .replace_all(line.text, |caps: &Captures| {
                        format!(r#"<Footnote id="{}" />"#, escape_html(&caps[1]))
                    })
                    .into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render placeholders as `[id]` markers and collect their references.
///
/// A placeholder whose id has no definition still renders, with empty content.
pub fn resolve_footnotes(source: &str, footnotes: &FootnoteMap) -> RenderedBody {
    let mut references = Vec::new();
    let body = PLACEHOLDER_RE
        .replace_all(source, |caps: &Captures| {
            let id = unescape_attr(&caps[1]);
            let marker = format!("[{}]", id);
            references.push(footnotes.resolve(&id));
            marker
        })
        .into_owned();
    RenderedBody { body, references }
}

fn unescape_attr(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_removed_and_collected() {
        let md = "Body with note[^1].\n\n[^1]: The note text.\nMore body.";
        let r = extract_footnotes(md);
        assert_eq!(r.markdown, "Body with note[^1].\n\nMore body.");
        assert_eq!(r.footnotes.get("1"), Some("The note text."));
    }

    #[test]
    fn continuation_lines_joined() {
        let md = "x\n[^a]: first part\n  second part\n    third\nafter";
        let r = extract_footnotes(md);
        assert_eq!(r.footnotes.get("a"), Some("first part second part third"));
        assert_eq!(r.markdown, "x\nafter");
    }

    #[test]
    fn encounter_order_not_numeric() {
        let md = "[^10]: ten\n[^2]: two\n[^b]: bee";
        let r = extract_footnotes(md);
        let ids: Vec<&str> = r.footnotes.notes().map(|(k, _)| k).collect();
        assert_eq!(ids, vec!["10", "2", "b"]);
    }

    #[test]
    fn redefinition_keeps_position() {
        let mut map = FootnoteMap::default();
        map.insert("1".into(), "old".into());
        map.insert("2".into(), "two".into());
        map.insert("1".into(), "new".into());
        let notes: Vec<_> = map.notes().collect();
        assert_eq!(notes, vec![("1", "new"), ("2", "two")]);
    }

    #[test]
    fn fenced_definitions_stay_in_body() {
        let md = "```\n[^x]: code sample\n```";
        let r = extract_footnotes(md);
        assert!(r.footnotes.is_empty());
        assert_eq!(r.markdown, md);
    }

    #[test]
    fn references_become_placeholders() {
        let out = replace_footnote_references("See[^1] and[^note-2].");
        assert_eq!(out, r#"See<Footnote id="1" /> and<Footnote id="note-2" />."#);
    }

    #[test]
    fn fenced_references_untouched() {
        let md = "a[^1]\n```\nb[^1]\n```";
        assert_eq!(
            replace_footnote_references(md),
            "a<Footnote id=\"1\" />\n```\nb[^1]\n```"
        );
    }

    #[test]
    fn missing_definition_renders_empty() {
        let map = FootnoteMap::default();
        let rendered = resolve_footnotes(r#"Text<Footnote id="ghost" />"#, &map);
        assert_eq!(rendered.body, "Text[ghost]");
        assert_eq!(
            rendered.references,
            vec![FootnoteReference {
                label: "ghost".into(),
                content: String::new(),
            }]
        );
    }

    #[test]
    fn quoted_ids_round_trip() {
        let source = replace_footnote_references(r#"odd[^a"b]"#);
        let mut map = FootnoteMap::default();
        map.insert(r#"a"b"#.into(), "quoted".into());
        let rendered = resolve_footnotes(&source, &map);
        assert_eq!(rendered.body, r#"odd[a"b]"#);
        assert_eq!(rendered.references[0].content, "quoted");
    }

    #[test]
    fn serializes_in_order() {
        let r = extract_footnotes("[^z]: last letter\n[^a]: first letter");
        let json = serde_json::to_string(&r.footnotes).unwrap();
        assert_eq!(json, r#"{"z":"last letter","a":"first letter"}"#);
    }

    #[test]
    fn fixture_blog() {
        let md = std::fs::read_to_string("tests/fixtures/blog.md").unwrap();
        let r = extract_footnotes(&md);
        assert_eq!(r.footnotes.len(), 2);
        assert!(!r.markdown.contains("Kerosene"));
        assert!(r.markdown.contains("[^1]: this is code"));
        let rendered = resolve_footnotes(&replace_footnote_references(&r.markdown), &r.footnotes);
        assert_eq!(rendered.references.len(), 3);
        assert!(rendered.references.iter().any(|f| f.content.is_empty()));
    }
}
