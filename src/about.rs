use serde::Serialize;

use crate::api::{Biography, SiteSettings};
use crate::content::narrative::{extract_narrative, FALLBACK_BIOGRAPHY};
use crate::content::quote::ExtractedQuote;
use crate::content::social::{resolve_instagram_social, SocialLink};
use crate::content::timeline::TimelineEntry;

const DEFAULT_NAME: &str = "Memshaheb Magazine";

/// Everything the about page renders.
#[derive(Debug, Clone, Serialize)]
pub struct AboutPage {
    pub name: String,
    pub tagline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<ExtractedQuote>,
    pub timeline: Vec<TimelineEntry>,
    pub markdown: String,
    pub socials: Vec<SocialLink>,
    pub portrait_url: Option<String>,
    /// Last edit of the stored biography.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl AboutPage {
    /// Extract from the biography's rich text, then let the stored fields
    /// override the extracted ones.
    pub fn compose(biography: Option<&Biography>, settings: Option<&SiteSettings>) -> Self {
        let source = biography
            .and_then(|b| b.rich_text.as_deref())
            .unwrap_or(FALLBACK_BIOGRAPHY);
        let extracted = extract_narrative(source);

        let name = stored(biography.and_then(|b| b.name.as_deref()))
            .unwrap_or_else(|| DEFAULT_NAME.to_string());
        let tagline = stored(biography.and_then(|b| b.tagline.as_deref()))
            .unwrap_or(extracted.tagline);

        let quote = match stored(biography.and_then(|b| b.quote.as_deref())) {
            Some(text) => Some(ExtractedQuote {
                text,
                attribution: stored(biography.and_then(|b| b.quote_attribution.as_deref())),
            }),
            None => extracted.quote,
        };

        let timeline = match biography.map(|b| &b.timeline) {
            Some(items) if !items.is_empty() => items
                .iter()
                .enumerate()
                .map(|(i, item)| TimelineEntry {
                    id: format!("biography-timeline-{}", i),
                    time_label: item.time_label.clone(),
                    title: item.title.clone(),
                    description: item.description.clone(),
                })
                .collect(),
            _ => extracted.timeline,
        };

        AboutPage {
            name,
            tagline,
            quote,
            timeline,
            markdown: extracted.markdown,
            socials: resolve_instagram_social(biography, settings),
            portrait_url: biography.and_then(|b| b.portrait_url.clone()),
            updated_at: biography.map(|b| b.updated_at.clone()),
        }
    }

    /// Page for a bare markdown document, with no stored fields to layer on.
    pub fn from_markdown(markdown: &str) -> Self {
        let extracted = extract_narrative(markdown);
        AboutPage {
            name: DEFAULT_NAME.to_string(),
            tagline: extracted.tagline,
            quote: extracted.quote,
            timeline: extracted.timeline,
            markdown: extracted.markdown,
            socials: Vec::new(),
            portrait_url: None,
            updated_at: None,
        }
    }
}

fn stored(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn biography(value: serde_json::Value) -> Biography {
        let mut base = serde_json::json!({ "id": 1, "updated_at": "2024-01-01T00:00:00Z" });
        if let (Some(b), Some(v)) = (base.as_object_mut(), value.as_object()) {
            b.extend(v.clone());
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn no_biography_uses_fallback() {
        let page = AboutPage::compose(None, None);
        assert_eq!(page.name, DEFAULT_NAME);
        assert_eq!(page.timeline.len(), 4);
        assert_eq!(page.timeline[0].id, "timeline-0");
        assert_eq!(
            page.quote.unwrap().attribution.as_deref(),
            Some("Memshaheb Editorial")
        );
        assert!(page.socials.is_empty());
        assert!(page.updated_at.is_none());
    }

    #[test]
    fn from_markdown_fixture() {
        let md = std::fs::read_to_string("tests/fixtures/biography.md").unwrap();
        let page = AboutPage::from_markdown(&md);
        assert_eq!(page.name, DEFAULT_NAME);
        assert_eq!(page.quote.unwrap().attribution.as_deref(), Some("Nadia Rahman"));
        assert_eq!(page.timeline.len(), 3);
        assert!(page.tagline.starts_with("Nadia Rahman paints rooms at night"));
    }

    #[test]
    fn extracted_values_from_rich_text() {
        let bio = biography(serde_json::json!({
            "rich_text": "Painter of night rooms.\n\n> Colour is memory -- R. Sen\n\n## 2019 – First show\nDhaka.",
        }));
        let page = AboutPage::compose(Some(&bio), None);
        assert_eq!(page.tagline, "Painter of night rooms.");
        assert_eq!(page.quote.as_ref().unwrap().text, "Colour is memory");
        assert_eq!(page.timeline[0].title, "First show");
        assert!(!page.markdown.contains("Colour is memory"));
        assert_eq!(page.updated_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["updated_at"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn stored_fields_override_extraction() {
        let bio = biography(serde_json::json!({
            "name": "Nadia",
            "tagline": "Stored tagline",
            "quote": "Stored quote",
            "quote_attribution": "  ",
            "rich_text": "Derived tagline\n\n> Derived quote — Someone",
            "timeline": [{ "time_label": "2010", "title": "Start", "description": "Began." }],
            "instagram_handle": "nadia.paints"
        }));
        let page = AboutPage::compose(Some(&bio), None);
        assert_eq!(page.name, "Nadia");
        assert_eq!(page.tagline, "Stored tagline");
        let quote = page.quote.unwrap();
        assert_eq!(quote.text, "Stored quote");
        assert_eq!(quote.attribution, None);
        assert_eq!(page.timeline.len(), 1);
        assert_eq!(page.timeline[0].id, "biography-timeline-0");
        assert_eq!(page.socials[0].href, "https://instagram.com/nadia.paints");
        // Body still has the extracted quote removed.
        assert_eq!(page.markdown, "Derived tagline");
    }
}
