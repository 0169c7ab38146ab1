use serde::Serialize;

use super::quote::{extract_quote, ExtractedQuote};
use super::tagline::{derive_tagline, DEFAULT_TAGLINE};
use super::timeline::{extract_timeline, TimelineEntry};

/// Display data derived from a biography's rich text.
#[derive(Debug, Clone, Serialize)]
pub struct NarrativeExtract {
    pub markdown: String,
    pub tagline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<ExtractedQuote>,
    pub timeline: Vec<TimelineEntry>,
}

/// Quote first, then timeline and tagline over what the quote left behind.
pub fn extract_narrative(markdown: &str) -> NarrativeExtract {
    let extract = extract_quote(markdown.trim());
    let pruned = extract.pruned_markdown;
    let timeline = extract_timeline(&pruned);
    let tagline = derive_tagline(&pruned).unwrap_or_else(|| DEFAULT_TAGLINE.to_string());

    NarrativeExtract {
        markdown: pruned.trim().to_string(),
        tagline,
        quote: extract.quote,
        timeline,
    }
}

/// Shown when the backend has no biography record.
pub const FALLBACK_BIOGRAPHY: &str = "\
Memshaheb is a night-mode magazine crafted by women for women who move between art, work, and inner worlds. We celebrate soft power, slow thinking, and unapologetic ambition.

> We write in the dark so you can breathe between the lines. — Memshaheb Editorial

## 2018 – The spark
Late-night group chats between writers, painters, and researchers hint at a shared need: a calmer, more intentional magazine space.

## 2021 – Digital-first launch
Memshaheb goes live with a dark, gentle interface and three founding pillars: essays, visual narratives, and cultural field notes.

## 2023 – Community columns
Guest authors, artists, and researchers join in, bringing lived experiences from Dhaka to Dakar and beyond.

## 2025 – Memshaheb today
A calm editorial home that pairs essays with illustration, offers audio previews for late nights, and experiments with live rooms for collaborative curation.";
