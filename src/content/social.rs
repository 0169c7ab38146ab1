use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use serde::Serialize;

use crate::api::{Biography, SiteSettings};

static INSTAGRAM_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)instagram\.com/([^/?#]+)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialLink {
    pub label: String,
    pub href: String,
}

/// The about page shows one Instagram link: the biography handle if set,
/// otherwise the site-wide `instagram` social link.
pub fn resolve_instagram_social(
    biography: Option<&Biography>,
    settings: Option<&SiteSettings>,
) -> Vec<SocialLink> {
    let handle = biography
        .and_then(|b| b.instagram_handle.as_deref())
        .map(str::trim)
        .filter(|h| !h.is_empty());
    if let Some(handle) = handle {
        let clean = handle.strip_prefix('@').unwrap_or(handle);
        return vec![SocialLink {
            label: format!("@{}", clean),
            href: format!("https://instagram.com/{}", clean),
        }];
    }

    let href = settings
        .and_then(|s| s.social_links.as_ref())
        .and_then(|links| {
            links.iter().find_map(|(key, href)| match href {
                Some(h) if key.eq_ignore_ascii_case("instagram") && !h.is_empty() => Some(h),
                _ => None,
            })
        });

    match href {
        Some(href) => vec![SocialLink {
            label: format_instagram_label(href),
            href: href.clone(),
        }],
        None => Vec::new(),
    }
}

pub fn format_instagram_label(href: &str) -> String {
    if let Ok(url) = Url::parse(href) {
        if let Some(segment) = url.path_segments().and_then(|mut s| s.find(|p| !p.is_empty())) {
            return format!("@{}", segment.strip_prefix('@').unwrap_or(segment));
        }
    }

    if let Some(caps) = INSTAGRAM_PATH_RE.captures(href) {
        let raw = &caps[1];
        return format!("@{}", raw.strip_prefix('@').unwrap_or(raw));
    }

    "Instagram".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(links: serde_json::Value) -> SiteSettings {
        serde_json::from_value(serde_json::json!({ "social_links": links })).unwrap()
    }

    fn biography(handle: Option<&str>) -> Biography {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "instagram_handle": handle,
            "updated_at": "2024-01-01T00:00:00Z",
        }))
        .unwrap()
    }

    #[test]
    fn handle_wins_over_settings() {
        let b = biography(Some("@memshaheb"));
        let s = settings(serde_json::json!({ "instagram": "https://instagram.com/other" }));
        let links = resolve_instagram_social(Some(&b), Some(&s));
        assert_eq!(
            links,
            vec![SocialLink {
                label: "@memshaheb".into(),
                href: "https://instagram.com/memshaheb".into(),
            }]
        );
    }

    #[test]
    fn settings_key_case_insensitive() {
        let s = settings(serde_json::json!({ "Instagram": "https://www.instagram.com/@memshaheb/" }));
        let links = resolve_instagram_social(None, Some(&s));
        assert_eq!(links[0].label, "@memshaheb");
    }

    #[test]
    fn blank_handle_and_no_links() {
        let b = biography(Some("   "));
        let s = settings(serde_json::json!({ "twitter": "https://x.com/m", "instagram": "" }));
        assert!(resolve_instagram_social(Some(&b), Some(&s)).is_empty());
        assert!(resolve_instagram_social(None, None).is_empty());
    }

    #[test]
    fn labels() {
        assert_eq!(format_instagram_label("https://instagram.com/@memshaheb/"), "@memshaheb");
        assert_eq!(format_instagram_label("instagram.com/night.mag?hl=en"), "@night.mag");
        assert_eq!(format_instagram_label("https://instagram.com/"), "Instagram");
        assert_eq!(format_instagram_label("not a link"), "Instagram");
    }
}
