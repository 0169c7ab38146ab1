use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;

/// The backend rejects page sizes above this.
const MAX_PAGE_SIZE: usize = 50;

// ── Payloads ──

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BiographyTimelineItem {
    #[serde(default)]
    pub time_label: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Biography {
    pub id: i64,
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub quote: Option<String>,
    pub quote_attribution: Option<String>,
    pub rich_text: Option<String>,
    pub portrait_url: Option<String>,
    #[serde(default)]
    pub timeline: Vec<BiographyTimelineItem>,
    pub instagram_handle: Option<String>,
    pub updated_at: String,
}

impl Biography {
    /// Trim text fields, turn blanks into `None`, and drop timeline rows
    /// missing a label, title or description.
    pub fn normalize(mut self) -> Self {
        self.name = clean(self.name);
        self.tagline = clean(self.tagline);
        self.quote = clean(self.quote);
        self.quote_attribution = clean(self.quote_attribution);
        self.instagram_handle = clean(self.instagram_handle);
        self.timeline = self
            .timeline
            .into_iter()
            .map(|item| BiographyTimelineItem {
                time_label: item.time_label.trim().to_string(),
                title: item.title.trim().to_string(),
                description: item.description.trim().to_string(),
            })
            .filter(|item| {
                !item.time_label.is_empty() && !item.title.is_empty() && !item.description.is_empty()
            })
            .collect();
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SiteSettings {
    pub social_links: Option<BTreeMap<String, Option<String>>>,
    pub site_title: Option<String>,
    pub site_tagline: Option<String>,
    pub seo_description: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlogCategory {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Blog {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content_md: String,
    pub cover_url: Option<String>,
    pub excerpt: Option<String>,
    pub tags: Option<Vec<String>>,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub read_time_minutes: Option<u32>,
    pub category: Option<BlogCategory>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlogListResponse {
    #[serde(default)]
    pub items: Vec<Blog>,
    pub next_cursor: Option<String>,
}

/// Filters for `GET /blogs`.
#[derive(Debug, Clone, Default)]
pub struct BlogQuery {
    pub query: Option<String>,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<usize>,
}

impl BlogQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(q) = self.query.as_deref().filter(|q| !q.is_empty()) {
            params.push(("query", q.to_string()));
        }
        if !self.tags.is_empty() {
            params.push(("tags", self.tags.join(",")));
        }
        if let Some(c) = &self.category {
            params.push(("category", c.clone()));
        }
        if let Some(c) = &self.cursor {
            params.push(("cursor", c.clone()));
        }
        if let Some(n) = self.limit {
            params.push(("limit", n.to_string()));
        }
        params
    }
}

// ── Session ──

/// Connection to the REST backend. Carries the optional bearer token
/// explicitly instead of reading it from ambient state.
pub struct Session {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Session {
            base_url: config.api_base.clone(),
            token: config.token.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` as JSON. 404 maps to `Ok(None)`; other failures are errors.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, params);

        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(params);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("GET {} returned {}: {}", path, status, body.trim());
        }

        let data = response
            .json::<T>()
            .await
            .with_context(|| format!("Malformed payload from {}", path))?;
        Ok(Some(data))
    }
}

// ── Endpoints ──

pub async fn get_biography(session: &Session) -> Result<Option<Biography>> {
    let bio = session.get_json::<Option<Biography>>("/biography", &[]).await?;
    Ok(bio.flatten().map(Biography::normalize))
}

pub async fn get_site_settings(session: &Session) -> Result<Option<SiteSettings>> {
    session.get_json("/site/settings", &[]).await
}

pub async fn get_blog(session: &Session, identifier: &str) -> Result<Option<Blog>> {
    let path = format!("/blogs/{}", identifier.trim_matches('/'));
    session.get_json(&path, &[]).await
}

pub async fn get_blogs(session: &Session, query: &BlogQuery) -> Result<BlogListResponse> {
    let page = session.get_json("/blogs", &query.params()).await?;
    Ok(page.unwrap_or(BlogListResponse {
        items: Vec::new(),
        next_cursor: None,
    }))
}

/// Follow `next_cursor` until the listing is exhausted or `limit` posts are collected.
///
/// Posts are deduplicated by id. Pagination stops on a repeated cursor or a
/// page that adds no unseen posts.
pub async fn get_all_blogs(
    session: &Session,
    base: &BlogQuery,
    limit: Option<usize>,
) -> Result<Vec<Blog>> {
    let mut blogs: Vec<Blog> = Vec::new();
    let mut seen_ids: HashSet<i64> = HashSet::new();
    let mut seen_cursors: HashSet<String> = HashSet::new();
    let mut query = base.clone();
    query.cursor = None;

    loop {
        let remaining = limit.map(|l| l.saturating_sub(blogs.len()));
        if remaining == Some(0) {
            break;
        }
        query.limit = Some(remaining.unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE));

        let page = get_blogs(session, &query).await?;
        let fetched = page.items.len();
        let before = blogs.len();
        blogs.extend(page.items.into_iter().filter(|b| seen_ids.insert(b.id)));
        debug!(
            "Fetched {} blogs, {} new (cursor {:?})",
            fetched,
            blogs.len() - before,
            query.cursor
        );

        if blogs.len() == before {
            if fetched > 0 {
                warn!("Page at cursor {:?} repeated earlier posts, stopping pagination", query.cursor);
            }
            break;
        }

        match page.next_cursor {
            Some(next) if seen_cursors.insert(next.clone()) => query.cursor = Some(next),
            Some(next) => {
                warn!("Cursor {} repeated, stopping pagination", next);
                break;
            }
            None => break,
        }
    }

    if let Some(l) = limit {
        blogs.truncate(l);
    }
    info!("Fetched {} blogs from {}", blogs.len(), session.base_url());
    Ok(blogs)
}

/// Read-path call site: a failed fetch is logged and rendered as absent.
pub async fn safe<T, F>(what: &str, fetch: F) -> Option<T>
where
    F: Future<Output = Result<Option<T>>>,
{
    match fetch.await {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to fetch {}: {:#}", what, e);
            None
        }
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
