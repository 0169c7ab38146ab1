use serde::Serialize;

use crate::api::Blog;
use crate::content::footnotes::{
    extract_footnotes, replace_footnote_references, resolve_footnotes, FootnoteMap, FootnoteReference,
};
use crate::content::format::{blog_card_data, estimate_read_time};
use crate::content::strip::{generate_excerpt, DEFAULT_EXCERPT_LEN};

/// A single post ready to render: body with footnote markers resolved plus
/// the end-of-article notes.
#[derive(Debug, Clone, Serialize)]
pub struct BlogArticle {
    pub title: String,
    pub slug: String,
    pub published: Option<String>,
    pub read_time: u32,
    pub category: Option<String>,
    pub tags: Vec<String>,
    /// MDX source with `<Footnote id="…" />` placeholders.
    pub source: String,
    pub body: String,
    pub references: Vec<FootnoteReference>,
    pub footnotes: FootnoteMap,
}

impl BlogArticle {
    pub fn compose(blog: &Blog) -> Self {
        let extract = extract_footnotes(&blog.content_md);
        let source = replace_footnote_references(&extract.markdown);
        let rendered = resolve_footnotes(&source, &extract.footnotes);
        let card = blog_card_data(blog);

        BlogArticle {
            title: blog.title.clone(),
            slug: blog.slug.clone(),
            published: card.published,
            read_time: card.read_time,
            category: blog.category.as_ref().map(|c| c.name.clone()),
            tags: blog.tags.clone().unwrap_or_default(),
            source,
            body: rendered.body,
            references: rendered.references,
            footnotes: extract.footnotes,
        }
    }

    /// Article built from a bare markdown file, without backend metadata.
    pub fn from_markdown(title: &str, markdown: &str) -> Self {
        let extract = extract_footnotes(markdown);
        let source = replace_footnote_references(&extract.markdown);
        let rendered = resolve_footnotes(&source, &extract.footnotes);

        BlogArticle {
            title: title.to_string(),
            slug: String::new(),
            published: None,
            read_time: estimate_read_time(markdown),
            category: None,
            tags: Vec::new(),
            source,
            body: rendered.body,
            references: rendered.references,
            footnotes: extract.footnotes,
        }
    }
}

/// Archive listing row.
#[derive(Debug, Clone, Serialize)]
pub struct BlogCard {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub published: Option<String>,
    pub read_time: u32,
    pub excerpt: String,
    pub footnotes: usize,
}

impl BlogCard {
    pub fn from_blog(blog: &Blog) -> Self {
        let card = blog_card_data(blog);
        let extract = extract_footnotes(&blog.content_md);
        let excerpt = blog
            .excerpt
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(String::from)
            .unwrap_or_else(|| generate_excerpt(&extract.markdown, DEFAULT_EXCERPT_LEN));

        BlogCard {
            id: blog.id,
            title: blog.title.clone(),
            slug: blog.slug.clone(),
            published: card.published,
            read_time: card.read_time,
            excerpt,
            footnotes: extract.footnotes.len(),
        }
    }
}
