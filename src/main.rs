mod about;
mod api;
mod blog;
mod config;
mod content;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use about::AboutPage;
use blog::{BlogArticle, BlogCard};
use config::Config;
use content::format::highlight_query;

#[derive(Parser)]
#[command(name = "memshaheb", about = "Memshaheb content pipeline: biography, blog and archive extraction")]
struct Cli {
    /// REST backend base URL (overrides MEMSHAHEB_API_BASE_URL / API_BASE_URL)
    #[arg(long, global = true)]
    api_base: Option<String>,
    /// Bearer token sent with every request (overrides MEMSHAHEB_API_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Biography page: name, tagline, pull quote, timeline
    About {
        /// Read biography markdown from a file instead of the API
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Single blog post with footnotes resolved
    Blog {
        /// Blog slug or id
        #[arg(required_unless_present = "file")]
        slug: Option<String>,
        /// Read post markdown from a file instead of the API
        #[arg(short, long, conflicts_with = "slug")]
        file: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Blog archive cards (read time, published date, excerpt)
    Archive {
        /// Max posts to fetch (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Free-text filter passed to the backend
        #[arg(short, long)]
        query: Option<String>,
        /// Tag filter, repeatable
        #[arg(short, long)]
        tag: Vec<String>,
        /// Category slug or id
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Search the archive and highlight matches
    Search {
        query: String,
        /// Max posts to fetch
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
    /// Print markdown as plain text
    Strip {
        /// Markdown text (reads --file when omitted)
        #[arg(required_unless_present = "file")]
        text: Option<String>,
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let config = Config::from_env().with_overrides(cli.api_base, cli.token);

    let result = match cli.command {
        Commands::About { file, json } => {
            let page = match file {
                Some(path) => AboutPage::from_markdown(&read_markdown(&path)?),
                None => {
                    let session = api::Session::new(&config)?;
                    let (biography, settings) = tokio::join!(
                        api::safe("biography", api::get_biography(&session)),
                        api::safe("site settings", api::get_site_settings(&session)),
                    );
                    if biography.is_none() {
                        info!("No biography from {}, using fallback copy", session.base_url());
                    }
                    AboutPage::compose(biography.as_ref(), settings.as_ref())
                }
            };
            if json {
                print_json(&page)?;
            } else {
                print_about(&page);
            }
            Ok(())
        }
        Commands::Blog { slug, file, json } => {
            let article = match (file, slug) {
                (Some(path), _) => {
                    let title = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    BlogArticle::from_markdown(&title, &read_markdown(&path)?)
                }
                (None, Some(slug)) => {
                    let session = api::Session::new(&config)?;
                    match api::get_blog(&session, &slug).await? {
                        Some(blog) => BlogArticle::compose(&blog),
                        None => bail!("No blog found for '{}'", slug),
                    }
                }
                (None, None) => bail!("Pass a blog slug or --file"),
            };
            if json {
                print_json(&article)?;
            } else {
                print_article(&article);
            }
            Ok(())
        }
        Commands::Archive {
            limit,
            query,
            tag,
            category,
            json,
        } => {
            let session = api::Session::new(&config)?;
            let filter = api::BlogQuery {
                query,
                tags: tag,
                category,
                ..Default::default()
            };
            let blogs = api::get_all_blogs(&session, &filter, limit).await?;
            if blogs.is_empty() {
                println!("No published blogs found.");
                return Ok(());
            }
            let cards = build_cards(&blogs);
            if json {
                print_json(&cards)?;
            } else {
                print_cards(&cards);
            }
            Ok(())
        }
        Commands::Search { query, limit } => {
            let session = api::Session::new(&config)?;
            let filter = api::BlogQuery {
                query: Some(query.clone()),
                ..Default::default()
            };
            let blogs = api::get_all_blogs(&session, &filter, Some(limit)).await?;
            if blogs.is_empty() {
                println!("No posts match \"{}\".", query);
                return Ok(());
            }
            for card in build_cards(&blogs) {
                println!("{}", highlight_query(&card.title, &query));
                println!("  /blogs/{}", card.slug);
                println!("  {}\n", highlight_query(&card.excerpt, &query));
            }
            Ok(())
        }
        Commands::Strip { text, file } => {
            let source = match (text, file) {
                (Some(t), _) => t,
                (None, Some(path)) => read_markdown(&path)?,
                (None, None) => bail!("Pass markdown text or --file"),
            };
            println!("{}", content::strip::strip_markdown(&source));
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("Done in {}", format_duration(elapsed));
    }

    result
}

/// Cards for the archive view, built in parallel chunks.
fn build_cards(blogs: &[api::Blog]) -> Vec<BlogCard> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(blogs.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }

    let mut cards = Vec::with_capacity(blogs.len());
    for chunk in blogs.chunks(200) {
        let built: Vec<BlogCard> = chunk.par_iter().map(BlogCard::from_blog).collect();
        cards.extend(built);
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    info!("Built {} archive cards", cards.len());
    cards
}

fn read_markdown(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_about(page: &AboutPage) {
    println!("{}", page.name);
    println!("{}", page.tagline);

    if let Some(quote) = &page.quote {
        match &quote.attribution {
            Some(by) => println!("\n  \"{}\" — {}", quote.text, by),
            None => println!("\n  \"{}\"", quote.text),
        }
    }

    if !page.timeline.is_empty() {
        println!("\n--- Timeline ---");
        for item in &page.timeline {
            println!("{:>8} | {}", truncate(&item.time_label, 8), item.title);
            if !item.description.is_empty() {
                println!("{:>8} | {}", "", truncate(&item.description, 96));
            }
        }
    }

    for social in &page.socials {
        println!("\nInstagram: {} ({})", social.label, social.href);
    }
}

fn print_article(article: &BlogArticle) {
    println!("{}", article.title);
    println!(
        "{} | {} min read",
        article.published.as_deref().unwrap_or("Undated"),
        article.read_time
    );
    if let Some(category) = &article.category {
        println!("Category: {}", category);
    }
    if !article.tags.is_empty() {
        println!("Tags: {}", article.tags.join(", "));
    }
    println!("\n{}", article.body);

    if !article.footnotes.is_empty() {
        println!("\n--- Footnotes ---");
        for (id, text) in article.footnotes.notes() {
            println!("  {}. {}", id, text);
        }
    }
}

fn print_cards(cards: &[BlogCard]) {
    println!(
        "{:>3} | {:<32} | {:<18} | {:>4} | {:>3} | {:<40}",
        "#", "Title", "Published", "Min", "Fn", "Excerpt"
    );
    println!("{}", "-".repeat(115));

    for (i, c) in cards.iter().enumerate() {
        println!(
            "{:>3} | {:<32} | {:<18} | {:>4} | {:>3} | {:<40}",
            i + 1,
            truncate(&c.title, 32),
            c.published.as_deref().unwrap_or("Undated"),
            c.read_time,
            c.footnotes,
            truncate(&c.excerpt, 40)
        );
    }

    println!("\n{} posts | slug: /blogs/<slug>", cards.len());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
