//! Command-line interface for the tumblelog.
//!
//! Thin glue over the library surface: author posts, list the unified
//! timeline, and manage provider refreshes. No admin semantics live
//! here.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use chrono::Utc;

use crate::config;
use crate::core::Timeline;
use crate::domain::{ContentItem, ContentKind, Post, Status};
use crate::oembed::{FetchPolicy, OembedClient, OembedItem};
use crate::types::{
    Article, FlickrPhoto, Gist, InstagramPhoto, Link, RdioTrack, SoundcloudTrack, Tweet,
    VimeoVideo, YoutubeVideo,
};

/// tumblelog - polymorphic post timeline with oEmbed metadata sync
#[derive(Parser, Debug)]
#[command(name = "tumblelog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Author an article
    AddArticle {
        title: String,

        /// Slug used to build the post URL
        slug: String,

        /// Body file (reads from stdin if not provided)
        #[arg(short, long)]
        body: Option<PathBuf>,

        /// Listing lead-in
        #[arg(short, long)]
        excerpt: Option<String>,

        #[arg(short, long)]
        author: Option<String>,

        /// Publish immediately instead of saving a draft
        #[arg(short, long)]
        publish: bool,
    },

    /// Author a link post
    AddLink {
        title: String,
        slug: String,

        /// The linked URL
        url: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        author: Option<String>,

        #[arg(short, long)]
        publish: bool,
    },

    /// Author a tweet post (fetches provider metadata on save)
    AddTweet {
        title: String,
        slug: String,

        /// URL of the tweet on twitter.com
        url: String,

        /// Strip photos and videos from the rendered tweet
        #[arg(long)]
        hide_media: bool,

        /// Hide the conversation the tweet replies to
        #[arg(long)]
        hide_thread: bool,

        #[arg(short, long)]
        author: Option<String>,

        #[arg(short, long)]
        publish: bool,
    },

    /// List the unified timeline, newest first
    List {
        /// Filter by status
        #[arg(short, long, value_enum)]
        status: Option<StatusArg>,

        /// Maximum number of posts to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show one post by slug
    Show {
        slug: String,
    },

    /// Force a provider refresh for an embed post
    Refresh {
        slug: String,
    },

    /// Delete a post by slug
    Delete {
        slug: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Status filter for the CLI (maps to Status)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Draft,
    Published,
    Hidden,
}

impl From<StatusArg> for Status {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::Draft => Status::Draft,
            StatusArg::Published => Status::Published,
            StatusArg::Hidden => Status::Hidden,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::AddArticle {
                title,
                slug,
                body,
                excerpt,
                author,
                publish,
            } => add_article(title, slug, body, excerpt, author, publish).await,
            Commands::AddLink {
                title,
                slug,
                url,
                description,
                author,
                publish,
            } => add_link(title, slug, url, description, author, publish).await,
            Commands::AddTweet {
                title,
                slug,
                url,
                hide_media,
                hide_thread,
                author,
                publish,
            } => add_tweet(title, slug, url, hide_media, hide_thread, author, publish).await,
            Commands::List { status, limit } => list_timeline(status, limit),
            Commands::Show { slug } => show_post(&slug),
            Commands::Refresh { slug } => refresh_post(&slug).await,
            Commands::Delete { slug } => delete_post(&slug),
            Commands::Config => show_config(),
        }
    }
}

/// Open the timeline using the resolved configuration
fn open_timeline() -> Result<Timeline> {
    let home = config::tumblelog_home()?;
    std::fs::create_dir_all(&home)
        .with_context(|| format!("Failed to create tumblelog home: {}", home.display()))?;

    let settings = config::oembed_settings()?;
    let client = OembedClient::new().with_max_dimensions(settings.max_width, settings.max_height);
    let policy = if settings.strict {
        FetchPolicy::Strict
    } else {
        FetchPolicy::StaleOnError
    };

    let timeline = Timeline::open(config::database_path()?)?
        .with_client(client)
        .with_fetch_policy(policy);
    Ok(timeline)
}

fn apply_common_fields<T: ContentItem>(item: &mut T, author: Option<String>, publish: bool) {
    item.fields_mut().author = author;
    if publish {
        item.fields_mut().publish(Utc::now());
    }
}

async fn add_article(
    title: String,
    slug: String,
    body_file: Option<PathBuf>,
    excerpt: Option<String>,
    author: Option<String>,
    publish: bool,
) -> Result<()> {
    let body = if let Some(path) = body_file {
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read body file: {}", path.display()))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read body from stdin")?;
        buffer
    };

    if body.trim().is_empty() {
        anyhow::bail!("Article body is empty. Use --body <file> or pipe to stdin");
    }

    let mut article = Article::new(title, slug, body);
    article.excerpt = excerpt;
    apply_common_fields(&mut article, author, publish);

    let mut timeline = open_timeline()?;
    let post = timeline.save(&mut article)?;
    println!("Saved {} at {}", post, post.absolute_url());
    Ok(())
}

async fn add_link(
    title: String,
    slug: String,
    url: String,
    description: Option<String>,
    author: Option<String>,
    publish: bool,
) -> Result<()> {
    let mut link = Link::new(title, slug, url);
    link.description = description;
    apply_common_fields(&mut link, author, publish);

    let mut timeline = open_timeline()?;
    let post = timeline.save(&mut link)?;
    println!("Saved {} at {}", post, post.absolute_url());
    Ok(())
}

async fn add_tweet(
    title: String,
    slug: String,
    url: String,
    hide_media: bool,
    hide_thread: bool,
    author: Option<String>,
    publish: bool,
) -> Result<()> {
    let mut tweet = Tweet::new(title, slug, url);
    tweet.embed.cache_age = config::oembed_settings()?.cache_age;
    tweet.hide_media = hide_media;
    tweet.hide_thread = hide_thread;
    apply_common_fields(&mut tweet, author, publish);

    let mut timeline = open_timeline()?;
    let post = timeline.save_embed(&mut tweet).await?;

    let provider = tweet
        .embed
        .provider_name
        .as_deref()
        .unwrap_or("provider unreachable");
    println!("Saved {} at {} ({})", post, post.absolute_url(), provider);
    Ok(())
}

fn list_timeline(status: Option<StatusArg>, limit: usize) -> Result<()> {
    let timeline = open_timeline()?;
    let posts = timeline.timeline(status.map(Into::into), Some(limit))?;

    if posts.is_empty() {
        println!("No posts.");
        return Ok(());
    }

    for post in posts {
        let published = post
            .date_published
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unpublished".to_string());
        println!(
            "{:<12} {:<10} {}  {}",
            post.post_type_name(),
            post.status,
            published,
            post
        );
    }
    Ok(())
}

fn show_post(slug: &str) -> Result<()> {
    let timeline = open_timeline()?;
    let post = timeline
        .find_by_slug(slug)?
        .with_context(|| format!("No post with slug '{}'", slug))?;

    println!("{}", post);
    println!("  url:       {}", post.absolute_url());
    println!("  status:    {}", post.status);
    if let Some(ref author) = post.author {
        println!("  author:    {}", author);
    }
    println!("  added:     {}", post.date_added);
    println!("  modified:  {}", post.date_modified);
    if let Some(published) = post.date_published {
        println!("  published: {}", published);
    }
    println!("  template:  {}", post.content.kind.post_template());
    Ok(())
}

async fn refresh_post(slug: &str) -> Result<()> {
    let mut timeline = open_timeline()?;
    let post = timeline
        .find_by_slug(slug)?
        .with_context(|| format!("No post with slug '{}'", slug))?;

    match post.content.kind {
        ContentKind::Tweet => refresh_one::<Tweet>(&mut timeline, &post).await,
        ContentKind::YoutubeVideo => refresh_one::<YoutubeVideo>(&mut timeline, &post).await,
        ContentKind::VimeoVideo => refresh_one::<VimeoVideo>(&mut timeline, &post).await,
        ContentKind::FlickrPhoto => refresh_one::<FlickrPhoto>(&mut timeline, &post).await,
        ContentKind::InstagramPhoto => refresh_one::<InstagramPhoto>(&mut timeline, &post).await,
        ContentKind::SoundcloudTrack => refresh_one::<SoundcloudTrack>(&mut timeline, &post).await,
        ContentKind::RdioTrack => refresh_one::<RdioTrack>(&mut timeline, &post).await,
        ContentKind::Gist => refresh_one::<Gist>(&mut timeline, &post).await,
        _ => anyhow::bail!("Post '{}' is not backed by a remote provider", slug),
    }
}

async fn refresh_one<T: OembedItem>(timeline: &mut Timeline, post: &Post) -> Result<()> {
    let mut item: T = timeline
        .get(post.content.id)?
        .with_context(|| format!("Content item missing for post '{}'", post.slug))?;

    timeline.refresh_embed(&mut item).await?;
    timeline.save(&mut item)?;

    println!(
        "Refreshed {} ({})",
        post.slug,
        item.embed()
            .provider_name
            .as_deref()
            .unwrap_or("provider unreachable")
    );
    Ok(())
}

fn delete_post(slug: &str) -> Result<()> {
    let mut timeline = open_timeline()?;
    let post = timeline
        .find_by_slug(slug)?
        .with_context(|| format!("No post with slug '{}'", slug))?;

    timeline.delete(post.content.kind, post.content.id)?;
    println!("Deleted {}", post);
    Ok(())
}

fn show_config() -> Result<()> {
    let config = config::config()?;

    println!("Home:      {}", config.home.display());
    println!("Database:  {}", config.database.display());
    match &config.config_file {
        Some(path) => println!("Config:    {}", path.display()),
        None => println!("Config:    (defaults)"),
    }
    println!("oEmbed:");
    println!("  cache_age:  {}s", config.oembed.cache_age);
    println!(
        "  max_width:  {}",
        config
            .oembed
            .max_width
            .map(|w| w.to_string())
            .unwrap_or_else(|| "unset".to_string())
    );
    println!(
        "  max_height: {}",
        config
            .oembed
            .max_height
            .map(|h| h.to_string())
            .unwrap_or_else(|| "unset".to_string())
    );
    println!("  strict:     {}", config.oembed.strict);
    Ok(())
}
