//! tumblelog - polymorphic post timeline with oEmbed metadata sync
//!
//! A blogging core that unifies many content types (articles, images,
//! tweets, videos, links, code, files, provider embeds) under a single
//! sortable timeline.
//!
//! # Architecture
//!
//! The system is built around a generic identity layer:
//! - Every concrete content item owns exactly one `Post` identity record
//! - Saving an item validates slug uniqueness, then syncs the identity
//!   record atomically with the item itself
//! - Embed-backed items cache provider metadata locally and refresh it
//!   once per cache window, serving stale data when the provider is down
//!
//! # Modules
//!
//! - `domain`: Data structures (Post, PostFields, EmbedFields)
//! - `types`: Concrete content types (Article, Tweet, YoutubeVideo, ...)
//! - `oembed`: Remote metadata sync (client, mapping tables, providers)
//! - `store`: SQLite persistence (identity records + content documents)
//! - `core`: Timeline orchestration (validate/save/load/delete)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Author a draft article from stdin
//! echo "Body text" | tumblelog add-article "Hello" hello
//!
//! # Publish a tweet post (fetches provider metadata on save)
//! tumblelog add-tweet "A tweet" a-tweet https://twitter.com/rust_lang/status/1 --publish
//!
//! # List the published timeline
//! tumblelog list --status published
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod oembed;
pub mod store;
pub mod types;

// Re-export main types at crate root for convenience
pub use crate::core::{Timeline, TimelineError};
pub use domain::{ContentItem, ContentKind, ContentRef, EmbedFields, Post, PostFields, Status};
pub use oembed::{FetchPolicy, OembedClient, OembedEndpoint, OembedError, OembedItem};
pub use store::{StoreError, TimelineStore};
pub use types::{
    Article, CodeFragment, CodeListing, FileUpload, FlickrPhoto, Gist, Image, InstagramPhoto,
    Link, RdioTrack, Snippet, SoundcloudTrack, Tweet, VimeoVideo, YoutubeVideo,
};
