//! Domain types for the tumblelog.
//!
//! This module contains the core data structures:
//! - Post: the unified identity record every content item owns
//! - PostFields: the field block shared by all content types
//! - EmbedFields: cached provider metadata for embed-backed types

pub mod content;
pub mod embed;
pub mod post;

// Re-export commonly used types
pub use content::{ContentItem, FieldError, PostFields, MAX_SLUG_LEN, MAX_TITLE_LEN};
pub use embed::{
    Attribution, EmbedFields, PhotoEmbed, RichEmbed, Thumbnail, VideoEmbed, DEFAULT_CACHE_AGE,
};
pub use post::{ContentKind, ContentRef, Post, Status};
