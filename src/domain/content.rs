//! Shared field block and contract for all concrete content types.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::post::{ContentKind, Status};

/// Maximum accepted title length
pub const MAX_TITLE_LEN: usize = 256;

/// Maximum accepted slug length
pub const MAX_SLUG_LEN: usize = 64;

/// Field-level validation failures, user-correctable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("title is {actual} characters, limit is {limit}")]
    TitleTooLong { actual: usize, limit: usize },

    #[error("slug must not be empty")]
    EmptySlug,

    #[error("slug is {actual} characters, limit is {limit}")]
    SlugTooLong { actual: usize, limit: usize },

    #[error("slug '{slug}' contains characters outside [a-z0-9_-]")]
    SlugCharset { slug: String },
}

/// The fields every content item carries, whatever its type.
///
/// `id` stays `None` until the first save assigns a store row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostFields {
    /// Store row id, assigned on first save
    pub id: Option<i64>,

    pub title: String,

    pub author: Option<String>,

    /// Used to construct the post's URL; unique across every type
    pub slug: String,

    pub status: Status,

    /// Recommended length: 150-160 characters
    pub meta_description: Option<String>,

    /// Set once at creation
    pub date_added: DateTime<Utc>,

    /// Refreshed at every save
    pub date_modified: DateTime<Utc>,

    /// Absent means unpublished
    pub date_published: Option<DateTime<Utc>>,
}

impl PostFields {
    /// Create a draft field block with fresh timestamps
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            title: title.into(),
            author: None,
            slug: slug.into(),
            status: Status::Draft,
            meta_description: None,
            date_added: now,
            date_modified: now,
            date_published: None,
        }
    }

    /// Set the author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the meta description
    pub fn with_meta_description(mut self, text: impl Into<String>) -> Self {
        self.meta_description = Some(text.into());
        self
    }

    /// Mark as published at the given instant
    pub fn publish(&mut self, at: DateTime<Utc>) {
        self.status = Status::Published;
        self.date_published = Some(at);
    }

    /// Run field-level checks
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.title.trim().is_empty() {
            return Err(FieldError::EmptyTitle);
        }
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(FieldError::TitleTooLong {
                actual: self.title.chars().count(),
                limit: MAX_TITLE_LEN,
            });
        }
        if self.slug.is_empty() {
            return Err(FieldError::EmptySlug);
        }
        if self.slug.chars().count() > MAX_SLUG_LEN {
            return Err(FieldError::SlugTooLong {
                actual: self.slug.chars().count(),
                limit: MAX_SLUG_LEN,
            });
        }
        if !self
            .slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(FieldError::SlugCharset {
                slug: self.slug.clone(),
            });
        }
        Ok(())
    }
}

/// Contract every concrete content type satisfies.
///
/// Items serialize to a JSON document for the content store; the
/// relational identity row is maintained by the save protocol, never by
/// the item itself.
pub trait ContentItem: Serialize + DeserializeOwned {
    /// Which timeline kind this type registers as
    const KIND: ContentKind;

    fn fields(&self) -> &PostFields;

    fn fields_mut(&mut self) -> &mut PostFields;

    /// Template name for detail rendering
    fn post_template(&self) -> String {
        Self::KIND.post_template()
    }

    /// Candidate feed templates, most specific first
    fn rss_templates(&self) -> [String; 2] {
        Self::KIND.rss_templates()
    }
}
