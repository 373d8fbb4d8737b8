//! The unified post identity record.
//!
//! Every concrete content item, regardless of its type, is addressable
//! through exactly one `Post` row. The record carries a denormalized copy
//! of the fields needed to list and order the timeline without touching
//! the typed content tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publication status, stored as a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Authored but not visible in public listings
    Draft,

    /// Visible in the public timeline
    Published,

    /// Published once, then withdrawn from listings
    Hidden,
}

impl Status {
    /// Single-character code used by the persistent store
    pub fn code(&self) -> char {
        match self {
            Status::Draft => 'd',
            Status::Published => 'p',
            Status::Hidden => 'h',
        }
    }

    /// Parse a store code back into a status
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'd' => Some(Status::Draft),
            'p' => Some(Status::Published),
            'h' => Some(Status::Hidden),
            _ => None,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Draft
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Draft => write!(f, "draft"),
            Status::Published => write!(f, "published"),
            Status::Hidden => write!(f, "hidden"),
        }
    }
}

impl std::str::FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "d" | "draft" => Ok(Status::Draft),
            "p" | "published" => Ok(Status::Published),
            "h" | "hidden" => Ok(Status::Hidden),
            _ => anyhow::bail!("Unknown status: {}", s),
        }
    }
}

/// Every concrete content type the timeline can carry.
///
/// The slug-cased name doubles as the store tag and the template name
/// segment, so the two can never drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    Article,
    Snippet,
    CodeListing,
    Image,
    FileUpload,
    Link,
    Tweet,
    YoutubeVideo,
    VimeoVideo,
    FlickrPhoto,
    InstagramPhoto,
    SoundcloudTrack,
    RdioTrack,
    Gist,
}

impl ContentKind {
    /// Slug-cased type name
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Article => "article",
            ContentKind::Snippet => "snippet",
            ContentKind::CodeListing => "code-listing",
            ContentKind::Image => "image",
            ContentKind::FileUpload => "file-upload",
            ContentKind::Link => "link",
            ContentKind::Tweet => "tweet",
            ContentKind::YoutubeVideo => "youtube-video",
            ContentKind::VimeoVideo => "vimeo-video",
            ContentKind::FlickrPhoto => "flickr-photo",
            ContentKind::InstagramPhoto => "instagram-photo",
            ContentKind::SoundcloudTrack => "soundcloud-track",
            ContentKind::RdioTrack => "rdio-track",
            ContentKind::Gist => "gist",
        }
    }

    /// Template name for the detail rendering of this type
    pub fn post_template(&self) -> String {
        format!("tumblelog/post/{}.html", self.as_str())
    }

    /// Candidate template names for feed rendering, most specific first
    pub fn rss_templates(&self) -> [String; 2] {
        [
            format!("tumblelog/rss/{}.html", self.as_str()),
            self.post_template(),
        ]
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ContentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" => Ok(ContentKind::Article),
            "snippet" => Ok(ContentKind::Snippet),
            "code-listing" => Ok(ContentKind::CodeListing),
            "image" => Ok(ContentKind::Image),
            "file-upload" => Ok(ContentKind::FileUpload),
            "link" => Ok(ContentKind::Link),
            "tweet" => Ok(ContentKind::Tweet),
            "youtube-video" => Ok(ContentKind::YoutubeVideo),
            "vimeo-video" => Ok(ContentKind::VimeoVideo),
            "flickr-photo" => Ok(ContentKind::FlickrPhoto),
            "instagram-photo" => Ok(ContentKind::InstagramPhoto),
            "soundcloud-track" => Ok(ContentKind::SoundcloudTrack),
            "rdio-track" => Ok(ContentKind::RdioTrack),
            "gist" => Ok(ContentKind::Gist),
            _ => anyhow::bail!("Unknown content kind: {}", s),
        }
    }
}

/// Tagged reference to exactly one concrete content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef {
    /// Which content table the id points into
    pub kind: ContentKind,

    /// Row id of the concrete item
    pub id: i64,
}

impl ContentRef {
    pub fn new(kind: ContentKind, id: i64) -> Self {
        Self { kind, id }
    }
}

impl std::fmt::Display for ContentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// A single entry in the unified timeline.
///
/// Never authored directly. Rows are created and refreshed by the save
/// protocol of the content item they point at, and removed when that item
/// is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Store-assigned identifier
    pub id: i64,

    /// The concrete item this record unifies
    pub content: ContentRef,

    /// Denormalized author, if any
    pub author: Option<String>,

    /// Denormalized title, for listing display
    pub title: String,

    /// Globally unique slug, used to build the public URL
    pub slug: String,

    /// Denormalized publication status
    pub status: Status,

    /// When the owning item was first saved
    pub date_added: DateTime<Utc>,

    /// Refreshed at every save of the owning item
    pub date_modified: DateTime<Utc>,

    /// Absent while the owning item is unpublished
    pub date_published: Option<DateTime<Utc>>,
}

impl Post {
    /// Public URL for this post
    pub fn absolute_url(&self) -> String {
        format!("/posts/{}/", self.slug)
    }

    /// Slug-cased name of the owning content type
    pub fn post_type_name(&self) -> &'static str {
        self.content.kind.as_str()
    }
}

impl std::fmt::Display for Post {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.title, self.content.kind)
    }
}
