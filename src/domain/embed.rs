//! Field blocks for content types backed by a remote metadata provider.
//!
//! Provider responses are cached on the item itself; `date_updated` plus
//! `cache_age` decide when the cached copy stops being trusted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default provider cache lifetime, in seconds (one day)
pub const DEFAULT_CACHE_AGE: i64 = 86_400;

/// The provider-supplied metadata every embed item caches locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedFields {
    /// Free-text caption shown with the embed
    pub caption: Option<String>,

    /// Protocol version reported by the provider
    pub version: Option<String>,

    pub provider_name: Option<String>,

    pub provider_url: Option<String>,

    /// Seconds the cached metadata stays trusted
    pub cache_age: i64,

    /// Last successful or attempted remote fetch; `None` before the first
    pub date_updated: Option<DateTime<Utc>>,
}

impl Default for EmbedFields {
    fn default() -> Self {
        Self {
            caption: None,
            version: None,
            provider_name: None,
            provider_url: None,
            cache_age: DEFAULT_CACHE_AGE,
            date_updated: None,
        }
    }
}

impl EmbedFields {
    /// Whether the cached metadata has outlived `cache_age`.
    ///
    /// An item that has never been fetched is not stale; the first fetch
    /// happens at save time.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.date_updated {
            Some(updated) => now > updated + Duration::seconds(self.cache_age),
            None => false,
        }
    }
}

/// Resource title and creator attribution, returned by most providers
/// alongside the media itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attribution {
    /// Provider-side title of the resource (distinct from the post title)
    pub title: Option<String>,

    pub author_name: Option<String>,

    pub author_url: Option<String>,
}

/// Preview image advertised by the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Fields a photo-family embed receives from its provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhotoEmbed {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub image_url: Option<String>,
}

/// Fields a video-family embed receives from its provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoEmbed {
    pub width: Option<u32>,
    pub height: Option<u32>,

    /// Provider-supplied embed markup
    pub embed: Option<String>,
}

/// Fields a rich-family embed receives from its provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RichEmbed {
    pub width: Option<u32>,
    pub height: Option<u32>,

    /// Provider-supplied embed URL
    pub embed: Option<String>,
}
