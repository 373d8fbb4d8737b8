//! Registry of oEmbed providers backing the embed content types.
//!
//! Pure declarative data: endpoint, the resource scheme it serves, and
//! the variant's mapping table plus known local fields. Each table
//! starts from the base metadata entries and extends them with family
//! fields (dimensions, image location, embed markup) and whatever else
//! the provider reliably returns (resource title, author attribution,
//! thumbnails). `validate` runs at startup so a mapping that names a
//! field the variant does not carry fails before any request is made.

use super::mapping::{FieldMapping, BASE_FIELDS, BASE_MAP};
use super::{OembedEndpoint, OembedError};
use crate::domain::ContentKind;

/// Declarative description of one embed variant's provider.
#[derive(Debug, Clone, Copy)]
pub struct Provider {
    pub kind: ContentKind,
    pub endpoint_url: &'static str,
    pub scheme: &'static str,
    pub map: &'static [FieldMapping],
    pub local_fields: &'static [&'static str],
}

impl Provider {
    pub fn endpoint(&self) -> OembedEndpoint {
        OembedEndpoint::new(self.endpoint_url, self.scheme)
    }
}

// Tweets render from their URL, so only the base metadata is mapped.
pub const TWEET: Provider = Provider {
    kind: ContentKind::Tweet,
    endpoint_url: "https://publish.twitter.com/oembed",
    scheme: "https://twitter.com/*/status/*",
    map: BASE_MAP,
    local_fields: BASE_FIELDS,
};

const YOUTUBE_MAP: &[FieldMapping] = &[
    FieldMapping::Same("version"),
    FieldMapping::Same("provider_name"),
    FieldMapping::Same("provider_url"),
    FieldMapping::Same("width"),
    FieldMapping::Same("height"),
    FieldMapping::Renamed {
        remote: "html",
        local: "embed",
    },
    FieldMapping::Same("title"),
    FieldMapping::Same("author_name"),
    FieldMapping::Same("author_url"),
    FieldMapping::Same("thumbnail_url"),
    FieldMapping::Same("thumbnail_width"),
    FieldMapping::Same("thumbnail_height"),
];

const YOUTUBE_FIELDS: &[&str] = &[
    "version",
    "provider_name",
    "provider_url",
    "width",
    "height",
    "embed",
    "title",
    "author_name",
    "author_url",
    "thumbnail_url",
    "thumbnail_width",
    "thumbnail_height",
];

pub const YOUTUBE_VIDEO: Provider = Provider {
    kind: ContentKind::YoutubeVideo,
    endpoint_url: "https://www.youtube.com/oembed",
    scheme: "https://www.youtube.com/watch*",
    map: YOUTUBE_MAP,
    local_fields: YOUTUBE_FIELDS,
};

const VIMEO_MAP: &[FieldMapping] = &[
    FieldMapping::Same("version"),
    FieldMapping::Same("provider_name"),
    FieldMapping::Same("provider_url"),
    FieldMapping::Same("width"),
    FieldMapping::Same("height"),
    FieldMapping::Renamed {
        remote: "html",
        local: "embed",
    },
    FieldMapping::Same("title"),
    FieldMapping::Same("author_name"),
    FieldMapping::Same("author_url"),
    FieldMapping::Same("thumbnail_url"),
    FieldMapping::Same("thumbnail_width"),
    FieldMapping::Same("thumbnail_height"),
    FieldMapping::Same("duration"),
    FieldMapping::Same("video_id"),
];

const VIMEO_FIELDS: &[&str] = &[
    "version",
    "provider_name",
    "provider_url",
    "width",
    "height",
    "embed",
    "title",
    "author_name",
    "author_url",
    "thumbnail_url",
    "thumbnail_width",
    "thumbnail_height",
    "duration",
    "video_id",
];

pub const VIMEO_VIDEO: Provider = Provider {
    kind: ContentKind::VimeoVideo,
    endpoint_url: "https://vimeo.com/api/oembed.json",
    scheme: "https://vimeo.com/*",
    map: VIMEO_MAP,
    local_fields: VIMEO_FIELDS,
};

const FLICKR_MAP: &[FieldMapping] = &[
    FieldMapping::Same("version"),
    FieldMapping::Same("provider_name"),
    FieldMapping::Same("provider_url"),
    FieldMapping::Same("width"),
    FieldMapping::Same("height"),
    FieldMapping::Renamed {
        remote: "url",
        local: "image_url",
    },
    FieldMapping::Same("title"),
    FieldMapping::Same("author_name"),
    FieldMapping::Same("author_url"),
];

const FLICKR_FIELDS: &[&str] = &[
    "version",
    "provider_name",
    "provider_url",
    "width",
    "height",
    "image_url",
    "title",
    "author_name",
    "author_url",
];

pub const FLICKR_PHOTO: Provider = Provider {
    kind: ContentKind::FlickrPhoto,
    endpoint_url: "https://www.flickr.com/services/oembed/",
    scheme: "https://www.flickr.com/photos/*",
    map: FLICKR_MAP,
    local_fields: FLICKR_FIELDS,
};

// Instagram does not return a profile URL, so no author_url entry.
const INSTAGRAM_MAP: &[FieldMapping] = &[
    FieldMapping::Same("version"),
    FieldMapping::Same("provider_name"),
    FieldMapping::Same("provider_url"),
    FieldMapping::Same("width"),
    FieldMapping::Same("height"),
    FieldMapping::Renamed {
        remote: "url",
        local: "image_url",
    },
    FieldMapping::Same("title"),
    FieldMapping::Same("author_name"),
];

const INSTAGRAM_FIELDS: &[&str] = &[
    "version",
    "provider_name",
    "provider_url",
    "width",
    "height",
    "image_url",
    "title",
    "author_name",
];

pub const INSTAGRAM_PHOTO: Provider = Provider {
    kind: ContentKind::InstagramPhoto,
    endpoint_url: "https://api.instagram.com/oembed",
    scheme: "https://instagram.com/p/*",
    map: INSTAGRAM_MAP,
    local_fields: INSTAGRAM_FIELDS,
};

const SOUNDCLOUD_MAP: &[FieldMapping] = &[
    FieldMapping::Same("version"),
    FieldMapping::Same("provider_name"),
    FieldMapping::Same("provider_url"),
    FieldMapping::Same("width"),
    FieldMapping::Same("height"),
    FieldMapping::Renamed {
        remote: "html",
        local: "embed",
    },
    FieldMapping::Same("title"),
    FieldMapping::Same("author_name"),
    FieldMapping::Same("author_url"),
    FieldMapping::Renamed {
        remote: "description",
        local: "track_description",
    },
];

const SOUNDCLOUD_FIELDS: &[&str] = &[
    "version",
    "provider_name",
    "provider_url",
    "width",
    "height",
    "embed",
    "title",
    "author_name",
    "author_url",
    "track_description",
];

pub const SOUNDCLOUD_TRACK: Provider = Provider {
    kind: ContentKind::SoundcloudTrack,
    endpoint_url: "https://soundcloud.com/oembed",
    scheme: "https://soundcloud.com/*",
    map: SOUNDCLOUD_MAP,
    local_fields: SOUNDCLOUD_FIELDS,
};

const RDIO_MAP: &[FieldMapping] = &[
    FieldMapping::Same("version"),
    FieldMapping::Same("provider_name"),
    FieldMapping::Same("provider_url"),
    FieldMapping::Same("width"),
    FieldMapping::Same("height"),
    FieldMapping::Renamed {
        remote: "html",
        local: "embed",
    },
    FieldMapping::Same("title"),
    FieldMapping::Same("thumbnail_url"),
    FieldMapping::Same("thumbnail_width"),
    FieldMapping::Same("thumbnail_height"),
];

const RDIO_FIELDS: &[&str] = &[
    "version",
    "provider_name",
    "provider_url",
    "width",
    "height",
    "embed",
    "title",
    "thumbnail_url",
    "thumbnail_width",
    "thumbnail_height",
];

pub const RDIO_TRACK: Provider = Provider {
    kind: ContentKind::RdioTrack,
    endpoint_url: "https://www.rdio.com/api/oembed/",
    scheme: "https://www.rdio.com/*",
    map: RDIO_MAP,
    local_fields: RDIO_FIELDS,
};

const GIST_MAP: &[FieldMapping] = &[
    FieldMapping::Same("version"),
    FieldMapping::Same("provider_name"),
    FieldMapping::Same("provider_url"),
    FieldMapping::Same("width"),
    FieldMapping::Same("height"),
    FieldMapping::Renamed {
        remote: "html",
        local: "embed",
    },
    FieldMapping::Same("title"),
    FieldMapping::Same("author_name"),
    FieldMapping::Same("author_url"),
];

const GIST_FIELDS: &[&str] = &[
    "version",
    "provider_name",
    "provider_url",
    "width",
    "height",
    "embed",
    "title",
    "author_name",
    "author_url",
];

pub const GIST: Provider = Provider {
    kind: ContentKind::Gist,
    endpoint_url: "https://github.com/api/oembed",
    scheme: "https://gist.github.com/*",
    map: GIST_MAP,
    local_fields: GIST_FIELDS,
};

/// Every registered provider
pub const PROVIDERS: &[Provider] = &[
    TWEET,
    YOUTUBE_VIDEO,
    VIMEO_VIDEO,
    FLICKR_PHOTO,
    INSTAGRAM_PHOTO,
    SOUNDCLOUD_TRACK,
    RDIO_TRACK,
    GIST,
];

/// Look up the provider registered for a content kind
pub fn find(kind: ContentKind) -> Option<&'static Provider> {
    PROVIDERS.iter().find(|p| p.kind == kind)
}

/// Check every mapping table against its variant's local field set.
pub fn validate() -> Result<(), OembedError> {
    for provider in PROVIDERS {
        validate_provider(provider)?;
    }
    Ok(())
}

fn validate_provider(provider: &Provider) -> Result<(), OembedError> {
    for entry in provider.map {
        if !provider.local_fields.contains(&entry.local()) {
            return Err(OembedError::UnknownField {
                kind: provider.kind,
                field: entry.local(),
            });
        }
    }
    Ok(())
}
