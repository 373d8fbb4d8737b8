//! Content types whose metadata is mirrored from an oEmbed provider.
//!
//! Each variant pins its provider through the registry in
//! `oembed::providers` and declares how response keys land on its
//! fields. The caption and cached provider metadata live in
//! `EmbedFields`; family-specific fields (dimensions, image location,
//! embed markup) and variant extras (attribution, thumbnails) sit
//! alongside.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    Attribution, ContentItem, ContentKind, EmbedFields, PhotoEmbed, PostFields, RichEmbed,
    Thumbnail, VideoEmbed,
};
use crate::oembed::mapping::{self, AssignError, FieldMapping};
use crate::oembed::{providers, OembedEndpoint, OembedItem};

fn default_tweet_language() -> String {
    "en".to_string()
}

fn default_tweet_maxwidth() -> u32 {
    325
}

fn default_show_comments() -> bool {
    true
}

/// A tweet mirrored from Twitter.
///
/// Link-like: only the base provider metadata is cached; the tweet is
/// rendered from its URL. The display knobs are passed to the endpoint
/// as request parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    pub fields: PostFields,
    pub embed: EmbedFields,

    /// URL of the tweet on twitter.com
    pub tweet_url: String,

    /// Strip photos and videos from the rendered tweet
    #[serde(default)]
    pub hide_media: bool,

    /// Hide the conversation the tweet replies to
    #[serde(default)]
    pub hide_thread: bool,

    /// Language the provider renders the tweet in
    #[serde(default = "default_tweet_language")]
    pub language: String,

    /// Maximum rendered width, in pixels
    #[serde(default = "default_tweet_maxwidth")]
    pub maxwidth: u32,
}

impl Tweet {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        tweet_url: impl Into<String>,
    ) -> Self {
        Self {
            fields: PostFields::new(title, slug),
            embed: EmbedFields::default(),
            tweet_url: tweet_url.into(),
            hide_media: false,
            hide_thread: false,
            language: default_tweet_language(),
            maxwidth: default_tweet_maxwidth(),
        }
    }
}

impl ContentItem for Tweet {
    const KIND: ContentKind = ContentKind::Tweet;

    fn fields(&self) -> &PostFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut PostFields {
        &mut self.fields
    }
}

impl OembedItem for Tweet {
    fn embed(&self) -> &EmbedFields {
        &self.embed
    }

    fn embed_mut(&mut self) -> &mut EmbedFields {
        &mut self.embed
    }

    fn endpoint(&self) -> OembedEndpoint {
        providers::TWEET.endpoint()
    }

    fn oembed_map() -> &'static [FieldMapping] {
        providers::TWEET.map
    }

    fn local_fields() -> &'static [&'static str] {
        providers::TWEET.local_fields
    }

    fn resource(&self) -> String {
        self.tweet_url.clone()
    }

    fn endpoint_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("maxwidth", self.maxwidth.to_string()),
            ("hide_media", self.hide_media.to_string()),
            ("hide_thread", self.hide_thread.to_string()),
            ("lang", self.language.clone()),
        ]
    }

    fn assign(&mut self, local: &str, value: &Value) -> Result<(), AssignError> {
        mapping::assign_embed_base(&mut self.embed, local, value)
    }
}

/// A YouTube video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoutubeVideo {
    pub fields: PostFields,
    pub embed: EmbedFields,
    pub video: VideoEmbed,

    #[serde(default)]
    pub attribution: Attribution,

    #[serde(default)]
    pub thumbnail: Thumbnail,

    /// Watch-page URL of the video
    pub video_url: String,
}

impl YoutubeVideo {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        video_url: impl Into<String>,
    ) -> Self {
        Self {
            fields: PostFields::new(title, slug),
            embed: EmbedFields::default(),
            video: VideoEmbed::default(),
            attribution: Attribution::default(),
            thumbnail: Thumbnail::default(),
            video_url: video_url.into(),
        }
    }
}

impl ContentItem for YoutubeVideo {
    const KIND: ContentKind = ContentKind::YoutubeVideo;

    fn fields(&self) -> &PostFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut PostFields {
        &mut self.fields
    }
}

impl OembedItem for YoutubeVideo {
    fn embed(&self) -> &EmbedFields {
        &self.embed
    }

    fn embed_mut(&mut self) -> &mut EmbedFields {
        &mut self.embed
    }

    fn endpoint(&self) -> OembedEndpoint {
        providers::YOUTUBE_VIDEO.endpoint()
    }

    fn oembed_map() -> &'static [FieldMapping] {
        providers::YOUTUBE_VIDEO.map
    }

    fn local_fields() -> &'static [&'static str] {
        providers::YOUTUBE_VIDEO.local_fields
    }

    fn resource(&self) -> String {
        self.video_url.clone()
    }

    fn assign(&mut self, local: &str, value: &Value) -> Result<(), AssignError> {
        let r = mapping::assign_embed_base(&mut self.embed, local, value);
        let r = mapping::or_unknown(r, || mapping::assign_video(&mut self.video, local, value));
        let r = mapping::or_unknown(r, || {
            mapping::assign_attribution(&mut self.attribution, local, value)
        });
        mapping::or_unknown(r, || {
            mapping::assign_thumbnail(&mut self.thumbnail, local, value)
        })
    }
}

/// A Vimeo video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VimeoVideo {
    pub fields: PostFields,
    pub embed: EmbedFields,
    pub video: VideoEmbed,

    #[serde(default)]
    pub attribution: Attribution,

    #[serde(default)]
    pub thumbnail: Thumbnail,

    /// Running time in seconds, as reported by the provider
    #[serde(default)]
    pub duration: Option<u32>,

    /// Provider-side id of the video
    #[serde(default)]
    pub video_id: Option<u64>,

    pub video_url: String,
}

impl VimeoVideo {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        video_url: impl Into<String>,
    ) -> Self {
        Self {
            fields: PostFields::new(title, slug),
            embed: EmbedFields::default(),
            video: VideoEmbed::default(),
            attribution: Attribution::default(),
            thumbnail: Thumbnail::default(),
            duration: None,
            video_id: None,
            video_url: video_url.into(),
        }
    }
}

impl ContentItem for VimeoVideo {
    const KIND: ContentKind = ContentKind::VimeoVideo;

    fn fields(&self) -> &PostFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut PostFields {
        &mut self.fields
    }
}

impl OembedItem for VimeoVideo {
    fn embed(&self) -> &EmbedFields {
        &self.embed
    }

    fn embed_mut(&mut self) -> &mut EmbedFields {
        &mut self.embed
    }

    fn endpoint(&self) -> OembedEndpoint {
        providers::VIMEO_VIDEO.endpoint()
    }

    fn oembed_map() -> &'static [FieldMapping] {
        providers::VIMEO_VIDEO.map
    }

    fn local_fields() -> &'static [&'static str] {
        providers::VIMEO_VIDEO.local_fields
    }

    fn resource(&self) -> String {
        self.video_url.clone()
    }

    fn assign(&mut self, local: &str, value: &Value) -> Result<(), AssignError> {
        match local {
            "duration" => {
                self.duration = Some(mapping::as_dimension(value).ok_or(AssignError::Malformed)?);
                Ok(())
            }
            "video_id" => {
                self.video_id = Some(mapping::as_id(value).ok_or(AssignError::Malformed)?);
                Ok(())
            }
            _ => {
                let r = mapping::assign_embed_base(&mut self.embed, local, value);
                let r =
                    mapping::or_unknown(r, || mapping::assign_video(&mut self.video, local, value));
                let r = mapping::or_unknown(r, || {
                    mapping::assign_attribution(&mut self.attribution, local, value)
                });
                mapping::or_unknown(r, || {
                    mapping::assign_thumbnail(&mut self.thumbnail, local, value)
                })
            }
        }
    }
}

/// A photo hosted on Flickr.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlickrPhoto {
    pub fields: PostFields,
    pub embed: EmbedFields,
    pub photo: PhotoEmbed,

    #[serde(default)]
    pub attribution: Attribution,

    pub photo_url: String,
}

impl FlickrPhoto {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        photo_url: impl Into<String>,
    ) -> Self {
        Self {
            fields: PostFields::new(title, slug),
            embed: EmbedFields::default(),
            photo: PhotoEmbed::default(),
            attribution: Attribution::default(),
            photo_url: photo_url.into(),
        }
    }
}

impl ContentItem for FlickrPhoto {
    const KIND: ContentKind = ContentKind::FlickrPhoto;

    fn fields(&self) -> &PostFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut PostFields {
        &mut self.fields
    }
}

impl OembedItem for FlickrPhoto {
    fn embed(&self) -> &EmbedFields {
        &self.embed
    }

    fn embed_mut(&mut self) -> &mut EmbedFields {
        &mut self.embed
    }

    fn endpoint(&self) -> OembedEndpoint {
        providers::FLICKR_PHOTO.endpoint()
    }

    fn oembed_map() -> &'static [FieldMapping] {
        providers::FLICKR_PHOTO.map
    }

    fn local_fields() -> &'static [&'static str] {
        providers::FLICKR_PHOTO.local_fields
    }

    fn resource(&self) -> String {
        self.photo_url.clone()
    }

    fn assign(&mut self, local: &str, value: &Value) -> Result<(), AssignError> {
        let r = mapping::assign_embed_base(&mut self.embed, local, value);
        let r = mapping::or_unknown(r, || mapping::assign_photo(&mut self.photo, local, value));
        mapping::or_unknown(r, || {
            mapping::assign_attribution(&mut self.attribution, local, value)
        })
    }
}

/// A photo hosted on Instagram.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramPhoto {
    pub fields: PostFields,
    pub embed: EmbedFields,
    pub photo: PhotoEmbed,

    /// Instagram returns no profile URL, so `author_url` stays empty
    #[serde(default)]
    pub attribution: Attribution,

    pub photo_url: String,
}

impl InstagramPhoto {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        photo_url: impl Into<String>,
    ) -> Self {
        Self {
            fields: PostFields::new(title, slug),
            embed: EmbedFields::default(),
            photo: PhotoEmbed::default(),
            attribution: Attribution::default(),
            photo_url: photo_url.into(),
        }
    }
}

impl ContentItem for InstagramPhoto {
    const KIND: ContentKind = ContentKind::InstagramPhoto;

    fn fields(&self) -> &PostFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut PostFields {
        &mut self.fields
    }
}

impl OembedItem for InstagramPhoto {
    fn embed(&self) -> &EmbedFields {
        &self.embed
    }

    fn embed_mut(&mut self) -> &mut EmbedFields {
        &mut self.embed
    }

    fn endpoint(&self) -> OembedEndpoint {
        providers::INSTAGRAM_PHOTO.endpoint()
    }

    fn oembed_map() -> &'static [FieldMapping] {
        providers::INSTAGRAM_PHOTO.map
    }

    fn local_fields() -> &'static [&'static str] {
        providers::INSTAGRAM_PHOTO.local_fields
    }

    fn resource(&self) -> String {
        self.photo_url.clone()
    }

    fn assign(&mut self, local: &str, value: &Value) -> Result<(), AssignError> {
        let r = mapping::assign_embed_base(&mut self.embed, local, value);
        let r = mapping::or_unknown(r, || mapping::assign_photo(&mut self.photo, local, value));
        mapping::or_unknown(r, || {
            mapping::assign_attribution(&mut self.attribution, local, value)
        })
    }
}

/// A SoundCloud track embed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundcloudTrack {
    pub fields: PostFields,
    pub embed: EmbedFields,
    pub rich: RichEmbed,

    #[serde(default)]
    pub attribution: Attribution,

    /// Track description as written on SoundCloud
    #[serde(default)]
    pub track_description: Option<String>,

    /// Start playback as soon as the player loads
    #[serde(default)]
    pub auto_play: bool,

    /// Show timed comments in the player
    #[serde(default = "default_show_comments")]
    pub show_comments: bool,

    /// Player accent color, as a hex triplet
    #[serde(default)]
    pub color: Option<String>,

    pub track_url: String,
}

impl SoundcloudTrack {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        track_url: impl Into<String>,
    ) -> Self {
        Self {
            fields: PostFields::new(title, slug),
            embed: EmbedFields::default(),
            rich: RichEmbed::default(),
            attribution: Attribution::default(),
            track_description: None,
            auto_play: false,
            show_comments: default_show_comments(),
            color: None,
            track_url: track_url.into(),
        }
    }
}

impl ContentItem for SoundcloudTrack {
    const KIND: ContentKind = ContentKind::SoundcloudTrack;

    fn fields(&self) -> &PostFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut PostFields {
        &mut self.fields
    }
}

impl OembedItem for SoundcloudTrack {
    fn embed(&self) -> &EmbedFields {
        &self.embed
    }

    fn embed_mut(&mut self) -> &mut EmbedFields {
        &mut self.embed
    }

    fn endpoint(&self) -> OembedEndpoint {
        providers::SOUNDCLOUD_TRACK.endpoint()
    }

    fn oembed_map() -> &'static [FieldMapping] {
        providers::SOUNDCLOUD_TRACK.map
    }

    fn local_fields() -> &'static [&'static str] {
        providers::SOUNDCLOUD_TRACK.local_fields
    }

    fn resource(&self) -> String {
        self.track_url.clone()
    }

    fn endpoint_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("auto_play", self.auto_play.to_string()),
            ("show_comments", self.show_comments.to_string()),
        ];
        if let Some(ref color) = self.color {
            params.push(("color", color.clone()));
        }
        params
    }

    fn assign(&mut self, local: &str, value: &Value) -> Result<(), AssignError> {
        match local {
            "track_description" => {
                self.track_description =
                    Some(mapping::as_text(value).ok_or(AssignError::Malformed)?);
                Ok(())
            }
            _ => {
                let r = mapping::assign_embed_base(&mut self.embed, local, value);
                let r =
                    mapping::or_unknown(r, || mapping::assign_rich(&mut self.rich, local, value));
                mapping::or_unknown(r, || {
                    mapping::assign_attribution(&mut self.attribution, local, value)
                })
            }
        }
    }
}

/// An Rdio track embed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RdioTrack {
    pub fields: PostFields,
    pub embed: EmbedFields,
    pub rich: RichEmbed,

    /// Only the track title is attributed; Rdio reports no author
    #[serde(default)]
    pub attribution: Attribution,

    #[serde(default)]
    pub thumbnail: Thumbnail,

    pub track_url: String,
}

impl RdioTrack {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        track_url: impl Into<String>,
    ) -> Self {
        Self {
            fields: PostFields::new(title, slug),
            embed: EmbedFields::default(),
            rich: RichEmbed::default(),
            attribution: Attribution::default(),
            thumbnail: Thumbnail::default(),
            track_url: track_url.into(),
        }
    }
}

impl ContentItem for RdioTrack {
    const KIND: ContentKind = ContentKind::RdioTrack;

    fn fields(&self) -> &PostFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut PostFields {
        &mut self.fields
    }
}

impl OembedItem for RdioTrack {
    fn embed(&self) -> &EmbedFields {
        &self.embed
    }

    fn embed_mut(&mut self) -> &mut EmbedFields {
        &mut self.embed
    }

    fn endpoint(&self) -> OembedEndpoint {
        providers::RDIO_TRACK.endpoint()
    }

    fn oembed_map() -> &'static [FieldMapping] {
        providers::RDIO_TRACK.map
    }

    fn local_fields() -> &'static [&'static str] {
        providers::RDIO_TRACK.local_fields
    }

    fn resource(&self) -> String {
        self.track_url.clone()
    }

    fn assign(&mut self, local: &str, value: &Value) -> Result<(), AssignError> {
        let r = mapping::assign_embed_base(&mut self.embed, local, value);
        let r = mapping::or_unknown(r, || mapping::assign_rich(&mut self.rich, local, value));
        let r = mapping::or_unknown(r, || {
            mapping::assign_attribution(&mut self.attribution, local, value)
        });
        mapping::or_unknown(r, || {
            mapping::assign_thumbnail(&mut self.thumbnail, local, value)
        })
    }
}

/// A GitHub gist embed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gist {
    pub fields: PostFields,
    pub embed: EmbedFields,
    pub rich: RichEmbed,

    #[serde(default)]
    pub attribution: Attribution,

    pub gist_url: String,
}

impl Gist {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        gist_url: impl Into<String>,
    ) -> Self {
        Self {
            fields: PostFields::new(title, slug),
            embed: EmbedFields::default(),
            rich: RichEmbed::default(),
            attribution: Attribution::default(),
            gist_url: gist_url.into(),
        }
    }
}

impl ContentItem for Gist {
    const KIND: ContentKind = ContentKind::Gist;

    fn fields(&self) -> &PostFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut PostFields {
        &mut self.fields
    }
}

impl OembedItem for Gist {
    fn embed(&self) -> &EmbedFields {
        &self.embed
    }

    fn embed_mut(&mut self) -> &mut EmbedFields {
        &mut self.embed
    }

    fn endpoint(&self) -> OembedEndpoint {
        providers::GIST.endpoint()
    }

    fn oembed_map() -> &'static [FieldMapping] {
        providers::GIST.map
    }

    fn local_fields() -> &'static [&'static str] {
        providers::GIST.local_fields
    }

    fn resource(&self) -> String {
        self.gist_url.clone()
    }

    fn assign(&mut self, local: &str, value: &Value) -> Result<(), AssignError> {
        let r = mapping::assign_embed_base(&mut self.embed, local, value);
        let r = mapping::or_unknown(r, || mapping::assign_rich(&mut self.rich, local, value));
        mapping::or_unknown(r, || {
            mapping::assign_attribution(&mut self.attribution, local, value)
        })
    }
}
