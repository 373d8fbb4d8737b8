//! Concrete content types carried by the timeline.
//!
//! Plain types own all of their data locally; embed types additionally
//! mirror metadata from an oEmbed provider.

pub mod embeds;
pub mod media;
pub mod text;

pub use embeds::{
    FlickrPhoto, Gist, InstagramPhoto, RdioTrack, SoundcloudTrack, Tweet, VimeoVideo,
    YoutubeVideo,
};
pub use media::{FileUpload, Image, Link};
pub use text::{Article, CodeFragment, CodeListing, Snippet};
