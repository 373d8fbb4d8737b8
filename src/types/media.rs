//! Locally-hosted media and link content types.

use serde::{Deserialize, Serialize};

use crate::domain::{ContentItem, ContentKind, PostFields};

/// A standalone image served from local storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub fields: PostFields,

    /// Storage path or URL of the image file
    pub image_path: String,

    pub caption: Option<String>,
}

impl Image {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        image_path: impl Into<String>,
    ) -> Self {
        Self {
            fields: PostFields::new(title, slug),
            image_path: image_path.into(),
            caption: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

impl ContentItem for Image {
    const KIND: ContentKind = ContentKind::Image;

    fn fields(&self) -> &PostFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut PostFields {
        &mut self.fields
    }
}

/// An uploaded file offered for download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileUpload {
    pub fields: PostFields,

    /// Storage path of the uploaded file
    pub file_path: String,

    pub description: Option<String>,
}

impl FileUpload {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            fields: PostFields::new(title, slug),
            file_path: file_path.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl ContentItem for FileUpload {
    const KIND: ContentKind = ContentKind::FileUpload;

    fn fields(&self) -> &PostFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut PostFields {
        &mut self.fields
    }
}

/// A plain hyperlink post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub fields: PostFields,

    pub url: String,

    pub description: Option<String>,
}

impl Link {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            fields: PostFields::new(title, slug),
            url: url.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl ContentItem for Link {
    const KIND: ContentKind = ContentKind::Link;

    fn fields(&self) -> &PostFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut PostFields {
        &mut self.fields
    }
}
