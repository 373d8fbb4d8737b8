//! Timeline orchestration.
//!
//! Ties the pieces together: field validation and slug uniqueness before
//! a save, the atomic item-plus-identity write, and the refresh cycle
//! for embed-backed items. One logical request drives one call; a stale
//! embed pays its provider refresh inline.

use std::path::Path;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument};

use crate::domain::{ContentItem, ContentKind, FieldError, Post, Status};
use crate::oembed::{self, providers, FetchPolicy, OembedClient, OembedError, OembedItem};
use crate::store::{StoreError, TimelineStore};

/// Everything that can go wrong while operating the timeline.
#[derive(Debug, Error)]
pub enum TimelineError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Oembed(#[from] OembedError),
}

impl TimelineError {
    /// Whether this is the user-correctable duplicate-slug case
    pub fn is_duplicate_slug(&self) -> bool {
        matches!(self, TimelineError::Store(StoreError::DuplicateSlug { .. }))
    }
}

/// The main entry point for authoring and reading posts.
pub struct Timeline {
    store: TimelineStore,
    client: OembedClient,
    fetch_policy: FetchPolicy,
}

impl Timeline {
    /// Open a timeline backed by the database at `path`.
    ///
    /// Validates the provider registry first so a broken mapping table
    /// fails here rather than mid-refresh.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TimelineError> {
        providers::validate()?;
        Ok(Self {
            store: TimelineStore::open(path)?,
            client: OembedClient::new(),
            fetch_policy: FetchPolicy::default(),
        })
    }

    /// Open a timeline on a private in-memory database
    pub fn open_in_memory() -> Result<Self, TimelineError> {
        providers::validate()?;
        Ok(Self {
            store: TimelineStore::open_in_memory()?,
            client: OembedClient::new(),
            fetch_policy: FetchPolicy::default(),
        })
    }

    /// Replace the oEmbed client (dimension caps and the like)
    pub fn with_client(mut self, client: OembedClient) -> Self {
        self.client = client;
        self
    }

    /// Opt into propagating provider transport failures
    pub fn with_fetch_policy(mut self, policy: FetchPolicy) -> Self {
        self.fetch_policy = policy;
        self
    }

    /// Run the checks a save would run, without persisting anything.
    ///
    /// Field-level validation first, then the slug lookup: a hit that is
    /// not this item's own identity record fails. An item that has never
    /// been saved tolerates the miss.
    pub fn validate<T: ContentItem>(&self, item: &T) -> Result<(), TimelineError> {
        item.fields().validate()?;

        if let Some(existing) = self.store.find_post_by_slug(&item.fields().slug)? {
            let is_own = item
                .fields()
                .id
                .map(|id| existing.content.kind == T::KIND && existing.content.id == id)
                .unwrap_or(false);
            if !is_own {
                return Err(StoreError::DuplicateSlug {
                    slug: item.fields().slug.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Persist a content item and sync its identity record.
    ///
    /// Refreshes `date_modified`, then hands the store one transaction
    /// covering the slug check, the document write, and the identity
    /// upsert.
    #[instrument(skip_all, fields(kind = %T::KIND, slug = %item.fields().slug))]
    pub fn save<T: ContentItem>(&mut self, item: &mut T) -> Result<Post, TimelineError> {
        item.fields().validate()?;
        item.fields_mut().date_modified = Utc::now();

        let post = self.store.save_item(item)?;
        info!(post_id = post.id, "Saved post");
        Ok(post)
    }

    /// Persist an embed item, forcing a provider refresh first.
    ///
    /// The forced refresh means a newly-created item is populated from
    /// its provider at least once before it is ever written.
    #[instrument(skip_all, fields(kind = %T::KIND, slug = %item.fields().slug))]
    pub async fn save_embed<T: OembedItem>(&mut self, item: &mut T) -> Result<Post, TimelineError> {
        oembed::refresh(&self.client, item, self.fetch_policy).await?;
        self.save(item)
    }

    /// Load a plain content item by id
    pub fn get<T: ContentItem>(&self, id: i64) -> Result<Option<T>, TimelineError> {
        self.store.get_content(id).map_err(Into::into)
    }

    /// Load an embed item by id, refreshing inline if its cache expired.
    ///
    /// The refreshed metadata lives on the returned instance; it is
    /// persisted at the item's next save.
    pub async fn get_embed<T: OembedItem>(&mut self, id: i64) -> Result<Option<T>, TimelineError> {
        let Some(mut item) = self.store.get_content::<T>(id)? else {
            return Ok(None);
        };

        if item.embed().is_stale(Utc::now()) {
            oembed::refresh(&self.client, &mut item, self.fetch_policy).await?;
        }
        Ok(Some(item))
    }

    /// Force a provider refresh regardless of freshness
    pub async fn refresh_embed<T: OembedItem>(
        &mut self,
        item: &mut T,
    ) -> Result<(), TimelineError> {
        oembed::refresh(&self.client, item, self.fetch_policy).await?;
        Ok(())
    }

    /// Delete a content item, cascading to its identity record
    pub fn delete(&mut self, kind: ContentKind, content_id: i64) -> Result<bool, TimelineError> {
        let removed = self.store.delete(kind, content_id)?;
        if removed {
            info!(%kind, content_id, "Deleted post");
        }
        Ok(removed)
    }

    /// The unified listing, newest-first by publish date
    pub fn timeline(
        &self,
        status: Option<Status>,
        limit: Option<usize>,
    ) -> Result<Vec<Post>, TimelineError> {
        self.store.timeline(status, limit).map_err(Into::into)
    }

    /// Look up an identity record by slug
    pub fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, TimelineError> {
        self.store.find_post_by_slug(slug).map_err(Into::into)
    }

    /// Look up the identity record for a saved content item
    pub fn post_for<T: ContentItem>(&self, item: &T) -> Result<Option<Post>, TimelineError> {
        match item.fields().id {
            Some(id) => self.store.find_post_by_ref(T::KIND, id).map_err(Into::into),
            None => Ok(None),
        }
    }

    /// Public URL of a saved content item, read through its identity record
    pub fn absolute_url<T: ContentItem>(&self, item: &T) -> Result<Option<String>, TimelineError> {
        Ok(self.post_for(item)?.map(|post| post.absolute_url()))
    }
}
