//! SQLite persistence for the timeline.
//!
//! Two tables: `posts` holds the relational identity records with the
//! unique-slug constraint, `content_items` holds each concrete item as a
//! JSON document tagged with its kind. A save touches both inside one
//! transaction so the pair can never drift apart.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use thiserror::Error;
use tracing::debug;

use crate::domain::{ContentItem, ContentKind, ContentRef, Post, PostFields, Status};

/// Errors raised by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another item already owns this slug; user-correctable
    #[error("a post with slug '{slug}' already exists")]
    DuplicateSlug { slug: String },

    /// The item row was written but its identity record was not; the
    /// enclosing transaction is rolled back
    #[error("content item saved but identity record sync failed: {source}")]
    IdentitySync {
        #[source]
        source: rusqlite::Error,
    },

    #[error("no {kind} content item with id {id}")]
    NotFound { kind: ContentKind, id: i64 },

    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("content document error: {0}")]
    Codec(#[from] serde_json::Error),
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS posts (
    id             INTEGER PRIMARY KEY,
    kind           TEXT NOT NULL,
    content_id     INTEGER NOT NULL,
    author         TEXT,
    title          TEXT NOT NULL,
    slug           TEXT NOT NULL UNIQUE,
    status         TEXT NOT NULL,
    date_added     TEXT NOT NULL,
    date_modified  TEXT NOT NULL,
    date_published TEXT,
    UNIQUE (kind, content_id)
);

CREATE TABLE IF NOT EXISTS content_items (
    id   INTEGER PRIMARY KEY,
    kind TEXT NOT NULL,
    body TEXT NOT NULL
);
";

/// SQLite-backed store for identity records and content documents.
pub struct TimelineStore {
    conn: Connection,
}

impl TimelineStore {
    /// Open (or create) the database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Look up the identity record owning a slug
    pub fn find_post_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        find_post_by_slug(&self.conn, slug).map_err(Into::into)
    }

    /// Look up the identity record for a (kind, content id) pair
    pub fn find_post_by_ref(
        &self,
        kind: ContentKind,
        content_id: i64,
    ) -> Result<Option<Post>, StoreError> {
        find_post_by_ref(&self.conn, kind, content_id).map_err(Into::into)
    }

    /// Idempotent upsert of the identity record for one content item.
    ///
    /// Creates the record if the (kind, content id) pair has none,
    /// otherwise overwrites its denormalized fields. Never duplicates.
    pub fn get_or_create_post(
        &mut self,
        kind: ContentKind,
        content_id: i64,
        fields: &PostFields,
    ) -> Result<Post, StoreError> {
        let tx = self.conn.transaction()?;
        let post = upsert_post(&tx, kind, content_id, fields)?;
        tx.commit()?;
        Ok(post)
    }

    /// Persist a content item and sync its identity record atomically.
    ///
    /// Assigns the item's store id on first save. The slug check, the
    /// document write, and the identity upsert share one transaction;
    /// any failure rolls all three back.
    pub fn save_item<T: ContentItem>(&mut self, item: &mut T) -> Result<Post, StoreError> {
        let tx = self.conn.transaction()?;

        if let Some(existing) = find_post_by_slug(&tx, &item.fields().slug)? {
            let is_own = item
                .fields()
                .id
                .map(|id| existing.content == ContentRef::new(T::KIND, id))
                .unwrap_or(false);
            if !is_own {
                return Err(StoreError::DuplicateSlug {
                    slug: item.fields().slug.clone(),
                });
            }
        }

        let body = serde_json::to_string(item)?;
        let content_id = match item.fields().id {
            Some(id) => {
                let updated = tx.execute(
                    "UPDATE content_items SET body = ?1 WHERE id = ?2 AND kind = ?3",
                    params![body, id, T::KIND.as_str()],
                )?;
                if updated == 0 {
                    return Err(StoreError::NotFound { kind: T::KIND, id });
                }
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO content_items (kind, body) VALUES (?1, ?2)",
                    params![T::KIND.as_str(), body],
                )?;
                tx.last_insert_rowid()
            }
        };
        item.fields_mut().id = Some(content_id);

        let post = upsert_post(&tx, T::KIND, content_id, item.fields())
            .map_err(|source| StoreError::IdentitySync { source })?;

        tx.commit()?;
        debug!(kind = %T::KIND, content_id, slug = %post.slug, "Saved content item");
        Ok(post)
    }

    /// Load a content item document by id
    pub fn get_content<T: ContentItem>(&self, id: i64) -> Result<Option<T>, StoreError> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM content_items WHERE id = ?1 AND kind = ?2",
                params![id, T::KIND.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match body {
            Some(body) => {
                let mut item: T = serde_json::from_str(&body)?;
                // The row id is authoritative
                item.fields_mut().id = Some(id);
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }

    /// Delete a content item and cascade to its identity record.
    ///
    /// Returns whether an item row was actually removed.
    pub fn delete(&mut self, kind: ContentKind, content_id: i64) -> Result<bool, StoreError> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM content_items WHERE id = ?1 AND kind = ?2",
            params![content_id, kind.as_str()],
        )?;
        tx.execute(
            "DELETE FROM posts WHERE kind = ?1 AND content_id = ?2",
            params![kind.as_str(), content_id],
        )?;
        tx.commit()?;
        Ok(removed > 0)
    }

    /// Identity records ordered newest-first by publish date.
    ///
    /// Unpublished records sort after published ones.
    pub fn timeline(
        &self,
        status: Option<Status>,
        limit: Option<usize>,
    ) -> Result<Vec<Post>, StoreError> {
        let mut sql = String::from(
            "SELECT id, kind, content_id, author, title, slug, status, \
             date_added, date_modified, date_published FROM posts",
        );
        if status.is_some() {
            sql.push_str(" WHERE status = ?1");
        }
        sql.push_str(" ORDER BY date_published IS NULL, date_published DESC, id DESC");
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = match status {
            Some(status) => stmt.query_map(params![status.code().to_string()], post_from_row)?,
            None => stmt.query_map([], post_from_row)?,
        };

        let mut posts = Vec::new();
        for row in rows {
            posts.push(row?);
        }
        Ok(posts)
    }

    /// Number of identity records in the store
    pub fn count_posts(&self) -> Result<i64, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        Ok(count)
    }
}

const POST_COLUMNS: &str = "id, kind, content_id, author, title, slug, status, \
                            date_added, date_modified, date_published";

fn find_post_by_slug(conn: &Connection, slug: &str) -> rusqlite::Result<Option<Post>> {
    conn.query_row(
        &format!("SELECT {} FROM posts WHERE slug = ?1", POST_COLUMNS),
        params![slug],
        post_from_row,
    )
    .optional()
}

fn find_post_by_ref(
    conn: &Connection,
    kind: ContentKind,
    content_id: i64,
) -> rusqlite::Result<Option<Post>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM posts WHERE kind = ?1 AND content_id = ?2",
            POST_COLUMNS
        ),
        params![kind.as_str(), content_id],
        post_from_row,
    )
    .optional()
}

/// Create or update the identity record for one (kind, content id) pair.
fn upsert_post(
    tx: &Transaction<'_>,
    kind: ContentKind,
    content_id: i64,
    fields: &PostFields,
) -> rusqlite::Result<Post> {
    let status = fields.status.code().to_string();
    let date_added = format_timestamp(&fields.date_added);
    let date_modified = format_timestamp(&fields.date_modified);
    let date_published = fields.date_published.as_ref().map(format_timestamp);

    let updated = tx.execute(
        "UPDATE posts SET author = ?1, title = ?2, slug = ?3, status = ?4, \
         date_added = ?5, date_modified = ?6, date_published = ?7 \
         WHERE kind = ?8 AND content_id = ?9",
        params![
            fields.author,
            fields.title,
            fields.slug,
            status,
            date_added,
            date_modified,
            date_published,
            kind.as_str(),
            content_id,
        ],
    )?;

    if updated == 0 {
        tx.execute(
            "INSERT INTO posts (kind, content_id, author, title, slug, status, \
             date_added, date_modified, date_published) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                kind.as_str(),
                content_id,
                fields.author,
                fields.title,
                fields.slug,
                status,
                date_added,
                date_modified,
                date_published,
            ],
        )?;
    }

    find_post_by_ref(tx, kind, content_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

fn post_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
    let kind_str: String = row.get(1)?;
    let kind: ContentKind = kind_str
        .parse()
        .map_err(|_| bad_column(1, format!("unknown content kind '{}'", kind_str)))?;

    let status_str: String = row.get(6)?;
    let status = status_str
        .chars()
        .next()
        .and_then(Status::from_code)
        .ok_or_else(|| bad_column(6, format!("unknown status code '{}'", status_str)))?;

    let date_added: String = row.get(7)?;
    let date_modified: String = row.get(8)?;
    let date_published: Option<String> = row.get(9)?;

    Ok(Post {
        id: row.get(0)?,
        content: ContentRef::new(kind, row.get(2)?),
        author: row.get(3)?,
        title: row.get(4)?,
        slug: row.get(5)?,
        status,
        date_added: parse_timestamp(7, &date_added)?,
        date_modified: parse_timestamp(8, &date_modified)?,
        date_published: match date_published {
            Some(value) => Some(parse_timestamp(9, &value)?),
            None => None,
        },
    })
}

/// Timestamps persist as fixed-width RFC 3339 so lexicographic order is
/// chronological order.
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(index: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                index,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

fn bad_column(index: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, message.into())
}
