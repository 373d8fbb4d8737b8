//! Text-based content types: articles, snippets, and code listings.

use serde::{Deserialize, Serialize};

use crate::domain::{ContentItem, ContentKind, PostFields};

/// A long-form article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub fields: PostFields,

    /// Full article body
    pub body: String,

    /// Optional lead-in shown in listings
    pub excerpt: Option<String>,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            fields: PostFields::new(title, slug),
            body: body.into(),
            excerpt: None,
        }
    }

    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }
}

impl ContentItem for Article {
    const KIND: ContentKind = ContentKind::Article;

    fn fields(&self) -> &PostFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut PostFields {
        &mut self.fields
    }
}

/// A short text post, no body structure beyond the text itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub fields: PostFields,
    pub body: String,
}

impl Snippet {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            fields: PostFields::new(title, slug),
            body: body.into(),
        }
    }
}

impl ContentItem for Snippet {
    const KIND: ContentKind = ContentKind::Snippet;

    fn fields(&self) -> &PostFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut PostFields {
        &mut self.fields
    }
}

/// One named piece of code within a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeFragment {
    /// Display name, typically the file name
    pub name: String,

    /// Language tag for highlighting
    pub language: String,

    pub body: String,
}

impl CodeFragment {
    pub fn new(
        name: impl Into<String>,
        language: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
            body: body.into(),
        }
    }
}

/// A code post holding an ordered set of named fragments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeListing {
    pub fields: PostFields,

    pub description: Option<String>,

    /// Fragments render in insertion order
    #[serde(default)]
    pub fragments: Vec<CodeFragment>,
}

impl CodeListing {
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            fields: PostFields::new(title, slug),
            description: None,
            fragments: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_fragment(mut self, fragment: CodeFragment) -> Self {
        self.fragments.push(fragment);
        self
    }
}

impl ContentItem for CodeListing {
    const KIND: ContentKind = ContentKind::CodeListing;

    fn fields(&self) -> &PostFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut PostFields {
        &mut self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Status;

    #[test]
    fn test_article_starts_as_draft() {
        let article = Article::new("Hello", "hello", "Body text").with_excerpt("Lead-in");
        assert_eq!(article.fields.status, Status::Draft);
        assert_eq!(article.excerpt.as_deref(), Some("Lead-in"));
        assert_eq!(article.post_template(), "tumblelog/post/article.html");
    }

    #[test]
    fn test_code_listing_keeps_fragment_order() {
        let listing = CodeListing::new("Sorting", "sorting")
            .with_fragment(CodeFragment::new("lib.rs", "rust", "fn a() {}"))
            .with_fragment(CodeFragment::new("main.rs", "rust", "fn b() {}"));

        let names: Vec<_> = listing.fragments.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["lib.rs", "main.rs"]);
    }

    #[test]
    fn test_snippet_roundtrips_through_json() {
        let snippet = Snippet::new("Note", "note", "a short thought");
        let json = serde_json::to_string(&snippet).unwrap();
        let parsed: Snippet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.body, "a short thought");
        assert_eq!(parsed.fields.slug, "note");
    }
}
