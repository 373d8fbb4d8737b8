//! Timeline integration tests
//!
//! End-to-end coverage of the save/validate protocol: identity record
//! creation, slug uniqueness, idempotent upserts, ordering, and cascade
//! deletes.

use chrono::{Duration, Utc};
use tempfile::TempDir;

use tumblelog::domain::PostFields;
use tumblelog::{
    Article, ContentKind, Image, Link, Snippet, Status, Timeline, TimelineStore,
};

#[test]
fn test_first_save_creates_exactly_one_identity_record() {
    let mut timeline = Timeline::open_in_memory().unwrap();

    let mut article =
        Article::new("Hello", "hello", "Body text").with_excerpt("A short lead-in");
    let post = timeline.save(&mut article).unwrap();

    // Exactly one record, draft by default, referencing this article
    let all = timeline.timeline(None, None).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, post.id);
    assert_eq!(all[0].slug, "hello");
    assert_eq!(all[0].status, Status::Draft);
    assert_eq!(all[0].content.kind, ContentKind::Article);
    assert_eq!(Some(all[0].content.id), article.fields.id);
}

#[test]
fn test_second_item_with_same_slug_fails_and_adds_nothing() {
    let mut timeline = Timeline::open_in_memory().unwrap();

    let mut first = Article::new("Hello", "hello", "Body text");
    timeline.save(&mut first).unwrap();

    let mut second = Article::new("Hello again", "hello", "Other body");
    let err = timeline.save(&mut second).unwrap_err();

    assert!(err.is_duplicate_slug());
    assert!(second.fields.id.is_none());
    assert_eq!(timeline.timeline(None, None).unwrap().len(), 1);
}

#[test]
fn test_slug_conflict_spans_content_types() {
    let mut timeline = Timeline::open_in_memory().unwrap();

    let mut article = Article::new("Hello", "hello", "Body text");
    timeline.save(&mut article).unwrap();

    // A different type cannot claim the slug either
    let mut link = Link::new("Hello link", "hello", "https://example.com/");
    assert!(timeline.save(&mut link).unwrap_err().is_duplicate_slug());

    let mut snippet = Snippet::new("Hello snippet", "hello", "text");
    assert!(timeline.validate(&snippet).is_err());
    assert!(timeline.save(&mut snippet).unwrap_err().is_duplicate_slug());
}

#[test]
fn test_resave_is_an_update_not_a_duplicate() {
    let mut timeline = Timeline::open_in_memory().unwrap();

    let mut article = Article::new("Hello", "hello", "Body text");
    let first = timeline.save(&mut article).unwrap();

    article.fields.title = "Hello, edited".to_string();
    article.body = "Edited body".to_string();
    let second = timeline.save(&mut article).unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.title, "Hello, edited");
    assert_eq!(timeline.timeline(None, None).unwrap().len(), 1);

    let reloaded: Article = timeline.get(article.fields.id.unwrap()).unwrap().unwrap();
    assert_eq!(reloaded.body, "Edited body");
}

#[test]
fn test_identity_upsert_is_idempotent() {
    let mut store = TimelineStore::open_in_memory().unwrap();
    let mut fields = PostFields::new("Hello", "hello");

    let first = store
        .get_or_create_post(ContentKind::Article, 42, &fields)
        .unwrap();

    // Second call with changed denormalized fields: same record, new values
    fields.title = "Hello, revised".to_string();
    fields.publish(Utc::now());
    let second = store
        .get_or_create_post(ContentKind::Article, 42, &fields)
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.title, "Hello, revised");
    assert_eq!(second.status, Status::Published);
    assert_eq!(store.count_posts().unwrap(), 1);
}

#[test]
fn test_timeline_orders_by_publish_date_descending() {
    let mut timeline = Timeline::open_in_memory().unwrap();
    let now = Utc::now();

    let mut oldest = Article::new("Oldest", "oldest", "Body");
    oldest.fields.publish(now - Duration::days(3));
    timeline.save(&mut oldest).unwrap();

    let mut newest = Image::new("Newest", "newest", "uploads/new.jpg");
    newest.fields.publish(now);
    timeline.save(&mut newest).unwrap();

    let mut middle = Link::new("Middle", "middle", "https://example.com/");
    middle.fields.publish(now - Duration::days(1));
    timeline.save(&mut middle).unwrap();

    let mut draft = Snippet::new("Draft", "draft", "unpublished");
    timeline.save(&mut draft).unwrap();

    let slugs: Vec<String> = timeline
        .timeline(None, None)
        .unwrap()
        .into_iter()
        .map(|p| p.slug)
        .collect();
    assert_eq!(slugs, ["newest", "middle", "oldest", "draft"]);

    // Status filter narrows the listing
    let published: Vec<String> = timeline
        .timeline(Some(Status::Published), None)
        .unwrap()
        .into_iter()
        .map(|p| p.slug)
        .collect();
    assert_eq!(published, ["newest", "middle", "oldest"]);

    let drafts = timeline.timeline(Some(Status::Draft), None).unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].slug, "draft");
}

#[test]
fn test_delete_cascades_to_identity_record() {
    let mut timeline = Timeline::open_in_memory().unwrap();

    let mut article = Article::new("Hello", "hello", "Body");
    timeline.save(&mut article).unwrap();
    let id = article.fields.id.unwrap();

    assert!(timeline.delete(ContentKind::Article, id).unwrap());
    assert_eq!(timeline.timeline(None, None).unwrap().len(), 0);
    assert!(timeline.get::<Article>(id).unwrap().is_none());

    // The slug is free again
    let mut replacement = Article::new("Hello", "hello", "New body");
    timeline.save(&mut replacement).unwrap();
}

#[test]
fn test_timeline_persists_across_reopen() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("tumblelog.db");

    {
        let mut timeline = Timeline::open(&db_path).unwrap();
        let mut article = Article::new("Hello", "hello", "Body");
        article.fields.publish(Utc::now());
        timeline.save(&mut article).unwrap();
    }

    let timeline = Timeline::open(&db_path).unwrap();
    let posts = timeline.timeline(Some(Status::Published), None).unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].slug, "hello");
    assert_eq!(posts[0].absolute_url(), "/posts/hello/");
}

#[test]
fn test_author_denormalizes_onto_identity_record() {
    let mut timeline = Timeline::open_in_memory().unwrap();

    let mut article = Article::new("Hello", "hello", "Body");
    article.fields.author = Some("ana".to_string());
    let post = timeline.save(&mut article).unwrap();

    assert_eq!(post.author.as_deref(), Some("ana"));

    // Clearing the author propagates on the next save
    article.fields.author = None;
    let post = timeline.save(&mut article).unwrap();
    assert_eq!(post.author, None);
}
