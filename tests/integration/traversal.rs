//! Traversals, pagination and the response cache.

use std::sync::Arc;

use anyhow::Result;
use futures::{StreamExt, TryStreamExt};
use hal_navigator::test_utils::{MockTransport, hal};
use hal_navigator::{HttpResponse, Navigator, NavigatorError, Traversal, TraversalStep, Verb};
use serde_json::json;

use crate::common::{ROOT, TestApi};

#[tokio::test]
async fn test_traversal_follows_relations_and_templates() -> Result<()> {
    let api = TestApi::new()?;
    api.serve("/users/mike", json!({"_links": {"posts": {"href": "/users/mike/posts"}}}));
    api.serve("/users/mike/posts", json!({"count": 4}));

    let posts = Traversal::new(api.nav.clone()).with_parameter("name", "mike").follow(["ht:me", "posts"]).await?;

    assert_eq!(posts.uri(), Some("http://api.example.com/users/mike/posts"));
    assert_eq!(posts.state().await?["count"], json!(4));
    Ok(())
}

#[tokio::test]
async fn test_traversal_posts_along_the_way() -> Result<()> {
    let api = TestApi::new()?;
    api.mock.respond(
        Verb::Post,
        &TestApi::uri("/signup"),
        HttpResponse::new(201, "").with_header("Location", "/users/ann"),
    );
    api.serve("/users/ann", json!({"_links": {"avatar": {"href": "/users/ann/avatar"}}}));

    let avatar = Traversal::new(api.nav.clone())
        .follow([TraversalStep::post("ht:signup", json!({"username": "ann"})), TraversalStep::rel("avatar")])
        .await?;

    assert_eq!(avatar.uri(), Some("http://api.example.com/users/ann/avatar"));
    assert_eq!(api.mock.count(Verb::Post, &TestApi::uri("/signup")), 1);
    Ok(())
}

#[tokio::test]
async fn test_traversal_stops_on_a_bare_status() -> Result<()> {
    let api = TestApi::new()?;
    api.mock.respond(Verb::Post, &TestApi::uri("/signup"), HttpResponse::new(202, ""));

    let result = Traversal::new(api.nav.clone()).follow([TraversalStep::post("ht:signup", json!({}))]).await;

    match result {
        Err(NavigatorError::UnexpectedStatus {
            method,
            status,
            ..
        }) => {
            assert_eq!(method, "POST");
            assert_eq!(status, 202);
        }
        other => panic!("Expected UnexpectedStatus, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_pages_walk_the_next_chain() -> Result<()> {
    let api = TestApi::with_index(json!({"_links": {"next": {"href": "/?page=2"}}, "page": 1}))?;
    api.mock.respond(
        Verb::Get,
        "http://api.example.com/?page=2",
        hal(json!({"_links": {"next": {"href": "/?page=3"}}, "page": 2})),
    );
    api.mock.respond(Verb::Get, "http://api.example.com/?page=3", hal(json!({"page": 3})));

    let pages: Vec<Navigator> = api.nav.pages().try_collect().await?;

    assert_eq!(pages.len(), 3);
    let mut numbers = Vec::new();
    for page in &pages {
        numbers.push(page.state().await?["page"].clone());
    }
    assert_eq!(numbers, [json!(1), json!(2), json!(3)]);
    assert_eq!(api.mock.request_count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_pages_end_after_the_first_error() -> Result<()> {
    let api = TestApi::with_index(json!({"_links": {"next": {"href": "/?page=2"}}}))?;
    api.mock.respond(
        Verb::Get,
        "http://api.example.com/?page=2",
        hal(json!({"_links": {"next": [{"href": "/?page=3a"}, {"href": "/?page=3b"}]}})),
    );

    let results: Vec<_> = api.nav.pages().collect().await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    assert!(matches!(results[2], Err(NavigatorError::AmbiguousSelection { count: 2, .. })));
    Ok(())
}

#[tokio::test]
async fn test_cache_serves_fresh_responses() -> Result<()> {
    let mock = Arc::new(MockTransport::new());
    mock.respond(
        Verb::Get,
        ROOT,
        hal(json!({"_links": {"stats": {"href": "/stats"}}})).with_header("Cache-Control", "max-age=300"),
    );
    let nav = Navigator::builder(ROOT).transport(mock.clone()).cache(true).build()?;

    nav.get().await?;
    nav.get().await?;
    assert_eq!(mock.count(Verb::Get, ROOT), 1);

    // A non-GET request evicts the cached representation
    mock.respond(Verb::Post, ROOT, HttpResponse::new(204, ""));
    nav.create(json!({})).await?;
    nav.get().await?;
    assert_eq!(mock.count(Verb::Get, ROOT), 2);
    Ok(())
}

#[tokio::test]
async fn test_cache_is_off_by_default() -> Result<()> {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Verb::Get, ROOT, hal(json!({})).with_header("Cache-Control", "max-age=300"));
    let nav = Navigator::builder(ROOT).transport(mock.clone()).build()?;

    nav.get().await?;
    nav.get().await?;

    assert_eq!(mock.count(Verb::Get, ROOT), 2);
    Ok(())
}
