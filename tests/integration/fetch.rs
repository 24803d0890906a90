//! Fetch outcomes, degraded parsing and remote errors.

use anyhow::Result;
use hal_navigator::test_utils::text;
use hal_navigator::{FetchState, HttpResponse, NavigatorError, Verb};
use serde_json::json;

use crate::common::TestApi;

#[tokio::test]
async fn test_state_excludes_links_and_embedded() -> Result<()> {
    let api = TestApi::new()?;

    let state = api.nav.state().await?;

    assert_eq!(state.len(), 2);
    assert_eq!(state["welcome"], json!("Welcome to the example API"));
    assert_eq!(state["hint_1"], json!("Sign up first"));
    assert_eq!(api.nav.fetch_state(), FetchState::Fetched);
    assert_eq!(api.nav.title().as_deref(), Some("Index"));
    Ok(())
}

#[tokio::test]
async fn test_lazy_fetch_happens_once() -> Result<()> {
    let api = TestApi::new()?;

    api.nav.links().await?;
    api.nav.state().await?;
    api.nav.embedded().await?;
    assert_eq!(api.mock.count(Verb::Get, crate::common::ROOT), 1);

    // An explicit fetch always goes to the server
    api.nav.get().await?;
    assert_eq!(api.mock.count(Verb::Get, crate::common::ROOT), 2);
    Ok(())
}

#[tokio::test]
async fn test_non_json_body_degrades_without_raising() -> Result<()> {
    let api = TestApi::new()?;
    api.mock.respond(Verb::Get, &TestApi::uri("/users"), text("plain words"));
    let users = api.nav.rel("ht:users").await?;

    let state = users.fetch(false).await?;

    assert!(state.is_empty());
    assert!(users.links().await?.is_empty());
    assert_eq!(users.fetch_state(), FetchState::Fetched);
    assert_eq!(users.raw_body().as_deref(), Some("plain words"));
    Ok(())
}

#[tokio::test]
async fn test_non_json_body_raises_with_the_raw_response() -> Result<()> {
    let api = TestApi::new()?;
    api.mock.respond(Verb::Get, &TestApi::uri("/users"), text("plain words"));
    let users = api.nav.rel("ht:users").await?;

    match users.get().await {
        Err(NavigatorError::NotJson {
            uri,
            response,
        }) => {
            assert_eq!(uri, TestApi::uri("/users"));
            assert_eq!(response.body, "plain words");
            assert_eq!(response.status, 200);
        }
        other => panic!("Expected NotJson, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_error_status_raises_remote() -> Result<()> {
    let api = TestApi::new()?;
    let users = api.nav.rel("ht:users").await?;

    let error = users.get().await.expect_err("unknown resource must fail");

    assert_eq!(error.status(), Some(404));
    assert!(error.response().is_some());
    match &error {
        NavigatorError::Remote {
            navigator,
            uri,
            ..
        } => {
            assert!(navigator.ptr_eq(&users));
            assert_eq!(uri, &TestApi::uri("/users"));
        }
        other => panic!("Expected Remote, got {other:?}"),
    }
    assert_eq!(users.fetch_state(), FetchState::Errored);
    Ok(())
}

#[tokio::test]
async fn test_error_status_is_recorded_when_not_raising() -> Result<()> {
    let api = TestApi::new()?;
    api.mock.respond(
        Verb::Get,
        &TestApi::uri("/users"),
        HttpResponse::new(500, json!({"message": "boom"}).to_string())
            .with_header("Content-Type", "application/json"),
    );
    let users = api.nav.rel("ht:users").await?;

    let state = users.fetch(false).await?;

    assert_eq!(state["message"], json!("boom"));
    assert_eq!(users.fetch_state(), FetchState::Errored);
    assert_eq!(users.status().map(|(code, _)| code), Some(500));
    Ok(())
}

#[tokio::test]
async fn test_refetch_replaces_previous_state() -> Result<()> {
    let api = TestApi::new()?;
    api.serve("/posts", json!({"count": 1, "stale": true}));
    let posts = api.nav.rel("ht:posts").await?;
    posts.get().await?;

    api.serve("/posts", json!({"count": 2}));
    let state = posts.get().await?;

    assert_eq!(state["count"], json!(2));
    assert!(!state.contains_key("stale"));
    Ok(())
}

#[tokio::test]
async fn test_navigator_from_a_hal_string() -> Result<()> {
    let body = json!({"_links": {"next": {"href": "/page/2"}}, "page": 1}).to_string();
    let nav = hal_navigator::Navigator::from_hal_json("http://api.example.com/page/1", &body)?;

    assert_eq!(nav.fetch_state(), FetchState::Fetched);
    assert_eq!(nav.state().await?["page"], json!(1));
    assert!(nav.contains("next").await?);

    assert!(hal_navigator::Navigator::from_hal_json("http://api.example.com/", "<html>").is_err());
    Ok(())
}
