//! POST/DELETE outcomes and verb restriction.

use anyhow::{Result, anyhow};
use hal_navigator::test_utils::hal;
use hal_navigator::{FetchState, HttpResponse, NavigatorError, RequestOptions, VerbOutcome, Verb};
use serde_json::json;

use crate::common::TestApi;

#[tokio::test]
async fn test_delete_on_a_get_link_is_rejected() -> Result<()> {
    let api = TestApi::new()?;
    let users = api.nav.rel("ht:users").await?;

    assert!(matches!(users.delete().await, Err(NavigatorError::InvalidOperation { .. })));
    assert_eq!(api.mock.count(Verb::Delete, &TestApi::uri("/users")), 0);
    Ok(())
}

#[tokio::test]
async fn test_post_on_a_get_link_is_rejected() -> Result<()> {
    let api = TestApi::new()?;
    let users = api.nav.rel("ht:users").await?;

    assert!(matches!(users.create(json!({})).await, Err(NavigatorError::InvalidOperation { .. })));
    Ok(())
}

#[tokio::test]
async fn test_root_accepts_any_verb() -> Result<()> {
    let api = TestApi::new()?;
    api.mock.respond(Verb::Delete, crate::common::ROOT, HttpResponse::new(204, ""));

    let outcome = api.nav.delete().await?;

    assert!(matches!(outcome, VerbOutcome::Status { code: 204, .. }));
    Ok(())
}

#[tokio::test]
async fn test_post_with_location_yields_a_registered_navigator() -> Result<()> {
    let api = TestApi::new()?;
    api.mock.respond(
        Verb::Post,
        &TestApi::uri("/signup"),
        HttpResponse::new(201, "").with_header("Location", "/users/mike"),
    );
    api.serve("/users/mike", json!({"username": "mike"}));

    let signup = api.nav.rel("ht:signup").await?;
    let created = signup
        .create(json!({"username": "mike", "password": "secret"}))
        .await?
        .into_navigator()
        .ok_or_else(|| anyhow!("expected a navigator"))?;

    assert_eq!(created.uri(), Some("http://api.example.com/users/mike"));
    assert!(created.is_registered());
    assert_eq!(created.fetch_state(), FetchState::Unfetched);
    assert_eq!(created.state().await?["username"], json!("mike"));
    Ok(())
}

#[tokio::test]
async fn test_post_answered_with_a_body_round_trips() -> Result<()> {
    let api = TestApi::new()?;
    api.mock.respond(Verb::Post, &TestApi::uri("/signup"), hal(json!({"token": "abc", "_links": {"me": {"href": "/users/mike"}}})));

    let signup = api.nav.rel("ht:signup").await?;
    let outcome = signup.post(json!({"username": "mike"})).await?;
    let response = outcome.navigator().cloned().ok_or_else(|| anyhow!("expected a navigator"))?;

    assert!(!response.is_idempotent());
    assert_eq!(response.template_uri(), None);
    assert_eq!(response.method(), "GET");
    assert_eq!(response.uri(), signup.uri());
    assert!(response.parent().is_some_and(|p| p.ptr_eq(&signup)));
    assert_eq!(response.state().await?["token"], json!("abc"));
    assert!(response.contains("me").await?);
    Ok(())
}

#[tokio::test]
async fn test_response_navigator_never_refetches_itself() -> Result<()> {
    let api = TestApi::new()?;
    api.mock.respond(Verb::Post, &TestApi::uri("/signup"), hal(json!({"token": "abc"})));
    let signup = api.nav.rel("ht:signup").await?;
    let response = signup.post(json!({})).await?.into_navigator().ok_or_else(|| anyhow!("expected a navigator"))?;
    let requests = api.mock.request_count();

    response.state().await?;
    response.links().await?;
    assert!(matches!(response.get().await, Err(NavigatorError::InvalidOperation { .. })));

    assert_eq!(api.mock.request_count(), requests);
    assert_eq!(api.mock.count(Verb::Get, &TestApi::uri("/signup")), 0);
    Ok(())
}

#[tokio::test]
async fn test_error_status_raises_unless_told_otherwise() -> Result<()> {
    let api = TestApi::new()?;
    api.mock.respond(Verb::Post, &TestApi::uri("/signup"), HttpResponse::new(409, "taken"));
    let signup = api.nav.rel("ht:signup").await?;

    let error = signup.create(json!({})).await.expect_err("409 must fail");
    assert_eq!(error.status(), Some(409));

    let outcome = signup.create_with(json!({}), RequestOptions::new().raise_on_error(false)).await?;
    match outcome {
        VerbOutcome::Status {
            code,
            reason,
        } => {
            assert_eq!(code, 409);
            assert_eq!(reason, "Conflict");
        }
        other => panic!("Expected a status, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_request_options_shape_the_request() -> Result<()> {
    let api = TestApi::new()?;
    api.mock.respond(Verb::Post, &TestApi::uri("/signup"), HttpResponse::new(202, ""));
    let signup = api.nav.rel("ht:signup").await?;

    let options = RequestOptions::new().content_type("text/plain").header("X-Trace", "42");
    signup.create_with("hello", options).await?;

    let request = api.mock.requests().pop().ok_or_else(|| anyhow!("no request recorded"))?;
    assert_eq!(request.body.as_deref(), Some("hello"));
    assert_eq!(request.headers.get("Content-Type").map(String::as_str), Some("text/plain"));
    assert_eq!(request.headers.get("X-Trace").map(String::as_str), Some("42"));
    assert!(!request.follow_redirects);
    Ok(())
}

#[tokio::test]
async fn test_session_auth_reaches_every_request() -> Result<()> {
    let api = TestApi::new()?;
    api.nav.authenticate(hal_navigator::Auth::bearer("t0k3n"));
    api.serve("/users", json!({}));

    api.nav.rel("ht:users").await?.get().await?;

    let request = api.mock.requests().pop().ok_or_else(|| anyhow!("no request recorded"))?;
    assert_eq!(request.auth, Some(hal_navigator::Auth::bearer("t0k3n")));
    Ok(())
}

#[tokio::test]
async fn test_see_other_with_location_yields_a_navigator() -> Result<()> {
    let api = TestApi::new()?;
    api.mock.respond(
        Verb::Post,
        &TestApi::uri("/signup"),
        HttpResponse::new(303, "").with_header("Location", "/users/9"),
    );

    let signup = api.nav.rel("ht:signup").await?;
    let outcome = signup.create(json!({})).await?;
    let target = outcome.into_navigator().ok_or_else(|| anyhow!("expected a navigator"))?;

    assert_eq!(target.uri(), Some("http://api.example.com/users/9"));
    assert!(target.is_registered());
    assert_eq!(signup.status().map(|(code, _)| code), Some(303));
    Ok(())
}
