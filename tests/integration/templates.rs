//! Templated links, expansion and registry exclusion.

use anyhow::Result;
use hal_navigator::{NavigatorError, Selector, Verb};
use serde_json::{Map, Value, json};

use crate::common::TestApi;

fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn test_templated_link_stays_out_of_the_registry() -> Result<()> {
    let api = TestApi::new()?;
    let before = api.nav.registry_len();

    let me = api.nav.rel("ht:me").await?;

    assert!(me.is_templated());
    assert_eq!(me.uri(), None);
    assert_eq!(me.template_uri(), Some("http://api.example.com/users/{name}"));
    assert!(!me.is_registered());
    assert_eq!(api.nav.registry_len(), before);
    Ok(())
}

#[tokio::test]
async fn test_expanding_twice_yields_distinct_instances() -> Result<()> {
    let api = TestApi::new()?;
    let me = api.nav.rel("ht:me").await?;

    let first = me.expand(args(json!({"name": "mike"})))?;
    let second = me.expand(args(json!({"name": "mike"})))?;

    assert_eq!(first.uri(), Some("http://api.example.com/users/mike"));
    assert_eq!(first, second);
    assert!(!first.ptr_eq(&second));
    assert!(!first.is_registered());
    Ok(())
}

#[tokio::test]
async fn test_zero_is_not_an_empty_value() -> Result<()> {
    let api = TestApi::with_index(json!({
        "_links": {"page": {"href": "/items{?page,size}", "templated": true}},
    }))?;

    let page = api.nav.rel("page").await?.expand(args(json!({"page": 0, "size": 20})))?;

    assert_eq!(page.uri(), Some("http://api.example.com/items?page=0&size=20"));
    Ok(())
}

#[tokio::test]
async fn test_templated_navigator_refuses_to_fetch() -> Result<()> {
    let api = TestApi::new()?;
    let me = api.nav.rel("ht:me").await?;

    match me.get().await {
        Err(NavigatorError::AmbiguousNavigation {
            template_uri,
            ..
        }) => assert_eq!(template_uri, "http://api.example.com/users/{name}"),
        other => panic!("Expected AmbiguousNavigation, got {other:?}"),
    }
    assert_eq!(api.mock.count(Verb::Get, &TestApi::uri("/users/{name}")), 0);
    Ok(())
}

#[tokio::test]
async fn test_partial_expansion_accumulates_arguments() -> Result<()> {
    let api = TestApi::with_index(json!({
        "_links": {"search": {"href": "/search{?q,lang}", "templated": true}},
    }))?;
    let search = api.nav.rel("search").await?;

    let partial = search.expand_partial(args(json!({"lang": "en"})))?;
    assert!(partial.is_templated());
    assert_eq!(partial.template_args().get("lang"), Some(&json!("en")));

    // Earlier bindings win over later ones
    let full = partial.expand(args(json!({"q": "rust", "lang": "fr"})))?;
    assert_eq!(full.uri(), Some("http://api.example.com/search?q=rust&lang=en"));
    Ok(())
}

#[tokio::test]
async fn test_selector_parameters_expand_and_fetch() -> Result<()> {
    let api = TestApi::new()?;
    api.serve("/users/mike", json!({"username": "mike"}));

    let user = api.nav.select(Selector::rel("me").param("name", "mike")).await?;
    let user = user.as_single().cloned().ok_or_else(|| anyhow::anyhow!("expected one navigator"))?;

    assert_eq!(user.uri(), Some("http://api.example.com/users/mike"));
    assert_eq!(user.state().await?["username"], json!("mike"));
    Ok(())
}

#[tokio::test]
async fn test_expanding_a_concrete_navigator_fails() -> Result<()> {
    let api = TestApi::new()?;
    let users = api.nav.rel("ht:users").await?;

    assert!(matches!(users.expand(Map::new()), Err(NavigatorError::NotTemplated { .. })));
    Ok(())
}
