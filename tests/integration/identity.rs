//! Identity registry sharing and weak lifetime.

use anyhow::Result;
use serde_json::json;

use crate::common::TestApi;

#[tokio::test]
async fn test_two_relations_to_one_uri_share_a_navigator() -> Result<()> {
    let api = TestApi::new()?;

    let posts = api.nav.rel("ht:posts").await?;
    let latest = api.nav.rel("ht:latest-posts").await?;

    assert!(posts.ptr_eq(&latest));
    assert!(posts.is_registered());
    Ok(())
}

#[tokio::test]
async fn test_sharing_spans_the_whole_tree() -> Result<()> {
    let api = TestApi::new()?;
    api.serve("/users", json!({"_links": {"home": {"href": "/"}, "posts": {"href": "/posts"}}}));

    let users = api.nav.rel("ht:users").await?;
    let home = users.rel("home").await?;
    let posts_from_users = users.rel("posts").await?;
    let posts_from_root = api.nav.rel("ht:posts").await?;

    assert!(home.ptr_eq(&api.nav));
    assert!(posts_from_users.ptr_eq(&posts_from_root));
    Ok(())
}

#[tokio::test]
async fn test_fetch_through_one_handle_is_seen_by_the_other() -> Result<()> {
    let api = TestApi::new()?;
    api.serve("/posts", json!({"total": 3}));

    let posts = api.nav.rel("ht:posts").await?;
    let latest = api.nav.rel("ht:latest-posts").await?;
    posts.get().await?;

    assert_eq!(latest.state().await?["total"], json!(3));
    assert_eq!(api.mock.count(hal_navigator::Verb::Get, &TestApi::uri("/posts")), 1);
    Ok(())
}

#[tokio::test]
async fn test_registry_never_keeps_a_navigator_alive() -> Result<()> {
    let api = TestApi::new()?;
    let posts_uri = TestApi::uri("/posts");

    let posts = api.nav.rel("ht:posts").await?;
    assert!(api.nav.lookup(&posts_uri).is_some());

    drop(posts);
    assert!(api.nav.lookup(&posts_uri).is_none());

    // A later traversal builds a fresh instance
    let again = api.nav.rel("ht:posts").await?;
    assert!(again.is_registered());
    Ok(())
}

#[tokio::test]
async fn test_embedded_with_self_link_is_the_linked_instance() -> Result<()> {
    let api = TestApi::with_index(json!({
        "_links": {"author": {"href": "/users/1"}},
        "_embedded": {"owner": {"_links": {"self": {"href": "/users/1"}}, "name": "ann"}},
    }))?;

    let owner = api.nav.rel("owner").await?;
    let author = api.nav.rel("author").await?;

    assert!(owner.ptr_eq(&author));
    assert_eq!(author.state().await?["name"], json!("ann"));
    assert_eq!(api.mock.request_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_root_without_a_path_is_its_own_home() -> Result<()> {
    let mock = std::sync::Arc::new(hal_navigator::test_utils::MockTransport::new());
    mock.respond(
        hal_navigator::Verb::Get,
        "http://e.com/",
        hal_navigator::test_utils::hal(json!({"_links": {"home": {"href": "/"}}})),
    );
    let nav = hal_navigator::Navigator::builder("e.com").transport(mock).build()?;

    let home = nav.rel("home").await?;

    assert_eq!(nav.uri(), Some("http://e.com/"));
    assert!(home.ptr_eq(&nav));
    Ok(())
}
