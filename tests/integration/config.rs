//! Configuration files and error presentation.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use hal_navigator::test_utils::{MockTransport, hal, hal_document};
use hal_navigator::{Auth, Navigator, NavigatorConfig, NavigatorError, Verb, user_friendly_error};
use tempfile::TempDir;

use crate::common::{ROOT, TestApi};

const CONFIG: &str = r#"
api_name = "Blog"
curie = "ht"
user_agent = "blog-reader/2.0"

[headers]
X-Client = "reporting"

[auth]
token = "s3cr3t"
"#;

async fn write_config(dir: &TempDir) -> Result<std::path::PathBuf> {
    let path = dir.path().join("config.toml");
    tokio::fs::write(&path, CONFIG).await?;
    Ok(path)
}

#[tokio::test]
async fn test_config_file_feeds_the_session() -> Result<()> {
    let dir = TempDir::new()?;
    let config = NavigatorConfig::load_from(&write_config(&dir).await?).await?;
    let mock = Arc::new(MockTransport::new());
    mock.respond(Verb::Get, ROOT, hal(hal_document()));

    let nav = Navigator::builder(ROOT).transport(mock.clone()).config(config).build()?;
    assert_eq!(nav.api_name(), "Blog");
    assert_eq!(nav.default_curie(), Some("ht"));

    // Bare relation resolved through the configured CURIE
    nav.rel("users").await?;

    let request = mock.requests().pop().ok_or_else(|| anyhow!("no request recorded"))?;
    assert_eq!(request.headers.get("X-Client").map(String::as_str), Some("reporting"));
    assert_eq!(request.headers.get("User-Agent").map(String::as_str), Some("blog-reader/2.0"));
    assert_eq!(request.auth, Some(Auth::bearer("s3cr3t")));
    Ok(())
}

#[tokio::test]
async fn test_builder_values_win_over_config() -> Result<()> {
    let dir = TempDir::new()?;
    let config = NavigatorConfig::load_from(&write_config(&dir).await?).await?;
    let mock = Arc::new(MockTransport::new());
    mock.respond(Verb::Get, ROOT, hal(hal_document()));

    let nav = Navigator::builder(ROOT)
        .transport(mock.clone())
        .config(config)
        .api_name("Override")
        .header("x-client", "dashboard")
        .build()?;
    nav.get().await?;

    assert_eq!(nav.api_name(), "Override");
    let request = mock.requests().pop().ok_or_else(|| anyhow!("no request recorded"))?;
    assert_eq!(request.headers.get("x-client").map(String::as_str), Some("dashboard"));
    assert!(!request.headers.contains_key("X-Client"));
    Ok(())
}

#[tokio::test]
async fn test_missing_config_file_reports_the_path() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("absent.toml");

    let error = NavigatorConfig::load_from(&path).await.expect_err("missing file must fail");

    assert!(format!("{error:#}").contains("absent.toml"));
    let ctx = user_friendly_error(error);
    assert!(matches!(ctx.error, NavigatorError::Config { .. }));
    assert!(ctx.suggestion.is_some());
    Ok(())
}

#[tokio::test]
async fn test_malformed_config_gets_a_toml_hint() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("config.toml");
    tokio::fs::write(&path, "curie = [unclosed").await?;

    let error = NavigatorConfig::load_from(&path).await.expect_err("bad TOML must fail");
    let ctx = user_friendly_error(error);

    assert!(matches!(ctx.error, NavigatorError::Config { .. }));
    assert!(ctx.suggestion.as_deref().is_some_and(|s| s.contains("TOML")));
    Ok(())
}

#[tokio::test]
async fn test_navigation_errors_carry_suggestions() -> Result<()> {
    let api = TestApi::new()?;

    let error = api.nav.rel("ht:user").await.expect_err("unknown relation must fail");
    let ctx = user_friendly_error(error.into());

    assert!(matches!(ctx.error, NavigatorError::RelationNotFound { .. }));
    assert_eq!(ctx.suggestion.as_deref(), Some("Did you mean 'ht:users'?"));
    let rendered = ctx.to_string();
    assert!(rendered.starts_with("Relation 'ht:user' not found"));
    assert!(rendered.contains("Suggestion: Did you mean 'ht:users'?"));
    Ok(())
}
