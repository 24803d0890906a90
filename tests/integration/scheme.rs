//! Root URI validation.

use hal_navigator::uri::fix_scheme;
use hal_navigator::{Navigator, NavigatorError};

#[test]
fn test_missing_scheme_defaults_to_http() {
    assert_eq!(fix_scheme("example.com/x").unwrap(), "http://example.com/x");
    assert_eq!(fix_scheme("https://example.com/x").unwrap(), "https://example.com/x");
}

#[test]
fn test_scheme_case_is_ignored() {
    assert_eq!(fix_scheme("HTTP://example.com/x").unwrap(), "http://example.com/x");
    assert_eq!(fix_scheme("HTTPS://example.com/").unwrap(), "https://example.com/");
}

#[test]
fn test_unsupported_scheme_is_rejected() {
    match fix_scheme("ftp://x") {
        Err(NavigatorError::BadScheme {
            scheme,
            ..
        }) => assert_eq!(scheme, "ftp"),
        other => panic!("Expected BadScheme, got {other:?}"),
    }
}

#[test]
fn test_repeated_delimiter_is_ambiguous() {
    assert!(matches!(fix_scheme("http://a://b"), Err(NavigatorError::AmbiguousScheme { .. })));
}

#[test]
fn test_construction_validates_immediately() {
    assert!(Navigator::new("ftp://example.com/").is_err());
    assert!(Navigator::new("http://a://b").is_err());

    let nav = Navigator::new("example.com/api/").unwrap();
    assert_eq!(nav.uri(), Some("http://example.com/api/"));
    assert_eq!(nav.api_name(), "Example");
}
