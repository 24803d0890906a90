//! Common fixtures for navigator integration tests
//!
//! Every test gets its own [`TestApi`]: a root navigator wired to a fresh
//! `MockTransport` that already serves the sample index document.

// Not every suite uses every helper
#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use hal_navigator::test_utils::{MockTransport, hal, hal_document, init_test_logging};
use hal_navigator::{Navigator, Verb};
use serde_json::Value;

pub const ROOT: &str = "http://api.example.com/";

/// Root navigator plus the transport behind it.
pub struct TestApi {
    pub nav: Navigator,
    pub mock: Arc<MockTransport>,
}

impl TestApi {
    /// Serve the sample index at [`ROOT`].
    pub fn new() -> Result<Self> {
        Self::with_index(hal_document())
    }

    /// Serve `index` at [`ROOT`].
    pub fn with_index(index: Value) -> Result<Self> {
        init_test_logging(None);
        let mock = Arc::new(MockTransport::new());
        mock.respond(Verb::Get, ROOT, hal(index));
        let nav = Navigator::builder(ROOT).transport(mock.clone()).build()?;
        Ok(Self {
            nav,
            mock,
        })
    }

    /// Absolute URI of `path` under [`ROOT`].
    pub fn uri(path: &str) -> String {
        format!("{}{}", ROOT.trim_end_matches('/'), path)
    }

    /// Serve `body` as HAL for GET `path`.
    pub fn serve(&self, path: &str, body: Value) {
        self.mock.respond(Verb::Get, &Self::uri(path), hal(body));
    }
}
