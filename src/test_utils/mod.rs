//! Test utilities for navigator code
//!
//! Available to this crate's unit tests and, through the `test-utils`
//! feature, to integration tests and downstream crates.
//!
//! - [`MockTransport`] - in-memory transport serving canned responses and
//!   recording every request
//! - [`fixtures`] - HAL response builders and sample documents
//! - [`init_test_logging`] - one-time tracing setup
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hal_navigator::Navigator;
//! use hal_navigator::http::Verb;
//! use hal_navigator::test_utils::{MockTransport, hal};
//! use serde_json::json;
//!
//! # async fn example() -> hal_navigator::Result<()> {
//! let mock = Arc::new(MockTransport::new());
//! mock.respond(Verb::Get, "http://example.com/", hal(json!({"_links": {}})));
//!
//! let nav = Navigator::builder("http://example.com/").transport(mock.clone()).build()?;
//! nav.get().await?;
//! assert_eq!(mock.request_count(), 1);
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod mock;

pub use fixtures::{hal, hal_document, text};
pub use mock::MockTransport;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Installs the tracing subscriber only once regardless of how many times it
/// is called. Uses `level` when given, otherwise `RUST_LOG`; with neither,
/// logging stays off.
///
/// ```bash
/// RUST_LOG=hal_navigator=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_ansi(true)
            .try_init();
    });
}
