//! Core types shared by every navigator module
//!
//! Currently this is the error system:
//! - [`NavigatorError`] - enumerated failure modes of URI handling, navigation
//!   and HTTP exchanges
//! - [`ErrorContext`] - user-facing wrapper with suggestions and details
//! - [`user_friendly_error`] - convert any [`anyhow::Error`] to an [`ErrorContext`]
//!
//! # Example
//!
//! ```rust,no_run
//! use hal_navigator::core::{NavigatorError, Result};
//!
//! fn require_http(url: &str) -> Result<()> {
//!     if url.starts_with("ftp://") {
//!         return Err(NavigatorError::BadScheme {
//!             url: url.to_string(),
//!             scheme: "ftp".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, NavigatorError, Result, user_friendly_error};
