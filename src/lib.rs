//! HAL Navigator - a client for HAL+JSON hypermedia APIs
//!
//! Given the root URL of an API, a [`Navigator`] fetches resource
//! representations, exposes their links, embedded resources and state, and
//! moves to related resources by link relation. Templated links are expanded
//! on demand and resources can be created or deleted with POST and DELETE.
//!
//! # Architecture Overview
//!
//! A navigator is a node of the hypermedia graph. It starts unfetched and is
//! populated by a GET (explicit or lazy) or directly from an `_embedded`
//! entry of its parent. Navigators reached from one root share an HTTP
//! session and an identity registry: two links to the same URI resolve to
//! the same navigator for as long as someone holds it.
//!
//! ## Key Features
//!
//! - **Lazy**: relations are resolved on first use, fetching only what is needed
//! - **Identity preserving**: one navigator per URI within a tree, without leaking memory
//! - **URI templates**: RFC 6570 levels 1 to 4, with partial expansion
//! - **Verb aware**: links advertise the method they accept and misuse is rejected
//! - **Pluggable transport**: reqwest by default, any [`http::Transport`] in tests
//!
//! # Core Modules
//!
//! - [`navigator`] - the navigation engine: [`Navigator`], [`Selector`], verbs
//! - [`link`] - `_links` model with explicit single and multi-valued relations
//! - [`registry`] - URI to weak navigator handle map
//! - [`template`] - URI template parsing and expansion
//! - [`uri`] - scheme normalization, resolution and display helpers
//! - [`http`] - transport seam, reqwest transport and GET response cache
//! - [`config`] - `~/.halnav/config.toml`
//! - [`traverse`] - scripted relation sequences
//! - [`core`] - error types
//!
//! # Example
//!
//! ```rust,no_run
//! use hal_navigator::{Navigator, Selector};
//! use serde_json::json;
//!
//! # async fn example() -> hal_navigator::Result<()> {
//! let api = Navigator::builder("haltalk.herokuapp.com").curie("ht").build()?;
//!
//! // Lazy fetch of the root, then follow a relation
//! let users = api.rel("users").await?;
//! for user in users.links().await?.get("ht:user").into_iter().flat_map(|v| v.iter()) {
//!     println!("{user}");
//! }
//!
//! // Expand a templated relation
//! let me = api.select(Selector::rel("me").param("name", "mike")).await?;
//! println!("{:?}", me.as_single().map(|n| n.uri()));
//!
//! // Create a resource
//! let signup = api.rel("signup").await?;
//! let outcome = signup.create(json!({"username": "mike", "password": "secret"})).await?;
//! if let Some(created) = outcome.into_navigator() {
//!     println!("created {created}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Every fallible operation returns [`Result`] with a [`NavigatorError`].
//! Construction-time URI problems always fail; body parse failures only fail
//! when requested; verb misuse always fails. See [`core::error`].

pub mod config;
pub mod constants;
pub mod core;
pub mod http;
pub mod link;
pub mod navigator;
pub mod registry;
pub mod template;
pub mod traverse;
pub mod uri;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::NavigatorConfig;
pub use core::{ErrorContext, NavigatorError, Result, user_friendly_error};
pub use http::{Auth, HttpResponse, RequestBody, Transport, Verb};
pub use link::{Link, LinkValue};
pub use navigator::{FetchState, Navigator, NavigatorBuilder, RequestOptions, Selector, Step, VerbOutcome};
pub use traverse::{Traversal, TraversalStep};
