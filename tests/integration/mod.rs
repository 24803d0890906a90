//! Integration test suite for the HAL navigator
//!
//! End-to-end tests driving navigators against an in-memory transport. No
//! network access is needed.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **scheme**: root URI validation
//! - **identity**: identity registry sharing and weak lifetime
//! - **templates**: templated links, expansion and registry exclusion
//! - **fetch**: fetch outcomes, degraded parsing and remote errors
//! - **embedded**: `_embedded` versus `_links`, single and multi-valued relations
//! - **verbs**: POST/DELETE outcomes and verb restriction
//! - **config**: configuration files and error presentation
//! - **traversal**: traversals, pagination and the response cache

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod config;
mod fetch;
mod identity;
mod scheme;
mod templates;
mod traversal;
mod verbs;
