//! Global constants used throughout the navigator.
//!
//! Media types, default request headers and timeouts live here so the
//! transport, the navigator core and the tests agree on the same values.

use std::time::Duration;

/// Version string advertised in the `User-Agent` header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Media types accepted when fetching a resource.
pub const ACCEPT_HAL_JSON: &str = "application/hal+json,application/json";

/// Media type assumed for a resource until a response says otherwise.
pub const HAL_JSON: &str = "application/hal+json";

/// Default `Content-Type` for request bodies.
pub const APPLICATION_JSON: &str = "application/json";

/// Product token used in the default `User-Agent` header.
pub const USER_AGENT_PRODUCT: &str = "HALNavigator";

/// The `User-Agent` header value sent unless overridden.
pub fn default_user_agent() -> String {
    format!("{USER_AGENT_PRODUCT}/{VERSION}")
}

/// Default timeout for a single HTTP round trip (30 seconds).
///
/// Only applied by [`ReqwestTransport`](crate::http::ReqwestTransport); the
/// navigator core itself has no timeout semantics.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Relation reserved for the resource's own URI and title.
pub const REL_SELF: &str = "self";

/// Relation reserved for CURIE declarations.
pub const REL_CURIES: &str = "curies";

/// Relation followed by pagination helpers.
pub const REL_NEXT: &str = "next";

/// Host labels that carry no information when deriving an API name.
pub const GENERIC_DOMAINS: &[&str] = &["localhost", "herokuapp", "appspot", "www"];
