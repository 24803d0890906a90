//! HTTP exchange types and the transport seam
//!
//! The navigator core never talks to the network directly. Every request goes
//! through a [`Transport`], which performs exactly one round trip:
//!
//! ```text
//! perform(HttpRequest { method, uri, headers, body, .. }) -> HttpResponse { status, reason, headers, body }
//! ```
//!
//! A transport-level failure (DNS, TLS, connection reset) is returned as
//! [`NavigatorError::Transport`](crate::core::NavigatorError::Transport) and
//! is distinct from a successful exchange carrying an error status.
//!
//! # Modules
//!
//! - [`client`] - [`ReqwestTransport`], the default transport
//! - [`cache`] - [`CachingTransport`], an opt-in GET response cache
//!
//! Tests plug in `test_utils::MockTransport` instead.

pub mod cache;
pub mod client;

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::Result;

pub use cache::CachingTransport;
pub use client::ReqwestTransport;

/// HTTP verbs the navigator issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Safe, repeatable fetch
    Get,
    /// Resource creation or other non-idempotent action
    Post,
    /// Resource deletion
    Delete,
}

impl Verb {
    /// Upper-case method name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials attached to every request of a navigator session.
///
/// `Debug` output never includes the secret part.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Auth {
    /// HTTP basic authentication
    Basic {
        /// User name
        username: String,
        /// Optional password
        #[serde(default)]
        password: Option<String>,
    },
    /// Bearer token authentication
    Bearer {
        /// The token
        token: String,
    },
}

impl Auth {
    /// Basic credentials.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: Some(password.into()),
        }
    }

    /// Bearer token credentials.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic {
                username,
                ..
            } => f.debug_struct("Basic").field("username", username).finish_non_exhaustive(),
            Self::Bearer {
                ..
            } => f.debug_struct("Bearer").finish_non_exhaustive(),
        }
    }
}

/// A request handed to a [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Method to issue
    pub method: Verb,
    /// Absolute request URI
    pub uri: String,
    /// Header name to value
    pub headers: BTreeMap<String, String>,
    /// Serialized body, if any
    pub body: Option<String>,
    /// Credentials, if any
    pub auth: Option<Auth>,
    /// Whether redirects may be followed transparently
    pub follow_redirects: bool,
}

/// A response returned by a [`Transport`].
///
/// Header names are stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Reason phrase
    pub reason: String,
    /// Lower-cased header name to value
    pub headers: BTreeMap<String, String>,
    /// Body text
    pub body: String,
}

impl HttpResponse {
    /// Build a response with the canonical reason phrase for `status`.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason_phrase(status).to_string(),
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Add a header, lower-casing its name.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Replace the status and its canonical reason phrase.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self.reason = reason_phrase(status).to_string();
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// The `Content-Type` header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// The `Location` header.
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Whether the status is 4xx or 5xx.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Canonical reason phrase for a status code, or an empty string.
pub fn reason_phrase(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("")
}

/// Body of a POST or DELETE request.
///
/// Structured bodies are serialized as compact JSON; text is sent verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// JSON value, serialized before sending
    Json(Value),
    /// Pre-serialized text
    Text(String),
}

impl RequestBody {
    /// Serialize into the wire payload.
    pub fn into_payload(self) -> Result<Option<String>> {
        match self {
            Self::Empty => Ok(None),
            Self::Json(value) => Ok(Some(serde_json::to_string(&value)?)),
            Self::Text(text) => Ok(Some(text)),
        }
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Map<String, Value>> for RequestBody {
    fn from(map: Map<String, Value>) -> Self {
        Self::Json(Value::Object(map))
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Performs HTTP round trips for navigators.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue `request` and wait for the complete response.
    async fn perform(&self, request: HttpRequest) -> Result<HttpResponse>;
}
