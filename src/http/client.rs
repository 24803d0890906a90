//! Default [`Transport`] backed by [`reqwest`].

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::redirect::Policy;
use tracing::debug;

use super::{Auth, HttpRequest, HttpResponse, Transport, Verb};
use crate::constants::DEFAULT_REQUEST_TIMEOUT;
use crate::core::{NavigatorError, Result};

/// Transport issuing real HTTP requests.
///
/// Holds two clients sharing the same settings: one that follows redirects
/// (used for GET) and one that never does (used for POST and DELETE, whose
/// `Location` answers the navigator interprets itself).
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    follow: Client,
    no_follow: Client,
}

impl ReqwestTransport {
    /// Create a transport with the default request timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a transport with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let build = |policy: Policy| {
            Client::builder().timeout(timeout).redirect(policy).build().map_err(|e| NavigatorError::Config {
                message: format!("Failed to create HTTP client: {e}"),
            })
        };

        Ok(Self {
            follow: build(Policy::default())?,
            no_follow: build(Policy::none())?,
        })
    }

    /// Wrap caller-configured clients (proxies, TLS roots, connection pools).
    pub const fn from_clients(follow: Client, no_follow: Client) -> Self {
        Self {
            follow,
            no_follow,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn perform(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            uri,
            headers,
            body,
            auth,
            follow_redirects,
        } = request;

        let client = if follow_redirects {
            &self.follow
        } else {
            &self.no_follow
        };
        let http_method = match method {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Delete => reqwest::Method::DELETE,
        };

        let mut builder = client.request(http_method, &uri);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match auth {
            Some(Auth::Basic {
                username,
                password,
            }) => builder.basic_auth(username, password),
            Some(Auth::Bearer {
                token,
            }) => builder.bearer_auth(token),
            None => builder,
        };
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| transport_error(method, &uri, e))?;

        let status = response.status();
        let mut response_headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            let Ok(value) = value.to_str() else {
                continue;
            };
            response_headers
                .entry(name.as_str().to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
        let text = response.text().await.map_err(|e| transport_error(method, &uri, e))?;

        debug!("{} {} -> {}", method, uri, status.as_u16());

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            headers: response_headers,
            body: text,
        })
    }
}

fn transport_error(method: Verb, uri: &str, error: reqwest::Error) -> NavigatorError {
    NavigatorError::Transport {
        method: method.to_string(),
        uri: uri.to_string(),
        message: error.to_string(),
        source: Some(Box::new(error)),
    }
}
