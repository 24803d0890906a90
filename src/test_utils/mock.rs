//! In-memory [`Transport`].

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::core::Result;
use crate::http::{HttpRequest, HttpResponse, Transport, Verb};

/// Serves canned responses keyed by method and URI and records requests.
///
/// A request without a canned response gets `404 Not Found` with an empty
/// body. A canned response is served for every matching request until it is
/// replaced.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: DashMap<(Verb, String), HttpResponse>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `response` for `method` requests to `uri`.
    pub fn respond(&self, method: Verb, uri: &str, response: HttpResponse) {
        self.responses.insert((method, uri.to_string()), response);
    }

    /// Forget the canned response for `method` and `uri`.
    pub fn forget(&self, method: Verb, uri: &str) {
        self.responses.remove(&(method, uri.to_string()));
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Number of requests with `method` to `uri`.
    pub fn count(&self, method: Verb, uri: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.method == method && r.uri == uri)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn perform(&self, request: HttpRequest) -> Result<HttpResponse> {
        let key = (request.method, request.uri.clone());
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(request);
        Ok(self.responses.get(&key).map(|r| r.value().clone()).unwrap_or_else(|| HttpResponse::new(404, "")))
    }
}
