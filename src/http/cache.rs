//! Opt-in GET response cache.
//!
//! Enabled with the `cache` navigator option. Only `200 OK` GET responses whose
//! `Cache-Control` header carries a positive `max-age` (and neither `no-store`
//! nor `no-cache`) are kept, and only until that age expires. Any non-GET
//! request evicts the entry for its URI.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::trace;

use super::{HttpRequest, HttpResponse, Transport, Verb};
use crate::core::Result;

#[derive(Debug, Clone)]
struct CachedResponse {
    response: HttpResponse,
    expires_at: Instant,
}

/// [`Transport`] decorator caching fresh GET responses in memory.
pub struct CachingTransport {
    inner: Arc<dyn Transport>,
    entries: DashMap<String, CachedResponse>,
}

impl CachingTransport {
    /// Wrap `inner`.
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
        }
    }

    /// Number of stored responses, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every stored response.
    pub fn clear(&self) {
        self.entries.clear();
    }

    fn fresh(&self, uri: &str) -> Option<HttpResponse> {
        let now = Instant::now();
        let hit = self
            .entries
            .get(uri)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.response.clone());
        if hit.is_none() {
            self.entries.remove_if(uri, |_, entry| entry.expires_at <= now);
        }
        hit
    }
}

#[async_trait]
impl Transport for CachingTransport {
    async fn perform(&self, request: HttpRequest) -> Result<HttpResponse> {
        if request.method != Verb::Get {
            self.entries.remove(&request.uri);
            return self.inner.perform(request).await;
        }

        let uri = request.uri.clone();
        if let Some(response) = self.fresh(&uri) {
            trace!("cache hit for {}", uri);
            return Ok(response);
        }

        let response = self.inner.perform(request).await?;
        if response.status == 200 {
            if let Some(lifetime) = cache_lifetime(&response) {
                trace!("caching {} for {:?}", uri, lifetime);
                self.entries.insert(
                    uri,
                    CachedResponse {
                        response: response.clone(),
                        expires_at: Instant::now() + lifetime,
                    },
                );
            }
        }
        Ok(response)
    }
}

fn cache_lifetime(response: &HttpResponse) -> Option<Duration> {
    let header = response.header("cache-control")?;
    let mut max_age = None;
    for directive in header.split(',').map(|d| d.trim().to_ascii_lowercase()) {
        match directive.as_str() {
            "no-store" | "no-cache" => return None,
            other => {
                if let Some(seconds) = other.strip_prefix("max-age=") {
                    max_age = seconds.trim_matches('"').parse::<u64>().ok();
                }
            }
        }
    }
    max_age.filter(|s| *s > 0).map(Duration::from_secs)
}
