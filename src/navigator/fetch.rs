//! GET, lazy fetching and population from HAL bodies.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{trace, warn};

use super::guard::{self, Operation};
use super::{Blueprint, FetchState, Navigator, Resource};
use crate::constants::HAL_JSON;
use crate::core::{NavigatorError, Result};
use crate::http::{HttpResponse, Verb};
use crate::link::{self, Curies, LinkValue, Links};
use crate::uri;

/// Everything read out of one HAL document.
struct Document {
    state: Map<String, Value>,
    links: Links,
    embedded: BTreeMap<String, LinkValue<Navigator>>,
    title: Option<String>,
    profile: Option<String>,
    curies: Curies,
}

impl Navigator {
    /// Fetch the resource, failing on error statuses and non-JSON bodies.
    ///
    /// Equivalent to `fetch(true)`.
    pub async fn get(&self) -> Result<Map<String, Value>> {
        self.fetch(true).await
    }

    /// Issue a GET and repopulate the navigator from the response.
    ///
    /// Always performs a request. Returns a copy of the resource state (every
    /// top-level member except `_links` and `_embedded`).
    ///
    /// With `raise_on_error` a non-2xx status fails with
    /// [`NavigatorError::Remote`] and a body that is not JSON with
    /// [`NavigatorError::NotJson`]. Without it both degrade: the navigator is
    /// populated as far as possible (empty state and links for a non-JSON
    /// body) and an error status is recorded as [`FetchState::Errored`].
    pub async fn fetch(&self, raise_on_error: bool) -> Result<Map<String, Value>> {
        guard::check(self, Operation::Get)?;
        let uri = self.require_uri("get")?;

        let response = self.send(Verb::Get, &uri, None, BTreeMap::new(), true).await?;
        self.write().response = Some(response.clone());
        if raise_on_error && !response.is_success() {
            self.write().fetch_state = FetchState::Errored;
            return Err(self.remote_error(&uri, response));
        }

        if raise_on_error {
            self.populate(&response)?;
        } else {
            self.populate_leniently(&response);
        }
        Ok(self.read().state.clone())
    }

    /// The resource state, fetching first if nothing was retrieved yet.
    pub async fn state(&self) -> Result<Map<String, Value>> {
        if self.fetch_state() == FetchState::Unfetched && self.is_idempotent() {
            return self.get().await;
        }
        Ok(self.read().state.clone())
    }

    /// Links of the resource as navigators, keyed by relation.
    ///
    /// Fetches first when needed. Never contains `self` or `curies`.
    pub async fn links(&self) -> Result<BTreeMap<String, LinkValue<Navigator>>> {
        self.ensure_fetched().await?;
        let links = self.read().links.clone();
        links
            .iter()
            .map(|(rel, value)| Ok::<_, NavigatorError>((rel.clone(), self.navigators_for(value)?)))
            .collect()
    }

    /// Embedded resources, keyed by relation. Fetches first when needed.
    pub async fn embedded(&self) -> Result<BTreeMap<String, LinkValue<Navigator>>> {
        self.ensure_fetched().await?;
        Ok(self.read().embedded.clone())
    }

    /// Fetch tolerantly if this navigator is idempotent and never fetched.
    ///
    /// Non-idempotent response navigators are never fetched implicitly.
    pub(crate) async fn ensure_fetched(&self) -> Result<()> {
        if self.is_idempotent() && self.fetch_state() == FetchState::Unfetched {
            trace!("auto-fetching {}", self);
            self.fetch(false).await?;
        }
        Ok(())
    }

    pub(crate) fn remote_error(&self, uri: &str, response: HttpResponse) -> NavigatorError {
        NavigatorError::Remote {
            navigator: self.clone(),
            uri: uri.to_string(),
            status: response.status,
            reason: response.reason.clone(),
            response: Box::new(response),
        }
    }

    /// Populate from a response body, failing if it is not a HAL document.
    pub(crate) fn populate(&self, response: &HttpResponse) -> Result<()> {
        let Some(body) = parse_object(&response.body) else {
            return Err(NavigatorError::NotJson {
                uri: self.uri().unwrap_or(self.root()).to_string(),
                response: Box::new(response.clone()),
            });
        };
        let document = self.read_document(&body)?;
        self.store(response, Some(document));
        Ok(())
    }

    /// Populate from a response body as far as it allows.
    ///
    /// A body that is not JSON, or not a usable HAL document, leaves empty
    /// state, links and embedded resources.
    pub(crate) fn populate_leniently(&self, response: &HttpResponse) {
        let document = match parse_object(&response.body) {
            Some(body) => match self.read_document(&body) {
                Ok(document) => Some(document),
                Err(e) => {
                    warn!("Ignoring unusable HAL document from {}: {}", self, e);
                    None
                }
            },
            None => {
                warn!("Response from {} wasn't valid JSON", self);
                None
            }
        };
        self.store(response, document);
    }

    /// Record a parsed response. The fetch state follows the response status;
    /// the content type is taken from the response when it carries one.
    fn store(&self, response: &HttpResponse, document: Option<Document>) {
        let mut resource = self.write();
        match document {
            Some(document) => apply(&mut resource, document),
            None => {
                resource.state = Map::new();
                resource.links = Links::new();
                resource.embedded = BTreeMap::new();
            }
        }
        if let Some(content_type) = response.content_type() {
            resource.content_type = Some(content_type.to_string());
        }
        resource.fetch_state = if response.is_success() {
            FetchState::Fetched
        } else {
            FetchState::Errored
        };
    }

    /// Populate from an already parsed HAL object, as a pre-fetched resource.
    pub(crate) fn populate_document(&self, body: &Map<String, Value>) -> Result<()> {
        let document = self.read_document(body)?;
        let mut resource = self.write();
        apply(&mut resource, document);
        resource.fetch_state = FetchState::Fetched;
        Ok(())
    }

    fn read_document(&self, body: &Map<String, Value>) -> Result<Document> {
        let base = self.uri().unwrap_or(self.root()).to_string();
        let self_link = link::self_link(body);
        let text = |key: &str| {
            self_link.and_then(|l| l.get(key)).and_then(Value::as_str).map(str::to_string)
        };

        let mut embedded = BTreeMap::new();
        if let Some(raw) = body.get("_embedded").and_then(Value::as_object) {
            for (rel, value) in raw {
                let parsed = match value {
                    Value::Array(items) => {
                        let mut navigators = Vec::with_capacity(items.len());
                        for item in items {
                            if let Some(nav) = self.embedded_navigator(item, &base)? {
                                navigators.push(nav);
                            }
                        }
                        LinkValue::Multiple(navigators)
                    }
                    single => match self.embedded_navigator(single, &base)? {
                        Some(nav) => LinkValue::Single(nav),
                        None => {
                            warn!("Skipping embedded '{}': not an object", rel);
                            continue;
                        }
                    },
                };
                embedded.insert(rel.clone(), parsed);
            }
        }

        Ok(Document {
            state: body
                .iter()
                .filter(|(key, _)| key.as_str() != "_links" && key.as_str() != "_embedded")
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            links: link::parse_links(body, &base)?,
            embedded,
            title: text("title"),
            profile: text("profile"),
            curies: Curies::from_body(body, &base),
        })
    }

    /// Build the navigator for one `_embedded` entry.
    ///
    /// Entries with a `self` link are registered under that URI; a live
    /// navigator already registered there is reused and repopulated from the
    /// entry, so every fetch of the container refreshes it. Entries without a
    /// `self` link share the containing resource's URI and are not idempotent.
    fn embedded_navigator(&self, value: &Value, base: &str) -> Result<Option<Navigator>> {
        let Some(body) = value.as_object() else {
            return Ok(None);
        };
        let href = link::self_link(body).and_then(|l| l.get("href")).and_then(Value::as_str);

        let navigator = match href {
            Some(href) => {
                let uri = uri::resolve(base, href)?;
                self.derive(Blueprint {
                    method_validation: true,
                    ..Blueprint::concrete(uri)
                })
            }
            None => self.detached(Blueprint {
                idempotent: false,
                method_validation: true,
                content_type: Some(HAL_JSON.to_string()),
                ..Blueprint::concrete(base.to_string())
            }),
        };

        navigator.populate_document(body)?;
        Ok(Some(navigator))
    }
}

fn apply(resource: &mut Resource, document: Document) {
    resource.state = document.state;
    resource.links = document.links;
    resource.embedded = document.embedded;
    resource.curies = document.curies;
    if document.title.is_some() {
        resource.title = document.title;
    }
    if document.profile.is_some() {
        resource.profile = document.profile;
    }
}

/// Parse a body as a JSON object.
///
/// JSON that is not an object yields an empty object; non-JSON yields `None`.
fn parse_object(body: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(body).ok()? {
        Value::Object(map) => Some(map),
        _ => Some(Map::new()),
    }
}
