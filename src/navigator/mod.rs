//! The navigation engine
//!
//! A [`Navigator`] represents one resource of a HAL+JSON API, fetched or not.
//! Navigators are cheap handles (`Arc` inside): cloning one clones the handle,
//! not the resource. All navigators reached from one root share a scope made
//! of the API root, the HTTP session and the [`IdentityRegistry`], so two links
//! to the same URI anywhere in the graph resolve to the same instance.
//!
//! # Lifecycle
//!
//! ```text
//!   root / link / Location          embedded entry
//!            |                            |
//!        Unfetched --- get() ---+         |
//!            |                  |         v
//!            |               Fetched <----+
//!            |                  ^
//!            +--- get() --> Errored (non-2xx response)
//! ```
//!
//! Templated navigators stay out of this graph until they are expanded. POST
//! and DELETE never mutate the navigator they are issued on: they produce a
//! new navigator (from a `Location` header) or a non-idempotent response
//! navigator wrapping the response body.
//!
//! # Modules
//!
//! - [`builder`] - root construction and [`NavigatorBuilder`]
//! - `guard` - the verb-restriction table applied before every operation
//! - `fetch` - GET, lazy fetching and population from HAL bodies
//! - `expand` - URI template expansion
//! - [`verbs`] - POST and DELETE with [`VerbOutcome`]
//! - [`select`] - the [`Selector`] protocol, pagination and documentation links
//!
//! # Examples
//!
//! ```rust,no_run
//! use hal_navigator::Navigator;
//! use serde_json::json;
//!
//! # async fn example() -> hal_navigator::Result<()> {
//! let api = Navigator::new("haltalk.herokuapp.com")?;
//! let users = api.rel("ht:users").await?;
//! let user = api
//!     .select(hal_navigator::Selector::rel("ht:user").param("name", "mike"))
//!     .await?
//!     .into_vec()
//!     .remove(0);
//! println!("{user}: {:?}", user.get().await?);
//! # let _ = (users, json!({}));
//! # Ok(())
//! # }
//! ```

pub mod builder;
mod expand;
mod fetch;
mod guard;
pub mod select;
pub mod verbs;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{Map, Value};
use tracing::debug;

use crate::constants::HAL_JSON;
use crate::core::{NavigatorError, Result};
use crate::http::{Auth, HttpRequest, HttpResponse, Transport, Verb};
use crate::link::{Curies, DEFAULT_METHOD, Link, LinkValue, Links};
use crate::registry::IdentityRegistry;
use crate::template;
use crate::uri;

pub use builder::NavigatorBuilder;
pub use select::{Selector, Step};
pub use verbs::{RequestOptions, VerbOutcome};

/// Where a navigator stands with respect to its representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchState {
    /// Nothing has been retrieved yet
    #[default]
    Unfetched,
    /// Populated from a successful response or an embedded entry
    Fetched,
    /// The last fetch returned a non-2xx status
    Errored,
}

/// HTTP settings shared by every navigator of a tree.
pub(crate) struct Session {
    transport: Arc<dyn Transport>,
    headers: BTreeMap<String, String>,
    auth: RwLock<Option<Auth>>,
}

impl Session {
    fn auth(&self) -> Option<Auth> {
        self.auth.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// State shared by a root and all of its descendants.
pub(crate) struct Scope {
    root: String,
    api_name: String,
    default_curie: Option<String>,
    session: Session,
    registry: IdentityRegistry<NavigatorInner>,
}

/// What a fetch or an embedded entry filled in.
#[derive(Default)]
struct Resource {
    fetch_state: FetchState,
    response: Option<HttpResponse>,
    state: Map<String, Value>,
    links: Links,
    embedded: BTreeMap<String, LinkValue<Navigator>>,
    title: Option<String>,
    profile: Option<String>,
    content_type: Option<String>,
    curies: Curies,
}

/// The immutable part of a navigator, with the metadata it starts from.
///
/// Derived navigators are built from a blueprint: either a fresh one or a
/// snapshot of an existing navigator with some fields overridden.
#[derive(Clone)]
struct Blueprint {
    uri: Option<String>,
    template_uri: Option<String>,
    template_variables: BTreeSet<String>,
    template_args: Map<String, Value>,
    method: String,
    templated: bool,
    idempotent: bool,
    method_validation: bool,
    parent: Option<Navigator>,
    title: Option<String>,
    profile: Option<String>,
    content_type: Option<String>,
}

impl Blueprint {
    /// A plain, idempotent GET resource at `uri`.
    fn concrete(uri: String) -> Self {
        Self {
            uri: Some(uri),
            template_uri: None,
            template_variables: BTreeSet::new(),
            template_args: Map::new(),
            method: DEFAULT_METHOD.to_string(),
            templated: false,
            idempotent: true,
            method_validation: false,
            parent: None,
            title: None,
            profile: None,
            content_type: Some(HAL_JSON.to_string()),
        }
    }

    /// The navigator a link points at.
    fn from_link(link: &Link) -> Result<Self> {
        let template_variables = match &link.template_uri {
            Some(template_uri) => template::variables(template_uri)?,
            None => BTreeSet::new(),
        };
        Ok(Self {
            uri: link.uri.clone(),
            template_uri: link.template_uri.clone(),
            template_variables,
            method: link.method.clone(),
            templated: link.templated,
            method_validation: true,
            title: link.title.clone(),
            profile: link.profile.clone(),
            content_type: link.media_type.clone().or_else(|| Some(HAL_JSON.to_string())),
            ..Self::concrete(String::new())
        })
    }
}

pub(crate) struct NavigatorInner {
    scope: Arc<Scope>,
    uri: Option<String>,
    template_uri: Option<String>,
    template_variables: BTreeSet<String>,
    template_args: Map<String, Value>,
    method: String,
    templated: bool,
    idempotent: bool,
    method_validation: bool,
    parent: Option<Navigator>,
    resource: RwLock<Resource>,
}

impl NavigatorInner {
    fn new(scope: Arc<Scope>, blueprint: Blueprint) -> Arc<Self> {
        let Blueprint {
            uri,
            template_uri,
            template_variables,
            template_args,
            method,
            templated,
            idempotent,
            method_validation,
            parent,
            title,
            profile,
            content_type,
        } = blueprint;

        Arc::new(Self {
            scope,
            uri,
            template_uri,
            template_variables,
            template_args,
            method,
            templated,
            idempotent,
            method_validation,
            parent,
            resource: RwLock::new(Resource {
                title,
                profile,
                content_type,
                ..Resource::default()
            }),
        })
    }
}

/// A handle on one resource of a HAL+JSON API.
///
/// Clones share the same resource. Use [`Navigator::ptr_eq`] to test whether
/// two handles denote the same instance; `==` compares URI and API name.
#[derive(Clone)]
pub struct Navigator {
    inner: Arc<NavigatorInner>,
}

impl Navigator {
    /// Create a root navigator with default settings.
    ///
    /// A missing scheme defaults to `http://`.
    pub fn new(root: &str) -> Result<Self> {
        Self::builder(root).build()
    }

    /// Start configuring a root navigator.
    pub fn builder(root: impl Into<String>) -> NavigatorBuilder {
        NavigatorBuilder::new(root)
    }

    /// Create a root navigator populated from a HAL document instead of a
    /// network round trip.
    ///
    /// # Errors
    ///
    /// [`NavigatorError::NotJson`] if `body` is not JSON.
    pub fn from_hal_json(root: &str, body: &str) -> Result<Self> {
        Self::builder(root).build_from_hal_json(body)
    }

    fn from_inner(inner: Arc<NavigatorInner>) -> Self {
        Self {
            inner,
        }
    }

    /// Whether both handles denote the same instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Absolute URI, `None` while templated.
    pub fn uri(&self) -> Option<&str> {
        self.inner.uri.as_deref()
    }

    /// Absolute URI template, `None` unless templated.
    pub fn template_uri(&self) -> Option<&str> {
        self.inner.template_uri.as_deref()
    }

    /// Variables the template needs before dereference.
    pub fn template_variables(&self) -> &BTreeSet<String> {
        &self.inner.template_variables
    }

    /// Arguments bound by previous partial expansions.
    pub fn template_args(&self) -> &Map<String, Value> {
        &self.inner.template_args
    }

    /// HTTP method the link to this resource advertised.
    pub fn method(&self) -> &str {
        &self.inner.method
    }

    pub fn is_templated(&self) -> bool {
        self.inner.templated
    }

    /// `false` only for navigators produced by POST or DELETE responses.
    pub fn is_idempotent(&self) -> bool {
        self.inner.idempotent
    }

    /// Whether the advertised method is checked before each verb.
    pub fn method_validation(&self) -> bool {
        self.inner.method_validation
    }

    /// Idempotent and concrete: eligible for the identity registry.
    pub fn cacheable(&self) -> bool {
        self.inner.idempotent && !self.inner.templated
    }

    /// The API root every URI of this tree is relative to.
    pub fn root(&self) -> &str {
        &self.inner.scope.root
    }

    pub fn api_name(&self) -> &str {
        &self.inner.scope.api_name
    }

    /// Default CURIE prefix tried for unknown relations.
    pub fn default_curie(&self) -> Option<&str> {
        self.inner.scope.default_curie.as_deref()
    }

    /// The navigator a POST or DELETE was issued on, for non-idempotent
    /// responses.
    pub fn parent(&self) -> Option<&Self> {
        self.inner.parent.as_ref()
    }

    pub fn fetch_state(&self) -> FetchState {
        self.read().fetch_state
    }

    pub fn title(&self) -> Option<String> {
        self.read().title.clone()
    }

    pub fn profile(&self) -> Option<String> {
        self.read().profile.clone()
    }

    pub fn content_type(&self) -> Option<String> {
        self.read().content_type.clone()
    }

    /// CURIE prefixes declared by the last representation.
    pub fn curies(&self) -> Curies {
        self.read().curies.clone()
    }

    /// The last response received by this navigator.
    pub fn response(&self) -> Option<HttpResponse> {
        self.read().response.clone()
    }

    /// Body text of the last response.
    pub fn raw_body(&self) -> Option<String> {
        self.read().response.as_ref().map(|r| r.body.clone())
    }

    /// Status code and reason phrase of the last response.
    pub fn status(&self) -> Option<(u16, String)> {
        self.read().response.as_ref().map(|r| (r.status, r.reason.clone()))
    }

    /// Replace the credentials used by every navigator of this tree.
    pub fn authenticate(&self, auth: Auth) {
        let mut slot = self.inner.scope.session.auth.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(auth);
    }

    /// URI (or template URI) with the API root replaced by `/`.
    pub fn relative_uri(&self) -> String {
        let target = self.uri().or(self.template_uri()).unwrap_or_default();
        uri::relative_to(self.root(), target)
    }

    /// Whether this very instance is the one registered for its URI.
    pub fn is_registered(&self) -> bool {
        self.uri()
            .and_then(|uri| self.inner.scope.registry.get(uri))
            .is_some_and(|live| Arc::ptr_eq(&live, &self.inner))
    }

    /// The live registered navigator for `uri` in this tree, if any.
    pub fn lookup(&self, uri: &str) -> Option<Self> {
        self.inner.scope.registry.get(uri).map(Self::from_inner)
    }

    /// Number of live registered navigators in this tree.
    pub fn registry_len(&self) -> usize {
        self.inner.scope.registry.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, Resource> {
        self.inner.resource.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Resource> {
        self.inner.resource.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Static fields plus current metadata, as a base for derived navigators.
    fn blueprint(&self) -> Blueprint {
        let resource = self.read();
        Blueprint {
            uri: self.inner.uri.clone(),
            template_uri: self.inner.template_uri.clone(),
            template_variables: self.inner.template_variables.clone(),
            template_args: self.inner.template_args.clone(),
            method: self.inner.method.clone(),
            templated: self.inner.templated,
            idempotent: self.inner.idempotent,
            method_validation: self.inner.method_validation,
            parent: self.inner.parent.clone(),
            title: resource.title.clone(),
            profile: resource.profile.clone(),
            content_type: resource.content_type.clone(),
        }
    }

    /// Build a navigator in this tree, registering it when cacheable.
    ///
    /// A live navigator already registered under the same URI wins over the
    /// blueprint.
    fn derive(&self, blueprint: Blueprint) -> Self {
        let scope = &self.inner.scope;
        match blueprint.uri.clone() {
            Some(uri) if blueprint.idempotent && !blueprint.templated => {
                let inner = scope
                    .registry
                    .get_or_insert_with(&uri, || NavigatorInner::new(Arc::clone(scope), blueprint));
                Self::from_inner(inner)
            }
            _ => self.detached(blueprint),
        }
    }

    /// Build a navigator in this tree that never enters the registry.
    fn detached(&self, blueprint: Blueprint) -> Self {
        Self::from_inner(NavigatorInner::new(Arc::clone(&self.inner.scope), blueprint))
    }

    /// The navigator a link points at.
    fn navigator_for(&self, link: &Link) -> Result<Self> {
        Ok(self.derive(Blueprint::from_link(link)?))
    }

    fn navigators_for(&self, value: &LinkValue<Link>) -> Result<LinkValue<Self>> {
        Ok(match value {
            LinkValue::Single(link) => LinkValue::Single(self.navigator_for(link)?),
            LinkValue::Multiple(links) => {
                LinkValue::Multiple(links.iter().map(|link| self.navigator_for(link)).collect::<Result<_>>()?)
            }
        })
    }

    /// The concrete URI, or why there is none.
    fn require_uri(&self, operation: &str) -> Result<String> {
        match (&self.inner.uri, &self.inner.template_uri) {
            (Some(uri), _) => Ok(uri.clone()),
            (None, template_uri) => Err(NavigatorError::AmbiguousNavigation {
                operation: operation.to_string(),
                template_uri: template_uri.clone().unwrap_or_default(),
            }),
        }
    }

    /// Issue one request through the session's transport.
    async fn send(
        &self,
        method: Verb,
        uri: &str,
        body: Option<String>,
        extra_headers: BTreeMap<String, String>,
        follow_redirects: bool,
    ) -> Result<HttpResponse> {
        let session = &self.inner.scope.session;
        let mut headers = session.headers.clone();
        for (name, value) in extra_headers {
            set_header(&mut headers, &name, value);
        }

        let request = HttpRequest {
            method,
            uri: uri.to_string(),
            headers,
            body,
            auth: session.auth(),
            follow_redirects,
        };
        debug!("{} {}", method, uri);
        let response = session.transport.perform(request).await?;
        debug!("{} {} -> {} {}", method, uri, response.status, response.reason);
        Ok(response)
    }
}

/// Insert a header, replacing any entry whose name differs only in case.
pub(crate) fn set_header(headers: &mut BTreeMap<String, String>, name: &str, value: String) {
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value);
}

impl PartialEq for Navigator {
    fn eq(&self, other: &Self) -> bool {
        self.uri() == other.uri() && self.api_name() == other.api_name()
    }
}

impl fmt::Display for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Navigator({}{})", self.api_name(), uri::display_path(&self.relative_uri()))
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("uri", &self.inner.uri)
            .field("template_uri", &self.inner.template_uri)
            .field("method", &self.inner.method)
            .field("idempotent", &self.inner.idempotent)
            .field("fetch_state", &self.fetch_state())
            .finish_non_exhaustive()
    }
}
