//! Root navigator construction.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::debug;

use super::{Blueprint, Navigator, NavigatorInner, Scope, Session, set_header};
use crate::config::NavigatorConfig;
use crate::constants::{ACCEPT_HAL_JSON, DEFAULT_REQUEST_TIMEOUT, HAL_JSON, default_user_agent};
use crate::core::{NavigatorError, Result};
use crate::http::{Auth, CachingTransport, HttpResponse, ReqwestTransport, Transport};
use crate::registry::IdentityRegistry;
use crate::uri;

/// Builder for root navigators.
///
/// Settings given here take precedence over a [`NavigatorConfig`] applied
/// with [`config`](Self::config), whatever the call order.
///
/// # Examples
///
/// ```rust,no_run
/// use hal_navigator::{Auth, Navigator};
///
/// # fn example() -> hal_navigator::Result<()> {
/// let api = Navigator::builder("https://api.example.com/")
///     .api_name("Example")
///     .curie("ex")
///     .header("X-Client", "reporting")
///     .auth(Auth::bearer("token"))
///     .cache(true)
///     .build()?;
/// # let _ = api;
/// # Ok(())
/// # }
/// ```
pub struct NavigatorBuilder {
    root: String,
    api_name: Option<String>,
    headers: BTreeMap<String, String>,
    auth: Option<Auth>,
    transport: Option<Arc<dyn Transport>>,
    cache: Option<bool>,
    curie: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    config: Option<NavigatorConfig>,
}

impl NavigatorBuilder {
    /// Start from the API root. A missing scheme defaults to `http://`.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            api_name: None,
            headers: BTreeMap::new(),
            auth: None,
            transport: None,
            cache: None,
            curie: None,
            timeout: None,
            user_agent: None,
            config: None,
        }
    }

    /// Display name, derived from the host when not set.
    #[must_use]
    pub fn api_name(mut self, name: impl Into<String>) -> Self {
        self.api_name = Some(name.into());
        self
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add headers sent with every request.
    #[must_use]
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    #[must_use]
    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Use `transport` instead of a [`ReqwestTransport`].
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Wrap the transport in a [`CachingTransport`].
    #[must_use]
    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache = Some(enabled);
        self
    }

    /// Default CURIE prefix tried for relations given without one.
    #[must_use]
    pub fn curie(mut self, prefix: impl Into<String>) -> Self {
        self.curie = Some(prefix.into());
        self
    }

    /// Request timeout of the default transport.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Fill unset options from `config`.
    #[must_use]
    pub fn config(mut self, config: NavigatorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the root navigator, unfetched.
    ///
    /// # Errors
    ///
    /// [`NavigatorError::BadScheme`], [`NavigatorError::AmbiguousScheme`] or
    /// [`NavigatorError::InvalidUri`] for a bad root;
    /// [`NavigatorError::Config`] if the HTTP client cannot be created.
    pub fn build(self) -> Result<Navigator> {
        let config = self.config.unwrap_or_default();

        let fixed = uri::fix_scheme(&self.root)?;
        // Canonical form, so links back to the root resolve to the same key
        let root = url::Url::parse(&fixed)
            .map_err(|e| NavigatorError::InvalidUri {
                uri: fixed.clone(),
                reason: e.to_string(),
            })?
            .to_string();

        let mut transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let timeout = self.timeout.or(config.timeout()).unwrap_or(DEFAULT_REQUEST_TIMEOUT);
                Arc::new(ReqwestTransport::with_timeout(timeout)?)
            }
        };
        if self.cache.unwrap_or(config.cache) {
            transport = Arc::new(CachingTransport::new(transport));
        }

        let mut headers = BTreeMap::new();
        set_header(&mut headers, "Accept", ACCEPT_HAL_JSON.to_string());
        let user_agent = self.user_agent.or(config.user_agent).unwrap_or_else(default_user_agent);
        set_header(&mut headers, "User-Agent", user_agent);
        for (name, value) in config.headers.into_iter().chain(self.headers) {
            set_header(&mut headers, &name, value);
        }

        let scope = Arc::new(Scope {
            root: root.clone(),
            api_name: self.api_name.or(config.api_name).unwrap_or_else(|| uri::namify(&root)),
            default_curie: self.curie.or(config.curie),
            session: Session {
                transport,
                headers,
                auth: RwLock::new(self.auth.or(config.auth)),
            },
            registry: IdentityRegistry::new(),
        });

        let inner = NavigatorInner::new(Arc::clone(&scope), Blueprint::concrete(root.clone()));
        scope.registry.insert(&root, &inner);
        debug!("Created navigator for {} ({})", root, scope.api_name);
        Ok(Navigator::from_inner(inner))
    }

    /// Build the root navigator and populate it from a HAL document.
    ///
    /// # Errors
    ///
    /// As [`build`](Self::build), plus [`NavigatorError::NotJson`] if `body`
    /// is not JSON.
    pub fn build_from_hal_json(self, body: &str) -> Result<Navigator> {
        let navigator = self.build()?;
        let document = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(_) => {
                return Err(NavigatorError::NotJson {
                    uri: navigator.root().to_string(),
                    response: Box::new(HttpResponse::new(200, body).with_header("Content-Type", HAL_JSON)),
                });
            }
        };
        navigator.populate_document(&document)?;
        Ok(navigator)
    }
}
