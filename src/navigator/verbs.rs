//! Non-idempotent verbs: POST and DELETE.
//!
//! Neither verb touches the navigator it is issued on beyond recording the
//! last response. The answer is interpreted as follows:
//!
//! | Response                                        | Outcome                                |
//! |-------------------------------------------------|----------------------------------------|
//! | 201, 302, 303 or 204 with a `Location` header   | navigator at that location             |
//! | 200                                             | non-idempotent response navigator      |
//! | anything else                                   | [`VerbOutcome::Status`] for inspection |
//!
//! With `raise_on_error` (the default) a 4xx or 5xx status fails with
//! [`NavigatorError::Remote`](crate::core::NavigatorError::Remote) before any
//! interpretation. Redirect statuses are never followed for these verbs, so a
//! 302 or 303 reaches the table above.

use std::collections::BTreeMap;

use tracing::debug;

use super::guard::{self, Operation};
use super::{Blueprint, Navigator};
use crate::constants::APPLICATION_JSON;
use crate::core::Result;
use crate::http::{HttpResponse, RequestBody, Verb};
use crate::link::DEFAULT_METHOD;
use crate::uri;

/// Per-call settings for [`Navigator::create_with`] and
/// [`Navigator::delete_with`].
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Fail on non-2xx statuses (default `true`)
    pub raise_on_error: bool,
    /// `Content-Type` of the request body (default `application/json`)
    pub content_type: String,
    /// Extra headers for this request only
    pub headers: BTreeMap<String, String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            raise_on_error: true,
            content_type: APPLICATION_JSON.to_string(),
            headers: BTreeMap::new(),
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn raise_on_error(mut self, raise: bool) -> Self {
        self.raise_on_error = raise;
        self
    }

    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// What a POST or DELETE produced.
#[derive(Debug, Clone)]
pub enum VerbOutcome {
    /// A navigator for the created or referenced resource, or for the
    /// response itself
    Resource(Navigator),
    /// Any other answer: the status line, for the caller to inspect
    Status {
        /// Status code
        code: u16,
        /// Reason phrase
        reason: String,
    },
}

impl VerbOutcome {
    /// The navigator, if the outcome is one.
    pub fn navigator(&self) -> Option<&Navigator> {
        match self {
            Self::Resource(nav) => Some(nav),
            Self::Status {
                ..
            } => None,
        }
    }

    /// Consume into the navigator, if the outcome is one.
    pub fn into_navigator(self) -> Option<Navigator> {
        match self {
            Self::Resource(nav) => Some(nav),
            Self::Status {
                ..
            } => None,
        }
    }

    pub const fn is_resource(&self) -> bool {
        matches!(self, Self::Resource(_))
    }
}

impl Navigator {
    /// POST `body` with default [`RequestOptions`].
    ///
    /// Maps and JSON values are sent as compact JSON; strings as they are.
    pub async fn create(&self, body: impl Into<RequestBody>) -> Result<VerbOutcome> {
        self.create_with(body, RequestOptions::default()).await
    }

    /// POST `body`.
    ///
    /// Only allowed on concrete navigators; when the method is validated the
    /// link must advertise `POST`.
    pub async fn create_with(&self, body: impl Into<RequestBody>, options: RequestOptions) -> Result<VerbOutcome> {
        guard::check(self, Operation::Create)?;
        self.issue(Verb::Post, body.into(), options).await
    }

    /// Alias of [`create`](Self::create).
    pub async fn post(&self, body: impl Into<RequestBody>) -> Result<VerbOutcome> {
        self.create(body).await
    }

    /// DELETE with default [`RequestOptions`] and no body.
    pub async fn delete(&self) -> Result<VerbOutcome> {
        self.delete_with(RequestBody::Empty, RequestOptions::default()).await
    }

    /// DELETE, optionally with a body.
    ///
    /// Only allowed on concrete navigators; when the method is validated the
    /// link must advertise `DELETE`.
    pub async fn delete_with(&self, body: impl Into<RequestBody>, options: RequestOptions) -> Result<VerbOutcome> {
        guard::check(self, Operation::Delete)?;
        self.issue(Verb::Delete, body.into(), options).await
    }

    async fn issue(&self, verb: Verb, body: RequestBody, options: RequestOptions) -> Result<VerbOutcome> {
        let uri = self.require_uri(&verb.as_str().to_ascii_lowercase())?;
        let payload = body.into_payload()?;

        let mut headers = options.headers;
        super::set_header(&mut headers, "Content-Type", options.content_type);

        let response = self.send(verb, &uri, payload, headers, false).await?;
        self.write().response = Some(response.clone());
        if options.raise_on_error && response.is_error() {
            return Err(self.remote_error(&uri, response));
        }

        self.interpret(verb, &uri, response)
    }

    fn interpret(&self, verb: Verb, uri: &str, response: HttpResponse) -> Result<VerbOutcome> {
        if matches!(response.status, 201 | 302 | 303 | 204) {
            if let Some(location) = response.location() {
                let target = uri::resolve(uri, location)?;
                debug!("{} {} created {}", verb, uri, target);
                return Ok(VerbOutcome::Resource(self.derive(Blueprint::concrete(target))));
            }
        }

        if response.status == 200 {
            return Ok(VerbOutcome::Resource(self.non_idempotent_response(response)));
        }

        Ok(VerbOutcome::Status {
            code: response.status,
            reason: response.reason,
        })
    }

    /// Wrap a 200 answer to POST or DELETE.
    ///
    /// The result shares this navigator's URI but is not idempotent, has no
    /// template, advertises GET with validation enabled and points back here
    /// through [`parent`](Self::parent). Its body is parsed tolerantly.
    fn non_idempotent_response(&self, response: HttpResponse) -> Navigator {
        let nir = self.detached(Blueprint {
            template_uri: None,
            template_variables: Default::default(),
            template_args: Default::default(),
            method: DEFAULT_METHOD.to_string(),
            templated: false,
            idempotent: false,
            method_validation: true,
            parent: Some(self.clone()),
            content_type: response.content_type().map(str::to_string),
            ..self.blueprint()
        });
        nir.populate_leniently(&response);
        nir.write().response = Some(response);
        nir
    }
}
