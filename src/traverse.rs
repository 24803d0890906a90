//! Scripted traversals.
//!
//! A [`Traversal`] follows a fixed sequence of relations from a root, expanding
//! templated links with a shared set of parameters and issuing POST where a
//! step asks for it:
//!
//! ```rust,no_run
//! use hal_navigator::{Navigator, Traversal, TraversalStep};
//! use serde_json::json;
//!
//! # async fn example() -> hal_navigator::Result<()> {
//! let root = Navigator::new("http://shop.example.com/")?;
//! let products = Traversal::new(root)
//!     .with_parameter("channel", "online")
//!     .follow([TraversalStep::post("create_basket", json!({})), "products".into()])
//!     .await?;
//! println!("{:?}", products.links().await?);
//! # Ok(())
//! # }
//! ```

use serde_json::{Map, Value};
use tracing::debug;

use crate::core::{NavigatorError, Result};
use crate::http::RequestBody;
use crate::navigator::{Navigator, RequestOptions, VerbOutcome};

/// One step of a [`Traversal`].
#[derive(Debug, Clone)]
pub struct TraversalStep {
    rel: String,
    post: Option<(RequestBody, RequestOptions)>,
}

impl TraversalStep {
    /// Follow `rel`.
    pub fn rel(rel: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            post: None,
        }
    }

    /// Follow `rel`, then POST `body` to it and continue from the result.
    pub fn post(rel: impl Into<String>, body: impl Into<RequestBody>) -> Self {
        Self::post_with(rel, body, RequestOptions::default())
    }

    /// Like [`post`](Self::post) with explicit request options.
    pub fn post_with(rel: impl Into<String>, body: impl Into<RequestBody>, options: RequestOptions) -> Self {
        Self {
            rel: rel.into(),
            post: Some((body.into(), options)),
        }
    }

    pub fn relation(&self) -> &str {
        &self.rel
    }
}

impl From<&str> for TraversalStep {
    fn from(rel: &str) -> Self {
        Self::rel(rel)
    }
}

impl From<String> for TraversalStep {
    fn from(rel: String) -> Self {
        Self::rel(rel)
    }
}

/// Follows relation sequences from a root navigator.
#[derive(Debug, Clone)]
pub struct Traversal {
    root: Navigator,
    template_parameters: Map<String, Value>,
}

impl Traversal {
    pub fn new(root: Navigator) -> Self {
        Self {
            root,
            template_parameters: Map::new(),
        }
    }

    /// Parameters used to expand every templated link met on the way.
    #[must_use]
    pub fn with_template_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.template_parameters.extend(parameters);
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.template_parameters.insert(name.into(), value.into());
        self
    }

    /// Follow `steps` from the root and return where they lead.
    ///
    /// # Errors
    ///
    /// Any error of the underlying selections and verbs, and
    /// [`NavigatorError::UnexpectedStatus`] when a POST step answers without
    /// a resource.
    pub async fn follow<I, S>(&self, steps: I) -> Result<Navigator>
    where
        I: IntoIterator<Item = S>,
        S: Into<TraversalStep>,
    {
        let mut cursor = self.root.clone();
        for step in steps {
            let step = step.into();
            cursor = cursor.rel(&step.rel).await?;
            if cursor.is_templated() {
                cursor = cursor.expand(self.template_parameters.clone())?;
            }
            debug!("traversal reached {}", cursor);

            if let Some((body, options)) = step.post {
                let uri = cursor.uri().unwrap_or_default().to_string();
                cursor = match cursor.create_with(body, options).await? {
                    VerbOutcome::Resource(next) => next,
                    VerbOutcome::Status {
                        code,
                        reason,
                    } => {
                        return Err(NavigatorError::UnexpectedStatus {
                            method: "POST".to_string(),
                            uri,
                            status: code,
                            reason,
                        });
                    }
                };
            }
        }
        Ok(cursor)
    }
}
