//! Subselection: moving from a navigator to related navigators.
//!
//! A [`Selector`] is a path of relation names and list indexes, optionally
//! followed by template arguments:
//!
//! ```text
//! Selector::rel("ht:users")                          users
//! Selector::rel("ht:posts").index(0)                 first post
//! Selector::rel("ht:me").then("ht:posts")            posts of the current user
//! Selector::rel("ht:user").param("name", "mike")     expand the user template
//! Selector::rel("search").slug()                     expand with every variable unset
//! Selector::rel("search").param("q", "x").keep_templated()
//! ```
//!
//! Each relation step fetches the current navigator first if it is idempotent
//! and was never fetched. A relation holding a one-element array unwraps to
//! that element.

use std::collections::BTreeMap;

use futures::stream::{self, Stream};
use serde_json::{Map, Value};
use strsim::levenshtein;

use super::guard::{self, Operation};
use super::Navigator;
use crate::constants::REL_NEXT;
use crate::core::{NavigatorError, Result};
use crate::link::LinkValue;

/// One step of a [`Selector`] path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Follow a relation
    Rel(String),
    /// Pick an entry of a multi-valued relation
    Index(usize),
}

/// A dereference path with optional template arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    steps: Vec<Step>,
    params: Map<String, Value>,
    slug: bool,
    keep_templated: bool,
}

impl Selector {
    /// An empty path, selecting the navigator itself.
    pub fn new() -> Self {
        Self::default()
    }

    /// A path starting with relation `rel`.
    pub fn rel(rel: impl Into<String>) -> Self {
        Self::new().then(rel)
    }

    /// Follow relation `rel` next.
    #[must_use]
    pub fn then(mut self, rel: impl Into<String>) -> Self {
        self.steps.push(Step::Rel(rel.into()));
        self
    }

    /// Pick entry `index` of the current relation.
    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.steps.push(Step::Index(index));
        self
    }

    /// Bind a template variable of the final navigator.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Bind several template variables of the final navigator.
    #[must_use]
    pub fn params(mut self, params: Map<String, Value>) -> Self {
        self.params.extend(params);
        self
    }

    /// Expand the final navigator even without arguments.
    #[must_use]
    pub fn slug(mut self) -> Self {
        self.slug = true;
        self
    }

    /// Expand the final navigator partially, keeping it templated.
    #[must_use]
    pub fn keep_templated(mut self) -> Self {
        self.keep_templated = true;
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    fn expands(&self) -> bool {
        self.slug || self.keep_templated || !self.params.is_empty()
    }
}

impl From<&str> for Selector {
    fn from(rel: &str) -> Self {
        Self::rel(rel)
    }
}

impl From<String> for Selector {
    fn from(rel: String) -> Self {
        Self::rel(rel)
    }
}

impl Navigator {
    /// Resolve a selector from this navigator.
    ///
    /// # Errors
    ///
    /// - [`NavigatorError::SelectorSyntax`] for `slug` combined with
    ///   `keep_templated`
    /// - [`NavigatorError::RelationNotFound`] for an unknown relation
    /// - [`NavigatorError::AmbiguousSelection`] when a relation with several
    ///   entries is followed or expanded without an index
    /// - [`NavigatorError::IndexOutOfRange`] for an index past the end
    pub async fn select(&self, selector: impl Into<Selector>) -> Result<LinkValue<Navigator>> {
        let selector = selector.into();
        guard::check(self, Operation::Select)?;
        if selector.slug && selector.keep_templated {
            return Err(NavigatorError::SelectorSyntax {
                message: "slug and keep_templated cannot be combined".to_string(),
            });
        }

        let mut current = LinkValue::Single(self.clone());
        let mut last_rel = String::new();
        for step in &selector.steps {
            match step {
                Step::Rel(rel) => {
                    let from = single(current, &last_rel)?;
                    from.ensure_fetched().await?;
                    current = from.relation(rel)?.unwrap_single();
                    last_rel.clone_from(rel);
                }
                Step::Index(index) => {
                    let len = current.len();
                    let picked = current.get(*index).cloned().ok_or_else(|| NavigatorError::IndexOutOfRange {
                        rel: last_rel.clone(),
                        index: *index,
                        len,
                    })?;
                    current = LinkValue::Single(picked);
                }
            }
        }

        if selector.expands() {
            let target = single(current, &last_rel)?;
            let expanded = target.expand_with(selector.params, selector.keep_templated)?;
            return Ok(LinkValue::Single(expanded));
        }
        Ok(current)
    }

    /// Follow one relation to a single navigator.
    ///
    /// Fails with [`NavigatorError::AmbiguousSelection`] if the relation holds
    /// several entries.
    pub async fn rel(&self, rel: &str) -> Result<Navigator> {
        single(self.select(rel).await?, rel)
    }

    /// Whether `rel` is a link or embedded relation, falling back to the
    /// default CURIE as [`rel`](Self::rel) does. Fetches first when needed.
    pub async fn contains(&self, rel: &str) -> Result<bool> {
        self.ensure_fetched().await?;
        let resource = self.read();
        Ok(self.relation_key(rel, &resource.links, &resource.embedded).is_ok())
    }

    /// Documentation URI for a compact relation `prefix:suffix`.
    ///
    /// Relations without a declared prefix are returned unchanged.
    pub async fn docs_for(&self, rel: &str) -> Result<String> {
        self.ensure_fetched().await?;
        Ok(self.read().curies.expand(rel).unwrap_or_else(|| rel.to_string()))
    }

    /// The `next` page, if the resource links to one.
    pub async fn next_page(&self) -> Result<Option<Navigator>> {
        if self.contains(REL_NEXT).await? {
            self.rel(REL_NEXT).await.map(Some)
        } else {
            Ok(None)
        }
    }

    /// This navigator followed by each successive `next` page.
    ///
    /// The stream ends after the first page without a `next` link, or after
    /// the first error.
    pub fn pages(&self) -> impl Stream<Item = Result<Navigator>> + Send + 'static {
        stream::unfold(Some(Ok(self.clone())), |pending: Option<Result<Navigator>>| async move {
            match pending? {
                Ok(page) => {
                    let next = page.next_page().await.transpose();
                    Some((Ok(page), next))
                }
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    /// Entries of relation `rel`, falling back to the default CURIE.
    fn relation(&self, rel: &str) -> Result<LinkValue<Navigator>> {
        let (links, embedded) = {
            let resource = self.read();
            let key = self.relation_key(rel, &resource.links, &resource.embedded)?;
            (resource.links.get(&key).cloned(), resource.embedded.get(&key).cloned())
        };
        match (links, embedded) {
            (Some(links), _) => self.navigators_for(&links),
            (None, Some(embedded)) => Ok(embedded),
            (None, None) => Err(NavigatorError::RelationNotFound {
                rel: rel.to_string(),
                suggestion: None,
            }),
        }
    }

    fn relation_key<L, E>(
        &self,
        rel: &str,
        links: &BTreeMap<String, L>,
        embedded: &BTreeMap<String, E>,
    ) -> Result<String> {
        let known = |key: &str| links.contains_key(key) || embedded.contains_key(key);
        if known(rel) {
            return Ok(rel.to_string());
        }
        if let Some(curie) = self.default_curie() {
            let prefixed = format!("{curie}:{rel}");
            if known(&prefixed) {
                return Ok(prefixed);
            }
        }

        let suggestion = links
            .keys()
            .chain(embedded.keys())
            .map(|key| (key, levenshtein(rel, key)))
            .filter(|(_, distance)| *distance <= (rel.len() / 3).max(2))
            .min_by_key(|(_, distance)| *distance)
            .map(|(key, _)| key.clone());
        Err(NavigatorError::RelationNotFound {
            rel: rel.to_string(),
            suggestion,
        })
    }
}

fn single(value: LinkValue<Navigator>, rel: &str) -> Result<Navigator> {
    match value.unwrap_single() {
        LinkValue::Single(nav) => Ok(nav),
        LinkValue::Multiple(items) => Err(NavigatorError::AmbiguousSelection {
            rel: rel.to_string(),
            count: items.len(),
        }),
    }
}
