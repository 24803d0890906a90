//! HAL link model: `_links` entries, multi-valued relations and CURIEs.
//!
//! A relation maps either to one link object or to a JSON array of them. The
//! distinction is kept explicitly in [`LinkValue`] and array order is
//! preserved. The reserved relations `self` and `curies` describe the resource
//! itself and are never part of the traversable link set.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::warn;

use crate::constants::{REL_CURIES, REL_SELF};
use crate::core::Result;
use crate::template::{self, UriTemplate};
use crate::uri;

/// Default method advertised by a link without a `method` member.
pub const DEFAULT_METHOD: &str = "GET";

/// One entry under `_links`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Relation the link was found under
    pub rel: String,
    /// Raw `href`, before resolution
    pub href: String,
    /// Absolute URI (`None` when templated)
    pub uri: Option<String>,
    /// Absolute URI template (`None` unless templated)
    pub template_uri: Option<String>,
    /// Whether `href` is a URI template
    pub templated: bool,
    /// HTTP method the link accepts, `GET` unless advertised otherwise
    pub method: String,
    /// Human-readable title
    pub title: Option<String>,
    /// Expected media type of the target
    pub media_type: Option<String>,
    /// Profile URI of the target
    pub profile: Option<String>,
    /// Secondary key among links sharing a relation
    pub name: Option<String>,
}

impl Link {
    /// Build a link from its JSON object, resolving `href` against `base`.
    ///
    /// Returns `Ok(None)` for entries that are not link objects (no string
    /// `href`); these are skipped rather than treated as errors.
    pub fn from_json(rel: &str, value: &Value, base: &str) -> Result<Option<Self>> {
        let Some(object) = value.as_object() else {
            return Ok(None);
        };
        let Some(href) = object.get("href").and_then(Value::as_str) else {
            return Ok(None);
        };

        let templated = object.get("templated").and_then(Value::as_bool).unwrap_or(false);
        let (uri, template_uri) = if templated {
            (None, Some(uri::resolve_template(base, href)?))
        } else {
            (Some(uri::resolve(base, href)?), None)
        };
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        Ok(Some(Self {
            rel: rel.to_string(),
            href: href.to_string(),
            uri,
            template_uri,
            templated,
            method: text("method").unwrap_or_else(|| DEFAULT_METHOD.to_string()),
            title: text("title"),
            media_type: text("type"),
            profile: text("profile"),
            name: text("name"),
        }))
    }

    /// The URI or, for templated links, the template URI.
    pub fn target(&self) -> &str {
        self.uri.as_deref().or(self.template_uri.as_deref()).unwrap_or(&self.href)
    }
}

/// A relation's value: one entry or an ordered sequence of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkValue<T> {
    /// The relation held a single object
    Single(T),
    /// The relation held a JSON array, in source order
    Multiple(Vec<T>),
}

impl<T> LinkValue<T> {
    /// Number of entries.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multiple(items) => items.len(),
        }
    }

    /// Whether there are no entries (an empty array).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        match self {
            Self::Single(item) if index == 0 => Some(item),
            Self::Single(_) => None,
            Self::Multiple(items) => items.get(index),
        }
    }

    /// Iterate over entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Self::Single(item) => std::slice::from_ref(item).iter(),
            Self::Multiple(items) => items.iter(),
        }
    }

    /// Collapse a single-element sequence into `Single`.
    #[must_use]
    pub fn unwrap_single(self) -> Self {
        match self {
            Self::Multiple(mut items) if items.len() == 1 => Self::Single(items.remove(0)),
            other => other,
        }
    }

    /// The entry if this is `Single`.
    pub fn as_single(&self) -> Option<&T> {
        match self {
            Self::Single(item) => Some(item),
            Self::Multiple(_) => None,
        }
    }

    /// Every entry, in order.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Single(item) => vec![item],
            Self::Multiple(items) => items,
        }
    }

    /// Map every entry, keeping the shape.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> LinkValue<U> {
        match self {
            Self::Single(item) => LinkValue::Single(f(item)),
            Self::Multiple(items) => LinkValue::Multiple(items.into_iter().map(f).collect()),
        }
    }

    /// Map every entry by reference, keeping the shape.
    pub fn map_ref<U>(&self, mut f: impl FnMut(&T) -> U) -> LinkValue<U> {
        match self {
            Self::Single(item) => LinkValue::Single(f(item)),
            Self::Multiple(items) => LinkValue::Multiple(items.iter().map(f).collect()),
        }
    }
}

impl<'a, T> IntoIterator for &'a LinkValue<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Traversable links of a resource, keyed by relation.
pub type Links = BTreeMap<String, LinkValue<Link>>;

/// Build the traversable link set from a HAL body.
///
/// `self` and `curies` are skipped. Entries that are not link objects are
/// dropped with a warning.
pub fn parse_links(body: &Map<String, Value>, base: &str) -> Result<Links> {
    let mut links = Links::new();
    let Some(raw) = body.get("_links").and_then(Value::as_object) else {
        return Ok(links);
    };

    for (rel, value) in raw {
        if rel == REL_SELF || rel == REL_CURIES {
            continue;
        }
        let parsed = match value {
            Value::Array(items) => {
                let mut links = Vec::with_capacity(items.len());
                for item in items {
                    match Link::from_json(rel, item, base)? {
                        Some(link) => links.push(link),
                        None => warn!("Skipping malformed link under '{}'", rel),
                    }
                }
                LinkValue::Multiple(links)
            }
            single => match Link::from_json(rel, single, base)? {
                Some(link) => LinkValue::Single(link),
                None => {
                    warn!("Skipping malformed link under '{}'", rel);
                    continue;
                }
            },
        };
        links.insert(rel.clone(), parsed);
    }
    Ok(links)
}

/// The resource's own link (first entry if `self` is an array).
pub fn self_link(body: &Map<String, Value>) -> Option<&Map<String, Value>> {
    let value = body.get("_links")?.get(REL_SELF)?;
    match value {
        Value::Array(items) => items.first()?.as_object(),
        other => other.as_object(),
    }
}

/// CURIE prefix to documentation URI template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Curies(BTreeMap<String, String>);

impl Curies {
    /// Read `_links.curies` (array or single object) from a HAL body.
    pub fn from_body(body: &Map<String, Value>, base: &str) -> Self {
        let mut curies = BTreeMap::new();
        let entries = match body.get("_links").and_then(|l| l.get(REL_CURIES)) {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(single @ Value::Object(_)) => vec![single],
            _ => Vec::new(),
        };
        for entry in entries {
            let name = entry.get("name").and_then(Value::as_str);
            let href = entry.get("href").and_then(Value::as_str);
            if let (Some(name), Some(href)) = (name, href) {
                let href = uri::resolve_template(base, href).unwrap_or_else(|_| href.to_string());
                curies.insert(name.to_string(), href);
            }
        }
        Self(curies)
    }

    /// Template registered for `prefix`.
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.0.get(prefix).map(String::as_str)
    }

    /// Whether no CURIE is declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(prefix, template)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Documentation URI for a compact relation `prefix:suffix`.
    ///
    /// Returns `None` when the relation has no prefix or the prefix is not
    /// declared.
    pub fn expand(&self, rel: &str) -> Option<String> {
        let (prefix, suffix) = rel.split_once(':')?;
        let template = UriTemplate::parse(self.get(prefix)?).ok()?;
        let mut bindings = Map::new();
        bindings.insert("rel".to_string(), Value::String(suffix.to_string()));
        Some(template.expand(&bindings))
    }
}

/// Variable names of a link's template (empty for plain links).
pub fn link_variables(link: &Link) -> Result<std::collections::BTreeSet<String>> {
    match &link.template_uri {
        Some(template_uri) => template::variables(template_uri),
        None => Ok(Default::default()),
    }
}
