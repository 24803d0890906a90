//! Identity registry: canonical URI to weak navigator handle.
//!
//! Every navigator derived from one root shares a single registry, so two links
//! to the same URI anywhere in the graph resolve to the same instance for as
//! long as somebody outside the registry holds it. Entries are [`Weak`]: the
//! registry never keeps a navigator alive on its own. Dead entries are
//! invisible to lookups immediately and are physically pruned on later
//! inserts.
//!
//! Access is guarded per shard by [`DashMap`], so a registry can be shared
//! between tasks.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::trace;

/// Inserts between two sweeps of dead entries.
const PRUNE_INTERVAL: usize = 32;

/// URI keyed map of weak handles.
pub struct IdentityRegistry<T> {
    entries: DashMap<String, Weak<T>>,
    inserts: AtomicUsize,
}

impl<T> fmt::Debug for IdentityRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityRegistry").field("live", &self.len()).finish()
    }
}

impl<T> Default for IdentityRegistry<T> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            inserts: AtomicUsize::new(0),
        }
    }
}

impl<T> IdentityRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The live value registered under `uri`.
    pub fn get(&self, uri: &str) -> Option<Arc<T>> {
        self.entries.get(uri).and_then(|weak| weak.upgrade())
    }

    /// Whether a live value is registered under `uri`.
    pub fn contains(&self, uri: &str) -> bool {
        self.entries.get(uri).is_some_and(|weak| weak.strong_count() > 0)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.value().strong_count() > 0).count()
    }

    /// Whether there are no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register `value` under `uri`, replacing whatever was there.
    pub fn insert(&self, uri: &str, value: &Arc<T>) {
        self.entries.insert(uri.to_string(), Arc::downgrade(value));
        self.after_insert();
    }

    /// Return the live value under `uri`, or register the one built by `make`.
    ///
    /// `make` runs while the entry is locked, so concurrent callers for the
    /// same URI observe a single instance. It must not touch the registry.
    pub fn get_or_insert_with(&self, uri: &str, make: impl FnOnce() -> Arc<T>) -> Arc<T> {
        let value = match self.entries.entry(uri.to_string()) {
            Entry::Occupied(mut occupied) => {
                if let Some(live) = occupied.get().upgrade() {
                    trace!("registry hit for {}", uri);
                    return live;
                }
                let value = make();
                occupied.insert(Arc::downgrade(&value));
                value
            }
            Entry::Vacant(vacant) => {
                trace!("registry miss for {}", uri);
                let value = make();
                vacant.insert(Arc::downgrade(&value));
                value
            }
        };
        self.after_insert();
        value
    }

    /// Physically remove entries whose value has been dropped.
    pub fn prune(&self) {
        self.entries.retain(|_, weak| weak.strong_count() > 0);
    }

    fn after_insert(&self) {
        let count = self.inserts.fetch_add(1, Ordering::Relaxed) + 1;
        if count % PRUNE_INTERVAL == 0 {
            self.prune();
        }
    }
}
