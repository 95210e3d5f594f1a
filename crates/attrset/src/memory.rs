//! In-memory attribute store implementation
//!
//! [`InMemoryAttributeStore`] is the concrete store an entity embeds (or
//! shares behind an `Arc` when it also acts as a parent for other stores).
//! The backing map is a [`DashMap`], so the individual trait operations are
//! atomic without an outer lock.
//!
//! A store may be chained to at most one parent through a non-owning `Weak`
//! link; [`resolve_attribute`] walks the chain iteratively, and a parent that
//! has been dropped simply ends the chain.
//!
//! [`resolve_attribute`]: crate::store::AttributeStore::resolve_attribute

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use dashmap::DashMap;
use derive_more::Display;
use tracing::{debug, trace, warn};

use crate::error::{AttributeError, AttributeResult};
use crate::key::{AttributeKey, KeyId};
use crate::store::{AttributeStore, AttributeValue};

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an [`InMemoryAttributeStore`]
///
/// Used for hierarchy cycle checks and log output.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[display("{_0}")]
pub struct StoreId(u64);

impl StoreId {
    fn next() -> Self {
        Self(NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

type ErasedValue = Box<dyn Any + Send + Sync>;

/// Concurrent in-memory implementation of [`AttributeStore`]
///
/// The store lives as long as the entity that embeds it. Parent links are
/// `Weak`, so a store never keeps its parent alive; once the parent is gone,
/// resolution stops at this store.
pub struct InMemoryAttributeStore {
    id: StoreId,
    entries: DashMap<KeyId, ErasedValue>,
    parent: RwLock<Option<Weak<InMemoryAttributeStore>>>,
}

impl Default for InMemoryAttributeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAttributeStore {
    /// Create a new store with no parent
    pub fn new() -> Self {
        Self {
            id: StoreId::next(),
            entries: DashMap::new(),
            parent: RwLock::new(None),
        }
    }

    /// Create a new store whose lookups fall back to `parent`
    pub fn with_parent(parent: &Arc<InMemoryAttributeStore>) -> Self {
        Self {
            id: StoreId::next(),
            entries: DashMap::new(),
            parent: RwLock::new(Some(Arc::downgrade(parent))),
        }
    }

    /// This store's identity
    pub fn id(&self) -> StoreId {
        self.id
    }

    /// The current parent, if one is set and still alive
    pub fn parent(&self) -> Option<Arc<InMemoryAttributeStore>> {
        self.parent_link().and_then(|weak| weak.upgrade())
    }

    /// Re-wire the parent link, or clear it with `None`
    ///
    /// Fails with [`AttributeError::SelfParent`] if the store is offered as
    /// its own parent and with [`AttributeError::HierarchyCycle`] if the
    /// proposed parent's chain already contains this store. On failure the
    /// existing link is left untouched.
    pub fn set_parent(&self, parent: Option<&Arc<InMemoryAttributeStore>>) -> AttributeResult<()> {
        let link = match parent {
            Some(parent) => {
                if parent.id == self.id {
                    return Err(AttributeError::SelfParent(self.id));
                }

                let mut visited = vec![parent.id];
                let mut current = parent.parent();
                while let Some(ancestor) = current {
                    if ancestor.id == self.id {
                        return Err(AttributeError::HierarchyCycle {
                            child: self.id,
                            parent: parent.id,
                        });
                    }
                    if visited.contains(&ancestor.id) {
                        break;
                    }
                    visited.push(ancestor.id);
                    current = ancestor.parent();
                }

                Some(Arc::downgrade(parent))
            }
            None => None,
        };

        trace!(store = %self.id, parent = ?parent.map(|p| p.id), "Rewiring parent link");
        match self.parent.write() {
            Ok(mut guard) => *guard = link,
            // the slot is a plain Option; a writer that panicked elsewhere
            // cannot have left it torn
            Err(poisoned) => *poisoned.into_inner() = link,
        }
        Ok(())
    }

    fn parent_link(&self) -> Option<Weak<InMemoryAttributeStore>> {
        match self.parent.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AttributeStore for InMemoryAttributeStore {
    fn get_attribute<T: AttributeValue>(&self, key: &AttributeKey<T>) -> Option<T> {
        self.entries
            .get(&key.id())
            .and_then(|entry| entry.value().downcast_ref::<T>().cloned())
    }

    fn set_attribute<T: AttributeValue>(&self, key: &AttributeKey<T>, value: T) -> Option<T> {
        trace!(store = %self.id, key = %key, "Binding attribute");
        self.entries
            .insert(key.id(), Box::new(value))
            .and_then(|prev| prev.downcast::<T>().ok().map(|boxed| *boxed))
    }

    fn remove_attribute<T: AttributeValue>(&self, key: &AttributeKey<T>) -> Option<T> {
        trace!(store = %self.id, key = %key, "Removing attribute");
        self.entries
            .remove(&key.id())
            .and_then(|(_, prev)| prev.downcast::<T>().ok().map(|boxed| *boxed))
    }

    fn resolve_attribute<T: AttributeValue>(&self, key: &AttributeKey<T>) -> Option<T> {
        if let Some(value) = self.get_attribute(key) {
            return Some(value);
        }

        // Iterative walk; set_parent refuses cycles, but a racing re-wire can
        // still close one, so revisiting a store ends the walk.
        let mut visited = vec![self.id];
        let mut current = self.parent();
        while let Some(store) = current {
            if visited.contains(&store.id) {
                warn!(store = %store.id, key = %key, "Attribute hierarchy cycle, treating rest of chain as unbound");
                return None;
            }
            if let Some(value) = store.get_attribute(key) {
                return Some(value);
            }
            visited.push(store.id);
            current = store.parent();
        }
        None
    }

    fn attribute_count(&self) -> usize {
        self.entries.len()
    }

    fn attribute_keys(&self) -> Vec<KeyId> {
        self.entries.iter().map(|entry| *entry.key()).collect()
    }

    fn clear_attributes(&self) {
        debug!(store = %self.id, count = self.entries.len(), "Clearing attributes");
        self.entries.clear();
    }
}

impl fmt::Debug for InMemoryAttributeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryAttributeStore")
            .field("id", &self.id)
            .field("attributes", &self.entries.len())
            .field("parent", &self.parent().map(|p| p.id))
            .finish()
    }
}
