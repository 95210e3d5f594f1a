//! The attribute store capability trait
//!
//! [`AttributeStore`] is the contract an entity exposes when it lets callers
//! attach typed metadata to it. The three primitive operations (`get`, `set`,
//! `remove`) act on the entity's local bindings only; [`resolve_attribute`]
//! additionally consults the entity's parent chain, if it defines one, and
//! [`compute_attribute_if_absent`] is a derived operation layered purely on
//! the primitives.
//!
//! The trait uses generic methods and is therefore not usable as a trait
//! object; every call site names the concrete store (or is itself generic).
//!
//! [`resolve_attribute`]: AttributeStore::resolve_attribute
//! [`compute_attribute_if_absent`]: AttributeStore::compute_attribute_if_absent

use std::any::Any;

use crate::key::{AttributeKey, KeyId};

/// Bound on the value types an attribute may hold
///
/// Values are type-erased inside the store and cloned back out on reads, so
/// they must be `Any + Clone` and shareable across threads. Blanket-implemented
/// for every qualifying type; never implement it by hand.
pub trait AttributeValue: Any + Clone + Send + Sync {}

impl<T: Any + Clone + Send + Sync> AttributeValue for T {}

/// Capability to attach in-memory typed attributes to an entity
///
/// A store is a mapping from key identity to a value of that key's declared
/// type. Entries are created on first [`set_attribute`], overwritten by later
/// sets, and dropped by [`remove_attribute`]. An absent result is not an
/// error, and "never bound" is indistinguishable from "removed".
///
/// All operations are synchronous and non-blocking; the contract prescribes
/// no concurrency model beyond `Send + Sync`. See
/// [`compute_attribute_if_absent`] for the one operation with a documented
/// race window.
///
/// [`set_attribute`]: AttributeStore::set_attribute
/// [`remove_attribute`]: AttributeStore::remove_attribute
/// [`compute_attribute_if_absent`]: AttributeStore::compute_attribute_if_absent
pub trait AttributeStore: Send + Sync {
    /// Get the value bound to `key` in this store only
    ///
    /// Never consults the parent chain. Returns `None` if unbound.
    fn get_attribute<T: AttributeValue>(&self, key: &AttributeKey<T>) -> Option<T>;

    /// Bind `value` to `key`, returning the previously bound value
    ///
    /// A pure overwrite: any previous binding is replaced, never merged.
    fn set_attribute<T: AttributeValue>(&self, key: &AttributeKey<T>, value: T) -> Option<T>;

    /// Unbind `key`, returning the removed value
    ///
    /// Returns `None` if nothing was bound.
    fn remove_attribute<T: AttributeValue>(&self, key: &AttributeKey<T>) -> Option<T>;

    /// Resolve `key` through this store's hierarchy
    ///
    /// Like [`get_attribute`](AttributeStore::get_attribute), but on a local
    /// miss the implementor's parent chain (if any) is consulted and the
    /// first binding found walking upward wins. The default implementation
    /// has no hierarchy and resolves locally.
    fn resolve_attribute<T: AttributeValue>(&self, key: &AttributeKey<T>) -> Option<T> {
        self.get_attribute(key)
    }

    /// Get the locally bound value, computing and binding it if absent
    ///
    /// Checks the local bindings only (no hierarchy walk). If `key` is bound,
    /// its value is returned and `resolver` is not invoked. Otherwise
    /// `resolver` runs exactly once; a `Some` result is bound via
    /// [`set_attribute`](AttributeStore::set_attribute) and returned, while a
    /// `None` result leaves the store unmodified.
    ///
    /// This is a check-then-act sequence over the two primitives and is NOT
    /// atomic: under concurrent use the resolver may run in more than one
    /// caller, and a racing `set_attribute` may be clobbered by the final
    /// bind. Callers that need atomicity must serialize at a higher level.
    fn compute_attribute_if_absent<T, F>(&self, key: &AttributeKey<T>, resolver: F) -> Option<T>
    where
        T: AttributeValue,
        F: FnOnce(&AttributeKey<T>) -> Option<T>,
    {
        if let Some(value) = self.get_attribute(key) {
            return Some(value);
        }

        let value = resolver(key)?;
        self.set_attribute(key, value.clone());
        Some(value)
    }

    /// Number of locally bound attributes
    fn attribute_count(&self) -> usize;

    /// Identities of the locally bound keys, in unspecified order
    fn attribute_keys(&self) -> Vec<KeyId>;

    /// Drop every local binding
    fn clear_attributes(&self);

    /// Whether this store has no local bindings
    fn is_empty(&self) -> bool {
        self.attribute_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::RwLock;

    use super::*;

    /// Minimal single-threaded-ish store for exercising the provided methods
    /// independently of the real implementation.
    struct TestStore {
        entries: RwLock<HashMap<KeyId, Box<dyn Any + Send + Sync>>>,
    }

    impl TestStore {
        fn new() -> Self {
            Self {
                entries: RwLock::new(HashMap::new()),
            }
        }
    }

    impl AttributeStore for TestStore {
        fn get_attribute<T: AttributeValue>(&self, key: &AttributeKey<T>) -> Option<T> {
            self.entries
                .read()
                .unwrap()
                .get(&key.id())
                .and_then(|v| v.downcast_ref::<T>().cloned())
        }

        fn set_attribute<T: AttributeValue>(&self, key: &AttributeKey<T>, value: T) -> Option<T> {
            self.entries
                .write()
                .unwrap()
                .insert(key.id(), Box::new(value))
                .and_then(|prev| prev.downcast::<T>().ok().map(|b| *b))
        }

        fn remove_attribute<T: AttributeValue>(&self, key: &AttributeKey<T>) -> Option<T> {
            self.entries
                .write()
                .unwrap()
                .remove(&key.id())
                .and_then(|prev| prev.downcast::<T>().ok().map(|b| *b))
        }

        fn attribute_count(&self) -> usize {
            self.entries.read().unwrap().len()
        }

        fn attribute_keys(&self) -> Vec<KeyId> {
            self.entries.read().unwrap().keys().copied().collect()
        }

        fn clear_attributes(&self) {
            self.entries.write().unwrap().clear();
        }
    }

    #[test]
    fn test_compute_if_absent_binds_once() {
        let store = TestStore::new();
        let key: AttributeKey<String> = AttributeKey::labeled("computed");

        let mut calls = 0;
        let value = store.compute_attribute_if_absent(&key, |_| {
            calls += 1;
            Some("first".to_string())
        });
        assert_eq!(value.as_deref(), Some("first"));
        assert_eq!(calls, 1);

        // Already bound: the resolver must not run again
        let value = store.compute_attribute_if_absent(&key, |_| {
            panic!("resolver invoked for a bound key")
        });
        assert_eq!(value.as_deref(), Some("first"));
        assert_eq!(store.get_attribute(&key).as_deref(), Some("first"));
    }

    #[test]
    fn test_compute_if_absent_none_leaves_store_unmodified() {
        let store = TestStore::new();
        let key: AttributeKey<u32> = AttributeKey::new();

        let value = store.compute_attribute_if_absent(&key, |_| None);
        assert_eq!(value, None);
        assert_eq!(store.get_attribute(&key), None);
        assert!(store.is_empty());

        // The miss is not cached: the resolver runs again on the next call
        let value = store.compute_attribute_if_absent(&key, |_| Some(9));
        assert_eq!(value, Some(9));
    }

    #[test]
    fn test_compute_if_absent_receives_the_key() {
        let store = TestStore::new();
        let key: AttributeKey<u64> = AttributeKey::labeled("derived-from-key");

        let value = store.compute_attribute_if_absent(&key, |k| Some(k.id().as_u64()));
        assert_eq!(value, Some(key.id().as_u64()));
    }

    #[test]
    fn test_default_resolve_is_local_get() {
        let store = TestStore::new();
        let key: AttributeKey<u32> = AttributeKey::new();

        assert_eq!(store.resolve_attribute(&key), None);
        store.set_attribute(&key, 7);
        assert_eq!(store.resolve_attribute(&key), Some(7));
    }

    #[test]
    fn test_is_empty_tracks_count() {
        let store = TestStore::new();
        let key: AttributeKey<u32> = AttributeKey::new();

        assert!(store.is_empty());
        store.set_attribute(&key, 1);
        assert!(!store.is_empty());
        assert_eq!(store.attribute_count(), 1);
        store.clear_attributes();
        assert!(store.is_empty());
    }
}
