//! Typed attribute keys
//!
//! An [`AttributeKey`] is an identity token: the store looks values up by the
//! key's process-unique [`KeyId`], never by its contents. Two keys created
//! independently are distinct even when they carry the same label and value
//! type, so a key only grants access to the bindings made through it (or
//! through one of its copies).
//!
//! Keys are typically created once and shared between producer and consumer:
//!
//! ```
//! use std::sync::LazyLock;
//!
//! use attrset::AttributeKey;
//!
//! static REMOTE_USER: LazyLock<AttributeKey<String>> =
//!     LazyLock::new(|| AttributeKey::labeled("remote-user"));
//! ```

use std::any::type_name;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use derive_more::Display;

static NEXT_KEY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an [`AttributeKey`]
///
/// This is the value the store actually indexes by. Ids are allocated from a
/// global counter and never reused within a process.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("{_0}")]
pub struct KeyId(u64);

impl KeyId {
    fn next() -> Self {
        Self(NEXT_KEY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Type-safe key for attribute storage
///
/// The type parameter `T` is the value type this key is permitted to carry;
/// it exists only at compile time. Equality, ordering into maps, and store
/// lookup all go through the key's [`KeyId`], so copies of a key are
/// interchangeable while independently constructed keys never collide.
///
/// The optional label is purely diagnostic: it shows up in `Debug`/`Display`
/// output and log fields but plays no part in identity.
pub struct AttributeKey<T> {
    id: KeyId,
    label: Option<&'static str>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> AttributeKey<T> {
    /// Create a new key with a fresh identity
    pub fn new() -> Self {
        Self {
            id: KeyId::next(),
            label: None,
            _marker: PhantomData,
        }
    }

    /// Create a new key carrying a diagnostic label
    ///
    /// The label does not participate in lookup: two labeled keys with the
    /// same label are still distinct keys.
    pub fn labeled(label: &'static str) -> Self {
        Self {
            id: KeyId::next(),
            label: Some(label),
            _marker: PhantomData,
        }
    }

    /// The identity this key binds under
    pub fn id(&self) -> KeyId {
        self.id
    }

    /// The diagnostic label, if one was given at construction
    pub fn label(&self) -> Option<&'static str> {
        self.label
    }
}

impl<T> Default for AttributeKey<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual impls: the derived forms would bound `T`, but a key is Copy/Eq/Hash
// regardless of its value type.

impl<T> Clone for AttributeKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AttributeKey<T> {}

impl<T> PartialEq for AttributeKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for AttributeKey<T> {}

impl<T> Hash for AttributeKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for AttributeKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeKey")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("value_type", &type_name::<T>())
            .finish()
    }
}

impl<T> fmt::Display for AttributeKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label {
            Some(label) => write!(f, "{}#{}", label, self.id),
            None => write!(f, "key#{}", self.id),
        }
    }
}
