//! # Attrset
//!
//! Typed, hierarchical attribute storage for session-like entities.
//!
//! An entity (a network session, a connection, a service context) often needs
//! to carry metadata it knows nothing about: the code that produces a value
//! and the code that consumes it agree on a shared [`AttributeKey`], and the
//! entity only provides the slot. Keys are identity tokens parameterized by
//! their value type, so a lookup through a key always yields the type that
//! key was declared with.
//!
//! ## Key Traits
//!
//! - [`AttributeStore`]: the capability to attach typed attributes to an
//!   entity, with `compute_attribute_if_absent` provided on top of the
//!   primitives
//! - [`AttributeValue`]: blanket bound on storable value types
//!
//! ## Key Types
//!
//! - [`AttributeKey`]: identity-unique typed key, usually created once at
//!   static scope and shared between producer and consumer
//! - [`InMemoryAttributeStore`]: concurrent map-backed implementation with
//!   optional parent chaining for hierarchical resolution
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use attrset::{AttributeKey, AttributeStore, InMemoryAttributeStore};
//!
//! // manager-level defaults, session-level overrides
//! let manager = Arc::new(InMemoryAttributeStore::new());
//! let session = InMemoryAttributeStore::with_parent(&manager);
//!
//! let window: AttributeKey<u32> = AttributeKey::labeled("window-size");
//! manager.set_attribute(&window, 128);
//!
//! assert_eq!(session.get_attribute(&window), None);
//! assert_eq!(session.resolve_attribute(&window), Some(128));
//!
//! session.set_attribute(&window, 256);
//! assert_eq!(session.resolve_attribute(&window), Some(256));
//! ```

pub mod error;
pub mod key;
pub mod memory;
pub mod store;

// Re-export main types
pub use error::*;
pub use key::*;
pub use memory::*;
pub use store::*;
