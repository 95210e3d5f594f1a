//! Error types for attribute storage
//!
//! Absent values are not errors (`Option::None` covers them); the error type
//! exists for the arguments that can actually be invalid at runtime, which in
//! practice means parent links offered to [`set_parent`].
//!
//! [`set_parent`]: crate::memory::InMemoryAttributeStore::set_parent

use thiserror::Error;

use crate::memory::StoreId;

/// Errors raised when wiring an attribute store hierarchy
#[derive(Debug, Error)]
pub enum AttributeError {
    #[error("store {0} cannot be its own parent")]
    SelfParent(StoreId),

    #[error("linking store {child} under store {parent} would close a resolution cycle")]
    HierarchyCycle { child: StoreId, parent: StoreId },
}

/// Result type alias for attribute operations
pub type AttributeResult<T> = Result<T, AttributeError>;
