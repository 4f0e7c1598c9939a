//! Error types for the reactive runtime.
//!
//! Only property-path writes are fallible at the API surface. Internal
//! bookkeeping violations (tracking-stack overflow, a recorded child key
//! with no backing node) are fatal and panic instead: continuing silently
//! would drop future notifications.

use thiserror::Error;

/// Errors surfaced by the reactive API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReactiveError {
    /// A property write walked through a key that does not exist on the
    /// stored value.
    #[error("no such property: `{path}`")]
    NoSuchProperty {
        /// Dotted path from the root signal to the missing key.
        path: String,
    },

    /// A property write walked through a value that is not object-shaped.
    #[error("`{path}` is not an object")]
    NotAnObject {
        /// Dotted path from the root signal to the offending value.
        path: String,
    },
}
