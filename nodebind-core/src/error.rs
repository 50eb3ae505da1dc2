//! Error types for nodebind core operations.

use thiserror::Error;

/// Core error type for declaration model operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Type reference text is empty after trimming.
    #[error("empty type reference")]
    EmptyReference,

    /// Angle brackets in a type reference do not balance.
    #[error("unbalanced generic arguments in type reference '{text}'")]
    UnbalancedGenerics {
        /// The offending reference text.
        text: String,
    },

    /// A path segment of a type reference is not an identifier.
    #[error("invalid segment '{segment}' in type reference '{text}'")]
    InvalidSegment {
        /// The offending reference text.
        text: String,
        /// The segment that failed to parse.
        segment: String,
    },
}

/// Result type alias for nodebind core operations.
pub type Result<T> = std::result::Result<T, Error>;
