//! Error types for clone and extract operations

use thiserror::Error;

use crate::shareable::ShareableKind;

/// Main error type for Bifrost operations.
///
/// All four kinds are raised synchronously at the call site and reflect
/// a programming error in the calling script, not a transient fault.
/// Teardown-time liveness checks never raise; they silently choose
/// "leak instead of destroy".
#[derive(Error, Debug)]
pub enum ShareableError {
    /// Clone encountered a value kind it cannot represent
    #[error("Unclonable value: cannot create a shareable from a {kind}")]
    UnclonableValue {
        /// The offending value's kind name
        kind: &'static str,
    },

    /// A plain (non-host) function was cloned without retain permission
    #[error("Non-retained function `{name}` cannot cross runtimes")]
    NonRetainedFunction {
        /// The function's declared name
        name: String,
    },

    /// Extract was called on a value that is not a shareable reference
    #[error("Expected the value to be a shareable reference, got a {kind}")]
    NotAShareableRef {
        /// The offending value's kind name
        kind: &'static str,
    },

    /// Extract requested an incompatible concrete variant
    #[error("Shareable type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Requested variant kind
        expected: ShareableKind,
        /// Actual variant kind of the wrapped shareable
        got: ShareableKind,
    },
}

/// Result type alias for Bifrost operations
pub type Result<T> = std::result::Result<T, ShareableError>;
