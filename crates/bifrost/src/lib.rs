//! # Bifrost
//!
//! Cross-runtime value sharing for embedded script runtimes.
//!
//! Bifrost lets a value created in one script runtime be copied,
//! referenced, or lazily materialized in a second, independent runtime
//! running on another thread, without sharing a garbage-collected heap.
//! A value is deep-cloned into a runtime-independent [`Shareable`]
//! snapshot, carried across the thread boundary as an opaque
//! [`ShareableRef`], and rebuilt natively on the far side with
//! [`Shareable::materialize`].
//!
//! ## Architecture
//!
//! - **Host value layer**: the [`JsValue`] surface values are cloned from
//!   and materialized into
//! - **Runtime layer**: [`WorkletRuntime`] handles, liveness tracking,
//!   and the unpacker/forwarder collaborator hooks
//! - **Shareable model**: the closed variant set, retaining caches, and
//!   the clone/extract protocol
//! - **Event routing**: the [`EventHandlerRegistry`] dispatching native
//!   events to worklet-backed handlers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod events;
pub mod runtime;
pub mod shareable;
pub mod value;

// Re-export main types
pub use error::{Result, ShareableError};
pub use events::{EmitterId, EventHandler, EventHandlerRegistry, WorkletEventHandler};
pub use runtime::{
    run_guarded, CallForwarder, RuntimeId, RuntimeLiveness, UnpackIntent, ValueUnpacker,
    WorkletRuntime, WorkletRuntimeRegistry,
};
pub use shareable::{
    clone_value, extract_shareable, extract_shareable_as, make_shareable_clone, Shareable,
    ShareableKind, ShareableRef,
};
pub use value::{
    HostFnPtr, HostObject, JsArray, JsArrayBuffer, JsFunction, JsObject, JsValue, NativeState,
    ObjectTag,
};

/// Bifrost version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
