//! Host value representation consumed and produced by the shareable model

mod callable;
mod compound;
mod display;
mod impls;

pub use callable::{HostFnPtr, HostObject, JsFunction};
pub use compound::{JsArray, JsArrayBuffer, JsObject, NativeState, ObjectTag};

use std::sync::Arc;

/// A value as seen by one script runtime.
///
/// Values are organized into two tiers:
/// - Inline primitives (no allocation)
/// - Heap-backed compound and callable types (Arc-wrapped, mutable in
///   place where the runtime semantics require it)
///
/// A `JsValue` is cheap to clone; compound clones share backing storage,
/// which is exactly the aliasing a live runtime value exhibits. The
/// shareable model is what produces *independent* copies.
#[derive(Clone)]
pub enum JsValue {
    /// The `undefined` value
    Undefined,

    /// The `null` value
    Null,

    /// Boolean: `true` or `false`
    Bool(bool),

    /// Double-precision number (the only numeric type)
    Number(f64),

    /// Arbitrary-precision integer, kept as decimal text
    BigInt(Arc<String>),

    /// Immutable UTF-8 string
    String(Arc<String>),

    /// Symbol (unique, unclonable; kept for error-path fidelity)
    Symbol(Arc<String>),

    /// Ordered, mutable element sequence
    Array(JsArray),

    /// Insertion-ordered, mutable property map
    Object(JsObject),

    /// Mutable byte buffer
    ArrayBuffer(JsArrayBuffer),

    /// Callable value, host-backed or script-defined
    Function(JsFunction),

    /// Opaque native object exposed through the host extension mechanism
    HostObject(Arc<dyn HostObject>),
}
