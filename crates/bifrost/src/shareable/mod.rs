//! Runtime-independent value snapshots and their materialization

mod clone;
mod handle;
mod refs;
mod remote;
mod retain;

pub use clone::{clone_value, extract_shareable, extract_shareable_as, make_shareable_clone};
pub use refs::ShareableRef;

pub(crate) use handle::ShareableHandle;
pub(crate) use remote::ShareableRemoteFunction;
pub(crate) use retain::{RetainSlot, RuntimeBound};

use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;

use crate::runtime::WorkletRuntime;
use crate::value::{HostFnPtr, HostObject, JsArray, JsFunction, JsObject, JsValue, NativeState, ObjectTag};

/// The variant tag of a shareable. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareableKind {
    /// The `undefined` value
    Undefined,
    /// The `null` value
    Null,
    /// A boolean
    Boolean,
    /// A number
    Number,
    /// A big integer (decimal text)
    BigInt,
    /// A string
    String,
    /// An ordered sequence of shareables
    Array,
    /// An ordered (key, shareable) property list
    Object,
    /// An owned byte buffer
    ArrayBuffer,
    /// A shared native object
    HostObject,
    /// A shared native callable
    HostFunction,
    /// A compiled closure, materialized as data
    Worklet,
    /// A reference to a function living on one specific runtime
    RemoteFunction,
    /// A lazily-initialized, cached-per-runtime singleton
    Handle,
}

impl std::fmt::Display for ShareableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ShareableKind::Undefined => "Undefined",
            ShareableKind::Null => "Null",
            ShareableKind::Boolean => "Boolean",
            ShareableKind::Number => "Number",
            ShareableKind::BigInt => "BigInt",
            ShareableKind::String => "String",
            ShareableKind::Array => "Array",
            ShareableKind::Object => "Object",
            ShareableKind::ArrayBuffer => "ArrayBuffer",
            ShareableKind::HostObject => "HostObject",
            ShareableKind::HostFunction => "HostFunction",
            ShareableKind::Worklet => "Worklet",
            ShareableKind::RemoteFunction => "RemoteFunction",
            ShareableKind::Handle => "Handle",
        };
        write!(f, "{}", name)
    }
}

/// The ordered property payload shared by Object and Worklet variants.
pub(crate) struct ShareableObject {
    fields: IndexMap<String, Arc<Shareable>>,
    native_state: Option<NativeState>,
}

impl ShareableObject {
    pub(crate) fn new(
        fields: IndexMap<String, Arc<Shareable>>,
        native_state: Option<NativeState>,
    ) -> Self {
        Self {
            fields,
            native_state,
        }
    }

    pub(crate) fn materialize(&self, rt: &WorkletRuntime, tag: ObjectTag) -> JsObject {
        let object = JsObject::with_tag(tag);
        for (key, value) in &self.fields {
            object.set(key.clone(), value.materialize(rt));
        }
        if let Some(state) = &self.native_state {
            object.set_native_state(Arc::clone(state));
        }
        object
    }
}

/// A shared native callable plus the metadata captured at clone time.
pub(crate) struct SharedHostFunction {
    pub(crate) func: HostFnPtr,
    pub(crate) name: String,
    pub(crate) param_count: usize,
}

/// Variant payloads. The set is closed; dispatch happens in one place.
pub(crate) enum Payload {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    BigInt(String),
    String(String),
    Array(Vec<Arc<Shareable>>),
    Object(ShareableObject),
    ArrayBuffer(Vec<u8>),
    HostObject(Arc<dyn HostObject>),
    HostFunction(SharedHostFunction),
    Worklet(ShareableObject),
    RemoteFunction(ShareableRemoteFunction),
    Handle(ShareableHandle),
}

impl Payload {
    fn materialize(&self, rt: &WorkletRuntime) -> JsValue {
        match self {
            Payload::Undefined => JsValue::Undefined,
            Payload::Null => JsValue::Null,
            Payload::Boolean(b) => JsValue::Bool(*b),
            Payload::Number(n) => JsValue::Number(*n),
            Payload::BigInt(digits) => JsValue::bigint(digits.clone()),
            Payload::String(s) => JsValue::string(s.clone()),
            Payload::Array(items) => {
                let elements = items.iter().map(|item| item.materialize(rt)).collect();
                JsValue::Array(JsArray::new(elements))
            }
            Payload::Object(object) => JsValue::Object(object.materialize(rt, ObjectTag::Plain)),
            Payload::ArrayBuffer(bytes) => JsValue::array_buffer(bytes.clone()),
            Payload::HostObject(host) => JsValue::HostObject(Arc::clone(host)),
            Payload::HostFunction(shared) => JsValue::Function(JsFunction::host(
                shared.name.clone(),
                shared.param_count,
                Arc::clone(&shared.func),
            )),
            Payload::Worklet(object) => JsValue::Object(object.materialize(rt, ObjectTag::Worklet)),
            Payload::RemoteFunction(remote) => remote.materialize(rt),
            Payload::Handle(handle) => handle.materialize(rt),
        }
    }
}

/// A runtime-independent snapshot of one value.
///
/// Immutable after construction: materialization is a pure function of
/// `(kind, payload, target runtime)`, except that the Handle variant
/// caches its lazily-computed value per consuming runtime. A shareable
/// may be materialized any number of times, on any number of runtimes,
/// concurrently.
pub struct Shareable {
    payload: Payload,
    retain: Option<RetainSlot>,
}

impl Shareable {
    pub(crate) fn new(payload: Payload) -> Self {
        Self {
            payload,
            retain: None,
        }
    }

    pub(crate) fn retained(payload: Payload, slot: RetainSlot) -> Self {
        Self {
            payload,
            retain: Some(slot),
        }
    }

    /// The canonical `undefined` shareable, shared process-wide.
    pub fn undefined() -> Arc<Shareable> {
        static UNDEFINED: OnceLock<Arc<Shareable>> = OnceLock::new();
        Arc::clone(UNDEFINED.get_or_init(|| Arc::new(Shareable::new(Payload::Undefined))))
    }

    /// This shareable's variant tag.
    pub fn kind(&self) -> ShareableKind {
        match &self.payload {
            Payload::Undefined => ShareableKind::Undefined,
            Payload::Null => ShareableKind::Null,
            Payload::Boolean(_) => ShareableKind::Boolean,
            Payload::Number(_) => ShareableKind::Number,
            Payload::BigInt(_) => ShareableKind::BigInt,
            Payload::String(_) => ShareableKind::String,
            Payload::Array(_) => ShareableKind::Array,
            Payload::Object(_) => ShareableKind::Object,
            Payload::ArrayBuffer(_) => ShareableKind::ArrayBuffer,
            Payload::HostObject(_) => ShareableKind::HostObject,
            Payload::HostFunction(_) => ShareableKind::HostFunction,
            Payload::Worklet(_) => ShareableKind::Worklet,
            Payload::RemoteFunction(_) => ShareableKind::RemoteFunction,
            Payload::Handle(_) => ShareableKind::Handle,
        }
    }

    /// Reconstruct a value native to `rt`, structurally and behaviorally
    /// equivalent to the value originally cloned.
    ///
    /// Never fails for a well-formed shareable; type errors surface at
    /// clone time instead. Without a retaining slot every call rebuilds a
    /// fresh value; with one, the secondary-runtime result is cached
    /// after the first call.
    pub fn materialize(&self, rt: &WorkletRuntime) -> JsValue {
        if let Some(slot) = &self.retain {
            if let Some(cached) = slot.cached(rt.id()) {
                return cached;
            }
            let value = self.payload.materialize(rt);
            slot.store(rt.id(), &value);
            return value;
        }
        self.payload.materialize(rt)
    }
}

impl std::fmt::Debug for Shareable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Shareable({})", self.kind())
    }
}
