//! Compound value types: objects, arrays, and byte buffers

use std::any::Any;
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;

use super::JsValue;

/// Opaque native-state blob a platform may attach to an object.
pub type NativeState = Arc<dyn Any + Send + Sync>;

/// Classification of an object for the clone protocol.
///
/// The tag travels with the object itself rather than being expressed
/// through magic marker properties on the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectTag {
    /// An ordinary data object
    Plain,

    /// A compiled closure: code reference plus captured-variable data
    Worklet,

    /// A one-time initializer for a lazily-shared singleton
    HandleInitializer,
}

struct ObjectInner {
    tag: ObjectTag,
    props: RwLock<IndexMap<String, JsValue>>,
    native_state: RwLock<Option<NativeState>>,
}

/// An object with insertion-ordered properties.
///
/// Uses IndexMap to preserve property order (clone walks enumerable own
/// properties in insertion order, and materialization must reproduce it).
/// Clones share the backing storage; mutation through any clone is
/// visible through all of them.
#[derive(Clone)]
pub struct JsObject {
    inner: Arc<ObjectInner>,
}

impl JsObject {
    /// Create an empty object with the given tag.
    pub fn with_tag(tag: ObjectTag) -> Self {
        Self {
            inner: Arc::new(ObjectInner {
                tag,
                props: RwLock::new(IndexMap::new()),
                native_state: RwLock::new(None),
            }),
        }
    }

    /// Create an empty plain object.
    pub fn new() -> Self {
        Self::with_tag(ObjectTag::Plain)
    }

    /// This object's tag.
    pub fn tag(&self) -> ObjectTag {
        self.inner.tag
    }

    /// Set a property, appending it if new.
    pub fn set(&self, key: impl Into<String>, value: JsValue) {
        self.inner.props.write().unwrap().insert(key.into(), value);
    }

    /// Get a property by name.
    pub fn get(&self, key: &str) -> Option<JsValue> {
        self.inner.props.read().unwrap().get(key).cloned()
    }

    /// Snapshot of all (key, value) pairs in insertion order.
    pub fn entries(&self) -> Vec<(String, JsValue)> {
        self.inner
            .props
            .read()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.inner.props.read().unwrap().len()
    }

    /// Check whether the object has no properties.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attach a native-state blob to this object.
    pub fn set_native_state(&self, state: NativeState) {
        *self.inner.native_state.write().unwrap() = Some(state);
    }

    /// The attached native-state blob, if any.
    pub fn native_state(&self) -> Option<NativeState> {
        self.inner.native_state.read().unwrap().clone()
    }

    /// Reference identity: do both handles point at the same object?
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for JsObject {
    fn default() -> Self {
        Self::new()
    }
}

/// An ordered, mutable element sequence.
///
/// Clones share the backing storage.
#[derive(Clone)]
pub struct JsArray {
    inner: Arc<RwLock<Vec<JsValue>>>,
}

impl JsArray {
    /// Create an array from the given elements.
    pub fn new(elements: Vec<JsValue>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(elements)),
        }
    }

    /// Get an element by index.
    pub fn get(&self, index: usize) -> Option<JsValue> {
        self.inner.read().unwrap().get(index).cloned()
    }

    /// Replace the element at `index`. Out-of-range writes are ignored.
    pub fn set(&self, index: usize, value: JsValue) {
        let mut elements = self.inner.write().unwrap();
        if let Some(slot) = elements.get_mut(index) {
            *slot = value;
        }
    }

    /// Append an element.
    pub fn push(&self, value: JsValue) {
        self.inner.write().unwrap().push(value);
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    /// Check whether the array is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }

    /// Snapshot of all elements in order.
    pub fn to_vec(&self) -> Vec<JsValue> {
        self.inner.read().unwrap().clone()
    }

    /// Reference identity: do both handles point at the same array?
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// A mutable byte buffer.
///
/// Clones share the backing storage; the clone protocol copies the bytes
/// out instead, so later mutation of the source is not observed.
#[derive(Clone)]
pub struct JsArrayBuffer {
    inner: Arc<RwLock<Vec<u8>>>,
}

impl JsArrayBuffer {
    /// Create a buffer owning the given bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(bytes)),
        }
    }

    /// Copy of the current contents.
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.read().unwrap().clone()
    }

    /// Byte length.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    /// Check whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }

    /// Overwrite the byte at `index`. Out-of-range writes are ignored.
    pub fn write_byte(&self, index: usize, byte: u8) {
        let mut bytes = self.inner.write().unwrap();
        if let Some(slot) = bytes.get_mut(index) {
            *slot = byte;
        }
    }

    /// Reference identity: do both handles point at the same buffer?
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
