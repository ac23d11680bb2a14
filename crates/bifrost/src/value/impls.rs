//! Value trait implementations: constructors, predicates, extractors, PartialEq

use std::sync::Arc;

use super::*;

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl JsValue {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        JsValue::String(Arc::new(s.into()))
    }

    /// Create a big-integer value from decimal text
    pub fn bigint(digits: impl Into<String>) -> Self {
        JsValue::BigInt(Arc::new(digits.into()))
    }

    /// Create a symbol value
    pub fn symbol(description: impl Into<String>) -> Self {
        JsValue::Symbol(Arc::new(description.into()))
    }

    /// Create an array value
    pub fn array(elements: Vec<JsValue>) -> Self {
        JsValue::Array(JsArray::new(elements))
    }

    /// Create an empty plain object value
    pub fn object() -> Self {
        JsValue::Object(JsObject::new())
    }

    /// Create an array-buffer value owning the given bytes
    pub fn array_buffer(bytes: Vec<u8>) -> Self {
        JsValue::ArrayBuffer(JsArrayBuffer::new(bytes))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Type Predicates
    // ═══════════════════════════════════════════════════════════════════

    /// Check if value is `undefined`
    pub fn is_undefined(&self) -> bool {
        matches!(self, JsValue::Undefined)
    }

    /// Check if value is `null`
    pub fn is_null(&self) -> bool {
        matches!(self, JsValue::Null)
    }

    /// Check if value is a boolean
    pub fn is_bool(&self) -> bool {
        matches!(self, JsValue::Bool(_))
    }

    /// Check if value is a number
    pub fn is_number(&self) -> bool {
        matches!(self, JsValue::Number(_))
    }

    /// Check if value is a string
    pub fn is_string(&self) -> bool {
        matches!(self, JsValue::String(_))
    }

    /// Check if value is an object
    pub fn is_object(&self) -> bool {
        matches!(self, JsValue::Object(_))
    }

    /// Check if value is callable
    pub fn is_function(&self) -> bool {
        matches!(self, JsValue::Function(_))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extractors
    // ═══════════════════════════════════════════════════════════════════

    /// Extract a boolean, if this is one
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract a number, if this is one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            JsValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract a string slice, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Extract the object handle, if this is an object
    pub fn as_object(&self) -> Option<&JsObject> {
        match self {
            JsValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Extract the array handle, if this is an array
    pub fn as_array(&self) -> Option<&JsArray> {
        match self {
            JsValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Extract the function handle, if this is a function
    pub fn as_function(&self) -> Option<&JsFunction> {
        match self {
            JsValue::Function(f) => Some(f),
            _ => None,
        }
    }

    /// A short name for this value's kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            JsValue::Undefined => "undefined",
            JsValue::Null => "null",
            JsValue::Bool(_) => "boolean",
            JsValue::Number(_) => "number",
            JsValue::BigInt(_) => "bigint",
            JsValue::String(_) => "string",
            JsValue::Symbol(_) => "symbol",
            JsValue::Array(_) => "array",
            JsValue::Object(_) => "object",
            JsValue::ArrayBuffer(_) => "arraybuffer",
            JsValue::Function(_) => "function",
            JsValue::HostObject(_) => "hostobject",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// From traits
// ═══════════════════════════════════════════════════════════════════

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Bool(b)
    }
}

impl From<f64> for JsValue {
    fn from(n: f64) -> Self {
        JsValue::Number(n)
    }
}

impl From<i32> for JsValue {
    fn from(n: i32) -> Self {
        JsValue::Number(n as f64)
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::string(s)
    }
}

impl From<JsObject> for JsValue {
    fn from(o: JsObject) -> Self {
        JsValue::Object(o)
    }
}

impl From<JsArray> for JsValue {
    fn from(a: JsArray) -> Self {
        JsValue::Array(a)
    }
}

impl From<JsFunction> for JsValue {
    fn from(f: JsFunction) -> Self {
        JsValue::Function(f)
    }
}

// ═══════════════════════════════════════════════════════════════════
// Equality
// ═══════════════════════════════════════════════════════════════════

/// Deep structural equality for data; reference identity for functions,
/// host objects, and symbols.
impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) => true,
            (JsValue::Null, JsValue::Null) => true,
            (JsValue::Bool(a), JsValue::Bool(b)) => a == b,
            (JsValue::Number(a), JsValue::Number(b)) => a == b,
            (JsValue::BigInt(a), JsValue::BigInt(b)) => a == b,
            (JsValue::String(a), JsValue::String(b)) => a == b,
            (JsValue::Symbol(a), JsValue::Symbol(b)) => Arc::ptr_eq(a, b),
            (JsValue::Array(a), JsValue::Array(b)) => a.to_vec() == b.to_vec(),
            (JsValue::Object(a), JsValue::Object(b)) => {
                a.tag() == b.tag() && a.entries() == b.entries()
            }
            (JsValue::ArrayBuffer(a), JsValue::ArrayBuffer(b)) => a.bytes() == b.bytes(),
            (JsValue::Function(a), JsValue::Function(b)) => a.ptr_eq(b),
            (JsValue::HostObject(a), JsValue::HostObject(b)) => {
                std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
            }
            _ => false,
        }
    }
}
