//! Debug implementation for JsValue

use std::fmt;

use super::*;

impl fmt::Debug for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "undefined"),
            JsValue::Null => write!(f, "null"),
            JsValue::Bool(b) => write!(f, "{}", b),
            JsValue::Number(n) => write!(f, "{}", n),
            JsValue::BigInt(s) => write!(f, "{}n", s),
            JsValue::String(s) => write!(f, "{:?}", s.as_str()),
            JsValue::Symbol(s) => write!(f, "Symbol({})", s),

            JsValue::Array(a) => {
                write!(f, "[")?;
                for (i, item) in a.to_vec().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", item)?;
                }
                write!(f, "]")
            }

            JsValue::Object(o) => {
                match o.tag() {
                    ObjectTag::Plain => {}
                    ObjectTag::Worklet => write!(f, "worklet ")?,
                    ObjectTag::HandleInitializer => write!(f, "handle-init ")?,
                }
                write!(f, "{{")?;
                for (i, (key, value)) in o.entries().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {:?}", key, value)?;
                }
                write!(f, "}}")
            }

            JsValue::ArrayBuffer(b) => write!(f, "ArrayBuffer({} bytes)", b.len()),
            JsValue::Function(func) => write!(f, "{:?}", func),
            JsValue::HostObject(_) => write!(f, "HostObject"),
        }
    }
}
