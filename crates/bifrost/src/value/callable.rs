//! Callable value types and the host extension surface

use std::any::Any;
use std::sync::Arc;

use super::JsValue;
use crate::runtime::{RuntimeId, WorkletRuntime};

/// Type alias for host function pointers to reduce signature noise.
///
/// Host functions receive the runtime they are invoked on and the call
/// arguments; a returned `Err` models a script-level exception.
pub type HostFnPtr =
    Arc<dyn Fn(&WorkletRuntime, &[JsValue]) -> Result<JsValue, String> + Send + Sync>;

/// An opaque native object exposed to script code through the host's
/// extension mechanism.
///
/// Implementors keep their own state; the shareable model only re-exposes
/// the same instance on every materialization. `as_any` is the identity
/// check used by extract: recognition is by concrete native type, never
/// by structural duck-typing.
pub trait HostObject: Any + Send + Sync {
    /// Downcast support for identity checks.
    fn as_any(&self) -> &dyn Any;
}

enum FunctionBacking {
    /// Backed by a native implementation; safe to carry across runtimes.
    Host(HostFnPtr),

    /// Defined by script; lives only on its origin runtime.
    Script { origin: RuntimeId, body: HostFnPtr },
}

struct FunctionInner {
    name: String,
    param_count: usize,
    backing: FunctionBacking,
}

/// A callable value.
///
/// Host-backed functions wrap a native closure and may be re-exposed on
/// any runtime. Script functions are pinned to the runtime that created
/// them; crossing runtimes requires the remote-function path.
#[derive(Clone)]
pub struct JsFunction {
    inner: Arc<FunctionInner>,
}

impl JsFunction {
    /// Create a host-backed function.
    pub fn host(name: impl Into<String>, param_count: usize, func: HostFnPtr) -> Self {
        Self {
            inner: Arc::new(FunctionInner {
                name: name.into(),
                param_count,
                backing: FunctionBacking::Host(func),
            }),
        }
    }

    /// Create a script function pinned to its origin runtime.
    pub fn script(
        name: impl Into<String>,
        param_count: usize,
        origin: RuntimeId,
        body: HostFnPtr,
    ) -> Self {
        Self {
            inner: Arc::new(FunctionInner {
                name: name.into(),
                param_count,
                backing: FunctionBacking::Script { origin, body },
            }),
        }
    }

    /// The function's declared name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The function's declared parameter count.
    pub fn param_count(&self) -> usize {
        self.inner.param_count
    }

    /// Whether this function is backed by a native implementation.
    pub fn is_host_function(&self) -> bool {
        matches!(self.inner.backing, FunctionBacking::Host(_))
    }

    /// The origin runtime of a script function, `None` for host functions.
    pub fn origin(&self) -> Option<RuntimeId> {
        match &self.inner.backing {
            FunctionBacking::Host(_) => None,
            FunctionBacking::Script { origin, .. } => Some(*origin),
        }
    }

    /// The native closure of a host-backed function.
    pub fn host_fn(&self) -> Option<HostFnPtr> {
        match &self.inner.backing {
            FunctionBacking::Host(func) => Some(Arc::clone(func)),
            FunctionBacking::Script { .. } => None,
        }
    }

    /// Invoke the function on the given runtime.
    pub fn call(&self, rt: &WorkletRuntime, args: &[JsValue]) -> Result<JsValue, String> {
        match &self.inner.backing {
            FunctionBacking::Host(func) => func(rt, args),
            FunctionBacking::Script { body, .. } => body(rt, args),
        }
    }

    /// Reference identity: do both handles point at the same function?
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for JsFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner.backing {
            FunctionBacking::Host(_) => write!(f, "HostFunction({})", self.inner.name),
            FunctionBacking::Script { origin, .. } => {
                write!(f, "Function({} @ {:?})", self.inner.name, origin)
            }
        }
    }
}
