//! References to functions living on one specific runtime

use std::sync::Arc;

use super::clone::clone_value;
use super::retain::RuntimeBound;
use crate::runtime::{RuntimeId, WorkletRuntime};
use crate::value::{JsFunction, JsValue};

/// A reference, scoped to one source runtime, to a function value that
/// lives only there.
///
/// Materializing on the origin returns the original function.
/// Materializing anywhere else builds a proxy that marshals its arguments
/// through the clone protocol and forwards the invocation to the origin
/// runtime via the target runtime's call forwarder. The surrounding
/// retain slot makes the proxy identical across repeated materializations
/// on the same non-origin runtime.
pub(crate) struct ShareableRemoteFunction {
    origin: RuntimeId,
    name: String,
    function: RuntimeBound<JsFunction>,
}

impl ShareableRemoteFunction {
    pub(crate) fn new(rt: &WorkletRuntime, function: JsFunction) -> Self {
        Self {
            origin: rt.id(),
            name: function.name().to_string(),
            function: RuntimeBound::new(rt.id(), rt.liveness(), function),
        }
    }

    pub(crate) fn materialize(&self, rt: &WorkletRuntime) -> JsValue {
        if rt.id() == self.origin {
            return JsValue::Function(self.function.get().clone());
        }

        let origin = self.origin;
        let original = self.function.get().clone();
        let param_count = original.param_count();

        let proxy = move |caller: &WorkletRuntime, args: &[JsValue]| -> Result<JsValue, String> {
            // Looked up per call: the proxy may be cached long before a
            // forwarder is installed on the invoking runtime.
            let forwarder = caller
                .call_forwarder()
                .ok_or_else(|| format!("no call forwarder installed to reach {}", origin))?;

            let mut marshaled = Vec::with_capacity(args.len());
            for arg in args {
                let shareable =
                    clone_value(caller, arg, false, None).map_err(|error| error.to_string())?;
                marshaled.push(shareable);
            }

            let result = forwarder.forward(origin, &original, marshaled)?;
            Ok(result.materialize(caller))
        };

        JsValue::Function(JsFunction::host(self.name.clone(), param_count, Arc::new(proxy)))
    }
}
