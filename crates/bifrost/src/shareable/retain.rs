//! Runtime-tied value ownership and the retaining cache slot

use std::sync::{Arc, Mutex};

use crate::runtime::{RuntimeId, RuntimeLiveness};
use crate::value::JsValue;

/// Owns a value whose deallocation requires its runtime to still exist.
///
/// Cached materialized values belong to the runtime they were produced
/// for; once that runtime is torn down, releasing them through the normal
/// path would touch memory the runtime owned. On drop this guard consults
/// the liveness tracker: a live runtime releases the value normally, a
/// dead one abandons it (an intentional leak). The backing memory of an
/// abandoned value is reclaimed with the runtime itself; this only
/// happens during development reloads or graceful shutdown, where a small
/// leak beats a crash.
pub(crate) struct RuntimeBound<T> {
    runtime: RuntimeId,
    liveness: Arc<dyn RuntimeLiveness>,
    // Some until drop; the Option exists so drop can take ownership.
    value: Option<T>,
}

impl<T> RuntimeBound<T> {
    /// Bind `value` to the runtime identified by `runtime`.
    pub fn new(runtime: RuntimeId, liveness: Arc<dyn RuntimeLiveness>, value: T) -> Self {
        Self {
            runtime,
            liveness,
            value: Some(value),
        }
    }

    /// The runtime this value belongs to.
    pub fn runtime(&self) -> RuntimeId {
        self.runtime
    }

    /// The bound value.
    pub fn get(&self) -> &T {
        self.value
            .as_ref()
            .expect("runtime-bound value accessed after drop")
    }
}

impl<T> Drop for RuntimeBound<T> {
    fn drop(&mut self) {
        if !self.liveness.is_runtime_alive(self.runtime) {
            if let Some(value) = self.value.take() {
                tracing::debug!(runtime = %self.runtime, "abandoning value of dead runtime");
                std::mem::forget(value);
            }
        }
    }
}

/// Single-slot cache for a value materialized in one non-origin runtime.
///
/// The origin (primary) runtime always recomputes; the first non-origin
/// runtime to materialize gets its result cached, and repeated
/// materialization there is O(1). A third distinct runtime overwrites the
/// slot (last write wins). The slot is not synchronized against racing
/// first-writes beyond that overwrite semantics.
pub(crate) struct RetainSlot {
    primary: RuntimeId,
    liveness: Arc<dyn RuntimeLiveness>,
    secondary: Mutex<Option<RuntimeBound<JsValue>>>,
}

impl RetainSlot {
    /// Create a slot whose origin runtime is `primary`.
    pub fn new(primary: RuntimeId, liveness: Arc<dyn RuntimeLiveness>) -> Self {
        Self {
            primary,
            liveness,
            secondary: Mutex::new(None),
        }
    }

    /// The cached value for `runtime`, if this slot holds one.
    pub fn cached(&self, runtime: RuntimeId) -> Option<JsValue> {
        if runtime == self.primary {
            return None;
        }
        let slot = self.secondary.lock().unwrap();
        match slot.as_ref() {
            Some(bound) if bound.runtime() == runtime => Some(bound.get().clone()),
            _ => None,
        }
    }

    /// Cache `value` for `runtime`. Primary-runtime results are never
    /// cached; a value for a different secondary runtime is overwritten.
    pub fn store(&self, runtime: RuntimeId, value: &JsValue) {
        if runtime == self.primary {
            return;
        }
        let bound = RuntimeBound::new(runtime, Arc::clone(&self.liveness), value.clone());
        *self.secondary.lock().unwrap() = Some(bound);
    }
}
