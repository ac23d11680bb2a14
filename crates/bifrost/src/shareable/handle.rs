//! Lazily-initialized shared singletons

use std::sync::{Arc, Mutex};

use dashmap::DashMap;

use super::retain::RuntimeBound;
use super::ShareableObject;
use crate::runtime::{RuntimeId, RuntimeLiveness, UnpackIntent, WorkletRuntime};
use crate::value::{JsValue, ObjectTag};

/// A one-time initializer plus a per-consuming-runtime cache of the value
/// it produces.
///
/// The initializer is never released after first use: runtimes may race
/// to initialize in parallel, and a later runtime may still need it. The
/// cache is the convergence point: its atomic insert-if-absent guarantees
/// that all observers on one runtime see a single value, even when racing
/// threads ran the initializer redundantly. The internal mutex guards
/// only the active-destination bookkeeping consulted at teardown, not
/// cache consistency.
pub(crate) struct ShareableHandle {
    initializer: ShareableObject,
    liveness: Arc<dyn RuntimeLiveness>,
    cache: DashMap<RuntimeId, RuntimeBound<JsValue>>,
    active_runtime: Mutex<Option<RuntimeId>>,
}

impl ShareableHandle {
    pub(crate) fn new(initializer: ShareableObject, liveness: Arc<dyn RuntimeLiveness>) -> Self {
        Self {
            initializer,
            liveness,
            cache: DashMap::new(),
            active_runtime: Mutex::new(None),
        }
    }

    pub(crate) fn materialize(&self, rt: &WorkletRuntime) -> JsValue {
        let id = rt.id();
        if let Some(cached) = self.cache.get(&id) {
            return cached.get().clone();
        }

        // First materialization for this runtime. Two threads may both
        // reach here and run the initializer; the entry call below picks
        // one winner and every caller returns the winner's value.
        let raw = JsValue::Object(self.initializer.materialize(rt, ObjectTag::HandleInitializer));
        let value = rt.unpack(raw, UnpackIntent::Handle);

        *self.active_runtime.lock().unwrap() = Some(id);

        let entry = self
            .cache
            .entry(id)
            .or_insert_with(|| RuntimeBound::new(id, Arc::clone(&self.liveness), value));
        entry.get().clone()
    }
}

impl Drop for ShareableHandle {
    fn drop(&mut self) {
        // Cached values are RuntimeBound and abandon themselves when
        // their runtime is gone; this is just teardown visibility.
        if let Some(active) = *self.active_runtime.lock().unwrap() {
            if !self.liveness.is_runtime_alive(active) {
                tracing::debug!(runtime = %active, "handle torn down after its destination runtime");
            }
        }
    }
}
