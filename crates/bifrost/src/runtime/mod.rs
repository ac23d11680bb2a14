//! Script runtime handles and their collaborator hooks

mod guard;
mod registry;

pub use guard::run_guarded;
pub use registry::{RuntimeId, RuntimeLiveness, WorkletRuntimeRegistry};

use std::sync::{Arc, RwLock};

use crate::shareable::Shareable;
use crate::value::{JsFunction, JsValue};

/// Why a materialized plain-data object is handed to the value unpacker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnpackIntent {
    /// The object is a compiled closure to reconstruct into a callable.
    Worklet,

    /// The object is a handle initializer to run once.
    Handle,
}

/// The value unpacker collaborator.
///
/// Given a materialized plain-data object tagged as a worklet or handle
/// initializer, reconstructs an executable closure or produces the
/// handle's value. A returned `Err` models a script-level exception.
pub type ValueUnpacker =
    Arc<dyn Fn(&WorkletRuntime, &JsValue, UnpackIntent) -> Result<JsValue, String> + Send + Sync>;

/// The remote-call forwarding collaborator.
///
/// Posts "invoke this function with these arguments on its origin
/// runtime" and delivers the marshaled result back. Arguments and result
/// cross as shareables so neither side ever touches the other's values
/// directly.
pub trait CallForwarder: Send + Sync {
    /// Invoke `function` with `args` on the runtime identified by
    /// `origin` and return the marshaled result.
    fn forward(
        &self,
        origin: RuntimeId,
        function: &JsFunction,
        args: Vec<Arc<Shareable>>,
    ) -> Result<Arc<Shareable>, String>;
}

/// One script execution context, typically pinned to one native thread.
///
/// Carries the hooks the shareable model delegates to: the liveness
/// tracker consulted at teardown, the value unpacker that turns
/// materialized worklet data back into callables, and the call forwarder
/// used by remote-function proxies. Dropping the runtime unregisters it,
/// which is what flips its liveness to dead.
pub struct WorkletRuntime {
    id: RuntimeId,
    name: String,
    liveness: Arc<dyn RuntimeLiveness>,
    registry: Option<Arc<WorkletRuntimeRegistry>>,
    unpacker: RwLock<Option<ValueUnpacker>>,
    forwarder: RwLock<Option<Arc<dyn CallForwarder>>>,
}

impl WorkletRuntime {
    /// Create a runtime registered with the given registry.
    pub fn new(name: impl Into<String>, registry: &Arc<WorkletRuntimeRegistry>) -> Self {
        let id = registry.register();
        Self {
            id,
            name: name.into(),
            liveness: Arc::clone(registry) as Arc<dyn RuntimeLiveness>,
            registry: Some(Arc::clone(registry)),
            unpacker: RwLock::new(None),
            forwarder: RwLock::new(None),
        }
    }

    /// Create a runtime with an externally managed liveness tracker.
    ///
    /// The caller owns the id space and the tracker's notion of alive;
    /// nothing is unregistered on drop. Used to inject liveness doubles.
    pub fn with_liveness(
        name: impl Into<String>,
        id: u64,
        liveness: Arc<dyn RuntimeLiveness>,
    ) -> Self {
        Self {
            id: RuntimeId::from_raw(id),
            name: name.into(),
            liveness,
            registry: None,
            unpacker: RwLock::new(None),
            forwarder: RwLock::new(None),
        }
    }

    /// This runtime's identity.
    pub fn id(&self) -> RuntimeId {
        self.id
    }

    /// This runtime's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The liveness tracker shareables created against this runtime use.
    pub fn liveness(&self) -> Arc<dyn RuntimeLiveness> {
        Arc::clone(&self.liveness)
    }

    /// Install the value unpacker, replacing any previous one.
    pub fn set_value_unpacker(&self, unpacker: ValueUnpacker) {
        *self.unpacker.write().unwrap() = Some(unpacker);
    }

    /// Install the remote-call forwarder, replacing any previous one.
    pub fn set_call_forwarder(&self, forwarder: Arc<dyn CallForwarder>) {
        *self.forwarder.write().unwrap() = Some(forwarder);
    }

    /// The installed remote-call forwarder, if any.
    pub fn call_forwarder(&self) -> Option<Arc<dyn CallForwarder>> {
        self.forwarder.read().unwrap().clone()
    }

    /// Run a materialized plain-data object through the value unpacker.
    ///
    /// With no unpacker installed the value passes through unchanged.
    /// Unpacker failures are reported and the raw value is returned, so
    /// materialization itself never fails.
    pub fn unpack(&self, value: JsValue, intent: UnpackIntent) -> JsValue {
        let unpacker = self.unpacker.read().unwrap().clone();
        match unpacker {
            Some(unpack) => match unpack(self, &value, intent) {
                Ok(unpacked) => unpacked,
                Err(error) => {
                    tracing::error!(runtime = %self.id, %error, ?intent, "value unpacker failed");
                    value
                }
            },
            None => value,
        }
    }
}

impl Drop for WorkletRuntime {
    fn drop(&mut self) {
        if let Some(registry) = &self.registry {
            registry.unregister(self.id);
        }
    }
}

impl std::fmt::Debug for WorkletRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WorkletRuntime({} as {})", self.name, self.id)
    }
}
