//! Runtime liveness tracking

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashSet;

/// Identity of one script runtime.
///
/// Ids are never reused within a process, so a stale id held by a
/// shareable can be checked against the liveness tracker at any point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuntimeId(u64);

impl RuntimeId {
    /// Build an id from a raw value. Intended for liveness-tracker
    /// doubles; normally ids come from [`WorkletRuntimeRegistry`].
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for RuntimeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "runtime#{}", self.0)
    }
}

/// Answers "is runtime X still alive?".
///
/// Shareables that cache runtime-tied values consult this at teardown to
/// decide between releasing the cached value and abandoning it. Must be
/// safe for concurrent reads against concurrent teardown writes.
pub trait RuntimeLiveness: Send + Sync {
    /// Whether the runtime with the given id has not been torn down.
    fn is_runtime_alive(&self, id: RuntimeId) -> bool;
}

/// Process-wide tracker of live runtimes.
///
/// Allocates runtime ids and records which ones are still alive. Runtimes
/// register themselves on creation and unregister on drop; the set is a
/// lock-free concurrent structure because liveness is read from arbitrary
/// threads while teardown happens on another.
pub struct WorkletRuntimeRegistry {
    alive: DashSet<RuntimeId>,
    next_id: AtomicU64,
}

impl WorkletRuntimeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            alive: DashSet::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Allocate a fresh id and mark it alive.
    pub fn register(&self) -> RuntimeId {
        let id = RuntimeId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.alive.insert(id);
        id
    }

    /// Mark a runtime as torn down.
    pub fn unregister(&self, id: RuntimeId) {
        self.alive.remove(&id);
        tracing::debug!(%id, "runtime unregistered");
    }

    /// Number of currently live runtimes.
    pub fn live_count(&self) -> usize {
        self.alive.len()
    }
}

impl Default for WorkletRuntimeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeLiveness for WorkletRuntimeRegistry {
    fn is_runtime_alive(&self, id: RuntimeId) -> bool {
        self.alive.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_marks_alive() {
        let registry = WorkletRuntimeRegistry::new();
        let id = registry.register();
        assert!(registry.is_runtime_alive(id));
    }

    #[test]
    fn test_unregister_marks_dead() {
        let registry = WorkletRuntimeRegistry::new();
        let id = registry.register();
        registry.unregister(id);
        assert!(!registry.is_runtime_alive(id));
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = WorkletRuntimeRegistry::new();
        let a = registry.register();
        let b = registry.register();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_id_is_dead() {
        let registry = WorkletRuntimeRegistry::new();
        assert!(!registry.is_runtime_alive(RuntimeId::from_raw(9999)));
    }
}
