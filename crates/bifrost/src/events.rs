//! Routing of native-originated events to registered worklet handlers

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use crate::runtime::{run_guarded, UnpackIntent, WorkletRuntime};
use crate::shareable::Shareable;
use crate::value::JsValue;

/// Identity of an event emitter (e.g. a native view tag).
pub type EmitterId = i64;

/// A registered event handler.
///
/// Handlers declare which event they listen to and optionally which
/// emitter they are scoped to; a handler without an emitter matches the
/// event from every emitter.
pub trait EventHandler: Send + Sync {
    /// Stable id used for registration and unregistration.
    fn id(&self) -> u64;

    /// The emitter this handler is scoped to, `None` for global handlers.
    fn emitter(&self) -> Option<EmitterId>;

    /// The event name this handler listens to.
    fn event_name(&self) -> &str;

    /// Deliver one event occurrence to the handler.
    fn invoke(&self, rt: &WorkletRuntime, timestamp: f64, payload: &JsValue);
}

/// An event handler backed by a worklet shareable.
///
/// Invocation materializes the worklet on the target runtime, rebuilds
/// the callable through the runtime's value unpacker, and calls it with
/// `(timestamp, payload)` under the call guard.
pub struct WorkletEventHandler {
    id: u64,
    emitter: Option<EmitterId>,
    event_name: String,
    worklet: Arc<Shareable>,
}

impl WorkletEventHandler {
    /// Create a handler for `event_name`, scoped to `emitter` when given.
    pub fn new(
        id: u64,
        emitter: Option<EmitterId>,
        event_name: impl Into<String>,
        worklet: Arc<Shareable>,
    ) -> Self {
        Self {
            id,
            emitter,
            event_name: event_name.into(),
            worklet,
        }
    }
}

impl EventHandler for WorkletEventHandler {
    fn id(&self) -> u64 {
        self.id
    }

    fn emitter(&self) -> Option<EmitterId> {
        self.emitter
    }

    fn event_name(&self) -> &str {
        &self.event_name
    }

    fn invoke(&self, rt: &WorkletRuntime, timestamp: f64, payload: &JsValue) {
        let data = self.worklet.materialize(rt);
        let unpacked = rt.unpack(data, UnpackIntent::Worklet);
        match unpacked.as_function() {
            Some(function) => {
                let result =
                    run_guarded(rt, function, &[JsValue::Number(timestamp), payload.clone()]);
                if let Err(error) = result {
                    tracing::warn!(
                        handler = self.id,
                        event = %self.event_name,
                        %error,
                        "event handler raised"
                    );
                }
            }
            None => {
                tracing::warn!(
                    handler = self.id,
                    event = %self.event_name,
                    "worklet did not unpack to a callable"
                );
            }
        }
    }
}

type HandlerSet = HashMap<u64, Arc<dyn EventHandler>>;

#[derive(Default)]
struct RegistryMaps {
    with_emitter: BTreeMap<(EmitterId, String), HandlerSet>,
    global: BTreeMap<String, HandlerSet>,
    by_id: BTreeMap<u64, Arc<dyn EventHandler>>,
}

impl RegistryMaps {
    fn insert(&mut self, handler: Arc<dyn EventHandler>) {
        let id = handler.id();
        let event_name = handler.event_name().to_owned();
        match handler.emitter() {
            Some(emitter) => {
                self.with_emitter
                    .entry((emitter, event_name))
                    .or_default()
                    .insert(id, Arc::clone(&handler));
            }
            None => {
                self.global
                    .entry(event_name)
                    .or_default()
                    .insert(id, Arc::clone(&handler));
            }
        }
        self.by_id.insert(id, handler);
    }

    fn remove(&mut self, id: u64) {
        let Some(handler) = self.by_id.remove(&id) else {
            return;
        };
        let event_name = handler.event_name().to_owned();
        match handler.emitter() {
            Some(emitter) => {
                let key = (emitter, event_name);
                if let Some(set) = self.with_emitter.get_mut(&key) {
                    set.remove(&id);
                    if set.is_empty() {
                        self.with_emitter.remove(&key);
                    }
                }
            }
            None => {
                if let Some(set) = self.global.get_mut(&event_name) {
                    set.remove(&id);
                    if set.is_empty() {
                        self.global.remove(&event_name);
                    }
                }
            }
        }
    }
}

/// The concurrent index routing native events to registered handlers.
///
/// Three maps under one mutex: handlers scoped to one emitter, handlers
/// listening globally, and a flat id map so unregistration is O(log n)
/// without knowing which keyed map a handler was filed under. All
/// critical sections are short; handler invocation never happens under
/// the lock, so a handler may itself register or unregister handlers.
pub struct EventHandlerRegistry {
    maps: Mutex<RegistryMaps>,
}

impl EventHandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            maps: Mutex::new(RegistryMaps::default()),
        }
    }

    /// Register a handler under its id and event key.
    ///
    /// Registering an id that is already present replaces the previous
    /// handler (last write wins).
    pub fn register_event_handler(&self, handler: Arc<dyn EventHandler>) {
        let mut maps = self.maps.lock().unwrap();
        // Clear a previous registration first so the keyed maps never
        // hold a stale entry for this id.
        maps.remove(handler.id());
        tracing::debug!(
            handler = handler.id(),
            event = handler.event_name(),
            emitter = ?handler.emitter(),
            "registering event handler"
        );
        maps.insert(handler);
    }

    /// Remove a handler by id. Unknown ids are a no-op.
    pub fn unregister_event_handler(&self, id: u64) {
        let mut maps = self.maps.lock().unwrap();
        maps.remove(id);
    }

    /// Dispatch one native event to every matching handler.
    ///
    /// Matches the union of handlers scoped to `(emitter, event_name)`
    /// and handlers listening to `event_name` globally. The full match
    /// set is computed before any invocation begins and the lock is not
    /// held across invocations. No cross-handler order is guaranteed.
    pub fn process_event(
        &self,
        rt: &WorkletRuntime,
        timestamp: f64,
        event_name: &str,
        emitter: EmitterId,
        payload: &JsValue,
    ) {
        let matches: Vec<Arc<dyn EventHandler>> = {
            let maps = self.maps.lock().unwrap();
            let scoped = maps
                .with_emitter
                .get(&(emitter, event_name.to_owned()))
                .into_iter()
                .flat_map(|set| set.values().cloned());
            let global = maps
                .global
                .get(event_name)
                .into_iter()
                .flat_map(|set| set.values().cloned());
            scoped.chain(global).collect()
        };

        tracing::trace!(
            event = event_name,
            emitter,
            handlers = matches.len(),
            "dispatching event"
        );
        for handler in matches {
            handler.invoke(rt, timestamp, payload);
        }
    }

    /// Whether any handler would match the given event.
    ///
    /// Used by the native event-producing side to avoid building payloads
    /// nobody will consume.
    pub fn is_any_handler_waiting_for_event(&self, event_name: &str, emitter: EmitterId) -> bool {
        let maps = self.maps.lock().unwrap();
        maps.with_emitter
            .contains_key(&(emitter, event_name.to_owned()))
            || maps.global.contains_key(event_name)
    }
}

impl Default for EventHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        id: u64,
        emitter: Option<EmitterId>,
        event_name: String,
        calls: AtomicUsize,
    }

    impl CountingHandler {
        fn new(id: u64, emitter: Option<EmitterId>, event_name: &str) -> Arc<Self> {
            Arc::new(Self {
                id,
                emitter,
                event_name: event_name.to_owned(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl EventHandler for CountingHandler {
        fn id(&self) -> u64 {
            self.id
        }

        fn emitter(&self) -> Option<EmitterId> {
            self.emitter
        }

        fn event_name(&self) -> &str {
            &self.event_name
        }

        fn invoke(&self, _rt: &WorkletRuntime, _timestamp: f64, _payload: &JsValue) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn test_runtime() -> (Arc<crate::runtime::WorkletRuntimeRegistry>, WorkletRuntime) {
        let registry = Arc::new(crate::runtime::WorkletRuntimeRegistry::new());
        let rt = WorkletRuntime::new("ui", &registry);
        (registry, rt)
    }

    #[test]
    fn test_scoped_handler_matches_its_emitter_only() {
        let (_registry, rt) = test_runtime();
        let registry = EventHandlerRegistry::new();
        let handler = CountingHandler::new(1, Some(7), "onScroll");
        registry.register_event_handler(handler.clone());

        registry.process_event(&rt, 0.0, "onScroll", 7, &JsValue::Null);
        registry.process_event(&rt, 1.0, "onScroll", 8, &JsValue::Null);

        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_global_handler_matches_every_emitter() {
        let (_registry, rt) = test_runtime();
        let registry = EventHandlerRegistry::new();
        let handler = CountingHandler::new(1, None, "onScroll");
        registry.register_event_handler(handler.clone());

        registry.process_event(&rt, 0.0, "onScroll", 7, &JsValue::Null);
        registry.process_event(&rt, 1.0, "onScroll", 8, &JsValue::Null);

        assert_eq!(handler.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unregister_stops_dispatch() {
        let (_registry, rt) = test_runtime();
        let registry = EventHandlerRegistry::new();
        let handler = CountingHandler::new(1, Some(7), "onScroll");
        registry.register_event_handler(handler.clone());
        registry.unregister_event_handler(1);

        registry.process_event(&rt, 0.0, "onScroll", 7, &JsValue::Null);

        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
        assert!(!registry.is_any_handler_waiting_for_event("onScroll", 7));
    }

    #[test]
    fn test_unregister_unknown_id_is_noop() {
        let registry = EventHandlerRegistry::new();
        registry.unregister_event_handler(999);
    }

    #[test]
    fn test_reregister_same_id_replaces() {
        let (_registry, rt) = test_runtime();
        let registry = EventHandlerRegistry::new();
        let first = CountingHandler::new(1, Some(7), "onScroll");
        let second = CountingHandler::new(1, Some(7), "onTouch");
        registry.register_event_handler(first.clone());
        registry.register_event_handler(second.clone());

        registry.process_event(&rt, 0.0, "onScroll", 7, &JsValue::Null);
        registry.process_event(&rt, 0.0, "onTouch", 7, &JsValue::Null);

        assert_eq!(first.calls.load(Ordering::SeqCst), 0);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
        assert!(!registry.is_any_handler_waiting_for_event("onScroll", 7));
    }

    #[test]
    fn test_membership_query() {
        let registry = EventHandlerRegistry::new();
        registry.register_event_handler(CountingHandler::new(1, Some(7), "onScroll"));
        registry.register_event_handler(CountingHandler::new(2, None, "onFling"));

        assert!(registry.is_any_handler_waiting_for_event("onScroll", 7));
        assert!(!registry.is_any_handler_waiting_for_event("onScroll", 8));
        // Global handlers match any emitter.
        assert!(registry.is_any_handler_waiting_for_event("onFling", 123));
    }
}
