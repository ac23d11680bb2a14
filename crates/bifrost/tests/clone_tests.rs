//! Tests for the clone / extract protocol

use std::any::Any;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use bifrost::*;

fn setup() -> (Arc<WorkletRuntimeRegistry>, WorkletRuntime, WorkletRuntime) {
    let registry = Arc::new(WorkletRuntimeRegistry::new());
    let main = WorkletRuntime::new("main", &registry);
    let ui = WorkletRuntime::new("ui", &registry);
    (registry, main, ui)
}

#[test]
fn test_scalar_round_trip() {
    let (_registry, main, ui) = setup();

    for value in [
        JsValue::Undefined,
        JsValue::Null,
        JsValue::Bool(true),
        JsValue::Bool(false),
        JsValue::Number(42.5),
        JsValue::Number(-0.0),
    ] {
        let shareable = clone_value(&main, &value, false, None).unwrap();
        assert_eq!(shareable.materialize(&ui), value);
    }
}

#[test]
fn test_string_and_bigint_round_trip() {
    let (_registry, main, ui) = setup();

    let s = clone_value(&main, &JsValue::string("hello"), false, None).unwrap();
    assert_eq!(s.materialize(&ui), JsValue::string("hello"));
    assert_eq!(s.kind(), ShareableKind::String);

    let b = clone_value(&main, &JsValue::bigint("123456789012345678901234567890"), false, None)
        .unwrap();
    assert_eq!(
        b.materialize(&ui),
        JsValue::bigint("123456789012345678901234567890")
    );
    assert_eq!(b.kind(), ShareableKind::BigInt);
}

#[test]
fn test_nested_structure_round_trip() {
    let (_registry, main, ui) = setup();

    // {a: 1, b: [true, "x"]}
    let object = JsObject::new();
    object.set("a", JsValue::Number(1.0));
    object.set(
        "b",
        JsValue::array(vec![JsValue::Bool(true), JsValue::string("x")]),
    );

    let wrapper = make_shareable_clone(&main, &JsValue::Object(object), false, None).unwrap();
    let shareable = extract_shareable(&wrapper).unwrap();
    let copy = shareable.materialize(&ui);

    let copy_obj = copy.as_object().unwrap();
    assert_eq!(copy_obj.get("a"), Some(JsValue::Number(1.0)));
    let b = copy_obj.get("b").unwrap();
    let b_arr = b.as_array().unwrap();
    assert_eq!(b_arr.get(0), Some(JsValue::Bool(true)));
    assert_eq!(b_arr.get(1), Some(JsValue::string("x")));

    // Mutating the materialized copy does not change the stored payload.
    b_arr.set(0, JsValue::Bool(false));
    b_arr.push(JsValue::Number(9.0));
    let fresh = shareable.materialize(&ui);
    let fresh_b = fresh.as_object().unwrap().get("b").unwrap();
    assert_eq!(fresh_b.as_array().unwrap().get(0), Some(JsValue::Bool(true)));
    assert_eq!(fresh_b.as_array().unwrap().len(), 2);
}

#[test]
fn test_object_property_order_preserved() {
    let (_registry, main, ui) = setup();

    let object = JsObject::new();
    object.set("zeta", JsValue::Number(1.0));
    object.set("alpha", JsValue::Number(2.0));
    object.set("mid", JsValue::Number(3.0));

    let shareable = clone_value(&main, &JsValue::Object(object), false, None).unwrap();
    let copy = shareable.materialize(&ui);
    let keys: Vec<String> = copy
        .as_object()
        .unwrap()
        .entries()
        .into_iter()
        .map(|(k, _)| k)
        .collect();

    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_array_buffer_is_copied_not_aliased() {
    let (_registry, main, ui) = setup();

    let buffer = JsArrayBuffer::new(vec![1, 2, 3, 4]);
    let shareable = clone_value(&main, &JsValue::ArrayBuffer(buffer.clone()), false, None).unwrap();

    // Mutation after the clone is not observed by the snapshot.
    buffer.write_byte(0, 99);

    match shareable.materialize(&ui) {
        JsValue::ArrayBuffer(copy) => assert_eq!(copy.bytes(), vec![1, 2, 3, 4]),
        other => panic!("expected an array buffer, got {:?}", other),
    }
}

#[test]
fn test_symbol_is_unclonable() {
    let (_registry, main, _ui) = setup();

    let result = clone_value(&main, &JsValue::symbol("tag"), false, None);
    assert!(matches!(
        result,
        Err(ShareableError::UnclonableValue { kind: "symbol" })
    ));
}

#[test]
fn test_plain_function_requires_retain_permission() {
    let (_registry, main, _ui) = setup();

    let body: HostFnPtr = Arc::new(|_rt, _args| Ok(JsValue::Undefined));
    let function = JsFunction::script("callback", 0, main.id(), body);

    let result = clone_value(&main, &JsValue::Function(function.clone()), false, None);
    match result {
        Err(ShareableError::NonRetainedFunction { name }) => assert_eq!(name, "callback"),
        other => panic!("expected NonRetainedFunction, got {:?}", other.map(|_| ())),
    }

    // With permission the clone succeeds as a remote-function reference.
    let retained = clone_value(&main, &JsValue::Function(function), true, None).unwrap();
    assert_eq!(retained.kind(), ShareableKind::RemoteFunction);
}

#[test]
fn test_host_function_preserves_native_entity() {
    let (_registry, main, ui) = setup();

    let native: HostFnPtr = Arc::new(|_rt, args| {
        let n = args.first().and_then(|a| a.as_number()).unwrap_or(0.0);
        Ok(JsValue::Number(n * 2.0))
    });
    let function = JsFunction::host("double", 1, native);

    let shareable = clone_value(&main, &JsValue::Function(function), false, None).unwrap();
    assert_eq!(shareable.kind(), ShareableKind::HostFunction);

    let copy = shareable.materialize(&ui);
    let copy_fn = copy.as_function().unwrap();
    assert_eq!(copy_fn.name(), "double");
    assert_eq!(copy_fn.param_count(), 1);
    assert_eq!(
        copy_fn.call(&ui, &[JsValue::Number(21.0)]),
        Ok(JsValue::Number(42.0))
    );
}

struct Marker;

impl HostObject for Marker {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn test_host_object_shares_identity() {
    let (_registry, main, ui) = setup();

    let marker: Arc<dyn HostObject> = Arc::new(Marker);
    let shareable = clone_value(&main, &JsValue::HostObject(Arc::clone(&marker)), false, None)
        .unwrap();
    assert_eq!(shareable.kind(), ShareableKind::HostObject);

    match shareable.materialize(&ui) {
        JsValue::HostObject(exposed) => {
            assert!(std::ptr::eq(
                Arc::as_ptr(&exposed) as *const (),
                Arc::as_ptr(&marker) as *const ()
            ));
        }
        other => panic!("expected a host object, got {:?}", other),
    }
}

#[test]
fn test_shareable_ref_round_trip_reuses_shareable() {
    let (_registry, main, _ui) = setup();

    let wrapper = make_shareable_clone(&main, &JsValue::Number(7.0), false, None).unwrap();
    let first = extract_shareable(&wrapper).unwrap();

    // Cloning the wrapper again must reuse the wrapped shareable.
    let rewrapped = make_shareable_clone(&main, &wrapper, false, None).unwrap();
    let second = extract_shareable(&rewrapped).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_extract_rejects_non_wrapper_values() {
    let result = extract_shareable(&JsValue::Number(1.0));
    assert!(matches!(
        result,
        Err(ShareableError::NotAShareableRef { kind: "number" })
    ));

    // A host object that is not a ShareableRef is also rejected.
    let host: Arc<dyn HostObject> = Arc::new(Marker);
    let result = extract_shareable(&JsValue::HostObject(host));
    assert!(matches!(
        result,
        Err(ShareableError::NotAShareableRef { kind: "hostobject" })
    ));
}

#[test]
fn test_extract_with_kind_check() {
    let (_registry, main, _ui) = setup();

    let worklet = JsObject::with_tag(ObjectTag::Worklet);
    worklet.set("code", JsValue::string("() => {}"));
    let wrapper = make_shareable_clone(&main, &JsValue::Object(worklet), false, None).unwrap();

    assert!(extract_shareable_as(&wrapper, ShareableKind::Worklet).is_ok());

    match extract_shareable_as(&wrapper, ShareableKind::Object) {
        Err(ShareableError::TypeMismatch { expected, got }) => {
            assert_eq!(expected, ShareableKind::Object);
            assert_eq!(got, ShareableKind::Worklet);
        }
        other => panic!("expected TypeMismatch, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_native_state_donation() {
    let (_registry, main, ui) = setup();

    let object = JsObject::new();
    object.set("x", JsValue::Number(1.0));

    let source = JsObject::new();
    let blob: NativeState = Arc::new(String::from("platform-state"));
    source.set_native_state(Arc::clone(&blob));

    let shareable = clone_value(
        &main,
        &JsValue::Object(object),
        false,
        Some(&JsValue::Object(source)),
    )
    .unwrap();

    let copy = shareable.materialize(&ui);
    let state = copy.as_object().unwrap().native_state().unwrap();
    assert!(Arc::ptr_eq(&state, &blob));
}
