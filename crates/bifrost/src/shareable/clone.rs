//! The clone / extract protocol between live values and shareables

use std::sync::Arc;

use indexmap::IndexMap;

use super::{
    Payload, RetainSlot, Shareable, ShareableHandle, ShareableKind, ShareableObject,
    ShareableRef, ShareableRemoteFunction, SharedHostFunction,
};
use crate::error::{Result, ShareableError};
use crate::runtime::WorkletRuntime;
use crate::value::{JsObject, JsValue, NativeState, ObjectTag};

/// Deep-clone a live value into a shareable tree.
///
/// `retain_remote` does two things: it permits plain (non-host) functions
/// to cross as remote-function references, and it adds the retaining
/// cache to object payloads so their first non-origin materialization is
/// the only expensive one. `native_state_source` optionally donates a
/// native-state blob to the resulting object variant.
///
/// # Errors
///
/// - [`ShareableError::NonRetainedFunction`] for a plain function cloned
///   without `retain_remote`
/// - [`ShareableError::UnclonableValue`] for value kinds with no
///   shareable representation
pub fn clone_value(
    rt: &WorkletRuntime,
    value: &JsValue,
    retain_remote: bool,
    native_state_source: Option<&JsValue>,
) -> Result<Arc<Shareable>> {
    match value {
        JsValue::Undefined => Ok(Shareable::undefined()),
        JsValue::Null => Ok(Arc::new(Shareable::new(Payload::Null))),
        JsValue::Bool(b) => Ok(Arc::new(Shareable::new(Payload::Boolean(*b)))),
        JsValue::Number(n) => Ok(Arc::new(Shareable::new(Payload::Number(*n)))),
        JsValue::BigInt(digits) => Ok(Arc::new(Shareable::new(Payload::BigInt(
            digits.as_str().to_owned(),
        )))),
        JsValue::String(s) => Ok(Arc::new(Shareable::new(Payload::String(
            s.as_str().to_owned(),
        )))),

        JsValue::Array(array) => {
            let mut items = Vec::with_capacity(array.len());
            for element in array.to_vec() {
                items.push(clone_value(rt, &element, retain_remote, None)?);
            }
            Ok(Arc::new(Shareable::new(Payload::Array(items))))
        }

        JsValue::ArrayBuffer(buffer) => {
            // Copy, not alias: later mutation of the source buffer must
            // not be observed through the shareable.
            Ok(Arc::new(Shareable::new(Payload::ArrayBuffer(
                buffer.bytes(),
            ))))
        }

        JsValue::Function(function) => match function.host_fn() {
            Some(func) => Ok(Arc::new(Shareable::new(Payload::HostFunction(
                SharedHostFunction {
                    func,
                    name: function.name().to_owned(),
                    param_count: function.param_count(),
                },
            )))),
            None if retain_remote => {
                let remote = ShareableRemoteFunction::new(rt, function.clone());
                Ok(Arc::new(Shareable::retained(
                    Payload::RemoteFunction(remote),
                    RetainSlot::new(rt.id(), rt.liveness()),
                )))
            }
            None => Err(ShareableError::NonRetainedFunction {
                name: function.name().to_owned(),
            }),
        },

        JsValue::HostObject(host) => {
            // A value that is already a shareable reference round-trips
            // without re-cloning.
            if let Some(reference) = host.as_any().downcast_ref::<ShareableRef>() {
                return Ok(reference.value());
            }
            Ok(Arc::new(Shareable::new(Payload::HostObject(Arc::clone(
                host,
            )))))
        }

        JsValue::Object(object) => match object.tag() {
            ObjectTag::Worklet => {
                let payload = clone_object_payload(rt, object, retain_remote, None)?;
                Ok(Arc::new(Shareable::retained(
                    Payload::Worklet(payload),
                    RetainSlot::new(rt.id(), rt.liveness()),
                )))
            }
            ObjectTag::HandleInitializer => {
                let payload = clone_object_payload(rt, object, retain_remote, None)?;
                Ok(Arc::new(Shareable::new(Payload::Handle(
                    ShareableHandle::new(payload, rt.liveness()),
                ))))
            }
            ObjectTag::Plain => {
                let state = donated_native_state(object, native_state_source);
                let payload = clone_object_payload(rt, object, retain_remote, state)?;
                if retain_remote {
                    Ok(Arc::new(Shareable::retained(
                        Payload::Object(payload),
                        RetainSlot::new(rt.id(), rt.liveness()),
                    )))
                } else {
                    Ok(Arc::new(Shareable::new(Payload::Object(payload))))
                }
            }
        },

        JsValue::Symbol(_) => Err(ShareableError::UnclonableValue {
            kind: value.kind_name(),
        }),
    }
}

/// Deep-clone a live value and wrap the result as a shareable reference,
/// ready to cross into script code as an opaque value.
pub fn make_shareable_clone(
    rt: &WorkletRuntime,
    value: &JsValue,
    retain_remote: bool,
    native_state_source: Option<&JsValue>,
) -> Result<JsValue> {
    let shareable = clone_value(rt, value, retain_remote, native_state_source)?;
    Ok(ShareableRef::host_value(shareable))
}

/// Recover the shareable wrapped by a reference value.
///
/// Recognition is by the reference wrapper's native extension identity,
/// never by structural shape.
///
/// # Errors
///
/// [`ShareableError::NotAShareableRef`] if `value` is not a shareable
/// reference.
pub fn extract_shareable(value: &JsValue) -> Result<Arc<Shareable>> {
    if let JsValue::HostObject(host) = value {
        if let Some(reference) = host.as_any().downcast_ref::<ShareableRef>() {
            return Ok(reference.value());
        }
    }
    Err(ShareableError::NotAShareableRef {
        kind: value.kind_name(),
    })
}

/// Recover the wrapped shareable and check it is of the expected kind.
///
/// # Errors
///
/// [`ShareableError::NotAShareableRef`] if `value` is not a shareable
/// reference; [`ShareableError::TypeMismatch`] if the wrapped shareable
/// is of a different kind.
pub fn extract_shareable_as(value: &JsValue, expected: ShareableKind) -> Result<Arc<Shareable>> {
    let shareable = extract_shareable(value)?;
    if shareable.kind() != expected {
        return Err(ShareableError::TypeMismatch {
            expected,
            got: shareable.kind(),
        });
    }
    Ok(shareable)
}

fn clone_object_payload(
    rt: &WorkletRuntime,
    object: &JsObject,
    retain_remote: bool,
    native_state: Option<NativeState>,
) -> Result<ShareableObject> {
    let mut fields = IndexMap::with_capacity(object.len());
    for (key, value) in object.entries() {
        fields.insert(key, clone_value(rt, &value, retain_remote, None)?);
    }
    Ok(ShareableObject::new(fields, native_state))
}

fn donated_native_state(
    object: &JsObject,
    native_state_source: Option<&JsValue>,
) -> Option<NativeState> {
    if let Some(JsValue::Object(source)) = native_state_source {
        if let Some(state) = source.native_state() {
            return Some(state);
        }
    }
    object.native_state()
}
