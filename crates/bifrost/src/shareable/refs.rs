//! Host-visible handle that lets a shareable travel through script code

use std::any::Any;
use std::sync::Arc;

use super::Shareable;
use crate::value::{HostObject, JsValue};

/// Wraps a shareable as an opaque host object.
///
/// Lets script code pass a shareable through ordinary control flow
/// (arguments, return values, storage in data structures) without forcing
/// materialization. The wrapped shareable outlives every live reference
/// to it. Construction never fails.
pub struct ShareableRef {
    value: Arc<Shareable>,
}

impl ShareableRef {
    /// Wrap a shareable.
    pub fn new(value: Arc<Shareable>) -> Self {
        Self { value }
    }

    /// The wrapped shareable, by shared ownership.
    pub fn value(&self) -> Arc<Shareable> {
        Arc::clone(&self.value)
    }

    /// Wrap a shareable and expose it directly as a host-object value.
    pub fn host_value(value: Arc<Shareable>) -> JsValue {
        JsValue::HostObject(Arc::new(Self::new(value)))
    }
}

impl HostObject for ShareableRef {
    fn as_any(&self) -> &dyn Any {
        self
    }
}
