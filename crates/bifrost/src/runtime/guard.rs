//! Guarded invocation of unpacked functions

use super::WorkletRuntime;
use crate::value::{JsFunction, JsValue};

/// Invoke `function` on `rt`, guarding against failures thrown on a
/// non-origin thread.
///
/// In debug builds the call runs under a guard that captures panics and
/// script-level errors and surfaces them through the error-reporting
/// channel instead of crashing the host. Release builds call through
/// directly.
#[cfg(debug_assertions)]
pub fn run_guarded(
    rt: &WorkletRuntime,
    function: &JsFunction,
    args: &[JsValue],
) -> Result<JsValue, String> {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    match catch_unwind(AssertUnwindSafe(|| function.call(rt, args))) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => {
            tracing::error!(
                runtime = %rt.id(),
                function = function.name(),
                %error,
                "guarded call raised"
            );
            Err(error)
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(
                runtime = %rt.id(),
                function = function.name(),
                panic = %message,
                "guarded call panicked"
            );
            Err(message)
        }
    }
}

/// Invoke `function` on `rt` directly (release builds skip the guard).
#[cfg(not(debug_assertions))]
pub fn run_guarded(
    rt: &WorkletRuntime,
    function: &JsFunction,
    args: &[JsValue],
) -> Result<JsValue, String> {
    function.call(rt, args)
}
