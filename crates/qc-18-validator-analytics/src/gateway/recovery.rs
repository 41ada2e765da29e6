//! Panic recovery for request handlers.

use super::error::GatewayError;
use futures::FutureExt;
use std::any::Any;
use std::backtrace::Backtrace;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::{error, Span};

/// Run `handler`, turning a panic into `GatewayError::Panic`.
///
/// The panic is logged with a backtrace and recorded as `panic.stack` on the
/// current request span.
pub async fn recover<F, T>(handler: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    match AssertUnwindSafe(handler).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            let stack = Backtrace::force_capture().to_string();
            Span::current().record("panic.stack", stack.as_str());
            error!(panic = %message, stack = %stack, "[qc-18] Handler panicked");
            Err(GatewayError::Panic)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
