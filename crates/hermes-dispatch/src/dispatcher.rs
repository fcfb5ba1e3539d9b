//! Handler dispatch.
//!
//! The [`Dispatcher`] invokes a [`HandlerBinding`] and settles its result.
//! Every failure raised during invocation comes back as a
//! [`HandlerError`]: an error value from the handler, a panic in a sync
//! handler, or a panic while polling an async handler's future.

use crate::binding::{HandlerBinding, HandlerMode, HandlerReturn, ReplyResult};
use futures_util::FutureExt;
use hermes_core::HandlerError;
use hermes_extract::Arguments;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Invokes a handler binding with extracted arguments.
#[derive(Debug, Clone)]
pub struct Dispatcher<S> {
    binding: HandlerBinding<S>,
}

impl<S> Dispatcher<S>
where
    S: Send + Sync + 'static,
{
    /// Creates a dispatcher for `binding`.
    #[must_use]
    pub fn new(binding: HandlerBinding<S>) -> Self {
        Self { binding }
    }

    /// Returns the mode of the bound handler.
    #[must_use]
    pub fn mode(&self) -> HandlerMode {
        self.binding.mode()
    }

    /// Returns the binding.
    #[must_use]
    pub fn binding(&self) -> &HandlerBinding<S> {
        &self.binding
    }

    /// Invokes the handler and waits for it to settle.
    ///
    /// Sync handlers settle without suspending. Async handlers are awaited.
    /// Panics are caught and turned into a 500 [`HandlerError`].
    pub async fn dispatch(&self, arguments: Arguments) -> ReplyResult {
        let returned = match catch_unwind(AssertUnwindSafe(|| self.binding.call(arguments))) {
            Ok(returned) => returned,
            Err(payload) => return Err(panicked(payload.as_ref())),
        };

        match returned {
            HandlerReturn::Ready(result) => result,
            HandlerReturn::Pending(future) => AssertUnwindSafe(future)
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(panicked(payload.as_ref()))),
        }
    }
}

fn panicked(payload: &(dyn std::any::Any + Send)) -> HandlerError {
    let error = HandlerError::from_panic(payload);
    tracing::error!(error = %error, "handler panicked");
    error
}
