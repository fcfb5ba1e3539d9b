//! Handler bindings.
//!
//! A [`HandlerBinding`] is what route resolution hands to the pipeline: the
//! service instance, a typed entry point, and whether that entry point
//! completes immediately or returns a future. The entry point is
//! type-erased once, when the binding is created.
//!
//! # Example
//!
//! ```rust
//! use hermes_core::HandlerError;
//! use hermes_dispatch::{HandlerBinding, HandlerMode, Invocation};
//!
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! let sync = HandlerBinding::sync(Greeter { greeting: "hi".into() }, |call: Invocation<Greeter>| {
//!     let name: String = call.arguments.required_as("name")?;
//!     Ok::<_, HandlerError>(format!("{} {name}", call.service.greeting))
//! });
//! assert_eq!(sync.mode(), HandlerMode::Sync);
//!
//! let asynchronous = HandlerBinding::asynchronous(
//!     Greeter { greeting: "hello".into() },
//!     |call: Invocation<Greeter>| async move {
//!         Ok::<_, HandlerError>(call.service.greeting.clone())
//!     },
//! );
//! assert_eq!(asynchronous.mode(), HandlerMode::Async);
//! ```

use crate::types::BoxFuture;
use futures_util::FutureExt;
use hermes_core::HandlerError;
use hermes_extract::Arguments;
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Settled handler outcome.
pub type ReplyResult = Result<Reply, HandlerError>;

/// What a handler receives: the service instance and its arguments.
#[derive(Debug)]
pub struct Invocation<S> {
    /// The resolved service instance.
    pub service: Arc<S>,
    /// Arguments in descriptor order.
    pub arguments: Arguments,
}

/// Whether a handler completes immediately or returns a future.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerMode {
    /// The handler returns its result directly.
    Sync,
    /// The handler returns a future that settles later.
    Async,
}

impl fmt::Display for HandlerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => write!(f, "sync"),
            Self::Async => write!(f, "async"),
        }
    }
}

/// A successful handler result, ready to be encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    status: StatusCode,
    body: Value,
}

impl Reply {
    /// Creates a `200 OK` reply.
    pub fn ok<T: Serialize + ?Sized>(value: &T) -> Result<Self, HandlerError> {
        Self::with_status(StatusCode::OK, value)
    }

    /// Creates a reply with a chosen success status.
    ///
    /// # Errors
    ///
    /// Returns a 500 [`HandlerError`] if `value` cannot be serialized.
    pub fn with_status<T: Serialize + ?Sized>(
        status: StatusCode,
        value: &T,
    ) -> Result<Self, HandlerError> {
        let body = serde_json::to_value(value).map_err(HandlerError::serialization)?;
        Ok(Self { status, body })
    }

    /// Returns the response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the body value.
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }
}

/// Conversion from a handler's return value into a [`Reply`].
///
/// Any serializable value becomes a `200 OK` reply; a [`Reply`] is passed
/// through as is.
pub trait IntoReply {
    /// Converts `self` into a reply.
    fn into_reply(self) -> ReplyResult;
}

impl<T: Serialize> IntoReply for T {
    fn into_reply(self) -> ReplyResult {
        Reply::ok(&self)
    }
}

impl IntoReply for Reply {
    fn into_reply(self) -> ReplyResult {
        Ok(self)
    }
}

/// Raw return of a handler entry point.
pub enum HandlerReturn {
    /// The handler already settled.
    Ready(ReplyResult),
    /// The handler settles when this future completes.
    Pending(BoxFuture<'static, ReplyResult>),
}

impl fmt::Debug for HandlerReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

type Entry<S> = Arc<dyn Fn(Invocation<S>) -> HandlerReturn + Send + Sync>;

/// A resolved handler: service instance, entry point and mode.
///
/// Bindings are immutable and cheap to clone; one binding serves every
/// concurrent request on its route.
pub struct HandlerBinding<S> {
    service: Arc<S>,
    entry: Entry<S>,
    mode: HandlerMode,
}

impl<S> HandlerBinding<S>
where
    S: Send + Sync + 'static,
{
    /// Binds a handler that returns its result directly.
    pub fn sync<F, R>(service: impl Into<Arc<S>>, handler: F) -> Self
    where
        F: Fn(Invocation<S>) -> Result<R, HandlerError> + Send + Sync + 'static,
        R: IntoReply,
    {
        let entry: Entry<S> = Arc::new(move |invocation: Invocation<S>| {
            HandlerReturn::Ready(handler(invocation).and_then(IntoReply::into_reply))
        });
        Self {
            service: service.into(),
            entry,
            mode: HandlerMode::Sync,
        }
    }

    /// Binds a handler that returns a future.
    pub fn asynchronous<F, Fut, R>(service: impl Into<Arc<S>>, handler: F) -> Self
    where
        F: Fn(Invocation<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
        R: IntoReply,
    {
        let entry: Entry<S> = Arc::new(move |invocation: Invocation<S>| {
            HandlerReturn::Pending(
                handler(invocation)
                    .map(|result| result.and_then(IntoReply::into_reply))
                    .boxed(),
            )
        });
        Self {
            service: service.into(),
            entry,
            mode: HandlerMode::Async,
        }
    }
}

impl<S> HandlerBinding<S> {
    /// Returns the handler mode.
    #[must_use]
    pub fn mode(&self) -> HandlerMode {
        self.mode
    }

    /// Returns the service instance.
    #[must_use]
    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    /// Calls the entry point. Panics propagate to the caller.
    pub(crate) fn call(&self, arguments: Arguments) -> HandlerReturn {
        (self.entry)(Invocation {
            service: Arc::clone(&self.service),
            arguments,
        })
    }
}

impl<S> Clone for HandlerBinding<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            entry: Arc::clone(&self.entry),
            mode: self.mode,
        }
    }
}

impl<S> fmt::Debug for HandlerBinding<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerBinding")
            .field("service", &std::any::type_name::<S>())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::ParameterLocation;
    use hermes_extract::Argument;
    use serde_json::json;

    struct Counter {
        base: i64,
    }

    fn args(value: i64) -> Arguments {
        Arguments::from(vec![Argument::new(
            "n",
            ParameterLocation::Body,
            json!(value),
        )])
    }

    #[test]
    fn test_sync_binding_settles_immediately() {
        let binding = HandlerBinding::sync(Counter { base: 10 }, |call: Invocation<Counter>| {
            let n: i64 = call.arguments.required_as("n")?;
            Ok(call.service.base + n)
        });

        match binding.call(args(5)) {
            HandlerReturn::Ready(Ok(reply)) => {
                assert_eq!(reply.status(), StatusCode::OK);
                assert_eq!(reply.body(), &json!(15));
            }
            other => panic!("unexpected return: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_async_binding_returns_future() {
        let binding =
            HandlerBinding::asynchronous(Counter { base: 1 }, |call: Invocation<Counter>| async move {
                let n: i64 = call.arguments.required_as("n")?;
                Ok::<_, HandlerError>(json!({ "total": call.service.base + n }))
            });

        match binding.call(args(2)) {
            HandlerReturn::Pending(future) => {
                let reply = future.await.unwrap();
                assert_eq!(reply.body(), &json!({"total": 3}));
            }
            other => panic!("unexpected return: {other:?}"),
        }
    }

    #[test]
    fn test_reply_with_status_passes_through() {
        let binding = HandlerBinding::sync(Counter { base: 0 }, |_call: Invocation<Counter>| {
            Reply::with_status(StatusCode::CREATED, &json!({"id": 1}))
        });

        match binding.call(Arguments::default()) {
            HandlerReturn::Ready(Ok(reply)) => assert_eq!(reply.status(), StatusCode::CREATED),
            other => panic!("unexpected return: {other:?}"),
        }
    }

    #[test]
    fn test_handler_error_is_returned() {
        let binding = HandlerBinding::sync(Counter { base: 0 }, |_call: Invocation<Counter>| {
            Err::<i64, _>(HandlerError::conflict("already exists"))
        });

        match binding.call(Arguments::default()) {
            HandlerReturn::Ready(Err(e)) => assert_eq!(e.status_code(), StatusCode::CONFLICT),
            other => panic!("unexpected return: {other:?}"),
        }
    }

    #[test]
    fn test_clone_shares_service() {
        let binding = HandlerBinding::sync(Counter { base: 0 }, |_call: Invocation<Counter>| {
            Ok::<_, HandlerError>(())
        });
        let clone = binding.clone();
        assert!(Arc::ptr_eq(binding.service(), clone.service()));
        assert_eq!(format!("{}", clone.mode()), "sync");
    }
}
