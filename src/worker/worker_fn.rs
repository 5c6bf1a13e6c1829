//! # Function-backed worker (`WorkerFn`)
//!
//! [`WorkerFn`] wraps a closure `F: Fn(WorkerContext) -> Fut`, producing a fresh
//! future per spawn. Every spawned worker owns its own state; if workers must
//! share something, capture an `Arc<...>` in the closure explicitly.
//!
//! ## Example
//! ```rust
//! use ctlvisor::{Status, WorkerContext, WorkerFn, WorkerRef};
//!
//! let w: WorkerRef = WorkerFn::arc("greeter", |ctx: WorkerContext| async move {
//!     let _bound_to = ctx.process();
//!     Status::Success
//! });
//!
//! assert_eq!(w.name(), "greeter");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use crate::{
    worker::worker::{BoxWorkerFuture, Worker, WorkerContext},
    Status,
};

/// Function-backed worker implementation.
#[derive(Debug)]
pub struct WorkerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> WorkerFn<F> {
    /// Creates a new function-backed worker.
    ///
    /// Prefer [`WorkerFn::arc`] when you immediately need a [`WorkerRef`](crate::WorkerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the worker and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, Fut> Worker for WorkerFn<F>
where
    F: Fn(WorkerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Status> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self, ctx: WorkerContext) -> BoxWorkerFuture {
        Box::pin((self.f)(ctx))
    }
}
