//! # Worker trait.
//!
//! A [`Worker`] produces a fresh future per spawn. The future **is** the worker's
//! whole life: it runs detached and its output is the status the worker
//! terminates with. Nobody awaits it on behalf of the caller.
//!
//! A worker has no cancellation input. It ends only by finishing its future.

use std::{future::Future, pin::Pin, sync::Arc};

use crate::{events::Bus, process::{self, ProcessId}, Status};

/// Boxed future returned by [`Worker::spawn`].
pub type BoxWorkerFuture = Pin<Box<dyn Future<Output = Status> + Send + 'static>>;

/// Shared handle to a worker entry task.
pub type WorkerRef = Arc<dyn Worker>;

/// What a running worker is given.
#[derive(Clone, Debug)]
pub struct WorkerContext {
    bus: Bus,
}

impl WorkerContext {
    pub(crate) fn new(bus: Bus) -> Self {
        Self { bus }
    }

    /// Diagnostic bus the worker may publish to.
    #[inline]
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Process the worker is bound to.
    ///
    /// Only meaningful from inside the worker's own future.
    #[inline]
    pub fn process(&self) -> ProcessId {
        process::current()
    }
}

/// # Detached, self-terminating unit of work.
///
/// # Example
/// ```
/// use ctlvisor::{BoxWorkerFuture, Status, Worker, WorkerContext};
///
/// struct Once;
///
/// impl Worker for Once {
///     fn name(&self) -> &str { "once" }
///
///     fn spawn(&self, _ctx: WorkerContext) -> BoxWorkerFuture {
///         Box::pin(async { Status::Success })
///     }
/// }
/// ```
pub trait Worker: Send + Sync + 'static {
    /// Returns a stable, human-readable worker name.
    fn name(&self) -> &str;

    /// Creates the future the scheduler will run.
    fn spawn(&self, ctx: WorkerContext) -> BoxWorkerFuture;
}
