//! # Run one detached worker.
//!
//! Wraps the worker's future with its process binding and publishes the
//! termination event when the worker ends on its own.
//!
//! ```text
//! scope(pid) {
//!   worker.spawn(ctx) ──► ... ticks ... ──► Status
//! }
//! publish WorkerTerminated { status, pid }
//! ```
//!
//! ## Rules
//! - The worker is created **inside** the scope, so even its setup runs under `pid`.
//! - Exactly one `WorkerTerminated` per worker.

use crate::{
    events::{Bus, Event, EventKind},
    process::{self, ProcessId},
    worker::{WorkerContext, WorkerRef},
};

/// Runs `worker` to completion on behalf of `pid`.
pub(crate) async fn run_detached(worker: WorkerRef, pid: ProcessId, bus: Bus) {
    let ctx = WorkerContext::new(bus.clone());
    let status = process::scope(pid, async { worker.spawn(ctx).await }).await;

    bus.publish(
        Event::new(EventKind::WorkerTerminated)
            .with_worker(worker.name())
            .with_status(status)
            .with_process(pid),
    );
}
