//! # Worker spawner.
//!
//! Creates a worker bound to an [`ExecutionContext`], then immediately releases
//! its handle. The spawner never waits on, queries, or cancels the worker
//! afterwards; once `spawn` returns it has no relationship to it.
//!
//! ## Flow
//! ```text
//! spawn(entry, context)
//!   ├─► pid = context.resolve()            (Unspecified → SYSTEM)
//!   ├─► scheduler.schedule(run_detached(entry, pid))
//!   │       ├─ Err ──► return Err(SpawnError)   (no handle exists)
//!   │       └─ Ok  ──► handle = table.insert(join, AccessMask::ALL)
//!   ├─► handle.close()                     (before returning)
//!   └─► Ok(())
//! ```

use std::sync::Arc;

use super::{
    handle::{AccessMask, HandleTable, WorkerHandle},
    runner::run_detached,
    scheduler::Schedule,
};
use crate::{context::ExecutionContext, error::SpawnError, events::Bus, worker::WorkerRef};

/// Creates detached workers and reclaims their handles.
pub struct Spawner {
    scheduler: Arc<dyn Schedule>,
    handles: Arc<HandleTable>,
    bus: Bus,
}

impl Spawner {
    pub fn new(scheduler: Arc<dyn Schedule>, bus: Bus) -> Self {
        Self {
            scheduler,
            handles: HandleTable::new(),
            bus,
        }
    }

    /// Handle accounting for workers created by this spawner.
    #[inline]
    pub fn handles(&self) -> &Arc<HandleTable> {
        &self.handles
    }

    /// Creates a worker running `entry` under `context` and releases its handle.
    ///
    /// `Ok(())` means the worker exists, not that it has started or finished.
    pub fn spawn(&self, entry: WorkerRef, context: ExecutionContext) -> Result<(), SpawnError> {
        let handle = self.create(entry, context, AccessMask::ALL)?;
        handle.close();
        Ok(())
    }

    fn create(
        &self,
        entry: WorkerRef,
        context: ExecutionContext,
        access: AccessMask,
    ) -> Result<WorkerHandle, SpawnError> {
        let pid = context.resolve();
        let fut = run_detached(entry, pid, self.bus.clone());
        let join = self.scheduler.schedule(Box::pin(fut))?;
        Ok(self.handles.insert(join, access))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::scheduler::{DetachedFuture, TokioScheduler},
        process::{self, ProcessId},
        worker::{WorkerContext, WorkerFn},
        Status,
    };
    use tokio::{sync::mpsc, task::JoinHandle};

    struct Exhausted;

    impl Schedule for Exhausted {
        fn schedule(&self, _fut: DetachedFuture) -> Result<JoinHandle<()>, SpawnError> {
            Err(SpawnError::InsufficientResources)
        }
    }

    fn recorder() -> (WorkerRef, mpsc::UnboundedReceiver<ProcessId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker: WorkerRef = WorkerFn::arc("recorder", move |ctx: WorkerContext| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(ctx.process());
                Status::Success
            }
        });
        (worker, rx)
    }

    #[tokio::test]
    async fn test_unspecified_context_runs_in_system_not_caller() {
        let spawner = Spawner::new(Arc::new(TokioScheduler), Bus::new(8));
        let (worker, mut rx) = recorder();

        let caller = ProcessId(1234);
        let res = process::sync_scope(caller, || {
            spawner.spawn(worker, ExecutionContext::Unspecified)
        });
        assert!(res.is_ok());

        let bound = rx.recv().await;
        assert_eq!(bound, Some(ProcessId::SYSTEM));
        assert!(bound.is_some_and(|pid| pid.is_system()));
        assert_ne!(bound, Some(caller));
    }

    #[tokio::test]
    async fn test_explicit_context_runs_in_that_process() {
        let spawner = Spawner::new(Arc::new(TokioScheduler), Bus::new(8));
        let (worker, mut rx) = recorder();

        let res = spawner.spawn(worker, ExecutionContext::Process(ProcessId(77)));
        assert!(res.is_ok());
        assert_eq!(rx.recv().await, Some(ProcessId(77)));
    }

    #[tokio::test]
    async fn test_handle_closed_before_spawn_returns() {
        let spawner = Spawner::new(Arc::new(TokioScheduler), Bus::new(8));
        let (worker, _rx) = recorder();

        assert!(spawner.spawn(worker, ExecutionContext::Unspecified).is_ok());
        assert_eq!(spawner.handles().created(), 1);
        assert_eq!(spawner.handles().open(), 0);
    }

    #[tokio::test]
    async fn test_failed_creation_leaves_no_handle() {
        let spawner = Spawner::new(Arc::new(Exhausted), Bus::new(8));
        let (worker, _rx) = recorder();

        let res = spawner.spawn(worker, ExecutionContext::Unspecified);
        assert_eq!(res, Err(SpawnError::InsufficientResources));
        assert_eq!(spawner.handles().created(), 0);
        assert_eq!(spawner.handles().open(), 0);
    }
}
