//! # Device: the device-control entry point.
//!
//! The [`Device`] owns the diagnostic bus, the configuration, the [`Spawner`] and
//! the subscribers attached at build time. It is built once (see
//! [`DeviceBuilder`]) and dispatch only reads it afterwards, so `dispatch` may be
//! called from many callers at once.
//!
//! ## Dispatch flow
//! ```text
//! dispatch(req)                               (on the caller's thread, in its process)
//!   ├─ no stack location  ──► publish MalformedRequest     ──► return InternalError
//!   ├─ code != supported  ──► publish UnsupportedOperation ──► return NotSupported
//!   │                          (both: request left pending, nothing spawned)
//!   └─ code == supported  ──► publish DispatchEntered
//!                         ──► context = cfg.context.select()
//!                         ──► spawner.spawn(entry, context)
//!                               ├─ Ok  ──► complete(Success)
//!                               └─ Err ──► publish SpawnFailed ──► complete(err.status())
//! ```
//!
//! ## Rules
//! - Only a request with the supported code is completed, **exactly once, before `dispatch` returns**.
//! - Rejected requests are traced and returned; their owner is never notified.
//! - Completion never waits for the worker; the request is done once the worker exists.
//! - No failure is retried; every failure is traced and returned as a [`Status`].

use std::sync::{Arc, Mutex};

use super::{builder::DeviceBuilder, handle::HandleTable, spawner::Spawner};
use crate::{
    config::Config,
    error::{DispatchError, Status},
    events::{Bus, Event, EventKind},
    process,
    request::Request,
    subscribers::SubscriberSet,
    worker::WorkerRef,
};

/// Device-control dispatcher with a single supported control code.
pub struct Device {
    cfg: Config,
    bus: Bus,
    spawner: Spawner,
    entry: WorkerRef,
    subscribers: Mutex<Option<SubscriberSet>>,
}

impl Device {
    /// Returns a builder for a device with the given configuration.
    pub fn builder(cfg: Config) -> DeviceBuilder {
        DeviceBuilder::new(cfg)
    }

    /// Creates a device with default collaborators and no subscribers.
    pub fn new(cfg: Config) -> Arc<Self> {
        DeviceBuilder::new(cfg).build()
    }

    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        spawner: Spawner,
        entry: WorkerRef,
        subscribers: Option<SubscriberSet>,
    ) -> Self {
        Self {
            cfg,
            bus,
            spawner,
            entry,
            subscribers: Mutex::new(subscribers),
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Diagnostic bus; subscribe to observe trace events.
    #[inline]
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Handle accounting of all workers this device created.
    #[inline]
    pub fn handles(&self) -> &Arc<HandleTable> {
        self.spawner.handles()
    }

    /// Dispatches one device-control request.
    ///
    /// Runs on behalf of the request's requestor process.
    ///
    /// # Example
    /// ```
    /// use ctlvisor::{Config, Device, Request, Status};
    ///
    /// let device = Device::new(Config::default());
    /// let mut req = Request::new(0xFFFF_FFFF);
    ///
    /// assert_eq!(device.dispatch(&mut req), Status::NotSupported);
    /// assert!(!req.is_completed());
    /// assert_eq!(device.handles().created(), 0);
    /// ```
    pub fn dispatch(&self, req: &mut Request) -> Status {
        process::sync_scope(req.requestor(), || self.dispatch_in_caller(req))
    }

    /// Detaches the subscribers attached at build time.
    ///
    /// Every trace published before the call is handed to them first, and the
    /// call returns once each subscriber has worked through its queue. Dispatch
    /// and running workers are unaffected; later traces reach only direct bus
    /// receivers. A second call does nothing.
    pub async fn shutdown(&self) {
        let set = match self.subscribers.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(set) = set {
            set.shutdown().await;
        }
    }

    fn dispatch_in_caller(&self, req: &mut Request) -> Status {
        let code = match req.current_stack_location() {
            Some(stack) => stack.control_code.0,
            None => return self.reject(DispatchError::MalformedRequest),
        };
        if code != self.cfg.control_code {
            return self.reject(DispatchError::Unsupported { code });
        }

        let status = match self.spawn_worker(code) {
            Ok(()) => Status::Success,
            Err(err) => {
                self.report(&err);
                err.status()
            }
        };

        req.complete(status);
        self.bus.publish(
            Event::new(EventKind::RequestCompleted)
                .with_code(code)
                .with_status(status),
        );
        status
    }

    /// Traces a rejected request and returns its status; the request stays pending.
    fn reject(&self, err: DispatchError) -> Status {
        self.report(&err);
        err.status()
    }

    fn spawn_worker(&self, code: u32) -> Result<(), DispatchError> {
        self.bus.publish(
            Event::new(EventKind::DispatchEntered)
                .with_code(code)
                .with_process(process::current()),
        );

        let context = self.cfg.context.select();
        self.spawner.spawn(Arc::clone(&self.entry), context)?;
        Ok(())
    }

    fn report(&self, err: &DispatchError) {
        let ev = match err {
            DispatchError::MalformedRequest => {
                Event::new(EventKind::MalformedRequest).with_status(err.status())
            }
            DispatchError::Unsupported { code } => {
                Event::new(EventKind::UnsupportedOperation).with_code(*code)
            }
            DispatchError::Spawn(e) => Event::new(EventKind::SpawnFailed).with_status(e.status()),
        };
        self.bus.publish(ev.with_reason(err.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::ContextPolicy,
        core::scheduler::{DetachedFuture, Schedule},
        error::SpawnError,
        ioctl::DEVICE_FUNCTION,
        process::ProcessId,
        subscribers::Subscribe,
        worker::{WorkerContext, WorkerFn},
    };
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::{
        sync::{broadcast, mpsc},
        task::JoinHandle,
    };

    const CALLER: ProcessId = ProcessId(1234);

    struct Exhausted;

    impl Schedule for Exhausted {
        fn schedule(&self, _fut: DetachedFuture) -> Result<JoinHandle<()>, SpawnError> {
            Err(SpawnError::InsufficientResources)
        }
    }

    fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    fn kinds(events: &[Event]) -> Vec<EventKind> {
        events.iter().map(|e| e.kind).collect()
    }

    #[derive(Default)]
    struct Collect(std::sync::Mutex<Vec<EventKind>>);

    #[async_trait]
    impl Subscribe for Collect {
        async fn on_event(&self, ev: &Event) {
            if let Ok(mut seen) = self.0.lock() {
                seen.push(ev.kind);
            }
        }
    }

    impl Collect {
        fn seen(&self) -> Vec<EventKind> {
            self.0.lock().map(|v| v.clone()).unwrap_or_default()
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

    #[tokio::test(start_paused = true)]
    async fn test_supported_request_spawns_one_worker_and_completes() {
        let device = Device::new(Config::default());
        let mut rx = device.bus().subscribe();
        let (mut req, done) = Request::new(DEVICE_FUNCTION)
            .with_requestor(CALLER)
            .with_completion();

        let status = device.dispatch(&mut req);

        assert_eq!(status, Status::Success);
        assert_eq!(req.status(), Some(Status::Success));
        assert_eq!(done.await.ok(), Some(Status::Success));
        assert_eq!(device.handles().created(), 1);
        assert_eq!(device.handles().open(), 0);

        let events = drain(&mut rx);
        assert_eq!(
            kinds(&events),
            vec![EventKind::DispatchEntered, EventKind::RequestCompleted]
        );
        assert_eq!(events[0].process, Some(CALLER));
        assert_eq!(events[0].code, Some(DEVICE_FUNCTION));
        assert_eq!(events[0].facility, crate::events::FACILITY);
    }

    #[tokio::test]
    async fn test_unsupported_code_spawns_nothing() {
        let device = Device::new(Config::default());
        let mut rx = device.bus().subscribe();
        let mut req = Request::new(0xFFFF_FFFF).with_requestor(CALLER);

        assert_eq!(device.dispatch(&mut req), Status::NotSupported);
        assert_eq!(req.status(), None);
        assert_eq!(device.handles().created(), 0);
        assert_eq!(device.handles().open(), 0);

        let events = drain(&mut rx);
        assert_eq!(kinds(&events), vec![EventKind::UnsupportedOperation]);
        assert_eq!(events[0].code, Some(0xFFFF_FFFF));
    }

    #[tokio::test]
    async fn test_unsupported_code_leaves_request_pending() {
        let device = Device::new(Config::default());
        let mut rx = device.bus().subscribe();
        let (mut req, mut done) = Request::new(0xFFFF_FFFF)
            .with_requestor(CALLER)
            .with_completion();

        assert_eq!(device.dispatch(&mut req), Status::NotSupported);
        assert!(!req.is_completed());
        assert!(done.try_recv().is_err());
        assert!(drain(&mut rx)
            .iter()
            .all(|e| e.kind != EventKind::RequestCompleted));

        // Still pending: the owner may complete it itself.
        assert!(req.complete(Status::NotSupported));
        assert_eq!(done.try_recv().ok(), Some(Status::NotSupported));
    }

    #[tokio::test]
    async fn test_unresolvable_context_is_internal_error_without_completion() {
        let device = Device::new(Config::default());
        let mut rx = device.bus().subscribe();
        let (mut req, mut done) = Request::with_stack(None)
            .with_requestor(CALLER)
            .with_completion();

        assert_eq!(device.dispatch(&mut req), Status::InternalError);
        assert!(!req.is_completed());
        assert!(done.try_recv().is_err());
        assert_eq!(device.handles().created(), 0);
        assert_eq!(kinds(&drain(&mut rx)), vec![EventKind::MalformedRequest]);
    }

    #[tokio::test]
    async fn test_spawn_failure_propagates_status_verbatim() {
        let device = Device::builder(Config::default())
            .with_scheduler(Arc::new(Exhausted))
            .build();
        let mut rx = device.bus().subscribe();
        let (mut req, done) = Request::new(DEVICE_FUNCTION)
            .with_requestor(CALLER)
            .with_completion();

        let status = device.dispatch(&mut req);

        assert_eq!(status, Status::InsufficientResources);
        assert_eq!(req.status(), Some(Status::InsufficientResources));
        assert_eq!(done.await.ok(), Some(Status::InsufficientResources));
        assert_eq!(device.handles().created(), 0);
        assert_eq!(device.handles().open(), 0);

        let events = drain(&mut rx);
        assert_eq!(
            kinds(&events),
            vec![
                EventKind::DispatchEntered,
                EventKind::SpawnFailed,
                EventKind::RequestCompleted
            ]
        );
        assert_eq!(events[1].status, Some(Status::InsufficientResources));
    }

    #[test]
    fn test_dispatch_without_runtime_reports_resource_failure() {
        let device = Device::new(Config::default());
        let mut req = Request::new(DEVICE_FUNCTION).with_requestor(CALLER);

        assert_eq!(device.dispatch(&mut req), Status::InsufficientResources);
        assert_eq!(req.status(), Some(Status::InsufficientResources));
        assert_eq!(device.handles().created(), 0);
    }

    #[tokio::test]
    async fn test_worker_runs_in_system_context_not_caller() {
        let (worker, mut seen) = recorder();
        let device = Device::builder(Config::default())
            .with_worker(worker)
            .build();
        let mut req = Request::new(DEVICE_FUNCTION).with_requestor(CALLER);

        assert_eq!(device.dispatch(&mut req), Status::Success);

        let bound = seen.recv().await;
        assert_eq!(bound, Some(ProcessId::SYSTEM));
        assert!(bound.is_some_and(|pid| pid.is_system()));
        assert_ne!(bound, Some(CALLER));
    }

    #[tokio::test]
    async fn test_caller_policy_binds_worker_to_requestor() {
        let cfg = Config {
            context: ContextPolicy::Caller,
            ..Config::default()
        };
        let (worker, mut seen) = recorder();
        let device = Device::builder(cfg).with_worker(worker).build();
        let mut req = Request::new(DEVICE_FUNCTION).with_requestor(CALLER);

        assert_eq!(device.dispatch(&mut req), Status::Success);
        assert_eq!(seen.recv().await, Some(CALLER));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_precedes_worker_output() {
        let device = Device::new(Config::default());
        let mut rx = device.bus().subscribe();
        let mut req = Request::new(DEVICE_FUNCTION).with_requestor(CALLER);

        assert_eq!(device.dispatch(&mut req), Status::Success);
        assert!(req.is_completed());

        let events = drain(&mut rx);
        assert!(events.iter().all(|e| e.kind != EventKind::WorkerTick));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_worker_ticks_twenty_times_then_terminates() {
        let device = Device::new(Config::default());
        let mut rx = device.bus().subscribe();
        let mut req = Request::new(DEVICE_FUNCTION).with_requestor(CALLER);
        assert_eq!(device.dispatch(&mut req), Status::Success);

        tokio::time::sleep(Duration::from_secs(200)).await;

        let events = drain(&mut rx);
        let ticks: Vec<_> = events
            .iter()
            .filter(|e| e.kind == EventKind::WorkerTick)
            .collect();
        assert_eq!(ticks.len(), 20);
        assert!(ticks.iter().all(|e| e.process == Some(ProcessId::SYSTEM)));

        let last = events.last().map(|e| (e.kind, e.status));
        assert_eq!(
            last,
            Some((EventKind::WorkerTerminated, Some(Status::Success)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_get_independent_workers() {
        let cfg = Config {
            ticks: 3,
            tick_interval: Duration::from_millis(10),
            ..Config::default()
        };
        let device = Device::new(cfg);
        let mut rx = device.bus().subscribe();

        for pid in 100..105 {
            let mut req = Request::new(DEVICE_FUNCTION).with_requestor(ProcessId(pid));
            assert_eq!(device.dispatch(&mut req), Status::Success);
        }
        assert_eq!(device.handles().created(), 5);
        assert_eq!(device.handles().open(), 0);

        tokio::time::sleep(Duration::from_secs(1)).await;

        let events = drain(&mut rx);
        let count = |kind| events.iter().filter(|e| e.kind == kind).count();
        assert_eq!(count(EventKind::WorkerTick), 15);
        assert_eq!(count(EventKind::WorkerTerminated), 5);
    }

    #[tokio::test]
    async fn test_shutdown_flushes_traces_to_subscribers() {
        let collect = Arc::new(Collect::default());
        let subs: Vec<Arc<dyn Subscribe>> = vec![collect.clone()];
        let device = Device::builder(Config::default())
            .with_subscribers(subs)
            .build();

        let mut bogus = Request::new(0xFFFF_FFFF).with_requestor(CALLER);
        let mut broken = Request::with_stack(None).with_requestor(CALLER);
        device.dispatch(&mut bogus);
        device.dispatch(&mut broken);

        device.shutdown().await;
        assert_eq!(
            collect.seen(),
            vec![EventKind::UnsupportedOperation, EventKind::MalformedRequest]
        );

        // Detached: later traces no longer reach the subscriber.
        device.dispatch(&mut bogus);
        device.shutdown().await;
        assert_eq!(collect.seen().len(), 2);
    }

    #[test]
    fn test_build_with_subscribers_outside_runtime_does_not_panic() {
        let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Collect::default())];
        let device = Device::builder(Config::default())
            .with_subscribers(subs)
            .build();

        let detached = device.subscribers.lock().map(|set| set.is_none());
        assert_eq!(detached.ok(), Some(true));

        let mut req = Request::new(0xFFFF_FFFF).with_requestor(CALLER);
        assert_eq!(device.dispatch(&mut req), Status::NotSupported);
    }
}
