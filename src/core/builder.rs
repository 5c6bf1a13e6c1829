use std::sync::Arc;

use tokio::runtime::Handle;

use super::{
    device::Device,
    scheduler::{Schedule, TokioScheduler},
    spawner::Spawner,
};
use crate::{
    config::Config,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
    worker::{Ticker, WorkerRef},
};

/// Builder for constructing a [`Device`] with optional collaborators.
pub struct DeviceBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    worker: Option<WorkerRef>,
    scheduler: Option<Arc<dyn Schedule>>,
}

impl DeviceBuilder {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            worker: None,
            scheduler: None,
        }
    }

    /// Sets diagnostic subscribers.
    ///
    /// They are attached only when [`build`](Self::build) runs inside a tokio
    /// runtime; elsewhere the device is built without them.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Replaces the entry task workers run (defaults to [`Ticker::from_config`]).
    pub fn with_worker(mut self, worker: WorkerRef) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Replaces the scheduler workers are created on (defaults to [`TokioScheduler`]).
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Schedule>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Builds the device.
    ///
    /// Initializes:
    /// - Diagnostic bus
    /// - Subscriber set attached to the bus (if any subscriber and a runtime)
    /// - Spawner with its handle table
    pub fn build(self) -> Arc<Device> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subscribers = attach_subscribers(&bus, self.subscribers);

        let entry: WorkerRef = match self.worker {
            Some(worker) => worker,
            None => Arc::new(Ticker::from_config(&self.cfg)),
        };
        let scheduler: Arc<dyn Schedule> = match self.scheduler {
            Some(scheduler) => scheduler,
            None => Arc::new(TokioScheduler),
        };
        let spawner = Spawner::new(scheduler, bus.clone());

        Arc::new(Device::new_internal(
            self.cfg,
            bus,
            spawner,
            entry,
            subscribers,
        ))
    }
}

fn attach_subscribers(bus: &Bus, subs: Vec<Arc<dyn Subscribe>>) -> Option<SubscriberSet> {
    if subs.is_empty() {
        return None;
    }
    match Handle::try_current() {
        Ok(runtime) => Some(SubscriberSet::attach(bus, &runtime, subs)),
        Err(_) => {
            eprintln!(
                "[ctlvisor] no tokio runtime, {} subscriber(s) not attached",
                subs.len()
            );
            None
        }
    }
}
