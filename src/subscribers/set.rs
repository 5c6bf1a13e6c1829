//! # SubscriberSet: the device's diagnostic fan-out.
//!
//! A [`SubscriberSet`] is attached to a device's [`Bus`] when the device is
//! built. One listener task reads the bus and routes every trace to the
//! subscribers that [accept](Subscribe::accepts) its [`EventKind`](crate::EventKind);
//! each subscriber works through its own bounded queue on its own task.
//!
//! ```text
//! Bus ──► listener ──┬─ accepts(kind)? ──► [queue S1] ──► S1.on_event()
//!                    └─ accepts(kind)? ──► [queue SN] ──► SN.on_event()
//! ```
//!
//! ## Rules
//! - Publishers (dispatch, workers) never wait for a subscriber. A full queue
//!   drops the trace for that subscriber only and says so on stderr.
//! - Per-subscriber FIFO; no ordering across subscribers.
//! - A panic in `on_event` is reported and the subscriber keeps receiving traces.
//! - [`shutdown`](SubscriberSet::shutdown) hands over everything published
//!   before the call, then waits until every queue is empty. Dropping the set
//!   detaches the subscribers the same way without waiting.

use std::sync::Arc;

use futures::FutureExt;
use tokio::{
    runtime::Handle,
    sync::{broadcast, mpsc, oneshot},
    task::JoinHandle,
};

use super::Subscribe;
use crate::events::{Bus, Event};

/// One subscriber as seen by the listener.
struct Route {
    sub: Arc<dyn Subscribe>,
    queue: mpsc::Sender<Arc<Event>>,
}

impl Route {
    fn forward(&self, ev: &Arc<Event>) {
        if !self.sub.accepts(ev.kind) {
            return;
        }
        let why = match self.queue.try_send(Arc::clone(ev)) {
            Ok(()) => return,
            Err(mpsc::error::TrySendError::Full(_)) => "queue full",
            Err(mpsc::error::TrySendError::Closed(_)) => "subscriber gone",
        };
        eprintln!(
            "[ctlvisor][{}] {} dropped {:?} #{}: {why}",
            ev.facility,
            self.sub.name(),
            ev.kind,
            ev.seq
        );
    }
}

/// Subscribers attached to one bus, with their queues and tasks.
pub struct SubscriberSet {
    stop: oneshot::Sender<()>,
    listener: JoinHandle<()>,
    queues: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Attaches `subs` to `bus`, running their tasks on `runtime`.
    ///
    /// Only traces published after this call are delivered.
    pub fn attach(bus: &Bus, runtime: &Handle, subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut routes = Vec::with_capacity(subs.len());
        let mut queues = Vec::with_capacity(subs.len());

        for sub in subs {
            let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
            queues.push(runtime.spawn(drain_queue(Arc::clone(&sub), rx)));
            routes.push(Route { sub, queue: tx });
        }

        let (stop, stopped) = oneshot::channel();
        let listener = runtime.spawn(listen(bus.subscribe(), routes, stopped));

        Self {
            stop,
            listener,
            queues,
        }
    }

    /// Forwards the traces published so far, then waits for every subscriber
    /// to handle its queue.
    pub async fn shutdown(self) {
        let _ = self.stop.send(());
        let _ = self.listener.await;
        for queue in self.queues {
            let _ = queue.await;
        }
    }
}

async fn listen(
    mut rx: broadcast::Receiver<Event>,
    routes: Vec<Route>,
    mut stopped: oneshot::Receiver<()>,
) {
    let fan_out = |ev: Event| {
        let ev = Arc::new(ev);
        for route in &routes {
            route.forward(&ev);
        }
    };

    loop {
        tokio::select! {
            biased;
            res = rx.recv() => match res {
                Ok(ev) => fan_out(ev),
                Err(broadcast::error::RecvError::Lagged(n)) => lagged(n),
                Err(broadcast::error::RecvError::Closed) => return,
            },
            // Explicit stop or the set was dropped.
            _ = &mut stopped => break,
        }
    }

    loop {
        match rx.try_recv() {
            Ok(ev) => fan_out(ev),
            Err(broadcast::error::TryRecvError::Lagged(n)) => lagged(n),
            Err(_) => break,
        }
    }
}

fn lagged(n: u64) {
    eprintln!("[ctlvisor] subscriber listener lagged, skipped {n} traces");
}

async fn drain_queue(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>) {
    while let Some(ev) = rx.recv().await {
        let handled = std::panic::AssertUnwindSafe(sub.on_event(&ev))
            .catch_unwind()
            .await;
        if let Err(panic) = handled {
            eprintln!(
                "[ctlvisor][{}] {} panicked on {:?}: {panic:?}",
                ev.facility,
                sub.name(),
                ev.kind
            );
        }
    }
}
