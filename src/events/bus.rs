//! # Trace bus of one device.
//!
//! Every [`Device`](crate::Device) owns one [`Bus`]. The dispatcher publishes on
//! the caller's thread; every worker the device spawned publishes through a clone
//! of the same bus, so all traces of one device share a single numbering.
//!
//! ```text
//!   dispatch()  ──┐
//!   worker 1    ──┼── publish ──► Bus (seq stamped) ──┬──► SubscriberSet listener
//!   worker N    ──┘                                   └──► Bus::subscribe() receivers
//! ```
//!
//! ## Rules
//! - `publish` never blocks, and a trace published with no receiver is gone.
//! - `seq` is assigned at publish time and increases per device, starting at 0.
//! - Receivers that fall more than the capacity behind skip the oldest traces
//!   (`RecvError::Lagged`).

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel carrying one device's traces.
///
/// Clones share the channel and the sequence counter.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
    next_seq: Arc<AtomicU64>,
}

impl Bus {
    /// Creates a bus retaining up to `capacity` traces per receiver (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self {
            tx,
            next_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Stamps the next sequence number on `ev` and sends it to all receivers.
    pub fn publish(&self, mut ev: Event) {
        ev.seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let _ = self.tx.send(ev);
    }

    /// Receiver for traces published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
