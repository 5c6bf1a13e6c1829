//! # Trace subscribers
//!
//! A `Subscribe` implementation receives the device's trace events: dispatch
//! outcomes (entry, rejection, spawn failure, completion) and the output of
//! detached workers (one [`WorkerTick`](EventKind::WorkerTick) per iteration,
//! then [`WorkerTerminated`](EventKind::WorkerTerminated)). Every trace carries
//! the device's facility id.
//!
//! ## Contract
//! - `on_event` may be slow. Neither `dispatch` nor any worker waits for it.
//! - Traces a subscriber does not [`accept`](Subscribe::accepts) never enter its
//!   queue. A default worker emits `ticks + 1` traces over its lifetime, so a
//!   subscriber interested only in dispatch outcomes should filter ticks out.
//! - When the queue is full the trace is dropped for this subscriber only.
//!
//! ## Example
//! ```rust
//! use ctlvisor::{Event, EventKind, Subscribe};
//!
//! struct TickCounter(std::sync::atomic::AtomicUsize);
//!
//! #[async_trait::async_trait]
//! impl Subscribe for TickCounter {
//!     async fn on_event(&self, _ev: &Event) {
//!         self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!     }
//!     fn accepts(&self, kind: EventKind) -> bool {
//!         kind == EventKind::WorkerTick
//!     }
//!     fn name(&self) -> &'static str { "tick-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

/// Queue slots per subscriber unless it asks otherwise.
const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Consumer of device trace events.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one accepted trace.
    async fn on_event(&self, event: &Event);

    /// Whether traces of `kind` should be queued for this subscriber.
    fn accepts(&self, kind: EventKind) -> bool {
        let _ = kind;
        true
    }

    /// Name used in drop and panic reports.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of this subscriber's queue (min 1).
    fn queue_capacity(&self) -> usize {
        DEFAULT_QUEUE_CAPACITY
    }
}
