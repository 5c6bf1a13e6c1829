//! Diagnostic events: types and broadcast bus.
//!
//! Every major transition of the dispatch layer is published as an [`Event`]
//! tagged with the fixed [`FACILITY`] id. What happens to it afterwards (printing,
//! collecting, nothing) is up to the subscribers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] per-device broadcast channel that numbers traces as they are published
//!
//! ## Quick reference
//! - **Publishers**: `Device::dispatch`, the worker runner, `Ticker`.
//! - **Consumers**: the listener of the device's `SubscriberSet` and anyone
//!   holding a receiver from [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind, FACILITY};
