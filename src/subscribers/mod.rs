//! # Diagnostic subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] that
//! a device attaches to its [`Bus`](crate::events::Bus) at build time and
//! detaches in [`Device::shutdown`](crate::Device::shutdown).
//!
//! ## Architecture
//! ```text
//! dispatch / worker ── publish(Event) ──► Bus ──► SubscriberSet listener
//!                                                      │ accepts(kind)?
//!                                                ┌─────┴─────┬─────────┐
//!                                                ▼           ▼         ▼
//!                                            LogWriter    Collector  Custom
//! ```
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], which prints one trace line per event.

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
