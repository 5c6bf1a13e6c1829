//! # Worker abstractions.
//!
//! This module provides the worker-related types:
//! - [`Worker`] - trait for the entry task a spawner hands to the scheduler
//! - [`WorkerFn`] - closure-backed worker
//! - [`WorkerRef`] - shared reference to a worker (`Arc<dyn Worker>`)
//! - [`Ticker`] - the device's default worker: a bounded, self-terminating loop
//! - [`WorkerContext`] - what a running worker gets (the diagnostic bus)

mod ticker;
mod worker;
mod worker_fn;

pub use ticker::Ticker;
pub use worker::{BoxWorkerFuture, Worker, WorkerContext, WorkerRef};
pub use worker_fn::WorkerFn;
