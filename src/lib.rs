//! # ctlvisor
//!
//! **ctlvisor** is a minimal device-control dispatch layer.
//!
//! It receives device-control requests, validates them, and hands the actual
//! work to a detached worker that outlives the request. The request is completed
//! as soon as the worker exists; the worker runs a bounded loop on its own and
//! terminates itself. Rejected requests are traced and handed back pending.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   caller (pid N)
//!        │ Request { stack: { control_code, input }, requestor: N }
//!        ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Device::dispatch (runs synchronously on the caller's thread)    │
//! │   ├─ validate stack location  ──► InternalError   (not completed)│
//! │   ├─ validate control code    ──► NotSupported    (not completed)│
//! │   ├─ ContextPolicy::select()  ──► Unspecified | Process(N)       │
//! │   ├─ Spawner::spawn(entry, ctx)                                  │
//! │   │     ├─ Schedule::schedule(run_detached) ──► JoinHandle       │
//! │   │     └─ WorkerHandle::close()  (detach, never join)           │
//! │   └─ Request::complete(status) ──► owning layer notified         │
//! └──────┬──────────────────────────────────────────────┬────────────┘
//!        │ publishes                                    │ spawns
//!        ▼                                              ▼
//! ┌──────────────────────┐                 ┌──────────────────────────┐
//! │  Bus (broadcast)     │◄── publishes ───│  Worker (pid SYSTEM)     │
//! └──────────┬───────────┘                 │  sleep → tick, ×20       │
//!            ▼                             │  → WorkerTerminated      │
//!      SubscriberSet ──► LogWriter, ...    └──────────────────────────┘
//! ```
//!
//! ### Worker lifecycle
//! ```text
//! Created → Running(0) → Running(1) → … → Running(19) → Terminated
//! ```
//!
//! ## Features
//! | Area              | Description                                           | Key types                                   |
//! |-------------------|-------------------------------------------------------|---------------------------------------------|
//! | **Dispatch**      | Validate, spawn, complete.                            | [`Device`], [`Request`], [`Status`]         |
//! | **Context**       | Which process a worker is bound to.                   | [`ContextPolicy`], [`ExecutionContext`]     |
//! | **Workers**       | Detached, self-terminating entry tasks.               | [`Worker`], [`WorkerFn`], [`Ticker`]        |
//! | **Spawning**      | Create, bind, release handle.                         | [`Spawner`], [`Schedule`], [`HandleTable`]  |
//! | **Diagnostics**   | Trace events and subscribers.                         | [`Event`], [`Subscribe`], [`SubscriberSet`] |
//! | **Configuration** | Control code, context policy, tick budget.            | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging`: exports the built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use ctlvisor::{ioctl::DEVICE_FUNCTION, process::ProcessId, Config, Device, Request, Status};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let device = Device::new(Config::default());
//!
//!     let (mut req, done) = Request::new(DEVICE_FUNCTION)
//!         .with_requestor(ProcessId(1234))
//!         .with_completion();
//!
//!     // Returns as soon as the worker exists.
//!     assert_eq!(device.dispatch(&mut req), Status::Success);
//!     assert_eq!(done.await.ok(), Some(Status::Success));
//!     assert_eq!(device.handles().open(), 0);
//! }
//! ```

mod config;
mod context;
mod core;
mod error;
mod events;
mod request;
mod subscribers;
mod worker;

pub mod ioctl;
pub mod process;

// ---- Public re-exports ----

pub use config::Config;
pub use context::{ContextPolicy, ExecutionContext};
pub use self::core::{
    AccessMask, DetachedFuture, Device, DeviceBuilder, HandleTable, Schedule, Spawner,
    TokioScheduler, WorkerHandle,
};
pub use error::{DispatchError, SpawnError, Status};
pub use events::{Bus, Event, EventKind, FACILITY};
pub use request::{Request, StackLocation};
pub use subscribers::{Subscribe, SubscriberSet};
pub use worker::{BoxWorkerFuture, Ticker, Worker, WorkerContext, WorkerFn, WorkerRef};

// Optional: expose a simple built-in trace printer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
