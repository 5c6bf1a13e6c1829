//! Dispatch core: request routing and worker hand-off.
//!
//! Internal modules:
//! - [`device`]: validates requests and completes them with the spawn outcome;
//! - [`builder`]: wires bus, subscribers, scheduler and entry worker into a device;
//! - [`spawner`]: creates a worker bound to a context and releases its handle;
//! - [`scheduler`]: the seam that turns a future into a detached unit of execution;
//! - [`handle`]: worker handles and their accounting;
//! - [`runner`]: runs one detached worker under its process binding.

mod builder;
mod device;
mod handle;
mod runner;
mod scheduler;
mod spawner;

pub use builder::DeviceBuilder;
pub use device::Device;
pub use handle::{AccessMask, HandleTable, WorkerHandle};
pub use scheduler::{DetachedFuture, Schedule, TokioScheduler};
pub use spawner::Spawner;
