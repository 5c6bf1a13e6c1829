//! # Scheduler seam.
//!
//! [`Schedule`] turns a worker future into an independently scheduled unit of
//! execution. The default [`TokioScheduler`] spawns on the ambient tokio runtime.
//! Tests plug in schedulers that fail to model resource exhaustion.

use std::{future::Future, pin::Pin};

use tokio::{runtime::Handle, task::JoinHandle};

use crate::error::SpawnError;

/// Future of a detached worker, already wrapped with its process binding.
pub type DetachedFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Creates independently scheduled units of execution.
pub trait Schedule: Send + Sync + 'static {
    /// Starts `fut` detached from the caller.
    ///
    /// Must not wait for `fut` to make progress.
    fn schedule(&self, fut: DetachedFuture) -> Result<JoinHandle<()>, SpawnError>;
}

/// Spawns workers on the tokio runtime the caller is running in.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Schedule for TokioScheduler {
    fn schedule(&self, fut: DetachedFuture) -> Result<JoinHandle<()>, SpawnError> {
        let rt = Handle::try_current().map_err(|_| SpawnError::NoRuntime)?;
        Ok(rt.spawn(fut))
    }
}
