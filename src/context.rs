//! # Execution context selection.
//!
//! A worker is always bound to a process when it is created. The selector
//! decides which one:
//!
//! - [`ContextPolicy::System`] → [`ExecutionContext::Unspecified`], which the
//!   spawner resolves to [`ProcessId::SYSTEM`];
//! - [`ContextPolicy::Caller`] → [`ExecutionContext::Process`] of whoever is
//!   dispatching the request right now.
//!
//! The device ships with `System`. `Caller` is kept so both bindings can be
//! exercised and compared.

use crate::process::{self, ProcessId};

/// Process a new worker is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    /// No explicit process: the worker runs in the system process.
    Unspecified,
    /// The worker runs on behalf of the given process.
    Process(ProcessId),
}

impl ExecutionContext {
    /// Resolves to the effective process.
    ///
    /// `Unspecified` never resolves to the calling process.
    #[inline]
    pub fn resolve(&self) -> ProcessId {
        match self {
            ExecutionContext::Unspecified => ProcessId::SYSTEM,
            ExecutionContext::Process(pid) => *pid,
        }
    }
}

/// Which context the selector picks for new workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextPolicy {
    /// Bind workers to the system process.
    #[default]
    System,
    /// Bind workers to the process that issued the request.
    Caller,
}

impl ContextPolicy {
    /// Produces the context reference for a worker created right now.
    ///
    /// `Caller` reads [`process::current`], so it must be evaluated on the
    /// dispatching thread, before any hand-off.
    pub fn select(&self) -> ExecutionContext {
        match self {
            ContextPolicy::System => ExecutionContext::Unspecified,
            ContextPolicy::Caller => ExecutionContext::Process(process::current()),
        }
    }
}
