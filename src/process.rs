//! # Process identity of the running code.
//!
//! Every piece of work runs on behalf of some process. The dispatcher runs in
//! the context of whoever issued the request; workers run in the context they
//! were bound to at creation.
//!
//! The association is carried in a tokio task-local. Code not running inside any
//! [`scope`]/[`sync_scope`] belongs to the system process, which is the case for
//! a freshly spawned tokio task: task-locals are **not** inherited by
//! `tokio::spawn`.
//!
//! ```text
//! caller (pid 1234) ── sync_scope(1234, dispatch) ──► current() == 1234
//!                                  │
//!                                  └─► spawn worker ── scope(SYSTEM, run) ──► current() == 4
//! ```

use std::future::Future;

tokio::task_local! {
    static CURRENT_PROCESS: ProcessId;
}

/// Identifier of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(pub u32);

impl ProcessId {
    /// The privileged system process.
    pub const SYSTEM: ProcessId = ProcessId(4);

    #[inline]
    pub fn is_system(&self) -> bool {
        *self == Self::SYSTEM
    }
}

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pid:{}", self.0)
    }
}

/// Returns the process the current code runs on behalf of.
///
/// Falls back to [`ProcessId::SYSTEM`] outside any scope.
pub fn current() -> ProcessId {
    CURRENT_PROCESS
        .try_with(|pid| *pid)
        .unwrap_or(ProcessId::SYSTEM)
}

/// Runs `fut` on behalf of `pid`.
pub async fn scope<F: Future>(pid: ProcessId, fut: F) -> F::Output {
    CURRENT_PROCESS.scope(pid, fut).await
}

/// Runs the synchronous closure `f` on behalf of `pid`.
///
/// # Example
/// ```
/// use ctlvisor::process::{self, ProcessId};
///
/// let seen = process::sync_scope(ProcessId(1234), process::current);
/// assert_eq!(seen, ProcessId(1234));
/// assert_eq!(process::current(), ProcessId::SYSTEM);
/// ```
pub fn sync_scope<F, R>(pid: ProcessId, f: F) -> R
where
    F: FnOnce() -> R,
{
    CURRENT_PROCESS.sync_scope(pid, f)
}
