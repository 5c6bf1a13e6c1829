//! # Diagnostic events emitted by the dispatcher and workers.
//!
//! The [`EventKind`] enum classifies events in two groups:
//! - **Dispatch events**: what happened to one request (entry, rejection, spawn failure, completion)
//! - **Worker events**: what a detached worker does (ticks, termination)
//!
//! The [`Event`] struct carries metadata such as the control code, status, tick
//! number and the process the publisher runs under.
//!
//! ## Ordering guarantees
//! The device's [`Bus`](crate::Bus) stamps each event with a sequence number
//! (`seq`) when it is published. Events from one publisher are ordered;
//! events from different workers interleave.
//!
//! ## Example
//! ```rust
//! use ctlvisor::{Event, EventKind, Status};
//!
//! let ev = Event::new(EventKind::RequestCompleted)
//!     .with_code(0x8337_2000)
//!     .with_status(Status::Success);
//!
//! assert_eq!(ev.kind, EventKind::RequestCompleted);
//! assert_eq!(ev.status, Some(Status::Success));
//! ```

use std::sync::Arc;
use std::time::SystemTime;

use crate::{error::Status, process::ProcessId};

/// Facility id every diagnostic line is tagged with.
pub const FACILITY: u32 = 77;

/// Classification of diagnostic events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Dispatch events ===
    /// Request has no resolvable call context.
    ///
    /// Sets:
    /// - `status`: `InternalError`
    MalformedRequest,

    /// Request carries a control code the device does not handle.
    ///
    /// Sets:
    /// - `code`: rejected control code
    UnsupportedOperation,

    /// Supported request accepted; a worker is about to be spawned.
    ///
    /// Sets:
    /// - `code`: control code
    /// - `process`: process of the dispatching caller
    DispatchEntered,

    /// Worker creation failed.
    ///
    /// Sets:
    /// - `status`: failure status
    /// - `reason`: error message
    SpawnFailed,

    /// Request completed.
    ///
    /// Sets:
    /// - `code`: control code
    /// - `status`: completion status
    RequestCompleted,

    // === Worker events ===
    /// Worker finished one iteration.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `tick`: zero-based iteration number
    /// - `process`: process the worker is bound to
    WorkerTick,

    /// Worker terminated itself.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `status`: exit status
    /// - `process`: process the worker was bound to
    WorkerTerminated,
}

/// Diagnostic event with optional metadata.
///
/// - `seq`: publication order within one device
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Publication order within the device; 0 until published.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Facility tag (always [`FACILITY`]).
    pub facility: u32,
    /// Event classification.
    pub kind: EventKind,

    /// Control code of the request.
    pub code: Option<u32>,
    /// Completion or exit status.
    pub status: Option<Status>,
    /// Worker iteration number (zero-based).
    pub tick: Option<u32>,
    /// Process the publisher runs under.
    pub process: Option<ProcessId>,
    /// Worker name.
    pub worker: Option<Arc<str>>,
    /// Human-readable reason (errors).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: 0,
            at: SystemTime::now(),
            facility: FACILITY,
            kind,
            code: None,
            status: None,
            tick: None,
            process: None,
            worker: None,
            reason: None,
        }
    }

    #[inline]
    pub fn with_code(mut self, code: u32) -> Self {
        self.code = Some(code);
        self
    }

    #[inline]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    #[inline]
    pub fn with_tick(mut self, tick: u32) -> Self {
        self.tick = Some(tick);
        self
    }

    #[inline]
    pub fn with_process(mut self, pid: ProcessId) -> Self {
        self.process = Some(pid);
        self
    }

    #[inline]
    pub fn with_worker(mut self, name: impl Into<Arc<str>>) -> Self {
        self.worker = Some(name.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
