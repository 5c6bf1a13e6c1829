//! # Device-control request.
//!
//! A [`Request`] is owned by the calling layer and lent to the dispatcher for the
//! duration of one call. It carries the current [`StackLocation`] (control code and
//! caller input), a completion status slot and an optional completion notifier
//! the owning layer can wait on.
//!
//! ## Rules
//! - A request is completed **at most once**; later calls to [`Request::complete`]
//!   are ignored and return `false`.
//! - The notifier fires exactly once, with the completion status.

use tokio::sync::oneshot;

use crate::{error::Status, ioctl::IoControlCode, process::ProcessId};

/// Per-call parameters of a device-control request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackLocation {
    /// Control code requested by the caller.
    pub control_code: IoControlCode,
    /// Caller-supplied input buffer.
    pub input: Vec<u8>,
}

/// One inbound device-control call.
#[derive(Debug)]
pub struct Request {
    stack: Option<StackLocation>,
    requestor: ProcessId,
    status: Option<Status>,
    notify: Option<oneshot::Sender<Status>>,
}

impl Request {
    /// Creates a request for `control_code` with an empty input buffer.
    pub fn new(control_code: u32) -> Self {
        Self::with_stack(Some(StackLocation {
            control_code: IoControlCode(control_code),
            input: Vec::new(),
        }))
    }

    /// Creates a request from an explicit stack location.
    ///
    /// `None` models a call whose context cannot be resolved.
    pub fn with_stack(stack: Option<StackLocation>) -> Self {
        Self {
            stack,
            requestor: ProcessId::SYSTEM,
            status: None,
            notify: None,
        }
    }

    /// Sets the caller-supplied input buffer.
    ///
    /// Has no effect on a request without a stack location.
    pub fn with_input(mut self, input: impl Into<Vec<u8>>) -> Self {
        if let Some(stack) = self.stack.as_mut() {
            stack.input = input.into();
        }
        self
    }

    /// Records the process that issued the request.
    pub fn with_requestor(mut self, pid: ProcessId) -> Self {
        self.requestor = pid;
        self
    }

    /// Attaches a completion notifier and returns its receiving side.
    pub fn with_completion(mut self) -> (Self, oneshot::Receiver<Status>) {
        let (tx, rx) = oneshot::channel();
        self.notify = Some(tx);
        (self, rx)
    }

    /// Current stack location, if the call context can be resolved.
    #[inline]
    pub fn current_stack_location(&self) -> Option<&StackLocation> {
        self.stack.as_ref()
    }

    /// Process that issued the request.
    #[inline]
    pub fn requestor(&self) -> ProcessId {
        self.requestor
    }

    /// Completion status, `None` while the request is pending.
    #[inline]
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.status.is_some()
    }

    /// Completes the request with `status` and notifies the owning layer.
    ///
    /// Returns `false` if the request was already completed.
    pub fn complete(&mut self, status: Status) -> bool {
        if self.status.is_some() {
            return false;
        }
        self.status = Some(status);
        if let Some(tx) = self.notify.take() {
            // The owning layer may have stopped listening.
            let _ = tx.send(status);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_only_once() {
        let (mut req, mut rx) = Request::new(1).with_completion();
        assert!(!req.is_completed());

        assert!(req.complete(Status::Success));
        assert!(!req.complete(Status::InternalError));

        assert_eq!(req.status(), Some(Status::Success));
        assert_eq!(rx.try_recv().ok(), Some(Status::Success));
    }

    #[test]
    fn test_input_requires_stack() {
        let req = Request::with_stack(None).with_input(vec![1, 2, 3]);
        assert!(req.current_stack_location().is_none());

        let req = Request::new(7).with_input(vec![1, 2, 3]);
        let stack = req.current_stack_location().map(|s| s.input.clone());
        assert_eq!(stack, Some(vec![1, 2, 3]));
    }
}
