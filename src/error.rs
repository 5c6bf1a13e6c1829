//! Status codes and error types used by the dispatch layer.
//!
//! This module defines:
//!
//! - [`Status`] - the completion status a request finishes with (NT-style codes).
//! - [`SpawnError`] - failures raised while creating a worker.
//! - [`DispatchError`] - failures raised while dispatching one request.
//!
//! Error types provide `as_label` for logs and a `status()` mapping so that every
//! failure path ends as a [`Status`] handed back to the completing layer.

use thiserror::Error;

/// # Completion status of a request.
///
/// Values mirror the NTSTATUS codes a device-control handler returns.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The operation completed successfully.
    Success,
    /// The request could not be associated with a call context.
    InternalError,
    /// The control code is not handled by this device.
    NotSupported,
    /// The system could not allocate what the operation needed.
    InsufficientResources,
}

impl Status {
    /// Returns the raw NTSTATUS value.
    ///
    /// # Example
    /// ```
    /// use ctlvisor::Status;
    ///
    /// assert_eq!(Status::Success.code(), 0);
    /// assert_eq!(Status::NotSupported.code(), 0xC000_00BB);
    /// ```
    pub fn code(&self) -> u32 {
        match self {
            Status::Success => 0x0000_0000,
            Status::InternalError => 0xC000_00E5,
            Status::NotSupported => 0xC000_00BB,
            Status::InsufficientResources => 0xC000_009A,
        }
    }

    /// `true` for [`Status::Success`] (the `NT_SUCCESS` check).
    #[inline]
    pub fn is_success(&self) -> bool {
        // NT_SUCCESS: severity bits 0b00 or 0b01.
        (self.code() as i32) >= 0
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::InternalError => "internal_error",
            Status::NotSupported => "not_supported",
            Status::InsufficientResources => "insufficient_resources",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:#010X})", self.as_label(), self.code())
    }
}

/// # Errors produced while creating a worker.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    /// The scheduler could not allocate a new unit of execution.
    #[error("insufficient resources to create worker")]
    InsufficientResources,

    /// No scheduler runtime is available on the calling thread.
    #[error("no runtime available to schedule worker")]
    NoRuntime,
}

impl SpawnError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SpawnError::InsufficientResources => "spawn_insufficient_resources",
            SpawnError::NoRuntime => "spawn_no_runtime",
        }
    }

    /// Status the failed spawn is reported with.
    ///
    /// Both variants are resource exhaustion from the caller's point of view.
    pub fn status(&self) -> Status {
        match self {
            SpawnError::InsufficientResources | SpawnError::NoRuntime => {
                Status::InsufficientResources
            }
        }
    }
}

/// # Errors produced while dispatching a single request.
///
/// All of them are terminal for the call that produced them; nothing is retried.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The request carries no current stack location.
    #[error("failed to get the I/O stack location of the caller")]
    MalformedRequest,

    /// The control code is not the one this device handles.
    #[error("control code {code:#010X} not supported")]
    Unsupported {
        /// The rejected control code.
        code: u32,
    },

    /// The worker could not be created.
    #[error("worker creation failed: {0}")]
    Spawn(#[from] SpawnError),
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use ctlvisor::DispatchError;
    ///
    /// let err = DispatchError::Unsupported { code: 0xFFFF_FFFF };
    /// assert_eq!(err.as_label(), "dispatch_unsupported");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::MalformedRequest => "dispatch_malformed_request",
            DispatchError::Unsupported { .. } => "dispatch_unsupported",
            DispatchError::Spawn(e) => e.as_label(),
        }
    }

    /// Status the request is reported with.
    pub fn status(&self) -> Status {
        match self {
            DispatchError::MalformedRequest => Status::InternalError,
            DispatchError::Unsupported { .. } => Status::NotSupported,
            DispatchError::Spawn(e) => e.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_success_is_nt_success() {
        assert!(Status::Success.is_success());
        assert!(!Status::InternalError.is_success());
        assert!(!Status::NotSupported.is_success());
        assert!(!Status::InsufficientResources.is_success());
    }

    #[test]
    fn test_dispatch_error_status_mapping() {
        assert_eq!(DispatchError::MalformedRequest.status(), Status::InternalError);
        assert_eq!(
            DispatchError::Unsupported { code: 1 }.status(),
            Status::NotSupported
        );
        assert_eq!(
            DispatchError::from(SpawnError::InsufficientResources).status(),
            Status::InsufficientResources
        );
    }

    #[test]
    fn test_display_includes_hex_code() {
        assert_eq!(
            Status::NotSupported.to_string(),
            "not_supported (0xC00000BB)"
        );
    }
}
