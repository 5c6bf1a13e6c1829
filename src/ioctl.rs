//! # Device I/O control codes.
//!
//! A control code packs four fields into 32 bits, the same way the `CTL_CODE`
//! macro does:
//!
//! ```text
//!  31            16 15  14 13           2 1     0
//! ┌────────────────┬──────┬──────────────┬───────┐
//! │  device type   │access│   function   │method │
//! └────────────────┴──────┴──────────────┴───────┘
//! ```
//!
//! [`DEVICE_FUNCTION`] is the single code the device answers to by default.

/// Device type used by this device (custom range starts at `0x8000`).
pub const FILE_DEVICE_BASIC: u32 = 0x0000_8337;

/// Buffered transfer method.
pub const METHOD_BUFFERED: u32 = 0;

/// Any caller with a handle to the device may issue the request.
pub const FILE_ANY_ACCESS: u32 = 0;

/// The one control code handled by the device.
pub const DEVICE_FUNCTION: u32 = ctl_code(FILE_DEVICE_BASIC, 0x800, METHOD_BUFFERED, FILE_ANY_ACCESS);

/// Builds a control code from its parts.
///
/// # Example
/// ```
/// use ctlvisor::ioctl::{ctl_code, IoControlCode};
///
/// let code = IoControlCode(ctl_code(0x22, 0x800, 0, 0));
/// assert_eq!(code.device_type(), 0x22);
/// assert_eq!(code.function(), 0x800);
/// ```
pub const fn ctl_code(device_type: u32, function: u32, method: u32, access: u32) -> u32 {
    (device_type << 16) | (access << 14) | (function << 2) | method
}

/// A raw control code with accessors for its packed fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IoControlCode(pub u32);

impl IoControlCode {
    #[inline]
    pub fn device_type(&self) -> u32 {
        self.0 >> 16
    }

    #[inline]
    pub fn access(&self) -> u32 {
        (self.0 >> 14) & 0x3
    }

    #[inline]
    pub fn function(&self) -> u32 {
        (self.0 >> 2) & 0xFFF
    }

    #[inline]
    pub fn method(&self) -> u32 {
        self.0 & 0x3
    }
}

impl From<u32> for IoControlCode {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_function_fields() {
        let code = IoControlCode(DEVICE_FUNCTION);
        assert_eq!(code.device_type(), FILE_DEVICE_BASIC);
        assert_eq!(code.function(), 0x800);
        assert_eq!(code.method(), METHOD_BUFFERED);
        assert_eq!(code.access(), FILE_ANY_ACCESS);
    }

    #[test]
    fn test_all_ones_is_not_device_function() {
        assert_ne!(DEVICE_FUNCTION, 0xFFFF_FFFF);
    }
}
