//! # Device configuration.
//!
//! Provides [`Config`], the settings a [`Device`](crate::Device) is built with.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by the bus
//! - `ticks = 0` → the worker terminates without ticking

use std::time::Duration;

use crate::{context::ContextPolicy, ioctl::DEVICE_FUNCTION};

/// Configuration for the device and the worker it spawns.
///
/// ## Field semantics
/// - `control_code`: the only control code the dispatcher accepts
/// - `context`: which process new workers are bound to
/// - `ticks`: how many iterations a worker runs before terminating
/// - `tick_interval`: sleep before each iteration
/// - `bus_capacity`: diagnostic bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct Config {
    /// Control code routed to the worker spawner.
    pub control_code: u32,

    /// Execution context policy for new workers.
    pub context: ContextPolicy,

    /// Worker iteration budget.
    pub ticks: u32,

    /// Worker delay per iteration.
    pub tick_interval: Duration,

    /// Capacity of the diagnostic bus.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events skip older ones.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `control_code = DEVICE_FUNCTION`
    /// - `context = ContextPolicy::System`
    /// - `ticks = 20`
    /// - `tick_interval = 5s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            control_code: DEVICE_FUNCTION,
            context: ContextPolicy::System,
            ticks: 20,
            tick_interval: Duration::from_secs(5),
            bus_capacity: 1024,
        }
    }
}
