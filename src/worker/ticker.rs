//! # Ticker: the device's default worker.
//!
//! Repeats a fixed number of times: sleep for `interval`, then publish a
//! [`EventKind::WorkerTick`]. When the budget is exhausted it terminates with
//! [`Status::Success`].
//!
//! ```text
//! Created → Running(0) → Running(1) → … → Running(ticks-1) → Terminated
//! ```
//!
//! ## Rules
//! - Tick count is exactly `ticks`; no early exit, no extra iterations.
//! - The tick counter lives inside the spawned future; every spawn gets its own.
//! - The timed sleep is the only suspension point and cannot fail.

use std::time::Duration;

use tokio::time;

use crate::{
    config::Config,
    events::{Event, EventKind},
    worker::worker::{BoxWorkerFuture, Worker, WorkerContext},
    Status,
};

/// Bounded periodic worker.
#[derive(Debug, Clone)]
pub struct Ticker {
    name: String,
    ticks: u32,
    interval: Duration,
}

impl Ticker {
    /// Name the device's default worker is published under.
    pub const DEFAULT_NAME: &'static str = "say-hello";

    pub fn new(name: impl Into<String>, ticks: u32, interval: Duration) -> Self {
        Self {
            name: name.into(),
            ticks,
            interval,
        }
    }

    /// Builds the default worker from `cfg.ticks` and `cfg.tick_interval`.
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(Self::DEFAULT_NAME, cfg.ticks, cfg.tick_interval)
    }

    #[inline]
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Ticks remaining plus the fixed per-tick delay.
#[derive(Debug)]
struct TickState {
    remaining: u32,
    done: u32,
    interval: Duration,
}

impl TickState {
    fn new(budget: u32, interval: Duration) -> Self {
        Self {
            remaining: budget,
            done: 0,
            interval,
        }
    }

    /// Sleeps for one interval and returns the finished tick number,
    /// or `None` once the budget is exhausted.
    async fn next(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        time::sleep(self.interval).await;

        let tick = self.done;
        self.remaining -= 1;
        self.done += 1;
        Some(tick)
    }
}

impl Worker for Ticker {
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self, ctx: WorkerContext) -> BoxWorkerFuture {
        let name = self.name.clone();
        let mut state = TickState::new(self.ticks, self.interval);

        Box::pin(async move {
            while let Some(tick) = state.next().await {
                ctx.bus().publish(
                    Event::new(EventKind::WorkerTick)
                        .with_worker(name.as_str())
                        .with_tick(tick)
                        .with_process(ctx.process()),
                );
            }
            Status::Success
        })
    }
}
