//! # Example: say_hello
//!
//! Builds a device with the built-in [`LogWriter`], issues one supported request
//! and one unsupported request from a simulated caller process, then waits while
//! the detached worker ticks in the system process.
//!
//! ## Flow
//! ```text
//! Request(DEVICE_FUNCTION, pid 1234) ──► Device::dispatch()
//!     ├─► publish(DispatchEntered)
//!     ├─► Spawner::spawn(Ticker, Unspecified) ──► handle closed
//!     └─► publish(RequestCompleted)             ◄── returns here
//!
//! Ticker (pid 4): sleep ─► publish(WorkerTick) ×N ─► publish(WorkerTerminated)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example say_hello --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use ctlvisor::{
    ioctl::DEVICE_FUNCTION, process::ProcessId, Config, Device, EventKind, LogWriter, Request,
    Subscribe,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Shorter ticks than the 20 × 5s default so the demo finishes quickly
    let cfg = Config {
        ticks: 5,
        tick_interval: Duration::from_millis(500),
        ..Config::default()
    };

    // 2. Print every trace event
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let device = Device::builder(cfg).with_subscribers(subs).build();
    let mut events = device.bus().subscribe();

    // 3. A request the device does not handle; traced, returned, left pending
    let mut bogus = Request::new(0xFFFF_FFFF).with_requestor(ProcessId(1234));
    println!("unsupported -> {}", device.dispatch(&mut bogus));
    println!("completed?  -> {}", bogus.is_completed());

    // 4. The supported request; completes before the worker ticks even once
    let (mut req, done) = Request::new(DEVICE_FUNCTION)
        .with_requestor(ProcessId(1234))
        .with_completion();
    println!("supported   -> {}", device.dispatch(&mut req));
    println!("completed   -> {}", done.await?);
    println!("open handles: {}", device.handles().open());

    // 5. Wait for the worker to terminate itself
    while let Ok(ev) = events.recv().await {
        if ev.kind == EventKind::WorkerTerminated {
            break;
        }
    }

    // 6. Let the LogWriter print everything published so far
    device.shutdown().await;
    Ok(())
}
