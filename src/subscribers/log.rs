//! # LogWriter - trace line printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout, one line per
//! event, prefixed with the facility id.
//!
//! ## Example output
//! ```text
//! [77][dispatch] code=0x83372000 pid:1234
//! [77][worker] name="say-hello" tick=0 pid:4 - Hello!
//! [77][completed] code=0x83372000 status=success (0x00000000)
//! [77][unsupported] code=0xFFFFFFFF
//! [77][spawn-failed] status=insufficient_resources (0xC000009A) err="..."
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn hex(code: Option<u32>) -> String {
    code.map(|c| format!("{c:#010X}")).unwrap_or_else(|| "-".into())
}

fn status(e: &Event) -> String {
    e.status.map(|s| s.to_string()).unwrap_or_else(|| "-".into())
}

fn process(e: &Event) -> String {
    e.process.map(|p| p.to_string()).unwrap_or_else(|| "-".into())
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let f = e.facility;
        match e.kind {
            EventKind::MalformedRequest => {
                println!("[{f}][malformed] failed to get the I/O stack location of the caller");
            }
            EventKind::UnsupportedOperation => {
                println!("[{f}][unsupported] code={}", hex(e.code));
            }
            EventKind::DispatchEntered => {
                println!("[{f}][dispatch] code={} {}", hex(e.code), process(e));
            }
            EventKind::SpawnFailed => {
                println!(
                    "[{f}][spawn-failed] status={} err={:?}",
                    status(e),
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
            EventKind::RequestCompleted => {
                println!("[{f}][completed] code={} status={}", hex(e.code), status(e));
            }
            EventKind::WorkerTick => {
                println!(
                    "[{f}][worker] name={:?} tick={} {} - Hello!",
                    e.worker.as_deref().unwrap_or("unknown"),
                    e.tick.unwrap_or_default(),
                    process(e)
                );
            }
            EventKind::WorkerTerminated => {
                println!(
                    "[{f}][terminated] name={:?} status={} {}",
                    e.worker.as_deref().unwrap_or("unknown"),
                    status(e),
                    process(e)
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
