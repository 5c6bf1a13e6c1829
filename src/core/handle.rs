//! # Worker handles and the handle table.
//!
//! A [`WorkerHandle`] is the spawner's only reference to a freshly created worker.
//! It is released with [`WorkerHandle::close`], which consumes it: after the
//! call there is nothing left to use.
//!
//! ## Rules
//! - The handle offers no way to wait on, query or cancel the worker.
//! - Closing a handle **detaches** the worker; it never stops it.
//! - Every handle is accounted in its [`HandleTable`]: `created` counts all handles
//!   ever issued, `open` counts handles not yet closed (or dropped).

use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc,
};

use tokio::task::JoinHandle;

/// Access rights requested on a worker handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessMask(pub u32);

impl AccessMask {
    /// Full access (`THREAD_ALL_ACCESS`).
    pub const ALL: AccessMask = AccessMask(0x001F_FFFF);
}

/// Counts issued and open worker handles.
#[derive(Debug, Default)]
pub struct HandleTable {
    created: AtomicU64,
    open: AtomicUsize,
}

impl HandleTable {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of handles ever issued (one per created worker).
    #[inline]
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Acquire)
    }

    /// Number of handles currently open.
    #[inline]
    pub fn open(&self) -> usize {
        self.open.load(Ordering::Acquire)
    }

    pub(crate) fn insert(
        self: &Arc<Self>,
        join: JoinHandle<()>,
        access: AccessMask,
    ) -> WorkerHandle {
        let id = self.created.fetch_add(1, Ordering::AcqRel) + 1;
        self.open.fetch_add(1, Ordering::AcqRel);
        WorkerHandle {
            id,
            access,
            _join: join,
            table: Arc::clone(self),
        }
    }
}

/// Transient reference to a created worker.
#[derive(Debug)]
pub struct WorkerHandle {
    id: u64,
    access: AccessMask,
    // Never awaited or aborted; dropping it with the handle detaches the worker.
    _join: JoinHandle<()>,
    table: Arc<HandleTable>,
}

impl WorkerHandle {
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn access(&self) -> AccessMask {
        self.access
    }

    /// Releases the handle. The worker keeps running.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.table.open.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_close_detaches_without_stopping() {
        let table = HandleTable::new();
        let (tx, rx) = tokio::sync::oneshot::channel();
        let join = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            let _ = tx.send(());
        });

        let handle = table.insert(join, AccessMask::ALL);
        assert_eq!(handle.id(), 1);
        assert_eq!(handle.access(), AccessMask::ALL);
        assert_eq!(table.open(), 1);

        handle.close();
        assert_eq!(table.open(), 0);
        assert_eq!(table.created(), 1);

        assert!(rx.await.is_ok(), "worker must outlive its handle");
    }
}
