//! Background sync thread for `SyncMode::Periodic`.

use super::writer::{SegmentWriter, WriterError};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Name of the background sync thread.
pub const SYNC_THREAD_NAME: &str = "seglog-sync";

struct StopSignal {
    stopped: Mutex<bool>,
    cond: Condvar,
}

/// Handle to a running background sync thread.
///
/// Stopping (explicitly or on drop) wakes the thread, joins it and issues one
/// final sync so nothing written before the stop is left unsynced.
pub struct SyncThread {
    writer: Arc<SegmentWriter>,
    signal: Arc<StopSignal>,
    handle: Option<JoinHandle<()>>,
}

impl SyncThread {
    fn spawn(writer: Arc<SegmentWriter>, interval: Duration) -> Result<Self, WriterError> {
        let signal = Arc::new(StopSignal {
            stopped: Mutex::new(false),
            cond: Condvar::new(),
        });

        let thread_writer = Arc::clone(&writer);
        let thread_signal = Arc::clone(&signal);
        let handle = thread::Builder::new()
            .name(SYNC_THREAD_NAME.to_string())
            .spawn(move || sync_loop(&thread_writer, &thread_signal, interval))
            .map_err(|e| WriterError::Io {
                op: "spawn sync thread",
                path: writer.dir().to_path_buf(),
                source: e,
            })?;

        tracing::debug!(interval_ms = interval.as_millis() as u64, "Sync thread started");

        Ok(SyncThread {
            writer,
            signal,
            handle: Some(handle),
        })
    }

    /// Whether the thread is still running.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop the thread and sync once more. Idempotent.
    pub fn stop(&mut self) -> Result<(), WriterError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        *self.signal.stopped.lock() = true;
        self.signal.cond.notify_all();
        if handle.join().is_err() {
            tracing::warn!("Sync thread panicked");
        }

        tracing::debug!("Sync thread stopped");
        self.writer.sync()
    }
}

impl Drop for SyncThread {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!(error = %e, "Final sync failed");
        }
    }
}

impl std::fmt::Debug for SyncThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncThread")
            .field("running", &self.is_running())
            .finish()
    }
}

fn sync_loop(writer: &SegmentWriter, signal: &StopSignal, interval: Duration) {
    let mut stopped = signal.stopped.lock();
    while !*stopped {
        signal.cond.wait_for(&mut stopped, interval);
        if *stopped {
            break;
        }
        // Writers must not wait on the stop flag while we fsync
        let result = MutexGuard::unlocked(&mut stopped, || writer.sync());
        if let Err(e) = result {
            tracing::warn!(error = %e, "Background sync failed");
        }
    }
}

impl SegmentWriter {
    /// Start the background sync thread when the config asks for periodic
    /// sync. Returns `None` for the other modes.
    pub fn start_sync_thread(self: &Arc<Self>) -> Result<Option<SyncThread>, WriterError> {
        match self.config().sync.interval() {
            Some(interval) => SyncThread::spawn(Arc::clone(self), interval).map(Some),
            None => Ok(None),
        }
    }
}
