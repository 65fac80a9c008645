//! Flush policies and the background flush worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Controls when the collection gets written to disk.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Write after every create/update/delete. Write failures reach the caller.
    #[default]
    Immediate,
    /// Background thread writes on a timer and whenever the collection changes.
    Async(Duration),
    /// Only write when `flush()` is called.
    Manual,
}

/// Background thread that runs a flush closure on a timer or when poked
/// through the channel. The thread exits once every sender is gone, and the
/// worker joins it on drop.
pub struct FlushWorker {
    stop: Arc<AtomicBool>,
    join_handle: Option<thread::JoinHandle<()>>,
}

impl FlushWorker {
    /// Spawn the worker. The caller keeps the sending half of `rx`'s channel;
    /// dropping it stops the loop.
    pub fn spawn<F>(interval: Duration, rx: mpsc::Receiver<()>, flush_fn: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let join_handle = thread::Builder::new()
            .name("bookshelf-flush".into())
            .spawn(move || loop {
                if stop_flag.load(Ordering::Relaxed) {
                    break;
                }
                match rx.recv_timeout(interval) {
                    Ok(()) | Err(mpsc::RecvTimeoutError::Timeout) => flush_fn(),
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            });

        let join_handle = match join_handle {
            Ok(h) => Some(h),
            Err(err) => {
                tracing::error!(error = %err, "could not spawn flush thread; relying on explicit flush");
                None
            }
        };

        Self { stop, join_handle }
    }
}

impl Drop for FlushWorker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(h) = self.join_handle.take() {
            let _ = h.join();
        }
    }
}

impl std::fmt::Debug for FlushWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlushWorker")
            .field("running", &self.join_handle.is_some())
            .finish()
    }
}
