//! Bounded task admission between the feeder and the worker pool.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::config::ProcessingConfig;

/// Create a bounded channel pair with the configured queue depth.
///
/// When the buffer is full, the feeder waits, so tasks are materialized
/// only as fast as workers drain them.
pub fn bounded_channel<T>(config: &ProcessingConfig) -> (mpsc::Sender<T>, SharedReceiver<T>) {
    let (tx, rx) = mpsc::channel(config.queue_depth);
    (tx, SharedReceiver::new(rx))
}

/// A FIFO receiver shared by every worker in the pool.
pub struct SharedReceiver<T> {
    inner: Arc<Mutex<mpsc::Receiver<T>>>,
}

impl<T> Clone for SharedReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> SharedReceiver<T> {
    fn new(rx: mpsc::Receiver<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(rx)),
        }
    }

    /// Take the next item, or `None` once the feeder is done and the buffer is empty.
    pub async fn next(&self) -> Option<T> {
        self.inner.lock().await.recv().await
    }

    /// Stop admitting items; pending sends fail immediately.
    pub async fn close(&self) {
        self.inner.lock().await.close();
    }
}

/// Run-level abort flag. Clone is cheap and shares state.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag {
    aborted: Arc<AtomicBool>,
}

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the run has been aborted.
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Abort the run. Returns `true` for the first caller only.
    pub fn abort(&self) -> bool {
        !self.aborted.swap(true, Ordering::SeqCst)
    }
}

/// Stream `items` into `tx` until exhausted, aborted, or the receiver closes.
///
/// Returns the number of items admitted.
pub fn spawn_feeder<I>(items: I, tx: mpsc::Sender<I::Item>, abort: AbortFlag) -> JoinHandle<usize>
where
    I: Iterator + Send + 'static,
    I::Item: Send + 'static,
{
    tokio::spawn(async move {
        let mut admitted = 0usize;
        for item in items {
            if abort.is_aborted() || tx.send(item).await.is_err() {
                break;
            }
            admitted += 1;
        }
        admitted
    })
}
