//! Bounded, non-blocking outbound queue for log records.
//!
//! Producers (`LogHandle::enqueue`) take a short mutex and return
//! immediately. A background tokio task drains the queue in batches and hands
//! each batch to a `LogSink`. When the queue is full the oldest record is
//! discarded and counted; delivery failures are reported locally and the
//! batch is dropped.

use crate::domain::{LogRecord, LogSinkPtr};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Tuning for the shipper queue and its delivery task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipperSettings {
    /// Maximum records held in memory before the oldest is dropped.
    pub capacity: usize,
    /// Maximum records handed to the sink per push.
    pub batch_size: usize,
    /// Longest a partial batch waits before being pushed.
    pub flush_interval: Duration,
}

impl Default for ShipperSettings {
    fn default() -> Self {
        Self {
            capacity: 1024,
            batch_size: 100,
            flush_interval: Duration::from_secs(1),
        }
    }
}

struct LogQueue {
    records: Mutex<VecDeque<LogRecord>>,
    capacity: usize,
    batch_size: usize,
    dropped: AtomicU64,
    delivery_failures: AtomicU64,
    closed: AtomicBool,
    wake: Notify,
}

impl LogQueue {
    fn lock(&self) -> MutexGuard<'_, VecDeque<LogRecord>> {
        // A panic while holding the lock cannot leave the deque inconsistent.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, record: LogRecord) {
        // ---
        let (evicted, len) = {
            let mut records = self.lock();
            let evicted = if records.len() >= self.capacity {
                records.pop_front().is_some()
            } else {
                false
            };
            records.push_back(record);
            (evicted, records.len())
        };

        if evicted {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        if len >= self.batch_size {
            self.wake.notify_one();
        }
    }

    fn take_batch(&self) -> Vec<LogRecord> {
        let mut records = self.lock();
        let n = records.len().min(self.batch_size);
        records.drain(..n).collect()
    }
}

/// Cloneable producer side of the shipper. Never blocks, never fails.
#[derive(Clone)]
pub struct LogHandle {
    queue: Arc<LogQueue>,
}

impl LogHandle {
    pub fn enqueue(&self, record: LogRecord) {
        self.queue.push(record);
    }

    /// Records discarded because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.queue.dropped.load(Ordering::Relaxed)
    }
}

/// Owner of the background delivery task.
pub struct LogShipper {
    queue: Arc<LogQueue>,
    worker: JoinHandle<()>,
}

impl LogShipper {
    /// Starts the delivery task on the current tokio runtime.
    pub fn spawn(sink: LogSinkPtr, settings: ShipperSettings) -> Self {
        // ---
        let queue = Arc::new(LogQueue {
            records: Mutex::new(VecDeque::with_capacity(settings.capacity.max(1))),
            capacity: settings.capacity.max(1),
            batch_size: settings.batch_size.max(1),
            dropped: AtomicU64::new(0),
            delivery_failures: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            wake: Notify::new(),
        });

        let worker = tokio::spawn(deliver_loop(
            Arc::clone(&queue),
            sink,
            settings.flush_interval,
        ));

        Self { queue, worker }
    }

    pub fn handle(&self) -> LogHandle {
        LogHandle {
            queue: Arc::clone(&self.queue),
        }
    }

    /// Records discarded because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.queue.dropped.load(Ordering::Relaxed)
    }

    /// Batches the sink failed to accept.
    pub fn delivery_failures(&self) -> u64 {
        self.queue.delivery_failures.load(Ordering::Relaxed)
    }

    /// Stops the delivery task after it has pushed everything still queued.
    pub async fn shutdown(self) {
        // ---
        let Self { queue, worker } = self;
        queue.closed.store(true, Ordering::Release);
        queue.wake.notify_one();

        if let Err(err) = worker.await {
            tracing::error!(error = %err, "Log shipper task did not exit cleanly");
        }

        let dropped = queue.dropped.load(Ordering::Relaxed);
        if dropped > 0 {
            tracing::warn!(dropped, "Log records were dropped due to a full queue");
        }
        tracing::info!("Log shipper stopped");
    }
}

async fn deliver_loop(queue: Arc<LogQueue>, sink: LogSinkPtr, flush_interval: Duration) {
    // ---
    loop {
        tokio::select! {
            _ = queue.wake.notified() => {}
            _ = tokio::time::sleep(flush_interval) => {}
        }

        // Read before draining so records queued ahead of close are shipped.
        let closing = queue.closed.load(Ordering::Acquire);

        loop {
            let batch = queue.take_batch();
            if batch.is_empty() {
                break;
            }
            if let Err(err) = sink.push(&batch).await {
                queue.delivery_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    error = %err,
                    lost = batch.len(),
                    "Failed to deliver log batch"
                );
            }
        }

        if closing {
            break;
        }
    }
}
