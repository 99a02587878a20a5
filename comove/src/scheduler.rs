//! Bounded worker pool distributing matrix rows.
//!
//! Rows are dispatched in pairs taken from both ends of the row range, since row `i` has
//! `N - 1 - i` columns to compute. Each dispatch first acquires a pool permit, blocking the
//! dispatcher until a worker slot is free. The permit is owned by the worker and released
//! when the worker finishes, including on panic. Completed rows are delivered unordered on
//! an mpsc channel.

use crate::{
    matrix::{CorrelationMatrixEngine, RowBestMatch},
    series::SeriesSource,
};
use std::sync::Arc;
use tokio::{
    sync::{Semaphore, mpsc},
    task::JoinHandle,
};
use tracing::{debug, warn};

/// Default number of rows computed concurrently.
pub const DEFAULT_CAPACITY: usize = 5;

/// Unit of work the [`RowScheduler`] distributes.
pub trait RowTask: Send + Sync + 'static {
    /// Number of schedulable rows (every matrix row except the last).
    fn rows(&self) -> usize;

    /// Computes one row and derives its best match.
    fn run_row(&self, row: usize) -> Option<RowBestMatch>;
}

impl<Source> RowTask for CorrelationMatrixEngine<Source>
where
    Source: SeriesSource + 'static,
{
    fn rows(&self) -> usize {
        self.matrix().schedulable_rows()
    }

    fn run_row(&self, row: usize) -> Option<RowBestMatch> {
        self.compute_row_best_match(row)
    }
}

/// Row dispatch order: lowest and highest pending rows together, contracting inwards.
///
/// `dispatch_order(6)` yields `[0, 5, 1, 4, 2, 3]`, `dispatch_order(5)` yields
/// `[0, 4, 1, 3, 2]`.
pub fn dispatch_order(rows: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(rows);
    let Some(mut last) = rows.checked_sub(1) else {
        return order;
    };

    let mut first = 0;
    while first <= last {
        order.push(first);
        if first < last {
            order.push(last);
        }
        first += 1;
        match last.checked_sub(1) {
            Some(next) => last = next,
            None => break,
        }
    }

    order
}

/// Fixed capacity pool that runs every schedulable row of a [`RowTask`] exactly once.
#[derive(Debug, Clone)]
pub struct RowScheduler {
    capacity: usize,
}

impl RowScheduler {
    /// Capacity is clamped to at least one worker.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Spawns the dispatcher and returns its handle with the completion receiver.
    ///
    /// The receiver yields one [`RowBestMatch`] per schedulable row in completion order and
    /// closes once the dispatcher and every worker have finished.
    pub fn spawn<Task>(
        &self,
        task: Arc<Task>,
    ) -> (JoinHandle<()>, mpsc::UnboundedReceiver<RowBestMatch>)
    where
        Task: RowTask,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let semaphore = Arc::new(Semaphore::new(self.capacity));

        let dispatcher = tokio::spawn(async move {
            for row in dispatch_order(task.rows()) {
                let permit = match semaphore.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(error) => {
                        warn!(?error, row, "row pool closed, stopping dispatch");
                        break;
                    }
                };

                debug!(row, "dispatching row");
                let task = Arc::clone(&task);
                let tx = tx.clone();
                tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    if let Some(best) = task.run_row(row) {
                        if tx.send(best).is_err() {
                            debug!(row, "completion receiver dropped");
                        }
                    }
                });
            }
        });

        (dispatcher, rx)
    }
}

impl Default for RowScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
