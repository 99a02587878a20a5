//! Consumes row completions in arrival order and forwards them to a sink.

use crate::{error::AggregateError, matrix::RowBestMatch};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// Destination for best-match records, written in the order rows complete.
pub trait BestMatchSink {
    type Error: std::fmt::Display;

    fn write(&mut self, best: &RowBestMatch) -> Result<(), Self::Error>;

    /// Called once every expected record has been written.
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl BestMatchSink for Vec<RowBestMatch> {
    type Error = std::convert::Infallible;

    fn write(&mut self, best: &RowBestMatch) -> Result<(), Self::Error> {
        self.push(best.clone());
        Ok(())
    }
}

/// Completed rows out of the total expected.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Deserialize, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total,
        }
    }

    pub fn advance(&mut self) -> Self {
        self.completed = (self.completed + 1).min(self.total);
        *self
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

/// Outcome of a finished aggregation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct AggregateSummary {
    pub rows: usize,
}

/// Reads exactly `total` completion records and writes each to the sink as it arrives.
#[derive(Debug)]
pub struct ResultAggregator<Sink> {
    sink: Sink,
    progress: Progress,
    progress_tx: Option<watch::Sender<Progress>>,
}

impl<Sink> ResultAggregator<Sink>
where
    Sink: BestMatchSink,
{
    pub fn new(sink: Sink, total: usize) -> Self {
        Self {
            sink,
            progress: Progress::new(total),
            progress_tx: None,
        }
    }

    /// Publish [`Progress`] after every record on the provided watch channel.
    pub fn with_progress(mut self, progress_tx: watch::Sender<Progress>) -> Self {
        self.progress_tx = Some(progress_tx);
        self
    }

    pub async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<RowBestMatch>,
    ) -> Result<(Sink, AggregateSummary), AggregateError> {
        while !self.progress.is_complete() {
            let Some(best) = rx.recv().await else {
                return Err(AggregateError::Incomplete {
                    received: self.progress.completed,
                    expected: self.progress.total,
                });
            };

            self.sink
                .write(&best)
                .map_err(|error| AggregateError::Sink {
                    row: best.row,
                    message: error.to_string(),
                })?;

            let progress = self.progress.advance();
            debug!(
                row = best.row,
                identifier = %best.identifier,
                peer = %best.peer,
                frequency = best.frequency,
                "row completed"
            );
            info!("finished: {:.2} %", progress.percent());
            if let Some(progress_tx) = &self.progress_tx {
                if progress_tx.send(progress).is_err() {
                    debug!(row = best.row, "progress receivers dropped");
                }
            }
        }

        self.sink.finish().map_err(|error| AggregateError::Sink {
            row: self.progress.completed,
            message: error.to_string(),
        })?;

        Ok((
            self.sink,
            AggregateSummary {
                rows: self.progress.completed,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Identifier;
    use rand::seq::SliceRandom;

    fn record(row: usize) -> RowBestMatch {
        RowBestMatch {
            row,
            column: row + 1,
            identifier: Identifier::new(format!("s{row}")),
            peer: Identifier::new(format!("s{}", row + 1)),
            frequency: row as f64 / 10.0,
        }
    }

    #[test]
    fn test_progress_is_monotonic_and_capped() {
        let mut progress = Progress::new(3);
        let steps: Vec<_> = (0..5).map(|_| progress.advance().completed).collect();
        assert_eq!(steps, vec![1, 2, 3, 3, 3]);
        assert!(progress.is_complete());
        assert_eq!(progress.percent(), 100.0);
        assert_eq!(Progress::new(0).percent(), 100.0);
    }

    #[tokio::test]
    async fn test_aggregator_accepts_any_arrival_order() {
        for _ in 0..10 {
            let mut rows: Vec<usize> = (0..9).collect();
            rows.shuffle(&mut rand::rng());

            let (tx, rx) = mpsc::unbounded_channel();
            for row in &rows {
                tx.send(record(*row)).unwrap();
            }

            let (progress_tx, progress_rx) = watch::channel(Progress::default());
            let (sink, summary) = ResultAggregator::new(Vec::<RowBestMatch>::new(), rows.len())
                .with_progress(progress_tx)
                .run(rx)
                .await
                .unwrap();

            let written: Vec<_> = sink.iter().map(|best| best.row).collect();
            assert_eq!(written, rows);
            assert_eq!(summary.rows, 9);
            assert_eq!(*progress_rx.borrow(), Progress { completed: 9, total: 9 });
        }
    }

    #[tokio::test]
    async fn test_aggregator_continues_without_progress_receivers() {
        let (tx, rx) = mpsc::unbounded_channel();
        for row in 0..3 {
            tx.send(record(row)).unwrap();
        }

        let (progress_tx, progress_rx) = watch::channel(Progress::default());
        drop(progress_rx);

        let (sink, summary) = ResultAggregator::new(Vec::<RowBestMatch>::new(), 3)
            .with_progress(progress_tx)
            .run(rx)
            .await
            .unwrap();

        assert_eq!(summary.rows, 3);
        assert_eq!(sink.len(), 3);
    }

    #[tokio::test]
    async fn test_aggregator_stops_after_expected_count() {
        let (tx, rx) = mpsc::unbounded_channel();
        for row in 0..3 {
            tx.send(record(row)).unwrap();
        }

        let (sink, summary) = ResultAggregator::new(Vec::<RowBestMatch>::new(), 2)
            .run(rx)
            .await
            .unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(sink.len(), 2);
        drop(tx);
    }

    #[tokio::test]
    async fn test_aggregator_reports_closed_channel() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(record(0)).unwrap();
        drop(tx);

        let result = ResultAggregator::new(Vec::<RowBestMatch>::new(), 3).run(rx).await;
        assert_eq!(
            result.unwrap_err(),
            AggregateError::Incomplete {
                received: 1,
                expected: 3
            }
        );
    }

    #[derive(Debug)]
    struct FailingSink;

    impl BestMatchSink for FailingSink {
        type Error = String;

        fn write(&mut self, _: &RowBestMatch) -> Result<(), Self::Error> {
            Err("disk full".to_string())
        }
    }

    #[tokio::test]
    async fn test_aggregator_surfaces_sink_error() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(record(4)).unwrap();

        let result = ResultAggregator::new(FailingSink, 1).run(rx).await;
        assert_eq!(
            result.unwrap_err(),
            AggregateError::Sink {
                row: 4,
                message: "disk full".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_aggregator_with_nothing_expected() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let (sink, summary) = ResultAggregator::new(Vec::<RowBestMatch>::new(), 0)
            .run(rx)
            .await
            .unwrap();
        assert!(sink.is_empty());
        assert_eq!(summary.rows, 0);
    }
}
