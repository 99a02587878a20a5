//! # Comove
//! Weekly co-movement frequency engine for a roster of daily close series.
//!
//! For every pair `(i, j)` with `i < j` the engine aligns the two histories on their common
//! dates, splits them into full Monday..Friday weeks, and counts the weeks whose
//! L2-normalised closes correlate above a threshold. The resulting frequency fills the upper
//! triangle of an N×N grid. Rows are distributed over a bounded worker pool and each row
//! reports its most co-moving later peer.
//!
//! ```ignore
//! let engine = Arc::new(CorrelationMatrixEngine::init(identifiers, store, ComoveConfig::default()));
//! let (grid, best_matches) = comove::run(engine, Vec::new()).await?;
//! ```

use crate::{
    aggregator::{BestMatchSink, Progress, ResultAggregator},
    error::AggregateError,
    matrix::{CorrelationMatrixEngine, FrequencyGrid},
    scheduler::{RowScheduler, RowTask},
    series::SeriesSource,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Result aggregation and progress reporting.
pub mod aggregator;

/// Run configuration.
pub mod config;

/// All [`Error`](std::error::Error)s generated in `comove`.
pub mod error;

/// Weekly correlation of two aligned close vectors.
pub mod estimator;

/// Pair frequency reduction over full weeks.
pub mod frequency;

/// Frequency grid and row computation.
pub mod matrix;

/// Bounded worker pool and row dispatch order.
pub mod scheduler;

/// Identifiers, close series and alignment.
pub mod series;

/// Full trading week segmentation.
pub mod week;

/// Computes the full grid for `engine`, writing each row's best match to `sink` as rows
/// complete. Pool capacity and threshold come from the engine's
/// [`ComoveConfig`](config::ComoveConfig).
pub async fn run<Source, Sink>(
    engine: Arc<CorrelationMatrixEngine<Source>>,
    sink: Sink,
) -> Result<(FrequencyGrid, Sink), AggregateError>
where
    Source: SeriesSource + 'static,
    Sink: BestMatchSink,
{
    let (progress_tx, _progress_rx) = watch::channel(Progress::default());
    run_with_progress(engine, sink, progress_tx).await
}

/// [`run`] that also publishes [`Progress`] on a watch channel.
pub async fn run_with_progress<Source, Sink>(
    engine: Arc<CorrelationMatrixEngine<Source>>,
    sink: Sink,
    progress_tx: watch::Sender<Progress>,
) -> Result<(FrequencyGrid, Sink), AggregateError>
where
    Source: SeriesSource + 'static,
    Sink: BestMatchSink,
{
    let rows = engine.rows();
    let config = *engine.config();
    info!(
        identifiers = engine.matrix().len(),
        rows,
        capacity = config.capacity,
        threshold = config.threshold,
        "computing co-movement matrix"
    );

    let (dispatcher, rx) = RowScheduler::new(config.capacity).spawn(Arc::clone(&engine));
    let (sink, summary) = ResultAggregator::new(sink, rows)
        .with_progress(progress_tx)
        .run(rx)
        .await?;

    if let Err(error) = dispatcher.await {
        warn!(?error, "row dispatcher terminated abnormally");
    }

    info!(rows = summary.rows, phase = ?engine.matrix().phase(), "co-movement matrix complete");
    Ok((engine.matrix().snapshot(), sink))
}
