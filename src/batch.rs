//! Outer loop over many acquisitions
//!
//! Acquisitions are independent: each worker reads its own files and writes
//! into its own output directory. A failed or timed-out acquisition is logged
//! and reported, and the batch carries on.

use crate::core::pipeline::{ShorelineParams, ShorelinePipeline};
use crate::io::tile::TileProduct;
use crate::types::{ShorelineError, ShorelineResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Batch scheduling parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Acquisitions processed at the same time
    pub max_workers: usize,
    /// Per-acquisition time limit; `None` waits indefinitely
    pub timeout_secs: Option<u64>,
    /// Root of the `<zone>/<date>/` output tree
    pub output_root: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            timeout_secs: Some(1800),
            output_root: PathBuf::from("shorelines"),
        }
    }
}

/// Acquisition that produced a shoreline file
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSuccess {
    pub prefix: String,
    pub points: usize,
}

/// Acquisition that was skipped, with the reason
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    pub prefix: String,
    pub error: String,
}

/// Outcome of a batch, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub succeeded: Vec<BatchSuccess>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    /// Number of acquisitions processed
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Runs the shoreline pipeline over many acquisitions
pub struct BatchRunner {
    config: BatchConfig,
    pipeline: Arc<ShorelinePipeline>,
}

impl BatchRunner {
    /// Create a runner sharing one pipeline across workers
    pub fn new(config: BatchConfig, params: ShorelineParams) -> Self {
        Self {
            config,
            pipeline: Arc::new(ShorelinePipeline::new(params)),
        }
    }

    /// Get the scheduling parameters
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Process every acquisition on a dedicated multi-thread runtime
    pub fn run(&self, tiles: Vec<TileProduct>) -> ShorelineResult<BatchReport> {
        let workers = self.config.max_workers.max(1);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(workers)
            .enable_time()
            .build()?;
        let report = runtime.block_on(self.run_async(tiles));
        // Do not wait on blocking threads of timed-out acquisitions
        runtime.shutdown_background();
        Ok(report)
    }

    /// Process every acquisition on the current runtime
    pub async fn run_async(&self, tiles: Vec<TileProduct>) -> BatchReport {
        let pipeline = Arc::clone(&self.pipeline);
        let work = move |tile: &TileProduct, root: &Path, cancelled: &AtomicBool| {
            pipeline
                .run_tile_cancellable(tile, root, cancelled)
                .map(|product| product.points.len())
        };
        let limit = self.config.timeout_secs.map(Duration::from_secs);
        self.schedule(tiles, limit, Arc::new(work)).await
    }

    /// Run `work` on every tile, at most `max_workers` at a time
    async fn schedule<F>(
        &self,
        tiles: Vec<TileProduct>,
        limit: Option<Duration>,
        work: Arc<F>,
    ) -> BatchReport
    where
        F: Fn(&TileProduct, &Path, &AtomicBool) -> ShorelineResult<usize> + Send + Sync + 'static,
    {
        let workers = self.config.max_workers.max(1);
        let semaphore = Arc::new(Semaphore::new(workers));
        log::info!(
            "Batch of {} acquisitions, {} workers, timeout {:?}",
            tiles.len(),
            workers,
            limit
        );

        let mut handles = Vec::with_capacity(tiles.len());
        for tile in tiles {
            let semaphore = Arc::clone(&semaphore);
            let work = Arc::clone(&work);
            let root = self.config.output_root.clone();
            let prefix = tile.prefix().to_string();

            let handle = tokio::spawn(async move {
                let permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ShorelineError::Processing(e.to_string()))?;
                run_one(permit, work, tile, root, limit).await
            });
            handles.push((prefix, handle));
        }

        let mut report = BatchReport::default();
        for (prefix, handle) in handles {
            let outcome = handle
                .await
                .map_err(|e| ShorelineError::Processing(format!("task join error: {}", e)))
                .and_then(|result| result);
            match outcome {
                Ok(points) => report.succeeded.push(BatchSuccess { prefix, points }),
                Err(e) => {
                    log::error!("Skipping acquisition {}: {}", prefix, e);
                    report.failed.push(BatchFailure {
                        prefix,
                        error: e.to_string(),
                    });
                }
            }
        }

        log::info!(
            "Batch finished: {} succeeded, {} failed",
            report.succeeded.len(),
            report.failed.len()
        );
        report
    }
}

/// Run one unit on a blocking thread
///
/// The worker slot stays taken until the blocking work returns, also after a
/// timeout; a timed-out unit is flagged so it skips its outputs.
async fn run_one<F>(
    permit: OwnedSemaphorePermit,
    work: Arc<F>,
    tile: TileProduct,
    root: PathBuf,
    limit: Option<Duration>,
) -> ShorelineResult<usize>
where
    F: Fn(&TileProduct, &Path, &AtomicBool) -> ShorelineResult<usize> + Send + Sync + 'static,
{
    let prefix = tile.prefix().to_string();
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);
    let task = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        (*work)(&tile, root.as_path(), flag.as_ref())
    });

    let joined = match limit {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => {
                cancelled.store(true, Ordering::SeqCst);
                return Err(ShorelineError::Timeout {
                    unit: prefix,
                    seconds: limit.as_secs(),
                });
            }
        },
        None => task.await,
    };
    joined.map_err(|e| ShorelineError::Processing(format!("worker failed: {}", e)))?
}
