//! Parallel extraction pipeline.
//!
//! Fans a known, bounded file set out across a fixed-size rayon worker pool.
//! Every file is processed independently by exactly one worker; results are
//! merged by path into a `BTreeMap`, so the final model does not depend on
//! completion order. Per-file failures are collected as warnings and never
//! abort the batch; only worker-pool allocation failure is fatal.

use rayon::prelude::*;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

use super::processor::{self, FileOutcome};
use crate::error::{FileFailure, PipelineError};
use crate::model::{RepoModel, SourceFile};

/// Tuning knobs for one pipeline invocation
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Worker count; `None` derives from available parallelism
    pub workers: Option<usize>,
}

impl PipelineOptions {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: Some(workers),
        }
    }

    fn effective_workers(&self, file_count: usize) -> usize {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        self.workers
            .unwrap_or(available)
            .clamp(1, file_count.max(1))
    }
}

/// Result of a generation run.
///
/// Always best-effort: a partial model plus explicit failures, never a hard
/// failure for parse problems. `cancelled` marks a run that was stopped
/// early; the model then covers only the files processed before the signal.
#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    pub model: RepoModel,
    pub failures: Vec<FileFailure>,
    pub cancelled: bool,
}

/// Extract definitions from every file in parallel and merge into a model.
///
/// The cancellation token is checked before each file is processed:
/// in-flight files finish at file granularity and the partially merged model
/// stays consistent.
pub fn generate(
    files: &[SourceFile],
    options: &PipelineOptions,
    cancel: &CancellationToken,
) -> Result<GenerateOutcome, PipelineError> {
    let workers = options.effective_workers(files.len());
    tracing::info!("Processing {} files with {} workers", files.len(), workers);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| PipelineError::WorkerPoolUnavailable(e.to_string()))?;

    let outcomes: Vec<Option<FileOutcome>> = pool.install(|| {
        files
            .par_iter()
            .map(|file| {
                if cancel.is_cancelled() {
                    return None;
                }
                Some(processor::process_file(file))
            })
            .collect()
    });

    let mut merged = BTreeMap::new();
    let mut failures = Vec::new();
    let mut cancelled = false;

    for outcome in outcomes {
        match outcome {
            Some(FileOutcome::Parsed { path, analysis }) => {
                merged.insert(path, analysis);
            }
            Some(FileOutcome::Skipped(failure)) => {
                tracing::warn!("Skipped {}: {:?}", failure.path, failure.kind);
                failures.push(failure);
            }
            None => cancelled = true,
        }
    }

    if cancelled {
        tracing::info!(
            "Generation cancelled; partial model covers {} files",
            merged.len()
        );
    }

    Ok(GenerateOutcome {
        model: RepoModel { files: merged },
        failures,
        cancelled,
    })
}
