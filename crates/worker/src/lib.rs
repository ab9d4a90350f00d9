//! `groupsolve-worker` library crate.
//!
//! Startup sequence for one pipeline run: preflight the binaries, create
//! the directory layout, discover jobs, and hand them to the scheduler.
//! The binary entrypoint lives in `main.rs`.

pub mod config;

use std::path::Path;

use groupsolve_core::discovery::{discover_jobs, ensure_layout};
use groupsolve_core::process::{check_binary, BinaryRunner, ProcessError};
use groupsolve_core::CoreError;
use groupsolve_pipeline::results::ResultHandler;
use groupsolve_pipeline::scheduler::SchedulerConfig;
use groupsolve_pipeline::{BatchScheduler, PipelineMode, RunSummary};

use config::WorkerConfig;

/// Fatal errors that abort a run before any job starts.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("{role} binary unusable ({source}); build the project first")]
    Binary {
        role: &'static str,
        #[source]
        source: ProcessError,
    },

    #[error("Could not prepare directories: {0}")]
    Layout(#[from] CoreError),
}

/// Check that every binary the run needs is present and executable.
pub fn preflight(config: &WorkerConfig) -> Result<(), WorkerError> {
    if config.solves() {
        check_binary(&config.solver).map_err(|source| WorkerError::Binary {
            role: "Solver",
            source,
        })?;
    }
    check_binary(&config.verifier).map_err(|source| WorkerError::Binary {
        role: "Verifier",
        source,
    })?;
    Ok(())
}

/// Execute one complete pipeline run.
pub async fn run(config: &WorkerConfig) -> Result<RunSummary, WorkerError> {
    preflight(config)?;

    let extra: Vec<&Path> = config.diagnostics_dir.iter().map(|d| d.as_path()).collect();
    ensure_layout(&config.discovery, &extra)?;

    let mut jobs = discover_jobs(&config.discovery);
    tracing::info!(jobs = jobs.len(), "Discovered jobs");

    let mode = if config.solves() {
        PipelineMode::SolveAndVerify
    } else {
        PipelineMode::VerifyOnly
    };
    let scheduler = BatchScheduler::new(
        BinaryRunner::with_timeout(config.process_timeout),
        ResultHandler::new(config.diagnostics_dir.clone()),
        SchedulerConfig {
            solver: config.solver.clone(),
            verifier: config.verifier.clone(),
            capacity: config.capacity,
            mode,
        },
    );

    let summary = scheduler.run(&mut jobs).await;

    if let Some(path) = &config.summary_file {
        match summary.write_json(path).await {
            Ok(()) => tracing::info!(path = %path.display(), "Wrote run summary"),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Could not write run summary")
            }
        }
    }

    Ok(summary)
}
