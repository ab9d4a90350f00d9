//! Two-phase wave scheduler.
//!
//! Jobs are processed in consecutive waves of at most `capacity` jobs. In
//! each wave every solve invocation is started at once and joined before
//! any verify invocation starts; the next wave begins only after the
//! current one is fully resolved.
//!
//! Only the scheduler mutates job state. Runner futures borrow the job
//! paths, return a [`ProcessOutcome`], and the phase transitions are
//! applied here after the join.

use std::path::{Path, PathBuf};

use chrono::Utc;
use futures::future::join_all;

use groupsolve_core::process::{ProcessError, ProcessOutcome, ProcessRunner};
use groupsolve_core::{Job, JobPhase, Stage};

use crate::progress::ProgressReporter;
use crate::results::ResultHandler;
use crate::summary::RunSummary;
use crate::wave::wave_ranges;

/// Which phases a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    /// Skip existing outputs, solve the rest, then verify.
    SolveAndVerify,
    /// Outputs already exist; verify every job against its input.
    VerifyOnly,
}

/// Static parameters of a scheduler run.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub solver: PathBuf,
    pub verifier: PathBuf,
    /// Maximum jobs per wave. Zero is treated as one.
    pub capacity: usize,
    pub mode: PipelineMode,
}

/// Drives jobs through solve and verify in capacity-bounded waves.
pub struct BatchScheduler<R> {
    runner: R,
    results: ResultHandler,
    config: SchedulerConfig,
}

impl<R: ProcessRunner> BatchScheduler<R> {
    pub fn new(runner: R, results: ResultHandler, config: SchedulerConfig) -> Self {
        Self {
            runner,
            results,
            config,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity.max(1)
    }

    /// Process every job and return the run summary.
    ///
    /// Never fails: per-job problems end up in the job's phase and in the
    /// summary counts.
    pub async fn run(&self, jobs: &mut [Job]) -> RunSummary {
        let started_at = Utc::now();
        let capacity = self.capacity();
        let waves = wave_ranges(jobs.len(), capacity);
        let mut progress = ProgressReporter::new(jobs.len());
        let mut diagnostic_errors = 0;

        tracing::info!(
            jobs = jobs.len(),
            capacity,
            waves = waves.len(),
            mode = ?self.config.mode,
            "Starting pipeline run",
        );

        for (index, range) in waves.into_iter().enumerate() {
            let wave = &mut jobs[range];
            tracing::debug!(wave = index, size = wave.len(), "Starting wave");

            if self.config.mode == PipelineMode::SolveAndVerify {
                skip_completed(wave);
                diagnostic_errors += self.solve_phase(wave).await;
            }
            diagnostic_errors += self.verify_phase(wave).await;

            report_failures(wave);
            progress.wave_finished(wave.len());
        }

        let summary = RunSummary::from_jobs(jobs, capacity, diagnostic_errors, started_at);
        tracing::info!(
            total = summary.total,
            verified = summary.verified,
            skipped = summary.skipped,
            invalid = summary.invalid,
            solve_failed = summary.solve_failed,
            diagnostic_errors = summary.diagnostic_errors,
            "Pipeline run finished",
        );
        summary
    }

    /// Solve every pending job in the wave. Returns artifact error count.
    async fn solve_phase(&self, wave: &mut [Job]) -> usize {
        let selected = select(wave, JobPhase::Pending, JobPhase::Solving);
        let results = self.fan_out(&self.config.solver, wave, &selected).await;

        let mut errors = 0;
        for (i, result) in selected.into_iter().zip(results) {
            let job = &mut wave[i];
            let outcome = settle(job, Stage::Solve, result);
            if outcome.success() {
                transition(job, JobPhase::Solved);
            } else {
                // A partial output must not pass a later run's skip check.
                if job.output_path.is_file() && self.results.invalidate_output(job).await.is_err() {
                    errors += 1;
                }
                errors += self
                    .results
                    .record_failure(job, Stage::Solve, &outcome)
                    .await
                    .len();
                transition(job, JobPhase::SolveFailed);
            }
        }
        errors
    }

    /// Verify every job that is ready for it. Returns artifact error count.
    async fn verify_phase(&self, wave: &mut [Job]) -> usize {
        let ready = match self.config.mode {
            PipelineMode::SolveAndVerify => JobPhase::Solved,
            PipelineMode::VerifyOnly => JobPhase::Pending,
        };
        let selected = select(wave, ready, JobPhase::Verifying);
        let results = self.fan_out(&self.config.verifier, wave, &selected).await;

        let mut errors = 0;
        for (i, result) in selected.into_iter().zip(results) {
            let job = &mut wave[i];
            let outcome = settle(job, Stage::Verify, result);
            if outcome.success() {
                transition(job, JobPhase::Verified);
            } else {
                if self.results.invalidate_output(job).await.is_err() {
                    errors += 1;
                }
                errors += self
                    .results
                    .record_failure(job, Stage::Verify, &outcome)
                    .await
                    .len();
                transition(job, JobPhase::Invalid);
            }
        }
        errors
    }

    /// Start `executable` for every selected job at once and join them all.
    async fn fan_out(
        &self,
        executable: &Path,
        wave: &[Job],
        selected: &[usize],
    ) -> Vec<Result<ProcessOutcome, ProcessError>> {
        let runs = selected.iter().map(|&i| {
            let job = &wave[i];
            self.runner
                .run(executable, &job.input_path, &job.output_path)
        });
        join_all(runs).await
    }
}

// ---------------------------------------------------------------------------
// Bookkeeping helpers
// ---------------------------------------------------------------------------

/// Mark jobs whose output already exists as skipped.
fn skip_completed(wave: &mut [Job]) {
    for job in wave.iter_mut() {
        if job.phase() == JobPhase::Pending && job.output_path.is_file() {
            tracing::info!(
                job_id = %job.id,
                path = %job.output_path.display(),
                "Output file already exists, skipping",
            );
            transition(job, JobPhase::Skipped);
        }
    }
}

/// Indices of jobs in phase `from`, moved to `to`.
fn select(wave: &mut [Job], from: JobPhase, to: JobPhase) -> Vec<usize> {
    let mut selected = Vec::new();
    for (i, job) in wave.iter_mut().enumerate() {
        if job.phase() == from {
            transition(job, to);
            selected.push(i);
        }
    }
    selected
}

/// Turn a runner result into an outcome, logging anything that failed.
fn settle(
    job: &Job,
    stage: Stage,
    result: Result<ProcessOutcome, ProcessError>,
) -> ProcessOutcome {
    match result {
        Ok(outcome) if outcome.success() => {
            tracing::debug!(
                job_id = %job.id,
                %stage,
                duration_ms = outcome.duration_ms,
                "Process succeeded",
            );
            outcome
        }
        Ok(outcome) => {
            tracing::warn!(
                job_id = %job.id,
                %stage,
                exit_code = ?outcome.exit_code,
                duration_ms = outcome.duration_ms,
                "Process exited with non-zero status",
            );
            outcome
        }
        Err(err) => {
            tracing::error!(job_id = %job.id, %stage, error = %err, "Process could not be run");
            ProcessOutcome::from_error(&err)
        }
    }
}

fn transition(job: &mut Job, next: JobPhase) {
    if let Err(e) = job.advance(next) {
        tracing::error!(error = %e, "Rejected job phase transition");
    }
}

fn report_failures(wave: &[Job]) {
    for job in wave.iter() {
        match job.phase() {
            JobPhase::SolveFailed => {
                tracing::warn!(job_id = %job.id, "Solver failed for group {}", job.id)
            }
            JobPhase::Invalid => {
                tracing::warn!(job_id = %job.id, "Output file for group {} is invalid", job.id)
            }
            _ => {}
        }
    }
}
