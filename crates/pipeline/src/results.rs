//! Failure bookkeeping: diagnostic capture files and output invalidation.
//!
//! Every write here is best-effort. Errors are logged and handed back to
//! the caller for counting, but never change the outcome of the job whose
//! failure was being recorded.

use std::path::{Path, PathBuf};

use groupsolve_core::naming::{diagnostic_paths, numbered_invalid_path, DiagnosticPaths};
use groupsolve_core::process::ProcessOutcome;
use groupsolve_core::{Job, Stage};

/// Error writing or moving a diagnostic artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persists evidence of failed invocations.
#[derive(Debug, Clone, Default)]
pub struct ResultHandler {
    /// Where capture files go; `None` puts them next to the job's output.
    diagnostics_dir: Option<PathBuf>,
}

impl ResultHandler {
    pub fn new(diagnostics_dir: Option<PathBuf>) -> Self {
        Self { diagnostics_dir }
    }

    /// Capture file paths for a failed `stage` of `job`.
    pub fn diagnostic_paths(&self, job: &Job, stage: Stage) -> DiagnosticPaths {
        let dir = match &self.diagnostics_dir {
            Some(dir) => dir.as_path(),
            None => job.output_path.parent().unwrap_or_else(|| Path::new(".")),
        };
        diagnostic_paths(dir, &job.id, stage)
    }

    /// Write the captured stdout and stderr of a failed invocation.
    pub async fn record_failure(
        &self,
        job: &Job,
        stage: Stage,
        outcome: &ProcessOutcome,
    ) -> Vec<ArtifactError> {
        let paths = self.diagnostic_paths(job, stage);
        let mut errors = Vec::new();

        for (path, bytes) in [(paths.stdout, &outcome.stdout), (paths.stderr, &outcome.stderr)] {
            if let Err(source) = tokio::fs::write(&path, bytes).await {
                let err = ArtifactError::Write { path, source };
                tracing::error!(
                    job_id = %job.id,
                    %stage,
                    error = %err,
                    "Could not save diagnostics",
                );
                errors.push(err);
            }
        }

        errors
    }

    /// Rename a rejected output to its invalid form.
    ///
    /// Returns the new path. The original path no longer exists afterwards,
    /// so a later run's skip check will schedule the job again. Invalid
    /// files left by earlier runs are kept; the first free numbered name
    /// is used instead.
    pub async fn invalidate_output(&self, job: &Job) -> Result<PathBuf, ArtifactError> {
        let to = free_invalid_path(&job.output_path).await;
        match tokio::fs::rename(&job.output_path, &to).await {
            Ok(()) => {
                tracing::info!(job_id = %job.id, path = %to.display(), "Marked output invalid");
                Ok(to)
            }
            Err(source) => {
                let err = ArtifactError::Rename {
                    from: job.output_path.clone(),
                    to,
                    source,
                };
                tracing::error!(job_id = %job.id, error = %err, "Could not mark output invalid");
                Err(err)
            }
        }
    }
}

async fn free_invalid_path(output: &Path) -> PathBuf {
    let mut attempt = 0;
    loop {
        let candidate = numbered_invalid_path(output, attempt);
        match tokio::fs::try_exists(&candidate).await {
            Ok(true) => attempt += 1,
            // Unknown counts as free; the rename reports any real problem.
            _ => return candidate,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
