//! Run-level aggregate of per-job outcomes.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use groupsolve_core::{Job, JobId, JobPhase};

/// Final tally of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub capacity: usize,
    pub total: usize,
    pub skipped: usize,
    pub verified: usize,
    pub invalid: usize,
    pub solve_failed: usize,
    /// Diagnostic writes or renames that failed along the way.
    pub diagnostic_errors: usize,
    /// Ids of jobs that ended `SolveFailed` or `Invalid`, in job order.
    pub failed_ids: Vec<JobId>,
}

impl RunSummary {
    /// Tally the terminal phases of `jobs`.
    pub fn from_jobs(
        jobs: &[Job],
        capacity: usize,
        diagnostic_errors: usize,
        started_at: DateTime<Utc>,
    ) -> Self {
        let count = |phase: JobPhase| jobs.iter().filter(|j| j.phase() == phase).count();
        Self {
            started_at,
            finished_at: Utc::now(),
            capacity,
            total: jobs.len(),
            skipped: count(JobPhase::Skipped),
            verified: count(JobPhase::Verified),
            invalid: count(JobPhase::Invalid),
            solve_failed: count(JobPhase::SolveFailed),
            diagnostic_errors,
            failed_ids: jobs
                .iter()
                .filter(|j| j.phase().is_failure())
                .map(|j| j.id.clone())
                .collect(),
        }
    }

    /// True when no job failed to solve or verify.
    pub fn is_success(&self) -> bool {
        self.invalid == 0 && self.solve_failed == 0
    }

    /// Write the summary as pretty JSON. Best-effort.
    pub async fn write_json(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_vec_pretty(self).map_err(std::io::Error::other)?;
        tokio::fs::write(path, json).await
    }
}
