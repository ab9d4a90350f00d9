//! Cumulative progress reporting, one line per wave.

use std::fmt;

/// Snapshot of how many jobs have been fully resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
}

impl Progress {
    /// Completion percentage; an empty run counts as complete.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        100.0 * self.processed as f64 / self.total as f64
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed {} groups out of {} ({:.2}%)",
            self.processed,
            self.total,
            self.percent()
        )
    }
}

/// Tracks cumulative progress across waves.
#[derive(Debug)]
pub struct ProgressReporter {
    processed: usize,
    total: usize,
}

impl ProgressReporter {
    pub fn new(total: usize) -> Self {
        Self {
            processed: 0,
            total,
        }
    }

    /// Record a finished wave of `wave_len` jobs and log the progress line.
    pub fn wave_finished(&mut self, wave_len: usize) -> Progress {
        self.processed = (self.processed + wave_len).min(self.total);
        let progress = self.snapshot();
        tracing::info!(
            processed = progress.processed,
            total = progress.total,
            "{progress}"
        );
        progress
    }

    pub fn snapshot(&self) -> Progress {
        Progress {
            processed: self.processed,
            total: self.total,
        }
    }
}
