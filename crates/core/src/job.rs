//! Job identity and the per-job phase state machine.
//!
//! A [`Job`] is one input/output file pair. Its [`JobPhase`] only ever
//! moves forward; [`Job::advance`] rejects anything the transition table
//! does not allow and leaves the job untouched.

use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// JobId
// ---------------------------------------------------------------------------

/// Identifier captured from a job's filename (e.g. `"17"` or `"5_10"`).
///
/// Ordering is natural: `_`-separated segments compare numerically when
/// both are numeric, so `"2"` sorts before `"10"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for JobId {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut lhs = self.0.split('_');
        let mut rhs = other.0.split('_');
        loop {
            match (lhs.next(), rhs.next()) {
                (None, None) => break,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(a), Some(b)) => {
                    let ord = match (a.parse::<u64>(), b.parse::<u64>()) {
                        (Ok(x), Ok(y)) => x.cmp(&y),
                        _ => a.cmp(b),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
            }
        }
        // "01" and "1" are numerically equal but distinct ids.
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for JobId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Which external invocation a process outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Solve,
    Verify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solve => f.write_str("solve"),
            Self::Verify => f.write_str("verify"),
        }
    }
}

/// Lifecycle state of a single job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Pending,
    /// Output already present before the run; nothing was invoked.
    Skipped,
    Solving,
    SolveFailed,
    Solved,
    Verifying,
    Invalid,
    Verified,
}

impl JobPhase {
    /// Whether this phase ends the job's lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Skipped | Self::SolveFailed | Self::Invalid | Self::Verified
        )
    }

    /// Whether the job ended in a state that fails the run.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::SolveFailed | Self::Invalid)
    }

    /// Check the transition table.
    ///
    /// `Pending -> Verifying` exists for verify-only runs, which have no
    /// solve phase.
    pub fn can_transition_to(self, next: JobPhase) -> bool {
        use JobPhase::*;
        matches!(
            (self, next),
            (Pending, Skipped)
                | (Pending, Solving)
                | (Pending, Verifying)
                | (Solving, Solved)
                | (Solving, SolveFailed)
                | (Solved, Verifying)
                | (Verifying, Verified)
                | (Verifying, Invalid)
        )
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Skipped => "skipped",
            Self::Solving => "solving",
            Self::SolveFailed => "solve_failed",
            Self::Solved => "solved",
            Self::Verifying => "verifying",
            Self::Invalid => "invalid",
            Self::Verified => "verified",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// One unit of solve + verify work.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    /// Absolute path to the (immutable) input file.
    pub input_path: PathBuf,
    /// Absolute path the solver is expected to write.
    pub output_path: PathBuf,
    phase: JobPhase,
}

impl Job {
    pub fn new(id: JobId, input_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            id,
            input_path,
            output_path,
            phase: JobPhase::Pending,
        }
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    /// Move the job to `next`, or fail without changing anything.
    pub fn advance(&mut self, next: JobPhase) -> Result<(), CoreError> {
        if !self.phase.can_transition_to(next) {
            return Err(CoreError::IllegalTransition {
                id: self.id.clone(),
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
