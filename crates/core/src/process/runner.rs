//! Process runner interface and shared types.

use std::future::Future;
use std::path::Path;

/// Captured result of one external invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit code, or `None` if the child was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Raw bytes the child wrote to stdout.
    pub stdout: Vec<u8>,
    /// Raw bytes the child wrote to stderr.
    pub stderr: Vec<u8>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stand-in outcome for an invocation that never produced a status.
    ///
    /// The error text becomes the captured stderr so it lands in the
    /// diagnostic files like any other failure.
    pub fn from_error(err: &ProcessError) -> Self {
        Self {
            exit_code: None,
            stdout: Vec::new(),
            stderr: err.to_string().into_bytes(),
            duration_ms: 0,
        }
    }
}

/// Errors raised while launching or supervising a child process.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Binary not found: {0}")]
    NotFound(String),

    #[error("Not a regular file: {0}")]
    NotAFile(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process {program} timed out after {elapsed_ms}ms")]
    Timeout { program: String, elapsed_ms: u64 },
}

/// Runs an external binary as `executable <input> <output>`.
///
/// Implementations must not interpret the child's output; success or
/// failure is carried by [`ProcessOutcome::exit_code`] alone.
pub trait ProcessRunner: Send + Sync {
    fn run(
        &self,
        executable: &Path,
        input: &Path,
        output: &Path,
    ) -> impl Future<Output = Result<ProcessOutcome, ProcessError>> + Send;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
