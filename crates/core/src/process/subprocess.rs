//! Spawn-and-capture logic shared by process runners.
//!
//! Provides [`run_command`]: the caller builds a [`tokio::process::Command`]
//! with program and arguments; this module wires up the pipes, drains both
//! streams while waiting, and applies the optional deadline.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use super::runner::{ProcessError, ProcessOutcome};

/// Spawn `cmd`, capture stdout/stderr into memory, and wait for exit.
///
/// With `timeout == None` this waits indefinitely. When a deadline is set
/// and expires, the child is killed (via `kill_on_drop`) and
/// [`ProcessError::Timeout`] is returned.
pub async fn run_command(
    cmd: &mut Command,
    program: &str,
    timeout: Option<Duration>,
) -> Result<ProcessOutcome, ProcessError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let start = Instant::now();

    let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: program.to_string(),
        source,
    })?;

    // Drain both pipes while waiting so a chatty child cannot block on a
    // full pipe buffer.
    let stdout_task = tokio::spawn(read_stream(child.stdout.take()));
    let stderr_task = tokio::spawn(read_stream(child.stderr.take()));

    let status = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(result) => result,
            Err(_elapsed) => {
                return Err(ProcessError::Timeout {
                    program: program.to_string(),
                    elapsed_ms: start.elapsed().as_millis() as u64,
                });
            }
        },
        None => child.wait().await,
    }
    .map_err(|source| ProcessError::Wait {
        program: program.to_string(),
        source,
    })?;

    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();

    Ok(ProcessOutcome {
        exit_code: status.code(),
        stdout,
        stderr,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Read an entire output stream into a byte buffer.
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = h.read_to_end(&mut buf).await;
    }
    buf
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
