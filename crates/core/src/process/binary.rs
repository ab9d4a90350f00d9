//! Runner for pre-built solver and verifier executables.
//!
//! Invokes the binary directly (no shell) with the job's input and output
//! paths as its two positional arguments.

use std::path::Path;
use std::time::Duration;

use super::runner::{ProcessError, ProcessOutcome, ProcessRunner};
use super::subprocess;

/// Verify that `path` is a regular, executable file.
///
/// Used as the startup preflight check; a failure here aborts the run
/// before any job is touched.
pub fn check_binary(path: &Path) -> Result<(), ProcessError> {
    let display = path.display().to_string();
    let metadata = std::fs::metadata(path).map_err(|_| ProcessError::NotFound(display.clone()))?;
    if !metadata.is_file() {
        return Err(ProcessError::NotAFile(display));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mode = metadata.permissions().mode();
        if mode & 0o111 == 0 {
            return Err(ProcessError::PermissionDenied(format!(
                "{display} is not executable (mode {mode:#o})"
            )));
        }
    }

    Ok(())
}

/// Process runner backed by `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct BinaryRunner {
    timeout: Option<Duration>,
}

impl BinaryRunner {
    /// Runner that waits for every child indefinitely.
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill children that run longer than `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl ProcessRunner for BinaryRunner {
    async fn run(
        &self,
        executable: &Path,
        input: &Path,
        output: &Path,
    ) -> Result<ProcessOutcome, ProcessError> {
        let program = executable.display().to_string();
        let mut cmd = tokio::process::Command::new(executable);
        cmd.arg(input).arg(output);
        subprocess::run_command(&mut cmd, &program, self.timeout).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(all(test, unix))]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::process::test_helpers::write_script;

    #[test]
    fn check_binary_not_found() {
        assert_matches!(
            check_binary(Path::new("/nonexistent/solver")),
            Err(ProcessError::NotFound(_))
        );
    }

    #[test]
    fn check_binary_rejects_directory() {
        let dir = tempfile::tempdir().expect("create temp dir");
        assert_matches!(check_binary(dir.path()), Err(ProcessError::NotAFile(_)));
    }

    #[test]
    fn check_binary_rejects_non_executable() {
        let f = tempfile::NamedTempFile::new().expect("create temp file");
        assert_matches!(
            check_binary(f.path()),
            Err(ProcessError::PermissionDenied(_))
        );
    }

    #[test]
    fn check_binary_accepts_script() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let script = write_script(dir.path(), "solver", "exit 0\n");
        assert!(check_binary(&script).is_ok());
    }

    #[tokio::test]
    async fn passes_input_then_output() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let script = write_script(dir.path(), "solver", "printf '%s|%s' \"$1\" \"$2\"\n");
        let outcome = BinaryRunner::new()
            .run(&script, Path::new("/in/a.txt"), Path::new("/out/b.txt"))
            .await
            .expect("run");
        assert!(outcome.success());
        assert_eq!(outcome.stdout, b"/in/a.txt|/out/b.txt");
    }

    #[tokio::test]
    async fn child_writes_output_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let script = write_script(dir.path(), "solver", "cp \"$1\" \"$2\"\n");
        let input = dir.path().join("input_group1.txt");
        let output = dir.path().join("output_group1.txt");
        std::fs::write(&input, b"problem").unwrap();

        let outcome = BinaryRunner::new()
            .run(&script, &input, &output)
            .await
            .expect("run");
        assert!(outcome.success());
        assert_eq!(std::fs::read(&output).unwrap(), b"problem");
    }

    #[tokio::test]
    async fn nonzero_exit_is_not_an_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let script = write_script(dir.path(), "verifier", "echo rejected >&2\nexit 1\n");
        let outcome = BinaryRunner::new()
            .run(&script, Path::new("a"), Path::new("b"))
            .await
            .expect("run");
        assert_eq!(outcome.exit_code, Some(1));
        assert_eq!(outcome.stderr, b"rejected\n");
    }

    #[tokio::test]
    async fn timeout_is_enforced() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let script = write_script(dir.path(), "solver", "sleep 60\n");
        let runner = BinaryRunner::with_timeout(Some(Duration::from_millis(200)));
        let result = runner.run(&script, Path::new("a"), Path::new("b")).await;
        assert_matches!(result, Err(ProcessError::Timeout { .. }));
    }
}
