use std::path::{Path, PathBuf};
use std::time::Duration;

use groupsolve_core::discovery::DiscoveryMode;
use groupsolve_core::naming::{
    FilePattern, OutputTemplate, DEFAULT_INPUT_PATTERN, DEFAULT_OUTPUT_TEMPLATE,
    DEFAULT_SHARED_OUTPUT_PATTERN,
};
use groupsolve_core::CoreError;

/// Error raised while reading the worker configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    InvalidValue {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error(transparent)]
    Naming(#[from] CoreError),
}

/// Worker configuration loaded from environment variables.
///
/// Relative paths are resolved against `GROUPSOLVE_ROOT`.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub solver: PathBuf,
    pub verifier: PathBuf,
    /// Diagnostic capture directory; `None` writes next to the outputs.
    pub diagnostics_dir: Option<PathBuf>,
    /// Where jobs come from. `SharedInput` means verify-only.
    pub discovery: DiscoveryMode,
    /// Jobs per wave.
    pub capacity: usize,
    /// Per-invocation deadline (default: none).
    pub process_timeout: Option<Duration>,
    /// Optional path for a JSON run summary.
    pub summary_file: Option<PathBuf>,
}

impl WorkerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                 | Default                              |
    /// |-------------------------|--------------------------------------|
    /// | `GROUPSOLVE_ROOT`       | `.`                                  |
    /// | `SOLVER_BIN`            | `build/solver`                       |
    /// | `VERIFIER_BIN`          | `build/verifier`                     |
    /// | `INPUTS_DIR`            | `data/inputs`                        |
    /// | `OUTPUTS_DIR`           | `data/outputs`                       |
    /// | `DIAGNOSTICS_DIR`       | outputs dir                          |
    /// | `INPUT_PATTERN`         | `^input_group(\d+)\.txt$`            |
    /// | `OUTPUT_TEMPLATE`       | `output_group{id}.txt`               |
    /// | `SHARED_INPUT`          | unset (set to run verify-only)       |
    /// | `SHARED_OUTPUT_PATTERN` | `^output_from_(\d+)_to_(\d+)\.txt$`  |
    /// | `CAPACITY`              | available parallelism                |
    /// | `PROCESS_TIMEOUT_SECS`  | unset                                |
    /// | `SUMMARY_FILE`          | unset                                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let root = PathBuf::from(var("GROUPSOLVE_ROOT").unwrap_or_else(|| ".".into()));
        let path = |key: &str, default: &str| -> PathBuf {
            resolve(&root, &var(key).unwrap_or_else(|| default.to_string()))
        };

        let solver = path("SOLVER_BIN", "build/solver");
        let verifier = path("VERIFIER_BIN", "build/verifier");
        let outputs_dir = path("OUTPUTS_DIR", "data/outputs");
        let diagnostics_dir = var("DIAGNOSTICS_DIR").map(|d| resolve(&root, &d));

        let discovery = match var("SHARED_INPUT") {
            Some(input) => DiscoveryMode::SharedInput {
                input_file: resolve(&root, &input),
                outputs_dir,
                output_pattern: FilePattern::new(
                    &var("SHARED_OUTPUT_PATTERN")
                        .unwrap_or_else(|| DEFAULT_SHARED_OUTPUT_PATTERN.to_string()),
                )?,
            },
            None => DiscoveryMode::PerJobInput {
                inputs_dir: path("INPUTS_DIR", "data/inputs"),
                input_pattern: FilePattern::new(
                    &var("INPUT_PATTERN").unwrap_or_else(|| DEFAULT_INPUT_PATTERN.to_string()),
                )?,
                outputs_dir,
                output_template: OutputTemplate::new(
                    &var("OUTPUT_TEMPLATE")
                        .unwrap_or_else(|| DEFAULT_OUTPUT_TEMPLATE.to_string()),
                )?,
            },
        };

        let capacity = match var("CAPACITY") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "CAPACITY",
                        expected: "a positive integer",
                        value,
                    })
                }
            },
            None => default_capacity(),
        };

        let process_timeout = match var("PROCESS_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "PROCESS_TIMEOUT_SECS",
                        expected: "a positive number of seconds",
                        value,
                    })
                }
            },
            None => None,
        };

        let summary_file = var("SUMMARY_FILE").map(|f| resolve(&root, &f));

        Ok(Self {
            solver,
            verifier,
            diagnostics_dir,
            discovery,
            capacity,
            process_timeout,
            summary_file,
        })
    }

    /// Whether the run includes a solve phase.
    pub fn solves(&self) -> bool {
        self.discovery.solves()
    }
}

/// Number of parallel execution units on this machine (at least 1).
pub fn default_capacity() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn resolve(root: &Path, value: &str) -> PathBuf {
    let p = PathBuf::from(value);
    if p.is_absolute() {
        p
    } else {
        root.join(p)
    }
}
