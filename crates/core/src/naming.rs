//! Filename conventions for job inputs, outputs, and diagnostics.
//!
//! Convention (batch mode):
//!
//! - input: `input_group<ID>.txt`
//! - output: `output_group<ID>.txt`
//! - invalid output: `output_group<ID>.invalid.txt`, then `output_group<ID>.invalid.<N>.txt`
//! - solve diagnostics: `stdout-<ID>.txt`, `stderr-<ID>.txt`
//! - verify diagnostics: `verifier_group<ID>.txt.stdout`, `verifier_group<ID>.txt.stderr`
//!
//! # Examples
//!
//! ```
//! use std::path::Path;
//! use groupsolve_core::naming::{invalid_path, FilePattern, OutputTemplate};
//!
//! let pattern = FilePattern::new(groupsolve_core::naming::DEFAULT_INPUT_PATTERN).unwrap();
//! let id = pattern.extract_id("input_group42.txt").unwrap();
//! assert_eq!(id.as_str(), "42");
//!
//! let template = OutputTemplate::new("output_group{id}.txt").unwrap();
//! assert_eq!(template.render(&id), "output_group42.txt");
//!
//! assert_eq!(
//!     invalid_path(Path::new("/out/output_group42.txt")),
//!     Path::new("/out/output_group42.invalid.txt"),
//! );
//! ```

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::CoreError;
use crate::job::{JobId, Stage};

/// Default batch-mode input filename pattern.
pub const DEFAULT_INPUT_PATTERN: &str = r"^input_group(\d+)\.txt$";

/// Default batch-mode output filename template.
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "output_group{id}.txt";

/// Default pattern for outputs checked in verify-only mode.
pub const DEFAULT_SHARED_OUTPUT_PATTERN: &str = r"^output_from_(\d+)_to_(\d+)\.txt$";

/// Placeholder substituted with the job id in an [`OutputTemplate`].
pub const ID_PLACEHOLDER: &str = "{id}";

/// Marker inserted into the name of an output that failed verification.
pub const INVALID_MARKER: &str = "invalid";

// ---------------------------------------------------------------------------
// Patterns and templates
// ---------------------------------------------------------------------------

/// A filename pattern whose capture groups form the job id.
#[derive(Debug, Clone)]
pub struct FilePattern {
    regex: Regex,
}

impl FilePattern {
    /// Compile `pattern`. It must contain at least one capture group.
    pub fn new(pattern: &str) -> Result<Self, CoreError> {
        let regex = Regex::new(pattern).map_err(|e| CoreError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        if regex.captures_len() < 2 {
            return Err(CoreError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "pattern must contain at least one capture group".to_string(),
            });
        }
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Extract the job id from `file_name`, joining multiple captures with `_`.
    ///
    /// Returns `None` when the name does not match or a capture is empty.
    pub fn extract_id(&self, file_name: &str) -> Option<JobId> {
        let caps = self.regex.captures(file_name)?;
        let mut parts = Vec::with_capacity(caps.len() - 1);
        for group in caps.iter().skip(1) {
            match group {
                Some(m) if !m.as_str().is_empty() => parts.push(m.as_str()),
                _ => return None,
            }
        }
        Some(JobId::new(parts.join("_")))
    }
}

/// Output filename template containing [`ID_PLACEHOLDER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate(String);

impl OutputTemplate {
    pub fn new(template: &str) -> Result<Self, CoreError> {
        if !template.contains(ID_PLACEHOLDER) {
            return Err(CoreError::InvalidTemplate(template.to_string()));
        }
        Ok(Self(template.to_string()))
    }

    pub fn render(&self, id: &JobId) -> String {
        self.0.replace(ID_PLACEHOLDER, id.as_str())
    }
}

// ---------------------------------------------------------------------------
// Derived paths
// ---------------------------------------------------------------------------

/// Path an output is renamed to when verification rejects it.
///
/// The marker goes before the final extension (`a.txt` -> `a.invalid.txt`);
/// names without an extension get `.invalid` appended.
pub fn invalid_path(output: &Path) -> PathBuf {
    numbered_invalid_path(output, 0)
}

/// The `attempt`-th invalid name for `output`.
///
/// Attempt 0 is [`invalid_path`]; later attempts add a counter after the
/// marker (`a.invalid.1.txt`) so earlier evidence is never overwritten.
pub fn numbered_invalid_path(output: &Path, attempt: u32) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let marker = match attempt {
        0 => INVALID_MARKER.to_string(),
        n => format!("{INVALID_MARKER}.{n}"),
    };
    let name = match output.extension() {
        Some(ext) => format!("{stem}.{marker}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{marker}"),
    };
    output.with_file_name(name)
}

/// Pair of capture files for one failed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticPaths {
    pub stdout: PathBuf,
    pub stderr: PathBuf,
}

/// Diagnostic capture paths for a failed `stage` of job `id`.
pub fn diagnostic_paths(dir: &Path, id: &JobId, stage: Stage) -> DiagnosticPaths {
    match stage {
        Stage::Solve => DiagnosticPaths {
            stdout: dir.join(format!("stdout-{id}.txt")),
            stderr: dir.join(format!("stderr-{id}.txt")),
        },
        Stage::Verify => DiagnosticPaths {
            stdout: dir.join(format!("verifier_group{id}.txt.stdout")),
            stderr: dir.join(format!("verifier_group{id}.txt.stderr")),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
