//! Job discovery from the filesystem naming convention.
//!
//! Discovery never fails: unreadable directories and non-matching entries
//! are skipped (with a warning for the former). Creating the directories a
//! run needs is the separate [`ensure_layout`] step.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::job::{Job, JobId};
use crate::naming::{FilePattern, OutputTemplate};

/// Where jobs come from and how their paths are derived.
#[derive(Debug, Clone)]
pub enum DiscoveryMode {
    /// One input file per job; outputs are derived from the template.
    PerJobInput {
        inputs_dir: PathBuf,
        input_pattern: FilePattern,
        outputs_dir: PathBuf,
        output_template: OutputTemplate,
    },
    /// Every job shares one input; existing outputs are the work items.
    SharedInput {
        input_file: PathBuf,
        outputs_dir: PathBuf,
        output_pattern: FilePattern,
    },
}

impl DiscoveryMode {
    /// Whether this mode runs the solver at all.
    pub fn solves(&self) -> bool {
        matches!(self, Self::PerJobInput { .. })
    }

    pub fn outputs_dir(&self) -> &Path {
        match self {
            Self::PerJobInput { outputs_dir, .. } | Self::SharedInput { outputs_dir, .. } => {
                outputs_dir
            }
        }
    }
}

/// Create the directories a run reads from and writes to.
pub fn ensure_layout(mode: &DiscoveryMode, extra: &[&Path]) -> Result<(), CoreError> {
    let mut dirs: Vec<&Path> = vec![mode.outputs_dir()];
    if let DiscoveryMode::PerJobInput { inputs_dir, .. } = mode {
        dirs.push(inputs_dir);
    }
    dirs.extend_from_slice(extra);

    for dir in dirs {
        fs::create_dir_all(dir).map_err(|source| CoreError::Io {
            path: dir.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

/// Discover all jobs for `mode`, sorted by id.
pub fn discover_jobs(mode: &DiscoveryMode) -> Vec<Job> {
    let mut jobs = match mode {
        DiscoveryMode::PerJobInput {
            inputs_dir,
            input_pattern,
            outputs_dir,
            output_template,
        } => {
            let outputs_dir = absolute(outputs_dir);
            matching_files(inputs_dir, input_pattern)
                .into_iter()
                .map(|(id, input)| {
                    let output = outputs_dir.join(output_template.render(&id));
                    Job::new(id, input, output)
                })
                .collect::<Vec<_>>()
        }
        DiscoveryMode::SharedInput {
            input_file,
            outputs_dir,
            output_pattern,
        } => {
            let input = absolute(input_file);
            matching_files(outputs_dir, output_pattern)
                .into_iter()
                .map(|(id, output)| Job::new(id, input.clone(), output))
                .collect::<Vec<_>>()
        }
    };

    jobs.sort_by(|a, b| a.id.cmp(&b.id));
    jobs
}

/// Regular files in `dir` whose names match `pattern`, with their ids.
///
/// Entries are visited in name order so duplicate-id resolution does not
/// depend on directory iteration order.
fn matching_files(dir: &Path, pattern: &FilePattern) -> Vec<(JobId, PathBuf)> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Cannot read job directory");
            return Vec::new();
        }
    };

    let mut candidates: Vec<(String, PathBuf)> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let path = entry.path();
            if !path.is_file() {
                return None;
            }
            let name = entry.file_name().to_str()?.to_string();
            Some((name, path))
        })
        .collect();
    candidates.sort();

    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for (name, path) in candidates {
        let Some(id) = pattern.extract_id(&name) else {
            continue;
        };
        if !seen.insert(id.clone()) {
            tracing::warn!(job_id = %id, file = %name, "Duplicate job id, ignoring file");
            continue;
        }
        found.push((id, absolute(&path)));
    }
    found
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
