//! End-to-end runs against stub solver/verifier shell scripts.
#![cfg(unix)]

use std::collections::HashMap;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_matches::assert_matches;

use groupsolve_worker::config::WorkerConfig;
use groupsolve_worker::WorkerError;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

struct Project {
    _tmp: tempfile::TempDir,
    root: PathBuf,
}

impl Project {
    fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        Self { _tmp: tmp, root }
    }

    fn inputs(&self) -> PathBuf {
        self.root.join("data/inputs")
    }

    fn outputs(&self) -> PathBuf {
        self.root.join("data/outputs")
    }

    fn log(&self) -> PathBuf {
        self.root.join("invocations.log")
    }

    fn add_input(&self, id: u32) {
        std::fs::create_dir_all(self.inputs()).unwrap();
        std::fs::write(self.inputs().join(format!("input_group{id}.txt")), format!("problem {id}"))
            .unwrap();
    }

    /// Install `build/<name>` as a shell script that logs each call.
    fn install(&self, name: &str, body: &str) {
        let dir = self.root.join("build");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "#!/bin/sh").unwrap();
        writeln!(f, "echo \"{name} $2\" >> '{}'", self.log().display()).unwrap();
        write!(f, "{body}").unwrap();
        drop(f);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn config(&self, extra: &[(&str, &str)]) -> WorkerConfig {
        let mut vars: HashMap<String, String> = extra
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        vars.insert("GROUPSOLVE_ROOT".into(), self.root.display().to_string());
        vars.entry("CAPACITY".into()).or_insert_with(|| "2".into());
        WorkerConfig::from_lookup(|key| vars.get(key).cloned()).expect("config")
    }

    fn invocations(&self) -> Vec<String> {
        std::fs::read_to_string(self.log())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

const COPY_SOLVER: &str = "cp \"$1\" \"$2\"\n";

const PICKY_VERIFIER: &str = r#"case "$2" in
  *output_group2.txt) echo "wrong answer"; echo "mismatch on line 1" >&2; exit 1 ;;
esac
exit 0
"#;

fn has_file_named(dir: &Path, name: &str) -> bool {
    dir.join(name).is_file()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn verifier_rejection_scenario() {
    let project = Project::new();
    project.add_input(1);
    project.add_input(2);
    project.install("solver", COPY_SOLVER);
    project.install("verifier", PICKY_VERIFIER);

    let summary = groupsolve_worker::run(&project.config(&[])).await.expect("run");

    let out = project.outputs();
    assert!(has_file_named(&out, "output_group1.txt"));
    assert!(!out.join("output_group2.txt").exists());
    assert!(has_file_named(&out, "output_group2.invalid.txt"));
    assert_eq!(
        std::fs::read_to_string(out.join("verifier_group2.txt.stdout")).unwrap(),
        "wrong answer\n"
    );
    assert_eq!(
        std::fs::read_to_string(out.join("verifier_group2.txt.stderr")).unwrap(),
        "mismatch on line 1\n"
    );
    assert!(!out.join("verifier_group1.txt.stdout").exists());
    assert!(!out.join("stdout-1.txt").exists());
    assert!(!out.join("stdout-2.txt").exists());

    assert_eq!(summary.verified, 1);
    assert_eq!(summary.invalid, 1);
    assert!(!summary.is_success());
}

#[tokio::test]
async fn failing_solver_is_never_verified() {
    let project = Project::new();
    project.add_input(1);
    project.add_input(2);
    project.install(
        "solver",
        r#"case "$1" in
  *input_group1.txt) echo partial; echo 'no solution' >&2; exit 3 ;;
esac
cp "$1" "$2"
"#,
    );
    project.install("verifier", "exit 0\n");

    let summary = groupsolve_worker::run(&project.config(&[])).await.expect("run");

    let out = project.outputs();
    assert_eq!(std::fs::read_to_string(out.join("stdout-1.txt")).unwrap(), "partial\n");
    assert_eq!(std::fs::read_to_string(out.join("stderr-1.txt")).unwrap(), "no solution\n");
    let calls = project.invocations();
    let verifier_calls: Vec<&String> = calls.iter().filter(|c| c.starts_with("verifier")).collect();
    assert_eq!(verifier_calls.len(), 1);
    assert!(verifier_calls[0].ends_with("output_group2.txt"));
    assert_eq!(summary.solve_failed, 1);
    assert_eq!(summary.verified, 1);
}

#[tokio::test]
async fn output_left_by_failed_solver_is_not_skipped_on_rerun() {
    let project = Project::new();
    project.add_input(1);
    project.install("solver", "echo partial > \"$2\"\nexit 1\n");
    project.install("verifier", "exit 1\n");
    let config = project.config(&[]);

    let first = groupsolve_worker::run(&config).await.expect("first run");
    assert_eq!(first.solve_failed, 1);
    assert!(!project.outputs().join("output_group1.txt").exists());
    assert!(has_file_named(&project.outputs(), "output_group1.invalid.txt"));

    let second = groupsolve_worker::run(&config).await.expect("second run");
    assert_eq!(second.skipped, 0);
    assert_eq!(second.solve_failed, 1);
    assert!(!second.is_success());
    assert!(has_file_named(&project.outputs(), "output_group1.invalid.1.txt"));
    let solver_calls = project
        .invocations()
        .iter()
        .filter(|c| c.starts_with("solver"))
        .count();
    assert_eq!(solver_calls, 2);
}

#[tokio::test]
async fn second_run_is_a_no_op() {
    let project = Project::new();
    for id in 1..=5 {
        project.add_input(id);
    }
    project.install("solver", COPY_SOLVER);
    project.install("verifier", "exit 0\n");
    let config = project.config(&[]);

    let first = groupsolve_worker::run(&config).await.expect("first run");
    assert_eq!(first.verified, 5);
    let calls_after_first = project.invocations().len();
    assert_eq!(calls_after_first, 10);

    let second = groupsolve_worker::run(&config).await.expect("second run");
    assert_eq!(project.invocations().len(), calls_after_first);
    assert_eq!(second.skipped, 5);
    assert!(second.is_success());
}

#[tokio::test]
async fn missing_solver_aborts_before_touching_anything() {
    let project = Project::new();
    project.add_input(1);
    project.install("verifier", "exit 0\n");

    let result = groupsolve_worker::run(&project.config(&[])).await;

    assert_matches!(result, Err(WorkerError::Binary { role: "Solver", .. }));
    assert!(!project.outputs().exists());
    assert!(project.invocations().is_empty());
    assert_eq!(
        std::fs::read_dir(project.inputs()).unwrap().count(),
        1,
        "inputs directory must be left as it was"
    );
}

#[tokio::test]
async fn missing_verifier_aborts() {
    let project = Project::new();
    project.install("solver", COPY_SOLVER);

    let result = groupsolve_worker::run(&project.config(&[])).await;
    assert_matches!(result, Err(WorkerError::Binary { role: "Verifier", .. }));
}

#[tokio::test]
async fn empty_inputs_directory_is_created_and_succeeds() {
    let project = Project::new();
    project.install("solver", COPY_SOLVER);
    project.install("verifier", "exit 0\n");

    let summary = groupsolve_worker::run(&project.config(&[])).await.expect("run");

    assert!(project.inputs().is_dir());
    assert!(project.outputs().is_dir());
    assert_eq!(summary.total, 0);
    assert!(summary.is_success());
}

#[tokio::test]
async fn verify_only_mode_checks_existing_outputs() {
    let project = Project::new();
    project.install("verifier", "case \"$2\" in *from_10_*) exit 1 ;; esac\nexit 0\n");
    std::fs::create_dir_all(project.outputs()).unwrap();
    let shared = project.root.join("data/input_group728.txt");
    std::fs::write(&shared, "big problem").unwrap();
    std::fs::write(project.outputs().join("output_from_0_to_9.txt"), "a").unwrap();
    std::fs::write(project.outputs().join("output_from_10_to_19.txt"), "b").unwrap();

    let config = project.config(&[("SHARED_INPUT", "data/input_group728.txt")]);
    let summary = groupsolve_worker::run(&config).await.expect("run");

    assert_eq!(summary.total, 2);
    assert_eq!(summary.verified, 1);
    assert_eq!(summary.invalid, 1);
    let out = project.outputs();
    assert!(has_file_named(&out, "output_from_0_to_9.txt"));
    assert!(has_file_named(&out, "output_from_10_to_19.invalid.txt"));
    assert!(has_file_named(&out, "verifier_group10_19.txt.stdout"));
    assert!(project.invocations().iter().all(|c| c.starts_with("verifier")));
}

#[tokio::test]
async fn summary_file_is_written() {
    let project = Project::new();
    project.add_input(1);
    project.install("solver", COPY_SOLVER);
    project.install("verifier", "exit 0\n");

    let config = project.config(&[("SUMMARY_FILE", "summary.json")]);
    groupsolve_worker::run(&config).await.expect("run");

    let raw = std::fs::read_to_string(project.root.join("summary.json")).unwrap();
    assert!(raw.contains("\"verified\": 1"), "summary was: {raw}");
}

#[tokio::test]
async fn diagnostics_dir_override() {
    let project = Project::new();
    project.add_input(1);
    project.install("solver", "echo boom >&2\nexit 1\n");
    project.install("verifier", "exit 0\n");

    let config = project.config(&[("DIAGNOSTICS_DIR", "diag")]);
    groupsolve_worker::run(&config).await.expect("run");

    let diag = project.root.join("diag");
    assert_eq!(std::fs::read_to_string(diag.join("stderr-1.txt")).unwrap(), "boom\n");
    assert!(diag.join("stdout-1.txt").is_file());
    assert!(!project.outputs().join("stderr-1.txt").exists());
}
