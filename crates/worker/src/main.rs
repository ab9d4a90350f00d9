//! `groupsolve-worker` -- batch solve-then-verify runner.
//!
//! Discovers `input_group<ID>.txt` files, runs the solver and verifier
//! binaries over them in waves sized to the available parallelism, and
//! exits non-zero if any job failed to solve or verify.
//!
//! Configuration is read from the environment (see
//! [`WorkerConfig::from_env`]); a `.env` file is honoured.

use std::process::ExitCode;

use groupsolve_worker::config::WorkerConfig;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "groupsolve_worker=info,groupsolve_pipeline=info,groupsolve_core=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match WorkerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        solver = %config.solver.display(),
        verifier = %config.verifier.display(),
        outputs = %config.discovery.outputs_dir().display(),
        capacity = config.capacity,
        verify_only = !config.solves(),
        "Starting groupsolve-worker",
    );

    match groupsolve_worker::run(&config).await {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(summary) => {
            tracing::warn!(
                invalid = summary.invalid,
                solve_failed = summary.solve_failed,
                "Run finished with failed jobs",
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            ExitCode::FAILURE
        }
    }
}
