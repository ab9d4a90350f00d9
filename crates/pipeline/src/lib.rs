//! Wave-based orchestration of solve-then-verify jobs.
//!
//! [`scheduler::BatchScheduler`] partitions discovered jobs into
//! capacity-sized waves and drives each wave through a solve barrier and a
//! verify barrier. Failure bookkeeping lives in [`results`], progress
//! reporting in [`progress`], and the run-level aggregate in [`summary`].

pub mod progress;
pub mod results;
pub mod scheduler;
pub mod summary;
pub mod wave;

pub use scheduler::{BatchScheduler, PipelineMode};
pub use summary::RunSummary;
