//! Domain logic for the solve-then-verify batch pipeline.
//!
//! Everything here is independent of scheduling: job identity and the
//! per-job phase state machine, filename conventions, job discovery, and
//! the external process runner. The pipeline crate drives these pieces.

pub mod discovery;
pub mod error;
pub mod job;
pub mod naming;
pub mod process;

pub use error::CoreError;
pub use job::{Job, JobId, JobPhase, Stage};
