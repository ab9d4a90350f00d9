//! External process execution for solver and verifier binaries.
//!
//! [`runner::ProcessRunner`] is the seam the scheduler depends on;
//! [`binary::BinaryRunner`] is the real implementation and delegates the
//! spawn + capture work to [`subprocess::run_command`].

pub mod binary;
pub mod runner;
pub mod subprocess;

pub use binary::{check_binary, BinaryRunner};
pub use runner::{ProcessError, ProcessOutcome, ProcessRunner};
