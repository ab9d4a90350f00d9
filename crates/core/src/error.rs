use crate::job::{JobId, JobPhase};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid output template '{0}': must contain the {{id}} placeholder")]
    InvalidTemplate(String),

    #[error("Illegal phase transition for job {id}: {from} -> {to}")]
    IllegalTransition {
        id: JobId,
        from: JobPhase,
        to: JobPhase,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
