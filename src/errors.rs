//! Error conditions reported by the pipeline driver.
//!
//! Every stage's output is a hard precondition for the stage after it, so
//! each of these conditions is fatal to the run: nothing is retried, and the
//! run log carries the same notice the error reports.

use thiserror::Error;

/// A specialized [`Result`](std::result::Result) type for pipeline
/// operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The ways a pipeline run can fail after the log file exists.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An external tool could not be resolved on the search path.
    #[error("required command not found on PATH: {command}")]
    CommandNotFound {
        /// Name of the command that could not be resolved.
        command: String,
    },

    /// An external tool ran and reported a non-zero exit status.
    #[error("stage {ordinal} ({name}) failed: `{command}` (exit: {code:?})")]
    CommandFailed {
        /// Ordinal position of the failing stage.
        ordinal: usize,

        /// Display name of the failing stage.
        name: &'static str,

        /// The rendered command line that failed.
        command: String,

        /// Exit code reported by the process, if one was available.
        code: Option<i32>,
    },

    /// A stage completed but one of its predicted output files does not
    /// exist. This is what convention drift looks like: a newer version of
    /// an external tool renamed its outputs and the registry's prediction
    /// no longer holds.
    #[error("stage {ordinal} ({name}) did not produce the expected file: {filename}")]
    StageOutputMissing {
        /// Ordinal position of the stage whose output is missing.
        ordinal: usize,

        /// Display name of the stage whose output is missing.
        name: &'static str,

        /// The filename the stage was expected to produce.
        filename: String,
    },

    /// An I/O error while writing the run log or managing run files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
