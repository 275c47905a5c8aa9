//! Simulation error types.
//!
//! Covers configuration errors, workload errors, oracle exhaustion, and
//! invariant violations.

use std::path::PathBuf;

/// Errors that can terminate a simulation run.
///
/// All variants are fatal: none are recovered locally and none trigger
/// retries. Configuration and workload errors abort before any tick runs;
/// oracle exhaustion and invariant violations can only occur
/// mid-simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A configuration file could not be opened.
    #[error("could not open configuration file {path}: {source}")]
    ConfigFileOpen {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration key was missing, malformed, or out of range.
    #[error("configuration error at {path} line {line}: {message}")]
    Configuration {
        /// Path of the offending configuration file.
        path: PathBuf,
        /// 1-indexed line number, or 0 if the error is not line-local.
        line: usize,
        /// Human-readable description of the problem.
        message: String,
    },

    /// A workload file (process list or reference trace) could not be
    /// opened.
    #[error("could not open workload file {path}: {source}")]
    WorkloadFileOpen {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A workload file contained a malformed or out-of-range record.
    #[error("workload error in {path} at line {line}: {message}")]
    Workload {
        /// Path of the offending workload file.
        path: PathBuf,
        /// 1-indexed line number.
        line: usize,
        /// Human-readable description of the problem.
        message: String,
    },

    /// The probability oracle's sequence was consumed past its end. The
    /// sequence is finite but must never run dry during a valid
    /// simulation.
    #[error("probability oracle exhausted after {consumed} draws")]
    OracleExhausted {
        /// Number of draws successfully consumed before exhaustion.
        consumed: usize,
    },

    /// A programmer-error invariant was violated: an index out of range,
    /// a queue assumed nonempty that was empty, or similar.
    #[error("invariant violation: {0}")]
    Invariant(String),
}
