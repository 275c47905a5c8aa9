//! Common types shared across the scheduler and MMU engines.
//!
//! This module provides the fundamental building blocks used throughout the
//! simulator:
//! 1. **Identifiers:** Strong types for process ids and tick counts.
//! 2. **Error Handling:** Configuration/workload/invariant error types.

/// Error types shared by configuration loading, workload parsing, and the
/// simulation engine.
pub mod error;

/// Strongly-typed identifiers (process id, tick count).
pub mod ids;

pub use error::SimError;
pub use ids::{Pid, Tick};
