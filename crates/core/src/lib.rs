//! Discrete-event simulator of an OS process scheduler and paging MMU.
//!
//! This crate implements two independent simulation modes driven by a
//! single integer logical clock:
//! 1. **CPU scheduling:** FCFS and Corbato-style MLFB policies over an
//!    arrival/ready/waiting queue set, with a probabilistic
//!    burst-termination oracle.
//! 2. **Paging MMU:** a per-process page table indexed by reference
//!    order and a clock (second-chance) physical frame table.
//!
//! Both modes share a process arena, a trace-event vocabulary, and a
//! statistics collector; [`sim::Simulator`] is the single entry point that
//! owns whichever mode is active and drives its tick loop.

/// Common types and constants (process ids, ticks, the error taxonomy).
pub mod common;
/// Configuration file parsing (scheduler and MMU run parameters).
pub mod config;
/// The memory-management tick loop (paging MMU mode).
pub mod memsim;
/// Paging MMU: page tables, the frame table, and the clock algorithm.
pub mod mmu;
/// The probability oracle driving burst-termination decisions.
pub mod oracle;
/// The process model and the arena that owns all processes.
pub mod process;
/// Queue types shared by both schedulers and the memory-management loop.
pub mod queue;
/// The two CPU scheduling policies (FCFS and MLFB).
pub mod scheduler;
/// The top-level simulator owning the active engine and its statistics.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;
/// Human-readable trace events produced by each tick.
pub mod trace;
/// Workload and probability-source file loaders.
pub mod workload;

/// Process ids, ticks, and the shared error taxonomy.
pub use common::{Pid, SimError, Tick};
/// CPU-mode and MMU-mode run configuration.
pub use config::{MmuConfig, SchedulerConfig};
/// The memory-management tick loop.
pub use memsim::MemSim;
/// The probability oracle and one consumed draw.
pub use oracle::{Draw, ProbabilityOracle};
/// The process model and its owning arena.
pub use process::{Process, ProcessPool, Stage};
/// The two CPU scheduling policies behind one tagged enum.
pub use scheduler::{Fcfs, Mlfb, Scheduler};
/// The top-level simulator.
pub use sim::Simulator;
/// Run statistics.
pub use stats::SimStats;
/// Trace events and their `Display` rendering.
pub use trace::TraceEvent;
