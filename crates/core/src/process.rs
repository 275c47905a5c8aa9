//! The process model and the arena that owns all processes.
//!
//! Queues hold [`Pid`] handles only; the [`ProcessPool`] is the single
//! owner of every [`Process`]. Ownership lives in one arena indexed by
//! pid rather than being threaded through the queues that reference a
//! process.

use std::collections::HashMap;

use crate::common::{Pid, Tick};
use crate::mmu::page_table::PageTable;

/// Which stage of the lifecycle a process currently occupies.
///
/// Used only for debug-time invariant assertions (a process must occupy
/// exactly one queue at a time); queues themselves are the source of
/// truth for membership.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Not yet arrived.
    Arrival,
    /// Waiting in a ready queue at the given priority level (0 for FCFS).
    Ready(usize),
    /// Occupying the running slot.
    Running,
    /// Blocked on I/O or a page fault.
    Waiting,
    /// Finished; no longer simulated.
    Terminated,
}

/// A simulated job.
#[derive(Clone, Debug)]
pub struct Process {
    /// Unique process id, assigned externally by the workload file.
    pub pid: Pid,
    /// Tick at which the process becomes eligible for the ready queue.
    pub arrival_time: Tick,
    /// Total ticks of CPU the process must accrue before terminating.
    pub total_cpu: u64,
    /// Expected length of one CPU burst.
    pub avg_burst: u64,
    /// Remaining CPU ticks; initially `total_cpu`.
    pub time_left: u64,
    /// Ticks spent in the current burst since entering running.
    pub burst_interval: u64,
    /// Ticks spent so far in the current waiting episode.
    pub io_wait: u64,
    /// MLFB-only: priority level, 0 = highest, bounded by `Q - 1`.
    pub priority_level: u32,
    /// MLFB-only: remaining ticks in the current quantum.
    pub guaranteed_time: u64,
    /// Current lifecycle stage, tracked for invariant checks.
    pub stage: Stage,
    /// Memory-management mode only: this process's per-reference page
    /// table, indexed by reference sequence number.
    pub page_table: Option<PageTable>,
    /// Memory-management mode only: index of the next unresolved
    /// reference in `page_table`.
    pub next_reference: usize,
    /// Memory-management mode only: remaining ticks before this process
    /// returns from blocked to ready.
    pub wait_time: u64,
}

impl Process {
    /// Creates a new process for the CPU scheduler modes (FCFS/MLFB).
    ///
    /// `time_left` starts at `total_cpu`, `guaranteed_time` starts at 1
    /// (reset to `2^priority_level` on (re)dispatch), and `priority_level`
    /// starts at 0.
    #[must_use]
    pub const fn new(pid: Pid, arrival_time: Tick, total_cpu: u64, avg_burst: u64) -> Self {
        Self {
            pid,
            arrival_time,
            total_cpu,
            avg_burst,
            time_left: total_cpu,
            burst_interval: 0,
            io_wait: 0,
            priority_level: 0,
            guaranteed_time: 1,
            stage: Stage::Arrival,
            page_table: None,
            next_reference: 0,
            wait_time: 0,
        }
    }

    /// Creates a new process for the memory-management mode: arrival time
    /// is always 0, and it carries a page table instead of CPU-burst
    /// bookkeeping.
    #[must_use]
    pub fn new_memory(pid: Pid, page_table: PageTable) -> Self {
        Self {
            pid,
            arrival_time: Tick::ZERO,
            total_cpu: 0,
            avg_burst: 0,
            time_left: 0,
            burst_interval: 0,
            io_wait: 0,
            priority_level: 0,
            guaranteed_time: 0,
            stage: Stage::Arrival,
            page_table: Some(page_table),
            next_reference: 0,
            wait_time: 0,
        }
    }

    /// Returns the current quantum size, `2^priority_level` (MLFB only).
    #[must_use]
    pub fn quantum(&self) -> u64 {
        1u64 << self.priority_level
    }

    /// Whether this process has resolved every reference in its trace
    /// (memory-management mode only).
    #[must_use]
    pub fn references_exhausted(&self) -> bool {
        match &self.page_table {
            Some(table) => self.next_reference >= table.len(),
            None => true,
        }
    }
}

/// Owning arena for every process in a simulation run.
///
/// Queues elsewhere in the crate hold `Pid` handles and look processes up
/// here; this is the single point of truth for process state, borrowed by
/// whichever scheduler phase needs it for the duration of one tick.
#[derive(Debug, Default)]
pub struct ProcessPool {
    processes: HashMap<Pid, Process>,
}

impl ProcessPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            processes: HashMap::new(),
        }
    }

    /// Inserts a process, keyed by its `pid`.
    pub fn insert(&mut self, process: Process) {
        self.processes.insert(process.pid, process);
    }

    /// Looks up a process by pid.
    ///
    /// # Panics
    ///
    /// Panics if no process with this pid exists; every `Pid` handle
    /// circulating through the queues is expected to name a live process
    /// until it is explicitly removed on termination — a missing entry is
    /// an invariant violation, not a recoverable condition.
    #[must_use]
    pub fn get(&self, pid: Pid) -> &Process {
        self.processes
            .get(&pid)
            .unwrap_or_else(|| panic!("invariant violation: unknown pid {pid}"))
    }

    /// Mutably looks up a process by pid. See [`get`](Self::get) for the
    /// panic contract.
    pub fn get_mut(&mut self, pid: Pid) -> &mut Process {
        self.processes
            .get_mut(&pid)
            .unwrap_or_else(|| panic!("invariant violation: unknown pid {pid}"))
    }

    /// Removes and returns a terminated process.
    pub fn remove(&mut self, pid: Pid) -> Option<Process> {
        self.processes.remove(&pid)
    }

    /// Number of processes still tracked (not yet terminated/removed).
    #[must_use]
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// Whether the pool has no live processes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_process_starts_with_full_time_left() {
        let p = Process::new(Pid::new(1), Tick::ZERO, 10, 3);
        assert_eq!(p.time_left, 10);
        assert_eq!(p.burst_interval, 0);
        assert_eq!(p.priority_level, 0);
        assert_eq!(p.guaranteed_time, 1);
    }

    #[test]
    fn quantum_doubles_per_level() {
        let mut p = Process::new(Pid::new(1), Tick::ZERO, 10, 3);
        assert_eq!(p.quantum(), 1);
        p.priority_level = 2;
        assert_eq!(p.quantum(), 4);
    }

    #[test]
    fn pool_round_trips_processes() {
        let mut pool = ProcessPool::new();
        pool.insert(Process::new(Pid::new(7), Tick::ZERO, 5, 2));
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(Pid::new(7)).total_cpu, 5);
        let removed = pool.remove(Pid::new(7));
        assert!(removed.is_some());
        assert!(pool.is_empty());
    }
}
