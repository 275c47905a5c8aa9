//! Queue types shared by both schedulers and the memory-management loop.
//!
//! Every queue here holds [`Pid`] handles, never `Process` values — the
//! [`ProcessPool`](crate::process::ProcessPool) is the sole owner. This is
//! the idiomatic-Rust rendering of the original tool's `deque<Process*>`.

use std::collections::VecDeque;

use crate::common::{Pid, Tick};

/// The arrival queue: processes not yet eligible for the ready queue,
/// pre-sorted ascending by `arrival_time` (spec.md §4.2: "Configuration:
/// ... one arrival queue `A` (pre-sorted ascending by arrival_time)").
///
/// Spec.md's Open Questions explicitly decline to define behavior for an
/// unsorted arrival queue ("this spec requires pre-sorted input"); in a
/// debug build, [`push`](Self::push) asserts the sort order instead of
/// silently accepting out-of-order input.
#[derive(Debug, Default)]
pub struct ArrivalQueue {
    entries: VecDeque<(Pid, Tick)>,
}

impl ArrivalQueue {
    /// Creates an empty arrival queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Appends a process with its arrival time.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `arrival_time` is earlier than the
    /// previously pushed entry, since the queue is required to already be
    /// sorted (spec.md §4.2).
    pub fn push(&mut self, pid: Pid, arrival_time: Tick) {
        debug_assert!(
            self.entries
                .back()
                .is_none_or(|&(_, last)| last <= arrival_time),
            "arrival queue must be pre-sorted ascending by arrival_time"
        );
        self.entries.push_back((pid, arrival_time));
    }

    /// Returns the arrival time of the head entry, if any, without
    /// removing it.
    #[must_use]
    pub fn peek_arrival_time(&self) -> Option<Tick> {
        self.entries.front().map(|&(_, t)| t)
    }

    /// Removes and returns the head entry's pid.
    pub fn pop(&mut self) -> Option<Pid> {
        self.entries.pop_front().map(|(pid, _)| pid)
    }

    /// Whether the queue has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pids currently queued, front to back (for trace snapshots).
    #[must_use]
    pub fn pids(&self) -> Vec<Pid> {
        self.entries.iter().map(|&(pid, _)| pid).collect()
    }
}

/// A FIFO ready queue (one per priority level in MLFB, one total in
/// FCFS).
#[derive(Debug, Default, Clone)]
pub struct ReadyQueue {
    entries: VecDeque<Pid>,
}

impl ReadyQueue {
    /// Creates an empty ready queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Pushes a process to the back of the queue (normal admission).
    pub fn push_back(&mut self, pid: Pid) {
        self.entries.push_back(pid);
    }

    /// Pushes a process to the front of the queue (MLFB preemption,
    /// spec.md §4.3 rule c).
    pub fn push_front(&mut self, pid: Pid) {
        self.entries.push_front(pid);
    }

    /// Removes and returns the head of the queue.
    pub fn pop_front(&mut self) -> Option<Pid> {
        self.entries.pop_front()
    }

    /// Whether the queue has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pids currently queued, front to back (for trace snapshots).
    #[must_use]
    pub fn pids(&self) -> Vec<Pid> {
        self.entries.iter().copied().collect()
    }
}

/// The waiting queue: processes blocked on I/O (CPU modes) or a page
/// fault (memory mode). Only the head entry's wait timer advances per
/// tick (spec.md §4.2 step 3).
#[derive(Debug, Default)]
pub struct WaitQueue {
    entries: VecDeque<Pid>,
}

impl WaitQueue {
    /// Creates an empty waiting queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Pushes a process to the back of the queue.
    pub fn push_back(&mut self, pid: Pid) {
        self.entries.push_back(pid);
    }

    /// Returns the pid at the head of the queue without removing it.
    #[must_use]
    pub fn front(&self) -> Option<Pid> {
        self.entries.front().copied()
    }

    /// Removes and returns the head of the queue.
    pub fn pop_front(&mut self) -> Option<Pid> {
        self.entries.pop_front()
    }

    /// Whether the queue has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pids currently queued, front to back (for trace snapshots).
    #[must_use]
    pub fn pids(&self) -> Vec<Pid> {
        self.entries.iter().copied().collect()
    }
}
