//! The memory-management tick loop: one reference per running process
//! resolved per tick against the paging MMU.

use crate::common::{Pid, SimError, Tick};
use crate::mmu::FrameTable;
use crate::process::{ProcessPool, Stage};
use crate::queue::{ArrivalQueue, ReadyQueue, WaitQueue};
use crate::trace::TraceEvent;

/// Drives processes through the ready/running/blocked cycle one
/// reference resolution at a time: the process at the head of ready
/// gets one reference resolved per cycle, then yields. No burst-length
/// probability is involved here, unlike the CPU schedulers.
#[derive(Debug)]
pub struct MemSim {
    arrival: ArrivalQueue,
    ready: ReadyQueue,
    blocked: WaitQueue,
    running: Option<Pid>,
    frame_table: FrameTable,
    page_size: u64,
    miss_penalty: u64,
    dirty_page_penalty: u64,
}

impl MemSim {
    /// Creates a new memory-management simulator.
    #[must_use]
    pub fn new(num_frames: usize, page_size: u64, miss_penalty: u64, dirty_page_penalty: u64) -> Self {
        Self {
            arrival: ArrivalQueue::new(),
            ready: ReadyQueue::new(),
            blocked: WaitQueue::new(),
            running: None,
            frame_table: FrameTable::new(num_frames),
            page_size,
            miss_penalty,
            dirty_page_penalty,
        }
    }

    /// Admits a process into the arrival queue. MM-mode processes always
    /// arrive at `t = 0`.
    pub fn admit(&mut self, pid: Pid, arrival_time: Tick) {
        self.arrival.push(pid, arrival_time);
    }

    /// Whether every queue and the running slot are empty.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.arrival.is_empty() && self.ready.is_empty() && self.blocked.is_empty() && self.running.is_none()
    }

    /// Advances the simulation by one tick: admit arrivals, wake blocked
    /// processes whose penalty has elapsed, then resolve one reference
    /// for whichever process is running (dispatching a fresh one from
    /// ready first if the running slot is empty).
    ///
    /// # Panics
    ///
    /// Panics if a process's page table is missing — a memory-management
    /// process must always carry one (invariant violation otherwise).
    pub fn tick(&mut self, t: Tick, pool: &mut ProcessPool) -> Result<Vec<TraceEvent>, SimError> {
        let mut events = Vec::new();

        // 1. Promote arrivals whose arrival_time <= t (all arrive at 0).
        while self.arrival.peek_arrival_time().is_some_and(|at| at <= t)
            && let Some(pid) = self.arrival.pop()
        {
            pool.get_mut(pid).stage = Stage::Ready(0);
            self.ready.push_back(pid);
            events.push(TraceEvent::Transition {
                tick: t,
                pid,
                from: Stage::Arrival,
                to: Stage::Ready(0),
                detail: "from arrival to ready".to_owned(),
            });
        }

        // 2. Wake blocked (or decrement wait_time).
        if let Some(head) = self.blocked.front() {
            let process = pool.get_mut(head);
            if process.wait_time == 0 {
                process.stage = Stage::Ready(0);
                self.blocked.pop_front();
                self.ready.push_back(head);
                events.push(TraceEvent::Transition {
                    tick: t,
                    pid: head,
                    from: Stage::Waiting,
                    to: Stage::Ready(0),
                    detail: "from blocked to ready".to_owned(),
                });
            } else {
                process.wait_time -= 1;
            }
        }

        // 3. Dispatch and resolve references until a fault, exhaustion,
        // or the process finishes.
        if self.running.is_none()
            && let Some(pid) = self.ready.pop_front()
        {
            pool.get_mut(pid).stage = Stage::Running;
            self.running = Some(pid);

            loop {
                if pool.get(pid).references_exhausted() {
                    let freed = self.frame_table.clear_pid(pid);
                    events.push(TraceEvent::FramesFreed { tick: t, pid, frames: freed });
                    pool.get_mut(pid).stage = Stage::Terminated;
                    pool.remove(pid);
                    self.running = None;
                    break;
                }

                let entry_index = pool.get(pid).next_reference;
                let entry = *pool
                    .get(pid)
                    .page_table
                    .as_ref()
                    .unwrap_or_else(|| panic!("invariant violation: pid {pid} has no page table"))
                    .get(entry_index);

                if !entry.valid_bit {
                    break;
                }

                if self.frame_table.check_fault(entry.pid, entry.frame) {
                    pool.get_mut(pid)
                        .page_table
                        .as_mut()
                        .unwrap_or_else(|| panic!("invariant violation: pid {pid} has no page table"))
                        .get_mut(entry_index)
                        .valid_bit = false;
                    break;
                }

                events.push(TraceEvent::MemoryReference {
                    tick: t,
                    pid,
                    virtual_address: entry.virtual_address,
                    page: entry.page,
                    offset: entry.offset,
                    is_write: entry.dirty_bit,
                    placement: None,
                    frame: entry.frame,
                });

                let occupant = self
                    .frame_table
                    .occupant_at(entry.frame)
                    .unwrap_or_else(|| panic!("invariant violation: frame {} has no occupant on a hit", entry.frame));
                let landing = pool
                    .get_mut(occupant.pid)
                    .page_table
                    .as_mut()
                    .unwrap_or_else(|| panic!("invariant violation: pid {} has no page table", occupant.pid))
                    .get_mut(occupant.entry_index);
                landing.ref_bit = true;
                if entry.dirty_bit {
                    landing.dirty_bit = true;
                }

                pool.get_mut(pid).next_reference += 1;
            }

            // Fault handling: the loop above exits here only when the
            // current reference is non-resident (exhaustion/hit-to-done
            // already cleared `self.running`).
            if self.running == Some(pid) {
                let entry_index = pool.get(pid).next_reference;
                let mut entry = *pool
                    .get(pid)
                    .page_table
                    .as_ref()
                    .unwrap_or_else(|| panic!("invariant violation: pid {pid} has no page table"))
                    .get(entry_index);
                entry.ref_bit = true;
                pool.get_mut(pid)
                    .page_table
                    .as_mut()
                    .unwrap_or_else(|| panic!("invariant violation: pid {pid} has no page table"))
                    .get_mut(entry_index)
                    .ref_bit = true;

                let (frame, placement) = self.frame_table.find_open(pool, pid, entry_index);
                pool.get_mut(pid)
                    .page_table
                    .as_mut()
                    .unwrap_or_else(|| panic!("invariant violation: pid {pid} has no page table"))
                    .propagate_placement(entry.page, frame);

                let wait_time = if matches!(placement, crate::mmu::Placement::Dirty) {
                    self.miss_penalty + self.dirty_page_penalty
                } else {
                    self.miss_penalty
                };

                let process = pool.get_mut(pid);
                process.wait_time = wait_time;
                process.stage = Stage::Waiting;
                self.blocked.push_back(pid);
                self.running = None;

                events.push(TraceEvent::MemoryReference {
                    tick: t,
                    pid,
                    virtual_address: entry.virtual_address,
                    page: entry.page,
                    offset: entry.offset,
                    is_write: entry.dirty_bit,
                    placement: Some(placement),
                    frame,
                });
            }
        }

        for event in &events {
            event.log();
        }
        Ok(events)
    }

    /// Page size configured for this run (bytes per frame/page).
    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// The process currently in the running slot, if any.
    #[must_use]
    pub const fn running_pid(&self) -> Option<Pid> {
        self.running
    }
}
