//! Corbato-style multi-level feedback scheduling.

use crate::common::{Pid, SimError, Tick};
use crate::oracle::ProbabilityOracle;
use crate::process::{ProcessPool, Stage};
use crate::queue::{ArrivalQueue, ReadyQueue, WaitQueue};
use crate::trace::TraceEvent;

use super::{ContextSwitch, end_burst, requires_draw};

/// `Q` ready queues indexed by priority level, one waiting queue, one
/// running slot, one arrival queue.
#[derive(Debug)]
pub struct Mlfb {
    arrival: ArrivalQueue,
    ready: Vec<ReadyQueue>,
    waiting: WaitQueue,
    running: Option<Pid>,
    context_switch: ContextSwitch,
    io_delay: u64,
    context_switch_delay: u64,
}

impl Mlfb {
    /// Creates a new MLFB scheduler with `queue_count` priority levels.
    #[must_use]
    pub fn new(io_delay: u64, context_switch_delay: u64, queue_count: usize) -> Self {
        Self {
            arrival: ArrivalQueue::new(),
            ready: (0..queue_count).map(|_| ReadyQueue::new()).collect(),
            waiting: WaitQueue::new(),
            running: None,
            context_switch: ContextSwitch::default(),
            io_delay,
            context_switch_delay,
        }
    }

    /// Number of priority levels, `Q`.
    #[must_use]
    pub fn queue_count(&self) -> usize {
        self.ready.len()
    }

    /// Admits a process into the arrival queue.
    pub fn admit(&mut self, pid: Pid, arrival_time: Tick) {
        self.arrival.push(pid, arrival_time);
    }

    /// Whether every queue and the running slot are empty.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.arrival.is_empty()
            && self.ready.iter().all(ReadyQueue::is_empty)
            && self.waiting.is_empty()
            && self.running.is_none()
    }

    /// The process currently in the running slot, if any.
    #[must_use]
    pub const fn running_pid(&self) -> Option<Pid> {
        self.running
    }

    /// Index of the lowest-numbered (highest-priority) nonempty ready
    /// queue, if any.
    fn highest_occupied(&self) -> Option<usize> {
        self.ready.iter().position(|q| !q.is_empty())
    }

    /// Advances the scheduler by one tick: trace snapshot, admit
    /// arrivals, advance waiting, drain any context-switch stall, advance
    /// the running process through the priority-ordered termination /
    /// aging / preemption / demotion rules, then dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OracleExhausted`] if a burst-termination draw
    /// is required but the oracle has no more values.
    pub fn tick(
        &mut self,
        t: Tick,
        pool: &mut ProcessPool,
        oracle: &mut ProbabilityOracle,
    ) -> Result<Vec<TraceEvent>, SimError> {
        let mut events = Vec::new();

        // 1. Trace snapshot.
        events.push(TraceEvent::Snapshot {
            tick: t,
            running: self.running,
            arrival: self.arrival.pids(),
            ready: self.ready.iter().map(ReadyQueue::pids).collect(),
            waiting: self.waiting.pids(),
        });

        // 2. Admit arrivals, always into R[0].
        if self.arrival.peek_arrival_time() == Some(t)
            && let Some(pid) = self.arrival.pop()
        {
            pool.get_mut(pid).stage = Stage::Ready(0);
            self.ready[0].push_back(pid);
            events.push(TraceEvent::Transition {
                tick: t,
                pid,
                from: Stage::Arrival,
                to: Stage::Ready(0),
                detail: "from arrival to ready".to_owned(),
            });
        }

        // 3. Advance waiting.
        if let Some(head) = self.waiting.front() {
            let process = pool.get_mut(head);
            if process.io_wait == self.io_delay - 1 {
                process.io_wait = 0;
                process.burst_interval = 0;
                process.guaranteed_time = 1u64 << process.priority_level;
                let level = process.priority_level as usize;
                process.stage = Stage::Ready(level);
                self.waiting.pop_front();
                self.ready[level].push_back(head);
                events.push(TraceEvent::Transition {
                    tick: t,
                    pid: head,
                    from: Stage::Waiting,
                    to: Stage::Ready(level),
                    detail: "from waiting to ready".to_owned(),
                });
            } else {
                process.io_wait += 1;
            }
        }

        // 4. Drain context switch.
        if self
            .context_switch
            .drain(self.running.is_none(), self.context_switch_delay)
        {
            events.push(TraceEvent::ContextSwitchStall { tick: t });
        }

        // 5. Advance running.
        if let Some(pid) = self.running {
            let highest_occupied = self.highest_occupied();
            let quantum = pool.get(pid).quantum();

            let (time_left, burst_interval, avg_burst, total_cpu, guaranteed_time, priority_level) = {
                let process = pool.get_mut(pid);
                process.guaranteed_time = process.guaranteed_time.saturating_sub(1);
                process.time_left -= 1;
                process.burst_interval += 1;
                (
                    process.time_left,
                    process.burst_interval,
                    process.avg_burst,
                    process.total_cpu,
                    process.guaranteed_time,
                    process.priority_level,
                )
            };

            let mut fired = false;

            if time_left == 0 {
                pool.get_mut(pid).stage = Stage::Terminated;
                pool.remove(pid);
                self.running = None;
                events.push(TraceEvent::Transition {
                    tick: t,
                    pid,
                    from: Stage::Running,
                    to: Stage::Terminated,
                    detail: "finished".to_owned(),
                });
                fired = true;
            } else {
                let draw = if requires_draw(burst_interval, avg_burst, total_cpu) {
                    let draw = oracle.next_probability()?;
                    events.push(TraceEvent::ProbabilityDraw { tick: t, draw });
                    Some(draw.probability)
                } else {
                    None
                };

                if end_burst(burst_interval, avg_burst, total_cpu, draw) {
                    let process = pool.get_mut(pid);
                    // Saturating on purpose: burst_interval < guaranteed_time must read as
                    // "well within the guarantee" (demote-eligible), not wrap to a huge gap.
                    if priority_level != 0 && burst_interval.saturating_sub(guaranteed_time) <= quantum / 2 {
                        process.priority_level -= 1;
                    }
                    process.stage = Stage::Waiting;
                    self.waiting.push_back(pid);
                    self.running = None;
                    events.push(TraceEvent::Transition {
                        tick: t,
                        pid,
                        from: Stage::Running,
                        to: Stage::Waiting,
                        detail: format!("ending burst; remaining time: {time_left}"),
                    });
                    fired = true;
                } else if highest_occupied.is_some_and(|p| p < priority_level as usize) {
                    let process = pool.get_mut(pid);
                    process.stage = Stage::Ready(priority_level as usize);
                    self.ready[priority_level as usize].push_front(pid);
                    self.running = None;
                    events.push(TraceEvent::Transition {
                        tick: t,
                        pid,
                        from: Stage::Running,
                        to: Stage::Ready(priority_level as usize),
                        detail: "preempted".to_owned(),
                    });
                    fired = true;
                } else if guaranteed_time == 0 {
                    let process = pool.get_mut(pid);
                    if (process.priority_level as usize) < self.queue_count() - 1 {
                        process.priority_level += 1;
                    }
                    process.guaranteed_time = 1u64 << process.priority_level;
                    process.stage = Stage::Ready(process.priority_level as usize);
                    let level = process.priority_level as usize;
                    self.ready[level].push_back(pid);
                    self.running = None;
                    events.push(TraceEvent::Transition {
                        tick: t,
                        pid,
                        from: Stage::Running,
                        to: Stage::Ready(level),
                        detail: format!("ending quantum; remaining time: {time_left}"),
                    });
                    fired = true;
                }
            }

            if fired && self.context_switch_delay > 0 {
                self.context_switch.pending = true;
            }
        }

        // 6. Dispatch.
        if self.running.is_none()
            && !self.context_switch.pending
            && let Some(level) = self.highest_occupied()
            && let Some(pid) = self.ready[level].pop_front()
        {
            pool.get_mut(pid).stage = Stage::Running;
            self.running = Some(pid);
            let remaining = pool.get(pid).time_left;
            events.push(TraceEvent::Transition {
                tick: t,
                pid,
                from: Stage::Ready(level),
                to: Stage::Running,
                detail: format!("remaining time: {remaining}"),
            });
        }

        for event in &events {
            event.log();
        }
        Ok(events)
    }
}
