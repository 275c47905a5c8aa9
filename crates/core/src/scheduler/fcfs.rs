//! First-come-first-served scheduling.

use crate::common::{Pid, SimError, Tick};
use crate::oracle::ProbabilityOracle;
use crate::process::{ProcessPool, Stage};
use crate::queue::{ArrivalQueue, ReadyQueue, WaitQueue};
use crate::trace::TraceEvent;

use super::{ContextSwitch, end_burst, requires_draw};

/// One ready queue, one waiting queue, one running slot, one arrival
/// queue.
#[derive(Debug, Default)]
pub struct Fcfs {
    arrival: ArrivalQueue,
    ready: ReadyQueue,
    waiting: WaitQueue,
    running: Option<Pid>,
    context_switch: ContextSwitch,
    io_delay: u64,
    context_switch_delay: u64,
}

impl Fcfs {
    /// Creates a new FCFS scheduler over an empty population.
    #[must_use]
    pub fn new(io_delay: u64, context_switch_delay: u64) -> Self {
        Self {
            io_delay,
            context_switch_delay,
            ..Self::default()
        }
    }

    /// Admits a process into the arrival queue.
    pub fn admit(&mut self, pid: Pid, arrival_time: Tick) {
        self.arrival.push(pid, arrival_time);
    }

    /// Whether every queue and the running slot are empty.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.arrival.is_empty()
            && self.ready.is_empty()
            && self.waiting.is_empty()
            && self.running.is_none()
    }

    /// The process currently in the running slot, if any.
    #[must_use]
    pub const fn running_pid(&self) -> Option<Pid> {
        self.running
    }

    /// Advances the scheduler by one tick: trace snapshot, admit
    /// arrivals, advance waiting, drain any context-switch stall, advance
    /// the running process, then dispatch.
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
            ready: vec![self.ready.pids()],
            waiting: self.waiting.pids(),
        });

        // 2. Admit arrivals.
        if self.arrival.peek_arrival_time() == Some(t)
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

        // 3. Advance waiting.
        if let Some(head) = self.waiting.front() {
            let process = pool.get_mut(head);
            if process.io_wait == self.io_delay - 1 {
                process.io_wait = 0;
                process.stage = Stage::Ready(0);
                self.waiting.pop_front();
                self.ready.push_back(head);
                events.push(TraceEvent::Transition {
                    tick: t,
                    pid: head,
                    from: Stage::Waiting,
                    to: Stage::Ready(0),
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
            let (time_left, burst_interval, avg_burst, total_cpu) = {
                let process = pool.get_mut(pid);
                process.time_left -= 1;
                process.burst_interval += 1;
                (
                    process.time_left,
                    process.burst_interval,
                    process.avg_burst,
                    process.total_cpu,
                )
            };

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
                if self.context_switch_delay > 0 {
                    self.context_switch.pending = true;
                }
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
                    process.stage = Stage::Waiting;
                    self.waiting.push_back(pid);
                    self.running = None;
                    events.push(TraceEvent::Transition {
                        tick: t,
                        pid,
                        from: Stage::Running,
                        to: Stage::Waiting,
                        detail: format!("ending burst ({burst_interval}); remaining time: {time_left}"),
                    });
                    if self.context_switch_delay > 0 {
                        self.context_switch.pending = true;
                    }
                }
            }
        }

        // 6. Dispatch.
        if self.running.is_none() && !self.context_switch.pending && let Some(pid) = self.ready.pop_front() {
            let process = pool.get_mut(pid);
            process.burst_interval = 0;
            process.stage = Stage::Running;
            let remaining = process.time_left;
            self.running = Some(pid);
            events.push(TraceEvent::Transition {
                tick: t,
                pid,
                from: Stage::Ready(0),
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
