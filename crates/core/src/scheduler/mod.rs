//! The two CPU scheduling policies behind one tagged enum, and the pure
//! burst-termination decision they share.

use crate::common::{Pid, SimError, Tick};
use crate::oracle::ProbabilityOracle;
use crate::process::ProcessPool;
use crate::trace::TraceEvent;

/// First-come-first-served scheduling.
pub mod fcfs;
/// Corbato-style multi-level feedback scheduling.
pub mod mlfb;

pub use fcfs::Fcfs;
pub use mlfb::Mlfb;

/// Whether [`end_burst`] needs a probability draw to decide, given the
/// current burst interval against the process's burst/total-cpu
/// parameters.
///
/// Checked before consuming from the oracle so that the two tick
/// functions never draw a probability they will not use: exhaustion is
/// fatal, so every draw must be load-bearing.
#[must_use]
pub const fn requires_draw(burst_interval: u64, avg_burst: u64, total_cpu: u64) -> bool {
    if burst_interval == total_cpu {
        return false;
    }
    burst_interval == avg_burst.saturating_sub(1) || burst_interval == avg_burst
}

/// Decides whether a CPU burst ends this tick.
///
/// Pure: the scheduler is responsible for consuming a draw from the
/// [`ProbabilityOracle`] beforehand (only when [`requires_draw`] says so)
/// and passing it in, keeping the probability cascade separate from
/// oracle consumption.
///
/// `avg_burst == 0` is a degenerate configuration rejected at load time
/// (see `config` module); this function treats it as "always end burst"
/// only to stay total, since loaders must never construct a process this
/// way in practice.
#[must_use]
pub fn end_burst(burst_interval: u64, avg_burst: u64, total_cpu: u64, draw: Option<f64>) -> bool {
    if burst_interval == total_cpu {
        return true;
    }
    if avg_burst == 0 {
        return true;
    }
    if burst_interval < avg_burst - 1 {
        return false;
    }
    if burst_interval == avg_burst - 1 {
        return draw.unwrap_or_else(|| unreachable!("end_burst needs a draw at b == avg_burst - 1")) <= 1.0 / 3.0;
    }
    if burst_interval == avg_burst {
        return draw.unwrap_or_else(|| unreachable!("end_burst needs a draw at b == avg_burst")) <= 0.5;
    }
    true
}

/// Shared per-tick bookkeeping the context-switch stall needs, common to
/// both policies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextSwitch {
    /// Set when a burst ends, a process terminates, or (MLFB only) a
    /// preemption/demotion fires and `context_switch_delay > 0`.
    pub pending: bool,
    /// Ticks elapsed since the stall began.
    pub idle_time: u64,
}

impl ContextSwitch {
    /// Drains one tick of an in-progress context-switch stall. Returns
    /// `true` if the stall consumed this tick (nothing else may enter
    /// running).
    pub fn drain(&mut self, running_is_empty: bool, context_switch_delay: u64) -> bool {
        if !(self.pending && running_is_empty) {
            return false;
        }
        self.idle_time += 1;
        if self.idle_time >= context_switch_delay {
            self.pending = false;
            self.idle_time = 0;
        }
        self.pending
    }
}

/// One of the two CPU scheduling policies, sharing a single `tick`
/// operation. A tagged variant rather than dynamic dispatch, since
/// exactly two policies exist and neither needs a plugin surface.
#[derive(Debug)]
pub enum Scheduler {
    /// First-come-first-served.
    Fcfs(Fcfs),
    /// Corbato-style multi-level feedback.
    Mlfb(Mlfb),
}

impl Scheduler {
    /// Advances the scheduler by one tick, consuming probability draws as
    /// needed and returning the trace events the tick produced.
    ///
    /// # Errors
    ///
    /// Returns an error if the probability oracle is exhausted mid-tick.
    pub fn tick(
        &mut self,
        t: Tick,
        pool: &mut ProcessPool,
        oracle: &mut ProbabilityOracle,
    ) -> Result<Vec<TraceEvent>, SimError> {
        match self {
            Self::Fcfs(fcfs) => fcfs.tick(t, pool, oracle),
            Self::Mlfb(mlfb) => mlfb.tick(t, pool, oracle),
        }
    }

    /// Whether the simulation has nothing left to do: every queue and
    /// the running slot are empty.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        match self {
            Self::Fcfs(fcfs) => fcfs.is_finished(),
            Self::Mlfb(mlfb) => mlfb.is_finished(),
        }
    }

    /// Admits a process into the arrival queue at load time.
    pub fn admit(&mut self, pid: Pid, arrival_time: Tick) {
        match self {
            Self::Fcfs(fcfs) => fcfs.admit(pid, arrival_time),
            Self::Mlfb(mlfb) => mlfb.admit(pid, arrival_time),
        }
    }
}
