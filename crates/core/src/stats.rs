//! Simulation statistics collection and reporting.
//!
//! Tracks the tick-budget invariant `t = cpu_ticks + idle_ticks +
//! context_switch_ticks` plus mode-specific counters, derived entirely
//! from the [`TraceEvent`](crate::trace::TraceEvent) stream each tick
//! produces.

use crate::mmu::Placement;
use crate::trace::TraceEvent;

/// Aggregate counters for one simulation run.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimStats {
    /// Total ticks the simulation ran for.
    pub ticks: u64,
    /// Ticks during which some process occupied the running slot.
    pub cpu_ticks: u64,
    /// Ticks where the CPU sat idle for want of ready work (not a
    /// context-switch stall).
    pub idle_ticks: u64,
    /// Ticks consumed by a context-switch stall.
    pub context_switch_ticks: u64,
    /// Processes that reached termination.
    pub processes_terminated: u64,
    /// Probability draws consumed from the oracle.
    pub probability_draws: u64,
    /// MLFB preemptions.
    pub preemptions: u64,
    /// MLFB demotions (quantum exhausted).
    pub demotions: u64,

    /// Memory references resolved as hits.
    pub page_hits: u64,
    /// Memory references placed in a previously-free frame.
    pub page_faults_free: u64,
    /// Memory references that evicted a clean page.
    pub page_faults_clean: u64,
    /// Memory references that evicted a dirty page.
    pub page_faults_dirty: u64,
    /// Frames reclaimed by `clear_pid` across the run.
    pub frames_freed: u64,
}

impl SimStats {
    /// Creates a zeroed stats accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ticks: 0,
            cpu_ticks: 0,
            idle_ticks: 0,
            context_switch_ticks: 0,
            processes_terminated: 0,
            probability_draws: 0,
            preemptions: 0,
            demotions: 0,
            page_hits: 0,
            page_faults_free: 0,
            page_faults_clean: 0,
            page_faults_dirty: 0,
            frames_freed: 0,
        }
    }

    /// Records the completion of one tick: advances `ticks` and
    /// classifies it as CPU-busy, context-switch-stalled, or idle, then
    /// folds in every event the tick produced.
    pub fn observe_tick(&mut self, running_before: bool, events: &[TraceEvent]) {
        self.ticks += 1;

        let stalled = events.iter().any(|e| matches!(e, TraceEvent::ContextSwitchStall { .. }));
        if running_before {
            self.cpu_ticks += 1;
        } else if stalled {
            self.context_switch_ticks += 1;
        } else {
            self.idle_ticks += 1;
        }

        for event in events {
            match event {
                TraceEvent::ProbabilityDraw { .. } => self.probability_draws += 1,
                TraceEvent::Transition { detail, .. } if detail == "finished" => {
                    self.processes_terminated += 1;
                }
                TraceEvent::Transition { detail, .. } if detail == "preempted" => {
                    self.preemptions += 1;
                }
                TraceEvent::Transition { detail, .. } if detail.starts_with("ending quantum") => {
                    self.demotions += 1;
                }
                TraceEvent::MemoryReference { placement, .. } => match placement {
                    None => self.page_hits += 1,
                    Some(Placement::Free) => self.page_faults_free += 1,
                    Some(Placement::Clean) => self.page_faults_clean += 1,
                    Some(Placement::Dirty) => self.page_faults_dirty += 1,
                },
                TraceEvent::FramesFreed { frames, .. } => {
                    self.frames_freed += frames.len() as u64;
                }
                _ => {}
            }
        }
    }

    /// Prints a summary report to stdout, in the style of a simulator's
    /// end-of-run statistics dump.
    pub fn print(&self) {
        println!("==========================================================");
        println!("SIMULATION STATISTICS");
        println!("==========================================================");
        println!("sim_ticks                {}", self.ticks);
        println!("cpu_ticks                {}", self.cpu_ticks);
        println!("idle_ticks               {}", self.idle_ticks);
        println!("context_switch_ticks     {}", self.context_switch_ticks);
        println!("processes_terminated     {}", self.processes_terminated);
        println!("probability_draws        {}", self.probability_draws);
        if self.preemptions > 0 || self.demotions > 0 {
            println!("----------------------------------------------------------");
            println!("preemptions              {}", self.preemptions);
            println!("demotions                {}", self.demotions);
        }
        if self.page_hits + self.page_faults_free + self.page_faults_clean + self.page_faults_dirty > 0 {
            println!("----------------------------------------------------------");
            println!("page_hits                {}", self.page_hits);
            println!("page_faults.free         {}", self.page_faults_free);
            println!("page_faults.clean        {}", self.page_faults_clean);
            println!("page_faults.dirty        {}", self.page_faults_dirty);
            println!("frames_freed             {}", self.frames_freed);
        }
        println!("==========================================================");
    }
}
