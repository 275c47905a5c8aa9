//! Human-readable trace events (spec.md §6).
//!
//! Every state transition and probability draw produced by a tick is
//! collected into a [`TraceEvent`] rather than printed directly, so the
//! core crate never touches stdout (spec.md §9, "core never touches
//! files"): the CLI owns rendering, core only owns content.

use std::fmt;

use crate::common::{Pid, Tick};
use crate::mmu::Placement;
use crate::oracle::Draw;
use crate::process::Stage;

/// One observable event during a tick, in the order it was produced.
#[derive(Clone, Debug, PartialEq)]
pub enum TraceEvent {
    /// A snapshot of every queue's occupancy, emitted at the start of a
    /// tick (phase 1 of §4.2/§4.3).
    Snapshot {
        /// Tick this snapshot describes.
        tick: Tick,
        /// Process currently in the running slot, if any.
        running: Option<Pid>,
        /// Arrival queue contents, front to back.
        arrival: Vec<Pid>,
        /// Ready queue contents. One entry per priority level; FCFS has
        /// exactly one level.
        ready: Vec<Vec<Pid>>,
        /// Waiting queue contents, front to back.
        waiting: Vec<Pid>,
    },
    /// A process moved from one stage to another.
    Transition {
        /// Tick the transition occurred on.
        tick: Tick,
        /// The process that moved.
        pid: Pid,
        /// Stage moved out of.
        from: Stage,
        /// Stage moved into.
        to: Stage,
        /// Extra human-readable context (e.g. remaining time).
        detail: String,
    },
    /// The CPU sat idle for one tick because the context-switch stall
    /// had not yet drained.
    ContextSwitchStall {
        /// Tick the stall occurred on.
        tick: Tick,
    },
    /// One value was consumed from the probability oracle.
    ProbabilityDraw {
        /// Tick the draw occurred on.
        tick: Tick,
        /// The consumed draw.
        draw: Draw,
    },
    /// A virtual memory reference resolved, in memory-management mode.
    MemoryReference {
        /// Tick the reference resolved on.
        tick: Tick,
        /// Owning process.
        pid: Pid,
        /// The virtual address referenced.
        virtual_address: u64,
        /// Page number.
        page: u64,
        /// Byte offset within the page.
        offset: u64,
        /// Whether this was a write.
        is_write: bool,
        /// `None` for a hit; `Some` for a miss, classifying the eviction.
        placement: Option<Placement>,
        /// The frame the reference resolved into.
        frame: usize,
    },
    /// A process's frames were reclaimed after its reference trace was
    /// exhausted.
    FramesFreed {
        /// Tick the frames were freed on.
        tick: Tick,
        /// The process whose frames were freed.
        pid: Pid,
        /// Freed frame indices, ascending.
        frames: Vec<usize>,
    },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snapshot {
                tick,
                running,
                arrival,
                ready,
                waiting,
            } => {
                writeln!(f, "==========")?;
                writeln!(f, "Time; {tick}")?;
                match running {
                    Some(pid) => writeln!(f, "Running: {pid}")?,
                    None => writeln!(f, "Running: none")?,
                }
                write_queue_line(f, "Arrival", arrival)?;
                if ready.len() <= 1 {
                    write_queue_line(f, "Ready", ready.first().map_or(&[][..], Vec::as_slice))?;
                } else {
                    for (level, queue) in ready.iter().enumerate() {
                        write_queue_line(f, &format!("Ready[{level}]"), queue)?;
                    }
                }
                write_queue_line(f, "Waiting", waiting)?;
                write!(f, "==========")
            }
            Self::Transition {
                tick,
                pid,
                to,
                detail,
                ..
            } => {
                write!(
                    f,
                    "Time {tick}: Moving process {pid} to {}. {detail}",
                    stage_name(*to)
                )
            }
            Self::ContextSwitchStall { tick } => {
                write!(f, "Time {tick}: Undergoing context switch.")
            }
            Self::ProbabilityDraw { draw, .. } => {
                write!(
                    f,
                    "[Random number ({}): {}]\nProbability == {}",
                    draw.ordinal, draw.raw, draw.probability
                )
            }
            Self::MemoryReference {
                tick,
                pid,
                virtual_address,
                page,
                offset,
                is_write,
                placement,
                frame,
            } => {
                let kind = if *is_write { 'W' } else { 'R' };
                let label = placement.map_or("Hit", |p| match p {
                    Placement::Free => "Free",
                    Placement::Clean => "Clean",
                    Placement::Dirty => "Dirty",
                });
                write!(
                    f,
                    "Time {tick}: Process {pid} R/W: {kind}; VA: {virtual_address}; Page: {page}; Offset: {offset}; {label}; Frame: {frame}"
                )
            }
            Self::FramesFreed { tick, pid, frames } => {
                let joined = frames
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                write!(f, "Time {tick}: Process {pid} freeing frames: {joined}")
            }
        }
    }
}

impl TraceEvent {
    /// Emits this event to the `tracing` subscriber, in parallel with its
    /// `Display` rendering for the console trace (spec.md §6's "implementations
    /// MAY diverge in formatting" leaves room for a second, structured sink).
    ///
    /// Snapshots and transitions log at `debug`; probability draws and
    /// per-reference memory events log at `trace`, since they fire once per
    /// tick per process and would otherwise drown a `debug`-level run.
    pub fn log(&self) {
        match self {
            Self::Snapshot {
                tick,
                running,
                arrival,
                ready,
                waiting,
            } => {
                tracing::debug!(
                    tick = tick.raw(),
                    running = ?running,
                    arrival_len = arrival.len() as u64,
                    ready_len = ready.iter().map(Vec::len).sum::<usize>() as u64,
                    waiting_len = waiting.len() as u64,
                    "tick snapshot"
                );
            }
            Self::Transition { tick, pid, from, to, detail } => {
                tracing::debug!(
                    tick = tick.raw(),
                    pid = %pid,
                    from = ?from,
                    to = ?to,
                    detail = %detail,
                    "process transition"
                );
            }
            Self::ContextSwitchStall { tick } => {
                tracing::debug!(tick = tick.raw(), "context switch stall");
            }
            Self::ProbabilityDraw { tick, draw } => {
                tracing::trace!(
                    tick = tick.raw(),
                    ordinal = draw.ordinal as u64,
                    raw = draw.raw,
                    probability = draw.probability,
                    "probability draw consumed"
                );
            }
            Self::MemoryReference {
                tick,
                pid,
                virtual_address,
                page,
                offset,
                is_write,
                placement,
                frame,
            } => {
                tracing::trace!(
                    tick = tick.raw(),
                    pid = %pid,
                    virtual_address = *virtual_address,
                    page = *page,
                    offset = *offset,
                    is_write = *is_write,
                    placement = ?placement,
                    frame = *frame as u64,
                    "memory reference resolved"
                );
            }
            Self::FramesFreed { tick, pid, frames } => {
                tracing::debug!(tick = tick.raw(), pid = %pid, frames = ?frames, "frames freed");
            }
        }
    }
}

fn write_queue_line(f: &mut fmt::Formatter<'_>, label: &str, queue: &[Pid]) -> fmt::Result {
    if queue.is_empty() {
        writeln!(f, "{label}: none")
    } else {
        let joined = queue
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(f, "{label}: {joined}")
    }
}

const fn stage_name(stage: Stage) -> &'static str {
    match stage {
        Stage::Arrival => "arrival",
        Stage::Ready(_) => "ready",
        Stage::Running => "running",
        Stage::Waiting => "waiting",
        Stage::Terminated => "terminated",
    }
}
