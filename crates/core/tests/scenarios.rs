//! Boundary-scenario integration tests (spec.md §8).
//!
//! Each test below corresponds to one of the six numbered boundary
//! scenarios spec.md §8 calls out by name, driving a full
//! [`Simulator`] end to end rather than exercising a single tick-phase
//! helper in isolation.

use pretty_assertions::assert_eq;

use kernelsim_core::common::{Pid, Tick};
use kernelsim_core::mmu::{FrameTable, PageTable, PageTableEntry, Placement};
use kernelsim_core::{Fcfs, MemSim, Mlfb, Process, ProcessPool, ProbabilityOracle, Scheduler, Simulator};

fn run_cpu(pool: ProcessPool, scheduler: Scheduler, draws: Vec<i64>) -> Simulator {
    let mut simulator = Simulator::new_cpu(pool, scheduler, ProbabilityOracle::new(draws));
    let mut guard = 0;
    while !simulator.is_finished() {
        simulator.tick().expect("simulation should not exhaust its oracle");
        guard += 1;
        assert!(guard < 10_000, "simulation did not terminate");
    }
    simulator
}

/// Scenario 1: single FCFS process, no context switch, no waiting.
#[test]
fn single_fcfs_process_runs_uninterrupted() {
    let mut pool = ProcessPool::new();
    pool.insert(Process::new(Pid::new(1), Tick::ZERO, 5, 100));
    let mut fcfs = Fcfs::new(4, 0);
    fcfs.admit(Pid::new(1), Tick::ZERO);

    let simulator = run_cpu(pool, Scheduler::Fcfs(fcfs), vec![]);

    // `tick_count` reports the clock value for the *next* iteration (the
    // loop condition is only re-checked after `t <- t + 1`), so it reads
    // one past the tick during which termination actually happened (t=5).
    assert_eq!(simulator.tick_count(), Tick(6));
    assert_eq!(simulator.stats().processes_terminated, 1);
    assert_eq!(simulator.stats().cpu_ticks, 5);
    assert_eq!(simulator.stats().probability_draws, 0);
}

/// Scenario 2: FCFS burst ends at `b == avg_burst - 1` because the drawn
/// probability clears the `<= 1/3` threshold.
#[test]
fn fcfs_burst_ends_at_avg_burst_minus_one() {
    let mut pool = ProcessPool::new();
    pool.insert(Process::new(Pid::new(1), Tick::ZERO, 10, 3));
    let mut fcfs = Fcfs::new(4, 0);
    fcfs.admit(Pid::new(1), Tick::ZERO);

    // raw / 2^31 == 0.2 requires raw = 0.2 * 2^31 = 429_496_729.6; pick an
    // exact raw value just under the 1/3 threshold instead.
    let raw_below_third = 400_000_000_i64;
    let mut simulator = Simulator::new_cpu(
        pool,
        Scheduler::Fcfs(fcfs),
        ProbabilityOracle::new(vec![raw_below_third]),
    );

    // t=0: dispatch. t=1: burst_interval 1. t=2: burst_interval 2 == a-1, draw consumed, burst ends.
    simulator.tick().expect("t=0"); // dispatch
    simulator.tick().expect("t=1"); // burst_interval -> 1
    let events = simulator.tick().expect("t=2, draws probability"); // burst_interval -> 2 == a-1

    assert_eq!(simulator.stats().probability_draws, 1);
    let went_to_waiting = events.iter().any(|e| {
        matches!(
            e,
            kernelsim_core::TraceEvent::Transition {
                to: kernelsim_core::process::Stage::Waiting,
                ..
            }
        )
    });
    assert!(went_to_waiting, "process should enter waiting at b == avg_burst - 1");
}

/// Scenario 3: I/O delay round trip — a process enters waiting and returns
/// to ready exactly `io_delay` ticks later, once `io_wait` reaches
/// `io_delay - 1`.
///
/// Uses `avg_burst == 1` with a single draw `<= 1/2` so the burst ends on
/// the first running tick without needing a second draw before the test
/// stops (the process is not redispatched until after this test observes
/// the round trip, at which point the oracle would be exhausted on a
/// fresh `avg_burst == 1` decision — so the loop breaks the instant the
/// round trip is observed).
#[test]
fn io_delay_round_trip() {
    let mut pool = ProcessPool::new();
    pool.insert(Process::new(Pid::new(1), Tick::ZERO, 100, 1));
    let mut fcfs = Fcfs::new(4, 0);
    fcfs.admit(Pid::new(1), Tick::ZERO);

    let raw_at_or_below_half = 0_i64; // probability 0.0 <= 0.5
    let mut simulator = Simulator::new_cpu(
        pool,
        Scheduler::Fcfs(fcfs),
        ProbabilityOracle::new(vec![raw_at_or_below_half]),
    );

    let mut entered_waiting_at = None;
    let mut returned_to_ready_at = None;
    for _ in 0..20 {
        let tick = simulator.tick_count();
        let events = simulator.tick().expect("only one draw should ever be requested in this test");
        for event in &events {
            if let kernelsim_core::TraceEvent::Transition {
                to: kernelsim_core::process::Stage::Waiting,
                ..
            } = event
            {
                entered_waiting_at.get_or_insert(tick);
            }
            if let kernelsim_core::TraceEvent::Transition {
                to: kernelsim_core::process::Stage::Ready(_),
                from: kernelsim_core::process::Stage::Waiting,
                ..
            } = event
            {
                returned_to_ready_at.get_or_insert(tick);
            }
        }
        if returned_to_ready_at.is_some() {
            break;
        }
    }

    let entered = entered_waiting_at.expect("process enters waiting");
    let returned = returned_to_ready_at.expect("process returns to ready");
    assert_eq!(returned.raw() - entered.raw(), 4, "io_delay=4 round trip takes 4 ticks");
}

/// Scenario 4: MLFB demotion then aging-promotion.
///
/// Q=3, a CPU-bound process exhausts its priority-0 quantum (1 tick)
/// without ending its burst, demoting to priority 1 (quantum 2); it then
/// exhausts the priority-1 quantum too, demoting to priority 2 (quantum 4).
#[test]
fn mlfb_demotes_through_priority_levels_on_quantum_exhaustion() {
    let mut pool = ProcessPool::new();
    pool.insert(Process::new(Pid::new(1), Tick::ZERO, 100, 100));
    let mut mlfb = Mlfb::new(4, 0, 3);
    mlfb.admit(Pid::new(1), Tick::ZERO);

    let mut simulator = Simulator::new_cpu(pool, Scheduler::Mlfb(mlfb), ProbabilityOracle::new(vec![]));

    let mut demotions_seen = Vec::new();
    for _ in 0..20 {
        let events = simulator.tick().expect("avg_burst == total_cpu never needs a draw");
        for event in &events {
            if let kernelsim_core::TraceEvent::Transition {
                to: kernelsim_core::process::Stage::Ready(level),
                detail,
                ..
            } = event
                && detail.starts_with("ending quantum")
            {
                demotions_seen.push(*level);
            }
        }
        if demotions_seen.len() >= 2 {
            break;
        }
    }

    assert_eq!(demotions_seen, vec![1, 2], "demotes 0 -> 1 -> 2 in order");
    assert_eq!(simulator.stats().demotions, 2);
}

/// Scenario 5: clock replacement with one dirty, not-recently-referenced
/// frame among otherwise-referenced frames.
#[test]
fn clock_replacement_finds_dirty_frame_and_clears_ref_bits() {
    let mut pool = ProcessPool::new();
    let mut table = FrameTable::new(4);

    // Seed four resident single-reference processes, pids 10..13, one per frame.
    for (i, pid_raw) in (0..4u32).zip(10..14u32) {
        let dirty = i == 2;
        let entry = PageTableEntry::new(Pid::new(pid_raw), 0, 0, 0, dirty);
        pool.insert(Process::new_memory(Pid::new(pid_raw), PageTable::new(vec![entry])));
        let (frame, _) = table.find_open(&mut pool, Pid::new(pid_raw), 0);
        assert_eq!(frame, i as usize);
    }

    // ref_bit=1 on frames 0,1,3; frame 2 (dirty) left with ref_bit=0.
    for pid_raw in [10, 11, 13] {
        pool.get_mut(Pid::new(pid_raw))
            .page_table
            .as_mut()
            .expect("page table")
            .get_mut(0)
            .ref_bit = true;
    }

    let incoming_entry = PageTableEntry::new(Pid::new(20), 0, 0, 0, false);
    pool.insert(Process::new_memory(Pid::new(20), PageTable::new(vec![incoming_entry])));
    let (frame, placement) = table.find_open(&mut pool, Pid::new(20), 0);

    assert_eq!(frame, 2, "hand clears frames 0 and 1, then finds the dirty frame 2");
    assert_eq!(placement, Placement::Dirty);
    assert!(!pool.get(Pid::new(10)).page_table.as_ref().unwrap().get(0).ref_bit);
    assert!(!pool.get(Pid::new(11)).page_table.as_ref().unwrap().get(0).ref_bit);
}

/// Scenario 6: two references to the same page (aliased PTEs) resolve
/// the second one as a hit after the first's miss installs the page.
#[test]
fn aliased_references_share_one_placement() {
    let mut pool = ProcessPool::new();
    let entries = vec![
        PageTableEntry::new(Pid::new(1), 100, 0, 100, false),
        PageTableEntry::new(Pid::new(1), 100, 0, 100, false),
    ];
    pool.insert(Process::new_memory(Pid::new(1), PageTable::new(entries)));

    let mut memsim = MemSim::new(4, 256, 5, 2);
    memsim.admit(Pid::new(1), Tick::ZERO);

    let mut simulator = Simulator::new_mem(pool, memsim);

    // t=0: dispatch, reference 0 is a miss (not yet resident); process blocks.
    simulator.tick().expect("t=0");
    // Drain the miss penalty.
    for _ in 0..5 {
        simulator.tick().expect("draining miss penalty");
    }
    // Reference 1 is now resolvable in the same dispatch as a hit, because
    // `propagate_placement` already marked it resident.
    let events = simulator.tick().expect("resolve aliased reference");
    let hit = events.iter().any(|e| {
        matches!(
            e,
            kernelsim_core::TraceEvent::MemoryReference { placement: None, .. }
        )
    });
    assert!(hit, "second reference to the same page resolves as a hit, not a second miss");
}
