//! Property-based checks of spec.md §8's two testable invariants:
//! the CPU tick-budget partition, and MLFB's priority/quantum bounds.

use proptest::prelude::*;

use kernelsim_core::common::{Pid, Tick};
use kernelsim_core::process::{Process, ProcessPool, Stage};
use kernelsim_core::scheduler::Mlfb;
use kernelsim_core::trace::TraceEvent;
use kernelsim_core::{Fcfs, ProbabilityOracle, Scheduler, Simulator};

/// One process's generation parameters, kept small so runs terminate in a
/// bounded tick count without relying on a guard loop to mask a hang.
fn process_strategy() -> impl Strategy<Value = (u64, u64, u64)> {
    (0u64..5, 1u64..20, 1u64..10)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// `ticks == cpu_ticks + idle_ticks + context_switch_ticks` for every
    /// FCFS run, regardless of population or draw sequence.
    #[test]
    fn fcfs_tick_budget_invariant(
        procs in prop::collection::vec(process_strategy(), 1..4),
        io_delay in 1u64..4,
        context_switch_delay in 0u64..2,
        draws in prop::collection::vec(0i64..i32::MAX as i64, 256),
    ) {
        // `ArrivalQueue::push` requires ascending arrival times (debug_assert
        // in queue.rs), so admit in arrival order rather than generation order.
        let mut sorted = procs.clone();
        sorted.sort_by_key(|&(arrival, _, _)| arrival);

        let mut pool = ProcessPool::new();
        let mut fcfs = Fcfs::new(io_delay, context_switch_delay);
        for (i, (arrival, total_cpu, avg_burst)) in sorted.iter().enumerate() {
            let pid = Pid::new(i as u32 + 1);
            pool.insert(Process::new(pid, Tick(*arrival), *total_cpu, *avg_burst));
            fcfs.admit(pid, Tick(*arrival));
        }

        let mut simulator = Simulator::new_cpu(pool, Scheduler::Fcfs(fcfs), ProbabilityOracle::new(draws));

        let mut guard = 0;
        while !simulator.is_finished() {
            if simulator.tick().is_err() {
                // Oracle exhaustion is a population/draw-count mismatch, not
                // an invariant violation; the partition still holds for
                // every tick actually observed, so just stop early.
                break;
            }
            guard += 1;
            prop_assert!(guard < 5_000, "simulation did not terminate");
        }

        let stats = simulator.stats();
        prop_assert_eq!(
            stats.ticks,
            stats.cpu_ticks + stats.idle_ticks + stats.context_switch_ticks
        );
    }

    /// Every MLFB process's `priority_level` stays within `[0, Q)` and
    /// `guaranteed_time` within `[0, 2^Q]`, tick after tick, for any
    /// quantum-exhaustion-only workload (no draws needed since
    /// `avg_burst == total_cpu` never ends a burst early).
    #[test]
    fn mlfb_priority_and_quantum_stay_in_bounds(
        total_cpu in 1u64..64,
        queue_count in 1usize..6,
    ) {
        let mut pool = ProcessPool::new();
        let pid = Pid::new(1);
        pool.insert(Process::new(pid, Tick::ZERO, total_cpu, total_cpu));
        let mut mlfb = Mlfb::new(4, 0, queue_count);
        mlfb.admit(pid, Tick::ZERO);

        let mut oracle = ProbabilityOracle::new(vec![]);
        let mut t = Tick::ZERO;
        let mut terminated = false;
        let mut guard = 0;

        while !mlfb.is_finished() {
            let events = match mlfb.tick(t, &mut pool, &mut oracle) {
                Ok(events) => events,
                Err(_) => break,
            };
            terminated |= events.iter().any(|e| {
                matches!(
                    e,
                    TraceEvent::Transition { to: Stage::Terminated, .. }
                )
            });
            if !terminated {
                let process = pool.get(pid);
                prop_assert!((process.priority_level as usize) < queue_count);
                prop_assert!(process.guaranteed_time <= 1u64 << queue_count);
            }
            t = t.next();
            guard += 1;
            prop_assert!(guard < 5_000, "simulation did not terminate");
        }
    }
}
