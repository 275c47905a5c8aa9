//! Kernel scheduler / paging-MMU simulator CLI.
//!
//! This binary provides a single entry point for both simulation modes
//! described in spec.md §2:
//! 1. **`cpu`**: the FCFS or MLFB process scheduler (spec.md §4.2/§4.3).
//! 2. **`mem`**: the paging MMU memory-management tick loop (spec.md §4.5).
//!
//! The CLI owns everything spec.md §1 calls out as external to THE CORE:
//! parsing the configuration/workload/probability-source files, console
//! trace formatting, and the top-level run loop. `kernelsim-core` never
//! touches a file or stdout.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kernelsim_core::config::{load_mmu_config, load_scheduler_config};
use kernelsim_core::workload::{load_probability_source, load_processes, load_references};
use kernelsim_core::{Fcfs, Mlfb, ProcessPool, Scheduler};
use kernelsim_core::{MemSim, SimError, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "ksim",
    author,
    version,
    about = "Discrete-event simulator of an OS process scheduler and paging MMU",
    long_about = "Runs a process-scheduling simulation (FCFS or MLFB) or a paging-MMU \
memory-management simulation over a workload and configuration file, printing a \
cycle-by-cycle trace and a final statistics summary.\n\nExamples:\n  ksim cpu --mode fcfs --config scheduling.txt --random random-numbers.txt\n  ksim cpu --mode mlfb --config scheduling.txt --random random-numbers.txt\n  ksim mem --config memmanagement.txt"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Which CPU scheduling policy to run (spec.md §2).
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Mode {
    /// First-come-first-served, probabilistic burst termination.
    Fcfs,
    /// Corbato-style multi-level feedback scheduler.
    Mlfb,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the process scheduler (FCFS or MLFB).
    Cpu {
        /// Scheduling policy. Must agree with whether the config file sets
        /// `CTSSQueues` (present selects MLFB, absent selects FCFS).
        #[arg(long, value_enum)]
        mode: Mode,

        /// Path to the scheduler configuration file (spec.md §6).
        #[arg(long)]
        config: PathBuf,

        /// Path to the probability source file (spec.md §4.1/§6): one
        /// non-negative integer per line.
        #[arg(long)]
        random: PathBuf,

        /// Enables verbose structured logging regardless of the config
        /// file's `Debug` key.
        #[arg(long)]
        debug: bool,
    },

    /// Run the paging-MMU memory-management simulation.
    Mem {
        /// Path to the memory-management configuration file (spec.md §6).
        #[arg(long)]
        config: PathBuf,

        /// Enables verbose structured logging regardless of the config
        /// file's `Debug` key.
        #[arg(long)]
        debug: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Cpu {
            mode,
            config,
            random,
            debug,
        } => cmd_cpu(mode, &config, &random, debug),
        Commands::Mem { config, debug } => cmd_mem(&config, debug),
    };

    if let Err(err) = result {
        eprintln!("ksim: {err}");
        process::exit(exit_code(&err));
    }
}

/// Maps a [`SimError`] onto the exit codes spec.md §6 partially specifies:
/// 0 on success (handled by `main` falling off the end), 1 on any file-open
/// failure, 2 for every other configuration/workload/runtime error
/// (spec.md §6 leaves non-1 codes implementation-defined; see DESIGN.md).
const fn exit_code(err: &SimError) -> i32 {
    match err {
        SimError::ConfigFileOpen { .. } | SimError::WorkloadFileOpen { .. } => 1,
        SimError::Configuration { .. }
        | SimError::Workload { .. }
        | SimError::OracleExhausted { .. }
        | SimError::Invariant(_) => 2,
    }
}

/// Initializes the `tracing` subscriber. `force_debug` raises the default
/// filter to `debug` regardless of `RUST_LOG`, mirroring the `--debug` CLI
/// flag overriding the config file's `Debug` key (spec.md §6).
fn init_tracing(force_debug: bool) {
    let default_level = if force_debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Runs the process-scheduling simulation (spec.md §4.2/§4.3) to
/// completion, printing the trace and final statistics.
///
/// # Errors
///
/// Returns an error on a bad config/workload file, or if the probability
/// oracle is exhausted mid-run (spec.md §4.1, §7).
fn cmd_cpu(mode: Mode, config_path: &std::path::Path, random_path: &std::path::Path, debug: bool) -> Result<(), SimError> {
    let config = load_scheduler_config(config_path)?;
    init_tracing(debug || config.debug);

    let is_mlfb = matches!(mode, Mode::Mlfb);
    if is_mlfb != config.ctss_queues.is_some() {
        return Err(SimError::Configuration {
            path: config_path.to_path_buf(),
            line: 0,
            message: "--mode does not agree with whether CTSSQueues is set".to_owned(),
        });
    }

    let processes = load_processes(&config.process_file)?;
    let draws = load_probability_source(random_path)?;
    let oracle = kernelsim_core::ProbabilityOracle::new(draws);

    let mut scheduler = match config.ctss_queues {
        Some(queues) => Scheduler::Mlfb(Mlfb::new(config.io_delay, config.context_switch_delay, queues)),
        None => Scheduler::Fcfs(Fcfs::new(config.io_delay, config.context_switch_delay)),
    };

    let mut pool = ProcessPool::new();
    for process in processes {
        let pid = process.pid;
        let arrival_time = process.arrival_time;
        pool.insert(process);
        scheduler.admit(pid, arrival_time);
    }

    tracing::info!(mode = ?mode, io_delay = config.io_delay, context_switch_delay = config.context_switch_delay, "starting CPU simulation");

    let mut simulator = Simulator::new_cpu(pool, scheduler, oracle);
    run_to_completion(&mut simulator)?;

    simulator.stats().print();
    Ok(())
}

/// Runs the memory-management simulation (spec.md §4.5) to completion,
/// printing the trace and final statistics.
///
/// # Errors
///
/// Returns an error on a bad config/workload file.
fn cmd_mem(config_path: &std::path::Path, debug: bool) -> Result<(), SimError> {
    let config = load_mmu_config(config_path)?;
    init_tracing(debug || config.debug);

    let processes = load_references(&config.reference_file, config.page_size)?;
    let num_frames = config.num_frames();

    tracing::info!(
        num_frames,
        page_size = config.page_size,
        miss_penalty = config.miss_penalty,
        dirty_page_penalty = config.dirty_page_penalty,
        "starting memory-management simulation"
    );

    let mut memsim = MemSim::new(num_frames, config.page_size, config.miss_penalty, config.dirty_page_penalty);
    let mut pool = ProcessPool::new();
    for process in processes {
        let pid = process.pid;
        let arrival_time = process.arrival_time;
        pool.insert(process);
        memsim.admit(pid, arrival_time);
    }

    let mut simulator = Simulator::new_mem(pool, memsim);
    run_to_completion(&mut simulator)?;

    simulator.stats().print();
    Ok(())
}

/// Drives a [`Simulator`] one tick at a time until it reports finished,
/// printing every trace event as it is produced (spec.md §6: "for every
/// state transition, a line identifying t, pid, source stage, destination
/// stage").
fn run_to_completion(simulator: &mut Simulator) -> Result<(), SimError> {
    while !simulator.is_finished() {
        let events = simulator.tick()?;
        for event in &events {
            println!("{event}");
        }
    }
    Ok(())
}
