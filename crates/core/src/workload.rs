//! Workload and probability-source file loaders.
//!
//! Every function here either succeeds with fully-formed [`Process`]
//! values or fails with a [`SimError`] before any tick runs; none of the
//! simulation engines touch the filesystem directly.

use std::fs;
use std::path::Path;

use crate::common::{Pid, SimError, Tick};
use crate::mmu::{PageTable, PageTableEntry};
use crate::process::Process;

/// Loads the CPU-mode process workload file: whitespace-separated
/// `pid arrival_time total_cpu avg_burst` per line.
///
/// # Errors
///
/// Returns [`SimError::WorkloadFileOpen`] if the file cannot be read, or
/// [`SimError::Workload`] for a malformed or out-of-range line.
pub fn load_processes(path: &Path) -> Result<Vec<Process>, SimError> {
    let contents = fs::read_to_string(path).map_err(|source| SimError::WorkloadFileOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let mut processes = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [pid, arrival_time, total_cpu, avg_burst] = fields.as_slice() else {
            return Err(SimError::Workload {
                path: path.to_path_buf(),
                line: line_no + 1,
                message: format!("expected 4 fields, got {}", fields.len()),
            });
        };

        let parse = |field: &str, name: &str| -> Result<u64, SimError> {
            field.parse().map_err(|_| SimError::Workload {
                path: path.to_path_buf(),
                line: line_no + 1,
                message: format!("{name} must be a non-negative integer, got {field:?}"),
            })
        };

        let pid = Pid::new(u32::try_from(parse(pid, "pid")?).map_err(|_| SimError::Workload {
            path: path.to_path_buf(),
            line: line_no + 1,
            message: "pid does not fit in u32".to_owned(),
        })?);
        let arrival_time = Tick(parse(arrival_time, "arrival_time")?);
        let total_cpu = parse(total_cpu, "total_cpu")?;
        let avg_burst = parse(avg_burst, "avg_burst")?;

        if avg_burst == 0 {
            return Err(SimError::Workload {
                path: path.to_path_buf(),
                line: line_no + 1,
                message: "avg_burst must be positive".to_owned(),
            });
        }

        processes.push(Process::new(pid, arrival_time, total_cpu, avg_burst));
    }

    processes.sort_by_key(|p| p.arrival_time);
    Ok(processes)
}

/// Loads the memory-management reference workload file: a leading
/// process count, then per process a blank-line-tolerant `pid` line, a
/// `numRefs` line, and that many `address kind` lines (`kind` ∈ {R, W}).
///
/// # Errors
///
/// Returns [`SimError::WorkloadFileOpen`] if the file cannot be read, or
/// [`SimError::Workload`] for a malformed record.
pub fn load_references(path: &Path, page_size: u64) -> Result<Vec<Process>, SimError> {
    let contents = fs::read_to_string(path).map_err(|source| SimError::WorkloadFileOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let mut lines = contents.lines().enumerate();
    let workload_err = |line_no: usize, message: String| SimError::Workload {
        path: path.to_path_buf(),
        line: line_no + 1,
        message,
    };

    let next_nonblank = |lines: &mut std::iter::Enumerate<std::str::Lines<'_>>| {
        loop {
            match lines.next() {
                Some((_, line)) if line.trim().is_empty() => continue,
                Some((line_no, line)) => return Some((line_no, line)),
                None => return None,
            }
        }
    };

    let (count_line_no, count_line) = next_nonblank(&mut lines).ok_or_else(|| workload_err(0, "empty reference file".to_owned()))?;
    let process_count: usize = count_line
        .trim()
        .parse()
        .map_err(|_| workload_err(count_line_no, format!("expected process count, got {count_line:?}")))?;

    let mut processes = Vec::with_capacity(process_count);

    for _ in 0..process_count {
        let (pid_line_no, pid_line) =
            next_nonblank(&mut lines).ok_or_else(|| workload_err(count_line_no, "expected pid line".to_owned()))?;
        let pid: u32 = pid_line
            .trim()
            .parse()
            .map_err(|_| workload_err(pid_line_no, format!("expected pid, got {pid_line:?}")))?;
        let pid = Pid::new(pid);

        let (num_refs_line_no, num_refs_line) =
            next_nonblank(&mut lines).ok_or_else(|| workload_err(pid_line_no, "expected numRefs line".to_owned()))?;
        let num_refs: usize = num_refs_line
            .trim()
            .parse()
            .map_err(|_| workload_err(num_refs_line_no, format!("expected numRefs, got {num_refs_line:?}")))?;

        let mut entries = Vec::with_capacity(num_refs);
        for _ in 0..num_refs {
            let (ref_line_no, ref_line) =
                lines.next().ok_or_else(|| workload_err(num_refs_line_no, "expected reference line".to_owned()))?;
            let Some((addr_str, kind_str)) = ref_line.trim().split_once(' ') else {
                return Err(workload_err(ref_line_no, format!("expected 'address kind', got {ref_line:?}")));
            };
            let virtual_address: u64 = addr_str
                .trim()
                .parse()
                .map_err(|_| workload_err(ref_line_no, format!("expected address, got {addr_str:?}")))?;
            let is_write = match kind_str.trim() {
                "W" => true,
                "R" => false,
                other => return Err(workload_err(ref_line_no, format!("expected R or W, got {other:?}"))),
            };

            entries.push(PageTableEntry::new(
                pid,
                virtual_address,
                virtual_address / page_size,
                virtual_address % page_size,
                is_write,
            ));
        }

        processes.push(Process::new_memory(pid, PageTable::new(entries)));
    }

    Ok(processes)
}

/// Loads the probability source file: one non-negative integer per line.
///
/// # Errors
///
/// Returns [`SimError::WorkloadFileOpen`] if the file cannot be read, or
/// [`SimError::Workload`] for a non-integer line.
pub fn load_probability_source(path: &Path) -> Result<Vec<i64>, SimError> {
    let contents = fs::read_to_string(path).map_err(|source| SimError::WorkloadFileOpen {
        path: path.to_path_buf(),
        source,
    })?;

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(line_no, line)| {
            line.trim().parse().map_err(|_| SimError::Workload {
                path: path.to_path_buf(),
                line: line_no + 1,
                message: format!("expected a non-negative integer, got {line:?}"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        write!(file, "{contents}").expect("write");
        file
    }

    #[test]
    fn loads_and_sorts_processes_by_arrival() {
        let file = write_temp("2 5 10 3\n1 0 8 2\n");
        let processes = load_processes(file.path()).expect("parses");
        assert_eq!(processes.len(), 2);
        assert_eq!(processes[0].pid, Pid::new(1));
        assert_eq!(processes[1].pid, Pid::new(2));
    }

    #[test]
    fn rejects_zero_avg_burst() {
        let file = write_temp("1 0 8 0\n");
        let err = load_processes(file.path()).expect_err("must reject");
        assert!(matches!(err, SimError::Workload { .. }));
    }

    #[test]
    fn loads_reference_file_with_blank_line_framing() {
        let file = write_temp("1\n\n7\n2\n100 R\n356 W\n");
        let processes = load_references(file.path(), 256).expect("parses");
        assert_eq!(processes.len(), 1);
        let table = processes[0].page_table.as_ref().expect("page table");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).page, 0);
        assert_eq!(table.get(1).page, 1);
        assert!(table.get(1).dirty_bit);
        assert!(!table.get(0).dirty_bit);
    }

    #[test]
    fn loads_probability_source() {
        let file = write_temp("10\n20\n30\n");
        let draws = load_probability_source(file.path()).expect("parses");
        assert_eq!(draws, vec![10, 20, 30]);
    }
}
