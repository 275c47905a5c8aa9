//! Configuration file parsing.
//!
//! Both the CPU-scheduler and memory-management configuration files share
//! the same line-oriented `key=value` shape, matched case-insensitively:
//! a strict superset of case-sensitive matching, and one parser serves
//! both config kinds.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::SimError;

/// Configuration for either CPU scheduling policy.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Path to the process workload file.
    pub process_file: PathBuf,
    /// I/O delay in ticks; must be `>= 1`.
    pub io_delay: u64,
    /// Context-switch stall length in ticks.
    pub context_switch_delay: u64,
    /// Number of MLFB priority queues, `Q`. `None` selects FCFS.
    pub ctss_queues: Option<usize>,
    /// Verbose debug output.
    pub debug: bool,
}

/// Configuration for the paging MMU / memory-management mode.
#[derive(Clone, Debug)]
pub struct MmuConfig {
    /// Path to the reference workload file.
    pub reference_file: PathBuf,
    /// Ticks charged on any page fault.
    pub miss_penalty: u64,
    /// Additional ticks charged when the evicted page was dirty.
    pub dirty_page_penalty: u64,
    /// Bytes per page.
    pub page_size: u64,
    /// Virtual address width in bits.
    pub va_bits: u32,
    /// Physical address width in bits.
    pub pa_bits: u32,
    /// Verbose debug output.
    pub debug: bool,
}

impl MmuConfig {
    /// Number of physical frames: `2^pa_bits / page_size`.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is zero; the loader rejects this before a
    /// `MmuConfig` is ever constructed.
    #[must_use]
    pub fn num_frames(&self) -> usize {
        ((1u64 << self.pa_bits) / self.page_size) as usize
    }
}

/// Reads a `key=value` file into a case-insensitively keyed map.
///
/// Keys are lowercased; values are taken verbatim (not trimmed), matching
/// the original tool's `substr` split on the first `=`.
fn read_key_value_file(path: &Path) -> Result<HashMap<String, String>, SimError> {
    let contents = fs::read_to_string(path).map_err(|source| SimError::ConfigFileOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let mut map = HashMap::new();
    for (line_no, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(SimError::Configuration {
                path: path.to_path_buf(),
                line: line_no + 1,
                message: format!("expected key=value, got {line:?}"),
            });
        };
        map.insert(key.to_lowercase(), value.to_owned());
    }
    Ok(map)
}

fn required<'a>(
    map: &'a HashMap<String, String>,
    path: &Path,
    key: &str,
) -> Result<&'a str, SimError> {
    map.get(key).map(String::as_str).ok_or_else(|| SimError::Configuration {
        path: path.to_path_buf(),
        line: 0,
        message: format!("missing required key {key:?}"),
    })
}

fn parse_u64(path: &Path, key: &str, raw: &str) -> Result<u64, SimError> {
    raw.trim().parse().map_err(|_| SimError::Configuration {
        path: path.to_path_buf(),
        line: 0,
        message: format!("key {key:?} must be a non-negative integer, got {raw:?}"),
    })
}

fn parse_u32(path: &Path, key: &str, raw: &str) -> Result<u32, SimError> {
    raw.trim().parse().map_err(|_| SimError::Configuration {
        path: path.to_path_buf(),
        line: 0,
        message: format!("key {key:?} must be a non-negative integer, got {raw:?}"),
    })
}

fn parse_bool(path: &Path, key: &str, raw: &str) -> Result<bool, SimError> {
    let trimmed = raw.trim();
    match trimmed {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => match trimmed.chars().next() {
            Some('f' | 'F') => Ok(false),
            Some('t' | 'T') => Ok(true),
            _ => Err(SimError::Configuration {
                path: path.to_path_buf(),
                line: 0,
                message: format!("key {key:?} must be a boolean (0/1/t/f), got {raw:?}"),
            }),
        },
    }
}

/// Loads a CPU-scheduler configuration file.
///
/// `ctss_queues` selects MLFB when present: `CTSSQueues` is an MLFB-only
/// key, so its absence means FCFS.
///
/// # Errors
///
/// Returns [`SimError::ConfigFileOpen`] if the file cannot be read, or
/// [`SimError::Configuration`] for a missing/malformed key.
pub fn load_scheduler_config(path: &Path) -> Result<SchedulerConfig, SimError> {
    let map = read_key_value_file(path)?;

    let process_file = PathBuf::from(required(&map, path, "processfile")?);
    let io_delay = parse_u64(path, "iodelay", required(&map, path, "iodelay")?)?;
    let context_switch_delay =
        parse_u64(path, "contextswitchdelay", required(&map, path, "contextswitchdelay")?)?;
    let ctss_queues = match map.get("ctssqueues") {
        Some(raw) => {
            let q = parse_u64(path, "ctssqueues", raw)?;
            if q == 0 {
                return Err(SimError::Configuration {
                    path: path.to_path_buf(),
                    line: 0,
                    message: "CTSSQueues must be positive".to_owned(),
                });
            }
            Some(q as usize)
        }
        None => None,
    };
    let debug = match map.get("debug") {
        Some(raw) => parse_bool(path, "debug", raw)?,
        None => false,
    };

    Ok(SchedulerConfig {
        process_file,
        io_delay,
        context_switch_delay,
        ctss_queues,
        debug,
    })
}

/// Loads a memory-management configuration file.
///
/// # Errors
///
/// Returns [`SimError::ConfigFileOpen`] if the file cannot be read, or
/// [`SimError::Configuration`] for a missing/malformed key, including a
/// `pagesize` of zero.
pub fn load_mmu_config(path: &Path) -> Result<MmuConfig, SimError> {
    let map = read_key_value_file(path)?;

    let reference_file = PathBuf::from(required(&map, path, "referencefile")?);
    let miss_penalty = parse_u64(path, "misspenalty", required(&map, path, "misspenalty")?)?;
    let dirty_page_penalty =
        parse_u64(path, "dirtypagepenalty", required(&map, path, "dirtypagepenalty")?)?;
    let page_size = parse_u64(path, "pagesize", required(&map, path, "pagesize")?)?;
    if page_size == 0 {
        return Err(SimError::Configuration {
            path: path.to_path_buf(),
            line: 0,
            message: "pageSize must be positive".to_owned(),
        });
    }
    let va_bits = parse_u32(path, "vabits", required(&map, path, "vabits")?)?;
    let pa_bits = parse_u32(path, "pabits", required(&map, path, "pabits")?)?;
    let debug = match map.get("debug") {
        Some(raw) => parse_bool(path, "debug", raw)?,
        None => false,
    };

    Ok(MmuConfig {
        reference_file,
        miss_penalty,
        dirty_page_penalty,
        page_size,
        va_bits,
        pa_bits,
        debug,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        write!(file, "{contents}").expect("write");
        file
    }

    #[test]
    fn loads_fcfs_scheduler_config() {
        let file = write_temp("ProcessFile=procs.txt\nIOdelay=4\nContextSwitchDelay=1\nDebug=0\n");
        let config = load_scheduler_config(file.path()).expect("parses");
        assert_eq!(config.process_file, PathBuf::from("procs.txt"));
        assert_eq!(config.io_delay, 4);
        assert_eq!(config.context_switch_delay, 1);
        assert_eq!(config.ctss_queues, None);
        assert!(!config.debug);
    }

    #[test]
    fn loads_mlfb_scheduler_config_case_insensitively() {
        let file = write_temp("processfile=procs.txt\niodelay=4\ncontextswitchdelay=1\nctssqueues=3\ndebug=True\n");
        let config = load_scheduler_config(file.path()).expect("parses");
        assert_eq!(config.ctss_queues, Some(3));
        assert!(config.debug);
    }

    #[test]
    fn rejects_zero_ctss_queues() {
        let file = write_temp("ProcessFile=p.txt\nIOdelay=1\nContextSwitchDelay=0\nCTSSQueues=0\n");
        let err = load_scheduler_config(file.path()).expect_err("must reject");
        assert!(matches!(err, SimError::Configuration { .. }));
    }

    #[test]
    fn loads_mmu_config() {
        let file = write_temp(
            "referenceFile=refs.txt\nmissPenalty=5\ndirtyPagePenalty=2\npageSize=256\nVAbits=16\nPAbits=12\n",
        );
        let config = load_mmu_config(file.path()).expect("parses");
        assert_eq!(config.num_frames(), (1u64 << 12) as usize / 256);
    }

    #[test]
    fn rejects_zero_page_size() {
        let file = write_temp("referenceFile=r.txt\nmissPenalty=1\ndirtyPagePenalty=1\npageSize=0\nVAbits=8\nPAbits=8\n");
        let err = load_mmu_config(file.path()).expect_err("must reject");
        assert!(matches!(err, SimError::Configuration { .. }));
    }

    #[test]
    fn missing_file_reports_open_error() {
        let err = load_scheduler_config(Path::new("/nonexistent/path.txt")).expect_err("must fail");
        assert!(matches!(err, SimError::ConfigFileOpen { .. }));
    }

    #[rstest]
    #[case("0", Some(false))]
    #[case("1", Some(true))]
    #[case("t", Some(true))]
    #[case("T", Some(true))]
    #[case("true", Some(true))]
    #[case("f", Some(false))]
    #[case("F", Some(false))]
    #[case("false", Some(false))]
    #[case("maybe", None)]
    fn parse_bool_covers_every_accepted_spelling(#[case] raw: &str, #[case] expected: Option<bool>) {
        let result = parse_bool(Path::new("debug.cfg"), "debug", raw);
        match expected {
            Some(value) => assert_eq!(result.expect("must parse"), value),
            None => assert!(matches!(result, Err(SimError::Configuration { .. }))),
        }
    }
}
