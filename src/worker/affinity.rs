//! CPU affinity for worker threads
//!
//! Workers can be pinned to specific cores so a benchmark run is not disturbed by
//! the scheduler migrating threads between rounds. Pinning is done on Linux through
//! `sched_setaffinity`; other platforms report an error and the caller carries on
//! unpinned.
//!
//! # Example
//!
//! ```no_run
//! use saxpulse::worker::affinity::{parse_cpu_list, set_cpu_affinity};
//!
//! let cores = parse_cpu_list("0,2-3").unwrap();
//! set_cpu_affinity(&cores[..1]).unwrap();
//! ```

use crate::Result;
use anyhow::Context;

/// Highest core id representable in a `cpu_set_t`
const MAX_CORE_ID: usize = 1023;

/// Bind the calling thread to the given cores
#[cfg(target_os = "linux")]
pub fn set_cpu_affinity(cores: &[usize]) -> Result<()> {
    use libc::{cpu_set_t, sched_setaffinity, CPU_SET, CPU_ZERO};
    use std::mem;

    if cores.is_empty() {
        anyhow::bail!("CPU core list cannot be empty");
    }
    if let Some(&bad) = cores.iter().find(|&&c| c > MAX_CORE_ID) {
        anyhow::bail!("CPU core ID {} is too large (max {})", bad, MAX_CORE_ID);
    }

    // SAFETY: cpu_set_t is plain data; zeroed is its empty state, and every core id
    // was bounds-checked above.
    let result = unsafe {
        let mut set: cpu_set_t = mem::zeroed();
        CPU_ZERO(&mut set);
        for &core in cores {
            CPU_SET(core, &mut set);
        }
        sched_setaffinity(0, mem::size_of::<cpu_set_t>(), &set)
    };

    if result != 0 {
        return Err(std::io::Error::last_os_error())
            .with_context(|| format!("Failed to set CPU affinity to cores {:?}", cores));
    }

    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn set_cpu_affinity(_cores: &[usize]) -> Result<()> {
    anyhow::bail!("CPU affinity is only supported on Linux")
}

/// Parse a core list such as `"0,2-4,7"` into sorted, de-duplicated core ids
pub fn parse_cpu_list(spec: &str) -> Result<Vec<usize>> {
    let parse_core = |s: &str| -> Result<usize> {
        s.trim()
            .parse()
            .with_context(|| format!("Invalid CPU core number: '{}'", s.trim()))
    };

    let mut cores = Vec::new();
    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((lo, hi)) => {
                if hi.contains('-') {
                    anyhow::bail!("Invalid CPU range format: {}", part);
                }
                let (lo, hi) = (parse_core(lo)?, parse_core(hi)?);
                if lo > hi {
                    anyhow::bail!("Invalid CPU range: start ({}) > end ({})", lo, hi);
                }
                cores.extend(lo..=hi);
            }
            None => cores.push(parse_core(part)?),
        }
    }

    if cores.is_empty() {
        anyhow::bail!("CPU core list cannot be empty");
    }

    cores.sort_unstable();
    cores.dedup();
    Ok(cores)
}

/// Number of logical CPUs on this machine
pub fn num_cpus() -> usize {
    num_cpus::get()
}

/// Log a warning when more worker threads than CPUs are requested
///
/// Returns true if the machine is oversubscribed.
pub fn warn_if_oversubscribed(thread_count: usize) -> bool {
    let cpu_count = num_cpus();
    if thread_count > cpu_count {
        log::warn!(
            "Thread count ({}) exceeds CPU count ({}); timings will include context switching",
            thread_count,
            cpu_count
        );
        true
    } else {
        false
    }
}
