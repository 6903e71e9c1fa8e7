// [apps/worker-node/src/hardware.rs]
/*!
 * Hardware telemetry sampled for each `HEARTBEAT` frame (spec.md §4.1:
 * `{cpuUsage, memoryUsage, activeJobs}`). Grounded in the teacher's
 * `HardwareMonitor` (`apps/miner-worker/src/cpu_manager.rs`): same
 * `/proc/loadavg` and `/proc/meminfo` reads, collapsed from the teacher's
 * thermal-telemetry struct to the two percentages the wire protocol wants.
 */

use std::fs;

#[derive(Debug, Clone, Copy)]
pub struct HardwareSample {
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

pub struct HardwareMonitor;

impl HardwareMonitor {
    pub fn sample() -> HardwareSample {
        HardwareSample {
            cpu_percent: Self::cpu_percent(),
            memory_percent: Self::memory_percent(),
        }
    }

    /// Approximates CPU utilization from the 1-minute load average relative
    /// to the number of logical cores. VMs without `/proc/loadavg` read 0.0.
    fn cpu_percent() -> f64 {
        let load_average = fs::read_to_string("/proc/loadavg")
            .ok()
            .and_then(|content| content.split_whitespace().next().map(str::to_string))
            .and_then(|value| value.parse::<f64>().ok())
            .unwrap_or(0.0);

        let cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1) as f64;
        (load_average / cores * 100.0).min(100.0)
    }

    fn memory_percent() -> f64 {
        let Ok(meminfo) = fs::read_to_string("/proc/meminfo") else {
            return 0.0;
        };

        let mut total_kb = 0u64;
        let mut available_kb = 0u64;
        for line in meminfo.lines() {
            if line.starts_with("MemTotal:") {
                total_kb = Self::parse_kb(line);
            } else if line.starts_with("MemAvailable:") {
                available_kb = Self::parse_kb(line);
            }
        }

        if total_kb == 0 {
            return 0.0;
        }
        let used_kb = total_kb.saturating_sub(available_kb);
        (used_kb as f64 / total_kb as f64 * 100.0).min(100.0)
    }

    fn parse_kb(line: &str) -> u64 {
        line.split_whitespace().nth(1).and_then(|value| value.parse::<u64>().ok()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kb_reads_the_second_whitespace_field() {
        assert_eq!(HardwareMonitor::parse_kb("MemTotal:       16384000 kB"), 16384000);
        assert_eq!(HardwareMonitor::parse_kb("garbage line"), 0);
    }

    #[test]
    fn sample_never_exceeds_one_hundred_percent() {
        let sample = HardwareMonitor::sample();
        assert!(sample.cpu_percent <= 100.0);
        assert!(sample.memory_percent <= 100.0);
    }
}
