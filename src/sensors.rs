//! Host metrics: process uptime, memory and CPU temperature.
//!
//! Every reading is fallible; callers render `None` as "N/A".

use std::time::{Duration, Instant};

/// Process memory in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryUsage {
    pub resident_bytes: u64,
    pub heap_bytes: u64,
}

pub trait Sensors: Send + Sync {
    /// Time since the process started.
    fn uptime(&self) -> Duration;

    fn memory(&self) -> Option<MemoryUsage>;

    /// CPU temperature in degrees Celsius.
    fn cpu_temperature(&self) -> Option<f64>;
}

/// Reads /proc and /sys on Linux. Memory and temperature are `None` elsewhere.
pub struct SystemSensors {
    started: Instant,
}

impl SystemSensors {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemSensors {
    fn default() -> Self {
        Self::new()
    }
}

impl Sensors for SystemSensors {
    fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    fn memory(&self) -> Option<MemoryUsage> {
        #[cfg(target_os = "linux")]
        {
            match std::fs::read_to_string("/proc/self/status") {
                Ok(status) => parse_proc_status(&status),
                Err(e) => {
                    tracing::warn!("Failed to read process memory: {}", e);
                    None
                }
            }
        }

        #[cfg(not(target_os = "linux"))]
        {
            None
        }
    }

    fn cpu_temperature(&self) -> Option<f64> {
        #[cfg(target_os = "linux")]
        {
            match std::fs::read_to_string("/sys/class/thermal/thermal_zone0/temp") {
                Ok(raw) => parse_millidegrees(&raw),
                Err(e) => {
                    tracing::debug!("CPU temperature unavailable: {}", e);
                    None
                }
            }
        }

        #[cfg(not(target_os = "linux"))]
        {
            None
        }
    }
}

/// Extract `VmRSS` and `VmData` (both in kB) from /proc/self/status.
pub fn parse_proc_status(status: &str) -> Option<MemoryUsage> {
    let field = |name: &str| -> Option<u64> {
        let line = status.lines().find(|l| l.starts_with(name))?;
        let kb = line.split_whitespace().nth(1)?.parse::<u64>().ok()?;
        Some(kb * 1024)
    };

    Some(MemoryUsage {
        resident_bytes: field("VmRSS:")?,
        heap_bytes: field("VmData:")?,
    })
}

/// Thermal zones report millidegrees Celsius.
pub fn parse_millidegrees(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    Some((value / 100.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_proc_status_fields() {
        let status = "Name:\tlurkbot\nVmPeak:\t  20000 kB\nVmData:\t   2048 kB\nVmRSS:\t   1024 kB\n";
        let usage = parse_proc_status(status).unwrap();
        assert_eq!(usage.resident_bytes, 1024 * 1024);
        assert_eq!(usage.heap_bytes, 2048 * 1024);
    }

    #[test]
    fn missing_fields_mean_unavailable() {
        assert!(parse_proc_status("Name:\tlurkbot\n").is_none());
    }

    #[test]
    fn parses_thermal_zone() {
        assert_eq!(parse_millidegrees("48312\n"), Some(48.3));
        assert_eq!(parse_millidegrees("garbage"), None);
    }

    #[test]
    fn uptime_moves_forward() {
        let sensors = SystemSensors::new();
        let first = sensors.uptime();
        assert!(sensors.uptime() >= first);
    }
}
