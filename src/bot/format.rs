//! Reply formatting helpers.

use crate::sensors::MemoryUsage;

/// `mm:ss` from milliseconds. Minutes are not wrapped into hours.
pub fn format_time(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    format!("{:02}:{:02}", minutes, seconds)
}

/// `HH:MM:SS` from seconds.
pub fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

pub fn format_memory(usage: Option<MemoryUsage>) -> String {
    match usage {
        Some(m) => format!(
            "{:.2} MB RSS, {:.2} MB Heap",
            megabytes(m.resident_bytes),
            megabytes(m.heap_bytes)
        ),
        None => "N/A".to_string(),
    }
}
