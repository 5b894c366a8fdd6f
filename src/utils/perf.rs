//! Process memory statistics for post-run reporting.
//!
//! Reads resident-set sizes from /proc/self/status, which is the reliable
//! source for per-process memory on Linux. Other platforms compile but
//! report zeros.

/// Resident-set sizes in kilobytes as reported by the kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// VmRSS: the current resident set.
    pub current_kb: u64,
    /// VmPeak: the high-water mark of the virtual memory size.
    pub peak_kb: u64,
}

/// Samples the process memory statistics.
///
/// Returns zeros if /proc/self/status cannot be read or a field is missing.
#[cfg(target_os = "linux")]
pub fn memory_stats() -> MemoryStats {
    let status = match std::fs::read_to_string("/proc/self/status") {
        Ok(content) => content,
        Err(_) => return MemoryStats::default(),
    };

    let mut stats = MemoryStats::default();
    for line in status.lines() {
        let field = |prefix: &str| {
            line.strip_prefix(prefix)
                .and_then(|rest| rest.split_whitespace().next())
                .and_then(|value| value.parse().ok())
        };
        if let Some(value) = field("VmRSS:") {
            stats.current_kb = value;
        }
        if let Some(value) = field("VmPeak:") {
            stats.peak_kb = value;
        }
    }
    stats
}

/// A dummy implementation for non-Linux platforms to ensure the code compiles.
#[cfg(not(target_os = "linux"))]
pub fn memory_stats() -> MemoryStats {
    use std::sync::Once;
    static WARN_ONCE: Once = Once::new();
    WARN_ONCE.call_once(|| {
        log::warn!("process memory statistics are only supported on Linux; reporting zeros");
    });
    MemoryStats::default()
}
