//! Common utilities shared by the driver binaries.
//!
//! - **`perf`**: platform-specific process memory statistics, logged by the
//!   binaries after a run for experimental bookkeeping.

pub mod perf;
