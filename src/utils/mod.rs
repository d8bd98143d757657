//! Shared utilities.

mod timing;

pub use timing::{PerformanceReport, ScanTimingMetrics, TimingStats};
