//! Aggregate timing and throughput metrics across scans.

use std::time::Duration;

/// Measurements from one completed scan.
#[derive(Debug, Clone, Copy)]
pub struct ScanTimingMetrics {
    pub scan_time: Duration,
    pub bytes_downloaded: u64,
    pub confidence: f64,
}

/// Diagnostics snapshot over all scans so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceReport {
    pub scans: usize,
    pub avg_scan_time: Duration,
    /// Bytes per second, across all scan wall-clock time.
    pub avg_bandwidth: f64,
    /// Fraction of scans that reached a confident verdict (>= 0.6).
    pub accuracy_estimate: f64,
}

/// Confidence at or above which a scan counts as decisively resolved.
const CONFIDENT_VERDICT_THRESHOLD: f64 = 0.6;

/// Running totals behind [`PerformanceReport`].
#[derive(Debug, Default)]
pub struct TimingStats {
    scans: usize,
    total_time: Duration,
    total_bytes: u64,
    confident_scans: usize,
}

impl TimingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, metrics: ScanTimingMetrics) {
        self.scans += 1;
        self.total_time += metrics.scan_time;
        self.total_bytes += metrics.bytes_downloaded;
        if metrics.confidence >= CONFIDENT_VERDICT_THRESHOLD {
            self.confident_scans += 1;
        }
    }

    pub fn report(&self) -> PerformanceReport {
        if self.scans == 0 {
            return PerformanceReport {
                scans: 0,
                avg_scan_time: Duration::ZERO,
                avg_bandwidth: 0.0,
                accuracy_estimate: 0.0,
            };
        }
        let seconds = self.total_time.as_secs_f64();
        PerformanceReport {
            scans: self.scans,
            avg_scan_time: self.total_time / self.scans as u32,
            avg_bandwidth: if seconds > 0.0 {
                self.total_bytes as f64 / seconds
            } else {
                0.0
            },
            accuracy_estimate: self.confident_scans as f64 / self.scans as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats_report_is_zeroed() {
        let report = TimingStats::new().report();
        assert_eq!(report.scans, 0);
        assert_eq!(report.avg_scan_time, Duration::ZERO);
        assert_eq!(report.avg_bandwidth, 0.0);
        assert_eq!(report.accuracy_estimate, 0.0);
    }

    #[test]
    fn test_averages_over_multiple_scans() {
        let mut stats = TimingStats::new();
        stats.record(ScanTimingMetrics {
            scan_time: Duration::from_secs(1),
            bytes_downloaded: 1000,
            confidence: 0.9,
        });
        stats.record(ScanTimingMetrics {
            scan_time: Duration::from_secs(3),
            bytes_downloaded: 3000,
            confidence: 0.3,
        });
        let report = stats.report();
        assert_eq!(report.scans, 2);
        assert_eq!(report.avg_scan_time, Duration::from_secs(2));
        assert!((report.avg_bandwidth - 1000.0).abs() < 1e-9);
        assert!((report.accuracy_estimate - 0.5).abs() < 1e-9);
    }
}
