//! Scan statistics tracking.
//!
//! This module provides thread-safe statistics tracking for errors, warnings,
//! and informational events during scan processing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{ErrorType, InfoType, WarningType};

/// Thread-safe scan statistics tracker.
///
/// Tracks errors, warnings, and informational events using atomic counters,
/// allowing concurrent access from multiple scan tasks. All types are
/// initialized to zero on creation.
///
/// # Categories
///
/// - **Errors**: Failures inside analyzers or the scheduler
/// - **Warnings**: Missing optional data
/// - **Info**: Notable events (cache hits, fast-path exits)
pub struct ScanStats {
    errors: HashMap<ErrorType, AtomicUsize>,
    warnings: HashMap<WarningType, AtomicUsize>,
    info: HashMap<InfoType, AtomicUsize>,
}

impl ScanStats {
    pub fn new() -> Self {
        let mut errors = HashMap::new();
        for error in ErrorType::iter() {
            errors.insert(error, AtomicUsize::new(0));
        }

        let mut warnings = HashMap::new();
        for warning in WarningType::iter() {
            warnings.insert(warning, AtomicUsize::new(0));
        }

        let mut info = HashMap::new();
        for info_type in InfoType::iter() {
            info.insert(info_type, AtomicUsize::new(0));
        }

        ScanStats {
            errors,
            warnings,
            info,
        }
    }

    /// Increment an error counter.
    ///
    /// All error types are initialized in the constructor, so the lookup
    /// cannot fail for a properly constructed `ScanStats`.
    pub fn increment_error(&self, error: ErrorType) {
        if let Some(counter) = self.errors.get(&error) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment error counter for {:?} which is not in the map",
                error
            );
        }
    }

    /// Increment a warning counter.
    pub fn increment_warning(&self, warning: WarningType) {
        if let Some(counter) = self.warnings.get(&warning) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Increment an info counter.
    pub fn increment_info(&self, info: InfoType) {
        if let Some(counter) = self.info.get(&info) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Returns the current count for an error type.
    pub fn error_count(&self, error: ErrorType) -> usize {
        self.errors
            .get(&error)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Returns the current count for an info type.
    pub fn info_count(&self, info: InfoType) -> usize {
        self.info
            .get(&info)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Logs non-zero counters at the end of a batch run, grouped by category.
    pub fn print_summary(&self) {
        let mut any = false;
        for error in ErrorType::iter() {
            let count = self.error_count(error);
            if count > 0 {
                if !any {
                    log::info!("Error statistics:");
                    any = true;
                }
                log::info!("  {}: {}", error.as_str(), count);
            }
        }
        for warning in WarningType::iter() {
            if let Some(counter) = self.warnings.get(&warning) {
                let count = counter.load(Ordering::Relaxed);
                if count > 0 {
                    log::info!("  {}: {}", warning.as_str(), count);
                }
            }
        }
        for info in InfoType::iter() {
            let count = self.info_count(info);
            if count > 0 {
                log::info!("  {}: {}", info.as_str(), count);
            }
        }
        if !any {
            log::info!("No errors recorded");
        }
    }
}

impl Default for ScanStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let stats = ScanStats::new();
        assert_eq!(stats.error_count(ErrorType::ScanTimeout), 0);
        assert_eq!(stats.info_count(InfoType::CacheHit), 0);
    }

    #[test]
    fn test_increment_error() {
        let stats = ScanStats::new();
        stats.increment_error(ErrorType::TaskTimeout);
        stats.increment_error(ErrorType::TaskTimeout);
        assert_eq!(stats.error_count(ErrorType::TaskTimeout), 2);
        assert_eq!(stats.error_count(ErrorType::ScanTimeout), 0);
    }

    #[test]
    fn test_increment_info() {
        let stats = ScanStats::new();
        stats.increment_info(InfoType::FastPathExit);
        assert_eq!(stats.info_count(InfoType::FastPathExit), 1);
    }

    #[test]
    fn test_concurrent_increments() {
        use std::sync::Arc;
        let stats = Arc::new(ScanStats::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let stats = Arc::clone(&stats);
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    stats.increment_error(ErrorType::HeuristicsError);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(stats.error_count(ErrorType::HeuristicsError), 800);
    }
}
