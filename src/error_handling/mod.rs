//! Error handling and statistics.
//!
//! Subsystem error enums (`thiserror`), error categorization, and
//! thread-safe per-run counters.

mod stats;
mod types;

pub use stats::ScanStats;
pub use types::{ErrorType, FetchError, InfoType, InitializationError, WarningType};
