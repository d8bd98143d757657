//! Application initialization and resource setup.
//!
//! Builds the shared resources a scanning run needs: the logger and the
//! HTTP client. Initialization functions return proper error types rather
//! than panicking.

mod client;
mod logger;

pub use client::init_client;
pub use logger::init_logger_with;
