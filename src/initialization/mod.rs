//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logger (console, or console plus run log file)
//! - HTTP client (image downloads, taxonomy API)
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;

// Re-export public API
pub use client::init_client;
pub use logger::{init_logger_to_file, init_logger_with};
