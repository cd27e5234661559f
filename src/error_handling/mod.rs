//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error types returned at the crate's seams (initialization, browser, sink, taxonomy)
//! - Processing statistics tracking (errors, warnings, info metrics)
//! - Retry strategies for navigation and API requests
//!
//! Counted categories are:
//! - **Errors**: Failures that cost an item (or the run) data
//! - **Warnings**: Degraded conditions the crawl recovered from
//! - **Info**: Informational metrics (reloads, fallback fills, saved images)

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{api_retry_strategy, navigation_retry_strategy};
pub use stats::ProcessingStats;
pub use types::{
    BrowserError, ErrorType, ImageError, InfoType, InitializationError, SinkError, TaxonomyError,
    WarningType,
};
