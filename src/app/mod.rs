//! Main application modules.
//!
//! This module provides URL helpers for item identity and image sources,
//! progress logging, and the end-of-run statistics used by the crawl.

pub mod logging;
pub mod statistics;
pub mod url;

// Re-export public API
pub use logging::{log_detail_progress, log_list_progress};
pub use statistics::{detail_success_summary, print_error_statistics, print_run_summary};
pub use url::{canonical_url, fill_template, path_tail, resolve_src};
