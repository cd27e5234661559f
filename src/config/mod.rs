//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (pacing, retry budgets, directory roots)
//! - The library `Config` with documented defaults
//! - CLI option types and parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{
    Cli, Command, Config, CrawlArgs, Delays, LogFormat, LogLevel, RetryPolicy, Site, TaxonomyArgs,
};
