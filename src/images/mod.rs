//! Image archiver.
//!
//! Finds photo URLs on a detail snapshot (structural regions first, then an
//! unscoped fallback, then a last-resort sweep) and saves each one once per
//! visit as `<code>_<n>.<ext>` under a date-partitioned directory.

mod archiver;
mod discover;

pub use archiver::{image_extension, ImageArchiver, ImageVisit};
pub use discover::{fallback_sources, region_sources, sweep_sources};
