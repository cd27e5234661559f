//! Brand/model taxonomy collection.
//!
//! Builds the table the brand joiner reads, either from a JSON API or by
//! walking a listing page's brand filter panel in the browser. Both write the
//! file in one go and leave a previous file untouched when nothing was
//! collected.

mod api;
mod panel;

use std::path::PathBuf;

pub use api::{collect_taxonomy, HEYDEALER_CAR_META_API, TAXONOMY_COLUMNS};
pub use panel::{collect_panel_taxonomy, split_last_paren, PANEL_TAXONOMY_COLUMNS};

/// What a taxonomy run collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyReport {
    pub brands: usize,
    pub model_groups: usize,
    /// Rows written
    pub models: usize,
    /// Brands or model groups that could not be read and were skipped
    pub skipped_requests: usize,
    pub path: PathBuf,
}
