//! Shared helpers.
//!
//! - Threshold-based attempt tracking
//! - CSS selector parsing and snapshot text extraction
//! - Whitespace and label normalisation

mod retry;
mod selector;
mod text;

pub use retry::{AttemptOutcome, AttemptTracker};
pub use selector::{node_lines, node_text, select_all, select_texts};
pub use text::{normalize_label, remove_whitespace};
