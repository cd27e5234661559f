//! Listing and detail stages.
//!
//! [`ListingCollector`] and [`DetailExtractor`] drive a
//! [`PageDriver`](crate::browser::PageDriver); everything they read off the
//! page goes through the pure functions in [`rules`].

mod detail;
mod listing;
pub mod rules;

pub use detail::{DetailExtractor, DetailSummary};
pub use listing::ListingCollector;
pub use rules::{
    apply_label_rules, count_filled, extract_card, extract_detail, harvest_cards, label_pairs,
    partition_labels, CardSnapshot, ItemResolver,
};
