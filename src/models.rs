//! Records produced by a crawl.
//!
//! A [`ListingItem`] is created once per unique canonical URL on the listing
//! page and never changes afterwards. A [`DetailRecord`] carries the same
//! sequence number, so the list and detail CSVs join row-for-row.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};

use crate::config::{DATE_FORMAT, MINUTE_FORMAT};
use crate::site::ColumnKeys;

/// One output record: column name to cell value.
///
/// Sinks write the columns they are configured with and ignore the rest.
pub type Row = BTreeMap<String, String>;

/// Collection timestamps written to every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamps {
    /// `YYYYMMDD`
    pub date: String,
    /// `YYYYMMDDHHMM`
    pub minute: String,
}

impl Timestamps {
    /// Timestamps for the current local time.
    pub fn now() -> Self {
        Self::at(Local::now())
    }

    /// Timestamps for a fixed instant.
    pub fn at(instant: DateTime<Local>) -> Self {
        Self {
            date: instant.format(DATE_FORMAT).to_string(),
            minute: instant.format(MINUTE_FORMAT).to_string(),
        }
    }
}

/// Brand resolved for a free-text model name. Every field is empty when
/// nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandMatch {
    pub brand_id: String,
    pub brand_name: String,
    /// Model group the key was listed under (empty for brand-level matches)
    pub model_group: String,
}

impl BrandMatch {
    pub fn is_empty(&self) -> bool {
        self.brand_id.is_empty() && self.brand_name.is_empty()
    }
}

/// One card discovered on a listing page.
#[derive(Debug, Clone)]
pub struct ListingItem {
    /// 1-based, assigned in discovery order, shared across partitions
    pub sn: usize,
    /// Detail URL without query string (deduplication key)
    pub detail_url: String,
    /// Site item code (URL tail or extracted id)
    pub code: String,
    /// Partition label the card was found under (empty when unpartitioned)
    pub partition: String,
    /// Brand resolved once at creation
    pub brand: BrandMatch,
    /// Fields read from the card, keyed by output column
    pub card: Row,
    pub collected: Timestamps,
}

impl ListingItem {
    /// Card field by column name, or `""`.
    pub fn field(&self, column: &str) -> &str {
        self.card.get(column).map(String::as_str).unwrap_or("")
    }

    /// Flattens the item into a sink row using the profile's column names.
    pub fn to_row(&self, keys: &ColumnKeys) -> Row {
        let mut row = self.card.clone();
        row.insert(keys.sn.to_string(), self.sn.to_string());
        row.insert(keys.code.to_string(), self.code.clone());
        row.insert(keys.detail_url.to_string(), self.detail_url.clone());
        if let Some(brand_id) = keys.brand_id {
            row.insert(brand_id.to_string(), self.brand.brand_id.clone());
        }
        row.insert(keys.brand_name.to_string(), self.brand.brand_name.clone());
        if let Some(group) = keys.model_group {
            row.insert(group.to_string(), self.brand.model_group.clone());
        }
        row.insert(keys.partition.to_string(), self.partition.clone());
        row.insert(keys.date.to_string(), self.collected.date.clone());
        row.insert(keys.minute.to_string(), self.collected.minute.clone());
        row
    }
}

/// How a detail row came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailOutcome {
    /// An attempt reached the core-field threshold
    Filled,
    /// Pages loaded but no attempt reached the threshold; best attempt kept
    Underfilled,
    /// Every attempt failed; row derived from the listing only
    Exhausted,
    /// Not visited because of the profile's skip rule
    Skipped,
}

impl DetailOutcome {
    /// Whether the detail page was actually read.
    pub fn is_success(&self) -> bool {
        matches!(self, DetailOutcome::Filled | DetailOutcome::Underfilled)
    }
}

/// One detail row, keyed by the same sequence number as its listing item.
#[derive(Debug, Clone)]
pub struct DetailRecord {
    pub sn: usize,
    pub code: String,
    pub fields: Row,
    pub outcome: DetailOutcome,
    /// Images written during the visit
    pub images_saved: usize,
}

impl DetailRecord {
    /// Field by column name, or `""`.
    pub fn field(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }
}

/// Back-fills blank `columns` of `detail` from `listing`.
///
/// Detail values take precedence; the listing is the floor. Returns the
/// number of cells that were filled.
pub fn merge_fallback(detail: &mut Row, listing: &Row, columns: &[&str]) -> usize {
    let mut filled = 0;
    for column in columns {
        let blank = detail
            .get(*column)
            .map(|v| v.trim().is_empty())
            .unwrap_or(true);
        if !blank {
            continue;
        }
        if let Some(value) = listing.get(*column).map(|v| v.trim()) {
            if !value.is_empty() {
                detail.insert(column.to_string(), value.to_string());
                filled += 1;
            }
        }
    }
    filled
}

/// Replaces every blank cell of `columns` with `sentinel`.
pub fn apply_sentinel(row: &mut Row, columns: &[&str], sentinel: &str) {
    for column in columns {
        let entry = row.entry(column.to_string()).or_default();
        if entry.trim().is_empty() {
            *entry = sentinel.to_string();
        }
    }
}
