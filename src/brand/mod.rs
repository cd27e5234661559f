//! Brand/model joiner.
//!
//! Resolves a listing's free-text model name to a brand using a taxonomy
//! collected beforehand. Resolution runs an ordered list of
//! [`MatchStrategy`] values and returns the first hit; every strategy is a
//! pure function over `(query, index)`.
//!
//! Unmatched names resolve to an empty [`BrandMatch`], never an error.

mod loader;

use std::collections::HashMap;

pub use loader::{load_index, load_index_or_empty};

use crate::models::BrandMatch;

/// Lookup tables built from a taxonomy file.
#[derive(Debug, Clone, Default)]
pub struct BrandIndex {
    by_model: HashMap<String, BrandMatch>,
    by_brand: HashMap<String, BrandMatch>,
}

impl BrandIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model key for `brand`. The first entry for a key wins, and
    /// the brand name itself is indexed for token matching (without a model
    /// group).
    pub fn insert(&mut self, model_key: &str, brand: BrandMatch) {
        let key = model_key.trim();
        let brand_name = brand.brand_name.trim().to_string();
        if !brand_name.is_empty() {
            self.by_brand.entry(brand_name).or_insert_with(|| BrandMatch {
                model_group: String::new(),
                ..brand.clone()
            });
        }
        if !key.is_empty() {
            self.by_model.entry(key.to_string()).or_insert(brand);
        }
    }

    pub fn model(&self, key: &str) -> Option<&BrandMatch> {
        self.by_model.get(key)
    }

    pub fn brand(&self, name: &str) -> Option<&BrandMatch> {
        self.by_brand.get(name)
    }

    /// Number of model keys.
    pub fn len(&self) -> usize {
        self.by_model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_model.is_empty() && self.by_brand.is_empty()
    }
}

/// One resolution heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Full name equals a model key
    Exact,
    /// Drop the first whitespace token (a brand prefix) and match the rest
    StripLeadingToken,
    /// Match only the last whitespace token
    LastToken,
    /// Any token (split on whitespace and middle dots) equals a brand name
    BrandToken,
}

impl MatchStrategy {
    pub fn apply(&self, query: &str, index: &BrandIndex) -> Option<BrandMatch> {
        match self {
            MatchStrategy::Exact => exact(query, index),
            MatchStrategy::StripLeadingToken => strip_leading_token(query, index),
            MatchStrategy::LastToken => last_token(query, index),
            MatchStrategy::BrandToken => brand_token(query, index),
        }
    }
}

pub fn exact(query: &str, index: &BrandIndex) -> Option<BrandMatch> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    index.model(query).cloned()
}

pub fn strip_leading_token(query: &str, index: &BrandIndex) -> Option<BrandMatch> {
    let (_, rest) = query.trim().split_once(char::is_whitespace)?;
    exact(rest, index)
}

pub fn last_token(query: &str, index: &BrandIndex) -> Option<BrandMatch> {
    let query = query.trim();
    let (_, last) = query.rsplit_once(char::is_whitespace)?;
    exact(last, index)
}

pub fn brand_token(query: &str, index: &BrandIndex) -> Option<BrandMatch> {
    query
        .split(|c: char| c.is_whitespace() || c == '·' || c == '∙')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .find_map(|token| index.brand(token).cloned())
}

/// Taxonomy index plus the ordered strategies used against it.
#[derive(Debug, Clone)]
pub struct BrandJoiner {
    index: BrandIndex,
    strategies: Vec<MatchStrategy>,
}

impl BrandJoiner {
    pub fn new(index: BrandIndex, strategies: &[MatchStrategy]) -> Self {
        Self {
            index,
            strategies: strategies.to_vec(),
        }
    }

    /// A joiner that never matches (taxonomy unavailable).
    pub fn disabled() -> Self {
        Self::new(BrandIndex::new(), &[])
    }

    pub fn index(&self) -> &BrandIndex {
        &self.index
    }

    /// First strategy hit, or an empty pair.
    pub fn resolve(&self, model_name: &str) -> BrandMatch {
        self.strategies
            .iter()
            .find_map(|s| s.apply(model_name, &self.index))
            .unwrap_or_default()
    }
}
