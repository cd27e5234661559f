//! Declarative site profiles.
//!
//! A [`SiteProfile`] holds everything that differs between marketplaces:
//! listing selectors and item identity, the card field table, the detail
//! label table and label rules, image regions, output column orders and the
//! taxonomy layout. The collectors read a profile and never name a selector
//! themselves.

mod heydealer;
mod reborncar;

use std::time::Duration;

use regex::Regex;

pub use heydealer::HEYDEALER;
pub use reborncar::REBORNCAR;

use crate::brand::MatchStrategy;
use crate::config::Site;
use crate::utils::normalize_label;

/// Returns the built-in profile for `site`.
pub fn profile(site: Site) -> &'static SiteProfile {
    match site {
        Site::Heydealer => &HEYDEALER,
        Site::Reborncar => &REBORNCAR,
    }
}

/// Names of the columns the pipeline itself fills in.
#[derive(Debug, Clone, Copy)]
pub struct ColumnKeys {
    pub sn: &'static str,
    pub code: &'static str,
    pub detail_url: &'static str,
    pub brand_id: Option<&'static str>,
    pub brand_name: &'static str,
    pub partition: &'static str,
    pub date: &'static str,
    pub minute: &'static str,
    /// Card column holding the free-text model name used for the brand join
    pub model_name: &'static str,
    /// Column receiving the matched model group, when the taxonomy has one
    pub model_group: Option<&'static str>,
}

/// The site's brand filter panel: brands, each expanding into model groups,
/// each expanding into models.
#[derive(Debug, Clone, Copy)]
pub struct FilterPanelTaxonomy {
    /// One element per brand
    pub brand: &'static str,
    /// Brand name, inside a brand element
    pub brand_name: &'static str,
    /// Control expanding a brand, inside a brand element
    pub brand_toggle: &'static str,
    /// One element per model group, inside a brand element
    pub group: &'static str,
    /// Group name (first match), inside a group element
    pub group_name: &'static str,
    /// Control expanding a group (first match), inside a group element
    pub group_toggle: &'static str,
    /// Model names, inside a group element
    pub model_name: &'static str,
}

/// Where the taxonomy comes from.
#[derive(Debug, Clone, Copy)]
pub enum TaxonomySource {
    /// heydealer car-meta JSON API (brands, model groups, models)
    CarMetaApi,
    /// Brand filter panel on the listing page, walked in the browser
    FilterPanel(FilterPanelTaxonomy),
}

/// Layout of the brand/model taxonomy file and how names are matched to it.
#[derive(Debug, Clone, Copy)]
pub struct TaxonomySpec {
    pub source: TaxonomySource,
    /// File name inside the site's result directory
    pub file_name: &'static str,
    /// Columns whose values are model keys
    pub key_columns: &'static [&'static str],
    pub brand_id_column: Option<&'static str>,
    pub brand_name_column: &'static str,
    /// Model group carried along with a match
    pub model_group_column: Option<&'static str>,
    /// Only the text before this character is used as the key
    pub key_separator: Option<char>,
    /// Resolution order
    pub strategies: &'static [MatchStrategy],
}

/// How an item's canonical URL and code are derived from its link.
#[derive(Debug, Clone, Copy)]
pub enum ItemIdentity {
    /// The href path starts with `href_prefix`; the query string is dropped
    /// and the last path segment is the code.
    PathTail { href_prefix: &'static str },
    /// The code is capture group 1 of `pattern` applied to the href; the
    /// canonical URL is `detail_url` with `{id}` replaced by the code.
    Pattern {
        pattern: &'static str,
        detail_url: &'static str,
    },
}

/// Which part of the matched text a card field keeps.
#[derive(Debug, Clone, Copy)]
pub enum FieldSource {
    /// Text of the first match
    Text,
    /// Text of the n-th match (0-based)
    Nth(usize),
    /// Part `index` of the first match split on `separator`. Without the
    /// separator, part 0 is the whole text and other parts are empty.
    SplitPart {
        separator: &'static str,
        index: usize,
    },
    /// This constant when anything matches (a badge, a flag)
    Present(&'static str),
}

/// One column read from a listing card.
#[derive(Debug, Clone, Copy)]
pub struct CardField {
    pub column: &'static str,
    /// Tried in order; the first non-empty result wins
    pub selectors: &'static [&'static str],
    pub source: FieldSource,
    /// Value used when every selector comes up empty
    pub default: &'static str,
}

/// How more items are made to appear.
#[derive(Debug, Clone, Copy)]
pub enum ListingMode {
    /// Scroll to the bottom and let the page lazy-load more cards
    InfiniteScroll,
    /// Click a next-page control; `active` marks the current page number
    Paginated {
        next: &'static [&'static str],
        active: &'static str,
    },
}

/// Price columns that depend on the card's sale status.
#[derive(Debug, Clone, Copy)]
pub struct StatusPricing {
    pub status: &'static str,
    pub price: &'static str,
    pub discount: &'static str,
    /// Statuses whose card shows a live price
    pub on_sale: &'static [&'static str],
    /// Appended to a live price
    pub price_suffix: &'static str,
    /// Discount written when a live price has none
    pub no_discount: &'static str,
    /// `(status, price, discount)` for statuses without a live price
    pub fixed: &'static [(&'static str, &'static str, &'static str)],
    /// Price and discount for any other status, and for a live price that
    /// could not be read
    pub unknown: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct ListingSpec {
    /// Selector that signals the listing has rendered
    pub ready: Option<&'static str>,
    /// One element per card
    pub item: &'static str,
    /// Link inside the card (`None` when the card is the link)
    pub link: Option<&'static str>,
    pub identity: ItemIdentity,
    pub fields: &'static [CardField],
    pub pricing: Option<StatusPricing>,
    pub mode: ListingMode,
}

/// How a clickable control is recognised by its text.
#[derive(Debug, Clone, Copy)]
pub enum TextMatch {
    Exact(&'static str),
    Pattern(&'static str),
}

impl TextMatch {
    /// Compares against normalised text (see [`normalize_label`]).
    pub fn matches(&self, text: &str) -> bool {
        let text = normalize_label(text);
        match self {
            TextMatch::Exact(want) => text == normalize_label(want),
            TextMatch::Pattern(pattern) => Regex::new(pattern)
                .map(|re| re.is_match(&text))
                .unwrap_or(false),
        }
    }
}

/// A control found by selector plus text.
#[derive(Debug, Clone, Copy)]
pub struct TextTarget {
    pub selector: &'static str,
    pub text: TextMatch,
}

/// How the previous partition is deselected before the next one is chosen.
#[derive(Debug, Clone, Copy)]
pub enum ClearMode {
    /// Click the previous option again
    ToggleOption,
    /// Click the first element matching this selector
    Click(&'static str),
}

/// A filter that splits the listing into partitions (e.g. car body types).
#[derive(Debug, Clone, Copy)]
pub struct PartitionFilter {
    /// Control that opens the filter panel
    pub open: Option<TextTarget>,
    /// Option elements
    pub options: &'static str,
    /// Accepted labels after normalisation (empty accepts every label)
    pub canonical: &'static [&'static str],
    /// Control that applies the selection
    pub apply: Option<TextTarget>,
    pub clear: ClearMode,
    /// Partition list output (`car_type_sn`, `car_type_name`)
    pub list_file: &'static str,
}

/// A readiness signal on the detail page.
#[derive(Debug, Clone, Copy)]
pub struct ReadyProbe {
    pub selector: &'static str,
    pub timeout: Duration,
}

/// A label/value table on the detail page.
#[derive(Debug, Clone, Copy)]
pub struct LabelTable {
    pub row: &'static str,
    pub label: &'static str,
    /// Value inside the row; `None` reads the label's next sibling element
    pub value: Option<&'static str>,
}

/// Maps a label to a field slot when the whitespace-free label contains
/// `contains` (and not `excludes`).
#[derive(Debug, Clone, Copy)]
pub struct LabelRule {
    pub contains: &'static str,
    pub excludes: Option<&'static str>,
    pub field: &'static str,
    /// Remove all whitespace from the value
    pub squash: bool,
}

impl LabelRule {
    pub const fn new(contains: &'static str, field: &'static str) -> Self {
        Self {
            contains,
            excludes: None,
            field,
            squash: false,
        }
    }

    pub const fn excluding(mut self, excludes: &'static str) -> Self {
        self.excludes = Some(excludes);
        self
    }

    pub const fn squashed(mut self) -> Self {
        self.squash = true;
        self
    }

    /// Whether the (whitespace-free) label selects this rule.
    pub fn matches(&self, label: &str) -> bool {
        label.contains(self.contains) && !self.excludes.is_some_and(|x| label.contains(x))
    }
}

/// How two parts of an item are joined.
#[derive(Debug, Clone, Copy)]
pub enum PairStyle {
    /// `left : right`
    Colon,
    /// `left(right)`
    Paren,
}

#[derive(Debug, Clone, Copy)]
pub enum TextMode {
    /// Text of the first match
    First,
    /// First match with line breaks flattened to `" | "`
    Lines,
    /// Every match joined with the separator
    JoinAll(&'static str),
    /// Every match read as a pair of inner elements, joined with `" | "`.
    /// Items without a left part are dropped.
    Pairs {
        left: &'static str,
        right: &'static str,
        style: PairStyle,
    },
    /// Inner parts of the first match as `caption : text` (bare text for an
    /// empty caption), joined with `" | "`
    Captioned(&'static [(&'static str, &'static str)]),
    /// Every match with whitespace removed and `" : "` between a leading label
    /// and the first digit (`리스:45만원` becomes `리스 : 45만원`), joined with
    /// `" | "`
    Amounts,
    /// Counters inside the first match (`판금 1건` becomes `판금 : 1건`),
    /// joined with `" | "`; the text of `otherwise` when there are none
    Counts {
        parts: &'static [&'static str],
        otherwise: &'static str,
    },
    /// Every match read as a label/value row. A row is kept when its label
    /// contains a caption key and is written as `caption : value`; a value
    /// containing one of `clip` is shortened to it.
    Labelled {
        label: &'static str,
        value: &'static str,
        captions: &'static [(&'static str, &'static str)],
        clip: &'static [&'static str],
    },
}

/// Where a free-text field looks.
#[derive(Debug, Clone, Copy)]
pub enum TextScope {
    /// The whole page
    Page,
    /// Containers (selector) whose text contains the marker
    Containing(&'static str, &'static str),
    /// Only the n-th container (0-based)
    Nth(&'static str, usize),
}

/// A free-text field read outside the label table.
#[derive(Debug, Clone, Copy)]
pub struct TextField {
    pub field: &'static str,
    pub selector: &'static str,
    pub mode: TextMode,
    pub scope: TextScope,
}

impl TextField {
    /// A field read page-wide.
    pub const fn new(field: &'static str, selector: &'static str, mode: TextMode) -> Self {
        Self {
            field,
            selector,
            mode,
            scope: TextScope::Page,
        }
    }

    pub const fn within(self, scope: TextScope) -> Self {
        Self { scope, ..self }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum RegionMode {
    /// Use the first selector that yields any image
    FirstMatch,
    /// Use every selector
    All,
}

/// A structural region holding item photos.
#[derive(Debug, Clone, Copy)]
pub struct ImageRegion {
    pub scope: &'static str,
    /// Only the n-th scope match (0-based); `None` uses every match
    pub nth: Option<usize>,
    pub selectors: &'static [&'static str],
    pub mode: RegionMode,
}

#[derive(Debug, Clone, Copy)]
pub struct ImageSpec {
    /// Priority order
    pub regions: &'static [ImageRegion],
    /// Unscoped selectors used only when the regions yield nothing
    pub fallback: &'static [&'static str],
    /// Host hints for the last-resort sweep over every `img` (empty disables it)
    pub sweep_hints: &'static [&'static str],
}

/// Items whose card `column` holds one of `values` get no detail visit.
#[derive(Debug, Clone, Copy)]
pub struct SkipRule {
    pub column: &'static str,
    pub values: &'static [&'static str],
}

impl SkipRule {
    pub fn matches(&self, value: &str) -> bool {
        self.values.contains(&value.trim())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DetailSpec {
    /// Tried in order until one appears
    pub ready: &'static [ReadyProbe],
    /// Pixels per scroll step when walking the page
    pub scroll_step: u64,
    pub tables: &'static [LabelTable],
    /// Evaluated top to bottom; first matching rule with an empty slot wins
    pub rules: &'static [LabelRule],
    pub texts: &'static [TextField],
    /// Fields scored against the minimum-filled threshold
    pub core_fields: &'static [&'static str],
    pub images: ImageSpec,
    pub skip: Option<SkipRule>,
    /// Written instead of an empty cell
    pub blank_sentinel: Option<&'static str>,
}

/// Everything site-specific about a marketplace.
#[derive(Debug, Clone, Copy)]
pub struct SiteProfile {
    pub site: Site,
    pub base_url: &'static str,
    pub listing_url: &'static str,
    pub list_file: &'static str,
    pub detail_file: &'static str,
    pub columns: ColumnKeys,
    pub list_columns: &'static [&'static str],
    pub detail_columns: &'static [&'static str],
    pub taxonomy: TaxonomySpec,
    pub listing: ListingSpec,
    pub partitions: Option<PartitionFilter>,
    pub detail: DetailSpec,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_rule_matching() {
        let interior = LabelRule::new("실내", "interior_description").excluding("세차");
        assert!(interior.matches("실내상태"));
        assert!(!interior.matches("실내세차"));
        assert!(LabelRule::new("연식", "year").matches("연식(최초등록)"));
    }

    #[test]
    fn test_text_match() {
        assert!(TextMatch::Exact("차체").matches(" 차체 "));
        assert!(TextMatch::Exact("SUV∙RV").matches("SUV · RV"));
        let apply = TextMatch::Pattern(r"^[\d,]+대\s*보기$");
        assert!(apply.matches("1,234대 보기"));
        assert!(!apply.matches("초기화"));
    }

    #[test]
    fn test_skip_rule() {
        let rule = SkipRule {
            column: "status",
            values: &["준비중", "판매완료"],
        };
        assert!(rule.matches(" 판매완료 "));
        assert!(!rule.matches("판매중"));
    }

    #[test]
    fn test_profiles_are_consistent() {
        for site in [Site::Heydealer, Site::Reborncar] {
            let p = profile(site);
            assert_eq!(p.site, site);
            assert!(p.list_columns.contains(&p.columns.sn));
            assert!(p.detail_columns.contains(&p.columns.sn));
            assert!(p.list_columns.contains(&p.columns.code));
            for rule in p.detail.rules {
                assert!(
                    p.detail_columns.contains(&rule.field),
                    "{site}: rule field {} has no column",
                    rule.field
                );
            }
            for text in p.detail.texts {
                assert!(p.detail_columns.contains(&text.field), "{}", text.field);
            }
            for core in p.detail.core_fields {
                assert!(p.detail_columns.contains(core), "{core}");
            }
            for field in p.listing.fields {
                assert!(p.list_columns.contains(&field.column), "{}", field.column);
            }
            if let Some(pricing) = p.listing.pricing {
                for column in [pricing.status, pricing.price, pricing.discount] {
                    assert!(p.list_columns.contains(&column), "{column}");
                }
            }
            if let Some(group) = p.columns.model_group {
                assert!(p.list_columns.contains(&group));
                assert!(p.detail_columns.contains(&group));
                assert_eq!(p.taxonomy.model_group_column, Some(group));
            }
        }
    }
}
