//! Image source discovery on HTML snapshots.

use scraper::{ElementRef, Html};

use crate::config::{SWEEP_MIN_SRC_LEN, SWEEP_SELECTOR};
use crate::site::{ImageSpec, RegionMode};
use crate::utils::select_all;

/// `src`, or `data-src` when `src` is absent or an inline placeholder.
fn img_src(img: ElementRef<'_>) -> Option<String> {
    let value = img.value();
    value
        .attr("src")
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.starts_with("data:"))
        .or_else(|| value.attr("data-src").map(str::trim))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn push_unique(out: &mut Vec<String>, src: String) {
    if !out.contains(&src) {
        out.push(src);
    }
}

/// Sources from the profile's structural regions, in priority order.
pub fn region_sources(content: &str, spec: &ImageSpec) -> Vec<String> {
    let html = Html::parse_document(content);
    let root = html.root_element();
    let mut out = Vec::new();
    for region in spec.regions {
        let scopes = select_all(root, region.scope);
        let scopes: Vec<ElementRef<'_>> = match region.nth {
            Some(n) => scopes.get(n).copied().into_iter().collect(),
            None => scopes,
        };
        let collect = |selector: &str| -> Vec<String> {
            scopes
                .iter()
                .flat_map(|scope| select_all(*scope, selector))
                .filter_map(img_src)
                .collect()
        };
        match region.mode {
            RegionMode::FirstMatch => {
                if let Some(found) = region
                    .selectors
                    .iter()
                    .map(|s| collect(*s))
                    .find(|found| !found.is_empty())
                {
                    found.into_iter().for_each(|src| push_unique(&mut out, src));
                }
            }
            RegionMode::All => {
                for selector in region.selectors {
                    collect(*selector)
                        .into_iter()
                        .for_each(|src| push_unique(&mut out, src));
                }
            }
        }
    }
    out
}

/// Sources from the unscoped fallback selectors.
pub fn fallback_sources(content: &str, selectors: &[&str]) -> Vec<String> {
    let html = Html::parse_document(content);
    let mut out = Vec::new();
    for selector in selectors {
        for src in select_all(html.root_element(), selector)
            .into_iter()
            .filter_map(img_src)
        {
            push_unique(&mut out, src);
        }
    }
    out
}

/// Every `img` source that carries one of `hints` or is long enough to be a
/// real asset URL.
pub fn sweep_sources(content: &str, hints: &[&str]) -> Vec<String> {
    let html = Html::parse_document(content);
    let mut out = Vec::new();
    for src in select_all(html.root_element(), SWEEP_SELECTOR)
        .into_iter()
        .filter_map(img_src)
    {
        if hints.iter().any(|h| src.contains(h)) || src.len() > SWEEP_MIN_SRC_LEN {
            push_unique(&mut out, src);
        }
    }
    out
}
