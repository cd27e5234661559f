//! Taxonomy from a listing page's brand filter panel.
//!
//! Expands each brand, then each model group under it, and reads the model
//! checkboxes that appear. A group without models becomes one row named
//! after the group. The DOM is read from snapshots; clicks address elements
//! by their position in a page-wide selector.

use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use scraper::{ElementRef, Html};

use super::TaxonomyReport;
use crate::browser::{goto_with_retry, PageDriver};
use crate::config::{Delays, RetryPolicy, PANEL_READY_TIMEOUT};
use crate::export::write_table;
use crate::models::{Row, Timestamps};
use crate::site::FilterPanelTaxonomy;
use crate::utils::{node_text, select_all};

/// Column order of a panel taxonomy file.
pub const PANEL_TAXONOMY_COLUMNS: &[&str] = &[
    "model_sn",
    "brand_list",
    "car_list",
    "model_list",
    "date_crtr_pnttm",
    "create_dt",
];

/// Splits a model label at its last opening parenthesis into
/// `name|(period)`.
///
/// Labels without a parenthesis, or with nothing before it, are returned
/// unchanged.
pub fn split_last_paren(text: &str) -> String {
    let Some(open) = text.rfind('(') else {
        return text.to_string();
    };
    let prefix = text[..open].trim();
    if prefix.is_empty() {
        return text.to_string();
    }
    format!("{prefix}|{}", text[open..].trim())
}

#[derive(Debug, PartialEq, Eq)]
struct Entry {
    name: String,
    /// Position of the entry's toggle among every toggle on the page
    toggle: usize,
    /// Groups under a brand, or model labels under a group
    children: Vec<String>,
}

fn first_text(scope: ElementRef<'_>, selector: &str) -> String {
    select_all(scope, selector)
        .first()
        .map(|e| node_text(*e))
        .unwrap_or_default()
}

fn position_in(html: &Html, selector: &str, target: ElementRef<'_>) -> Option<usize> {
    select_all(html.root_element(), selector)
        .iter()
        .position(|e| e.id() == target.id())
}

fn brand_toggles(panel: &FilterPanelTaxonomy) -> String {
    format!("{} {}", panel.brand, panel.brand_toggle)
}

fn group_toggles(panel: &FilterPanelTaxonomy) -> String {
    format!("{} {} {}", panel.brand, panel.group, panel.group_toggle)
}

fn brand_count(content: &str, panel: &FilterPanelTaxonomy) -> usize {
    let html = Html::parse_document(content);
    select_all(html.root_element(), panel.brand).len()
}

/// Brand `i` with the names of the groups currently shown under it.
fn brand_entry(content: &str, panel: &FilterPanelTaxonomy, i: usize) -> Option<Entry> {
    let html = Html::parse_document(content);
    let brand = select_all(html.root_element(), panel.brand).into_iter().nth(i)?;
    let toggle = select_all(brand, panel.brand_toggle).into_iter().next()?;
    Some(Entry {
        name: first_text(brand, panel.brand_name),
        toggle: position_in(&html, &brand_toggles(panel), toggle)?,
        children: select_all(brand, panel.group)
            .into_iter()
            .map(|g| first_text(g, panel.group_name))
            .collect(),
    })
}

/// Group `j` of brand `i` with the model labels currently shown under it.
fn group_entry(content: &str, panel: &FilterPanelTaxonomy, i: usize, j: usize) -> Option<Entry> {
    let html = Html::parse_document(content);
    let brand = select_all(html.root_element(), panel.brand).into_iter().nth(i)?;
    let group = select_all(brand, panel.group).into_iter().nth(j)?;
    let toggle = select_all(group, panel.group_toggle).into_iter().next()?;
    Some(Entry {
        name: first_text(group, panel.group_name),
        toggle: position_in(&html, &group_toggles(panel), toggle)?,
        children: select_all(group, panel.model_name)
            .into_iter()
            .map(node_text)
            .filter(|m| !m.is_empty())
            .collect(),
    })
}

/// Clicks a toggle and waits for the panel to update. Returns whether the
/// click landed.
async fn toggle<P: PageDriver>(
    page: &mut P,
    selector: &str,
    index: usize,
    delays: &Delays,
) -> bool {
    match page.click_nth(selector, index).await {
        Ok(true) => {
            page.pause(delays.click).await;
            true
        }
        Ok(false) => {
            warn!("Toggle {}#{} not found", selector, index);
            false
        }
        Err(e) => {
            warn!("Toggle {}#{} failed: {}", selector, index, e);
            false
        }
    }
}

/// Walks the brand filter panel on `url` and writes the taxonomy to `path`,
/// replacing any previous file.
///
/// Brands and groups that cannot be read or expanded are skipped and
/// counted in `skipped_requests`.
///
/// # Errors
///
/// Fails when the page cannot be reached after its retries, a snapshot
/// cannot be taken, or the file cannot be written.
pub async fn collect_panel_taxonomy<P: PageDriver>(
    page: &mut P,
    url: &str,
    panel: &FilterPanelTaxonomy,
    retry: &RetryPolicy,
    delays: &Delays,
    path: &Path,
) -> Result<TaxonomyReport> {
    let stamp = Timestamps::now();
    goto_with_retry(page, url, retry)
        .await
        .with_context(|| format!("could not open brand panel at {url}"))?;
    page.pause(delays.settle).await;
    if !page.wait_for(panel.brand, PANEL_READY_TIMEOUT).await {
        warn!("Brand panel {} did not appear on {}", panel.brand, url);
    }

    let brands = brand_count(&page.content().await?, panel);
    info!("Collecting taxonomy for {} brands", brands);
    let mut report = TaxonomyReport {
        brands,
        model_groups: 0,
        models: 0,
        skipped_requests: 0,
        path: path.to_path_buf(),
    };
    let brand_selector = brand_toggles(panel);
    let group_selector = group_toggles(panel);
    let mut rows: Vec<Row> = Vec::new();

    for i in 0..brands {
        let Some(brand) = brand_entry(&page.content().await?, panel, i) else {
            warn!("Skipping brand #{}: not readable", i + 1);
            report.skipped_requests += 1;
            continue;
        };
        info!("[{}/{}] brand: {}", i + 1, brands, brand.name);
        if !toggle(page, &brand_selector, brand.toggle, delays).await {
            report.skipped_requests += 1;
            continue;
        }
        let groups = brand_entry(&page.content().await?, panel, i)
            .map(|b| b.children.len())
            .unwrap_or(0);

        for j in 0..groups {
            let Some(group) = group_entry(&page.content().await?, panel, i, j) else {
                report.skipped_requests += 1;
                continue;
            };
            report.model_groups += 1;
            if !toggle(page, &group_selector, group.toggle, delays).await {
                warn!("Skipping model group {}", group.name);
                report.skipped_requests += 1;
                continue;
            }
            let models = group_entry(&page.content().await?, panel, i, j)
                .map(|g| g.children)
                .unwrap_or_default();
            let labels = if models.is_empty() {
                vec![group.name.clone()]
            } else {
                models
            };
            for label in labels {
                rows.push(Row::from([
                    ("model_sn".to_string(), (rows.len() + 1).to_string()),
                    ("brand_list".to_string(), brand.name.clone()),
                    ("car_list".to_string(), group.name.clone()),
                    ("model_list".to_string(), split_last_paren(&label)),
                    ("date_crtr_pnttm".to_string(), stamp.date.clone()),
                    ("create_dt".to_string(), stamp.minute.clone()),
                ]));
            }
        }
    }

    if rows.is_empty() {
        warn!("No models collected; {} left untouched", path.display());
        return Ok(report);
    }
    report.models = write_table(path, PANEL_TAXONOMY_COLUMNS, &rows, true)
        .with_context(|| format!("could not write {}", path.display()))?;
    info!(
        "Taxonomy written: {} models from {} brands to {}",
        report.models,
        report.brands,
        path.display()
    );
    Ok(report)
}
