//! Listing stage.
//!
//! Walks the listing page, triggering its load mechanism until one of three
//! stop conditions holds: the per-partition target is reached, the page stops
//! growing (height unchanged after a debounce, or the active page marker
//! unchanged), or `idle_rounds` consecutive triggers find nothing new. Each
//! new item is written to the list CSV the moment it is discovered. When the
//! previous list is kept, its URLs count as seen and numbering continues
//! after its highest sequence number.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, error, info, warn};

use super::rules::{harvest_cards, marker_text, partition_labels, ItemResolver};
use crate::app::log_list_progress;
use crate::brand::BrandJoiner;
use crate::browser::{goto_with_retry, PageDriver};
use crate::config::{Config, Delays, RetryPolicy, LISTING_READY_TIMEOUT};
use crate::error_handling::{
    BrowserError, ErrorType, InfoType, ProcessingStats, SinkError, WarningType,
};
use crate::export::{read_rows, write_table, CsvAppendSink};
use crate::models::{ListingItem, Row, Timestamps};
use crate::site::{ClearMode, ColumnKeys, ListingMode, PartitionFilter, SiteProfile};
use crate::utils::normalize_label;

/// Label shown in progress lines for an unpartitioned listing.
const ALL_PARTITIONS: &str = "전체";

/// Clicks the option whose normalised text equals `label`.
async fn click_label<P: PageDriver>(
    page: &mut P,
    selector: &str,
    label: &str,
) -> Result<bool, BrowserError> {
    let texts = page.texts(selector).await?;
    match texts.iter().position(|t| normalize_label(t) == label) {
        Some(index) => page.click_nth(selector, index).await,
        None => Ok(false),
    }
}

/// Canonical URLs and the highest sequence number of a previous list CSV.
fn previous_items(
    path: &Path,
    columns: &ColumnKeys,
) -> Result<(HashSet<String>, usize), SinkError> {
    if !path.exists() {
        return Ok((HashSet::new(), 0));
    }
    let mut seen = HashSet::new();
    let mut last_sn = 0;
    for row in read_rows(path)? {
        if let Some(url) = row.get(columns.detail_url).map(|u| u.trim()) {
            if !url.is_empty() {
                seen.insert(url.to_string());
            }
        }
        if let Some(sn) = row.get(columns.sn).and_then(|v| v.trim().parse::<usize>().ok()) {
            last_sn = last_sn.max(sn);
        }
    }
    Ok((seen, last_sn))
}

/// Collects [`ListingItem`]s for one site.
pub struct ListingCollector<'a> {
    profile: &'a SiteProfile,
    joiner: &'a BrandJoiner,
    sink: &'a CsvAppendSink,
    stats: &'a ProcessingStats,
    resolver: ItemResolver,
    listing_url: String,
    target: Option<usize>,
    retry: RetryPolicy,
    delays: Delays,
    result_dir: PathBuf,
    collected: Timestamps,
    items: Vec<ListingItem>,
    seen: HashSet<String>,
    /// Sequence number of the first item found by this run
    first_sn: usize,
}

impl<'a> ListingCollector<'a> {
    /// # Errors
    ///
    /// Fails when the profile's base URL or identity pattern is invalid.
    pub fn new(
        profile: &'a SiteProfile,
        config: &Config,
        joiner: &'a BrandJoiner,
        sink: &'a CsvAppendSink,
        stats: &'a ProcessingStats,
    ) -> Result<Self> {
        let (seen, last_sn) = if config.keep_existing {
            match previous_items(sink.path(), &profile.columns) {
                Ok((seen, last_sn)) => {
                    if !seen.is_empty() {
                        info!(
                            "Resuming after {} listed items (next {} = {})",
                            seen.len(),
                            profile.columns.sn,
                            last_sn + 1
                        );
                    }
                    (seen, last_sn)
                }
                Err(e) => {
                    warn!(
                        "Could not read previous list {}: {} (starting fresh)",
                        sink.path().display(),
                        e
                    );
                    (HashSet::new(), 0)
                }
            }
        } else {
            (HashSet::new(), 0)
        };
        Ok(Self {
            profile,
            joiner,
            sink,
            stats,
            resolver: ItemResolver::new(profile.base_url, profile.listing.identity)?,
            listing_url: config
                .listing_url
                .clone()
                .unwrap_or_else(|| profile.listing_url.to_string()),
            target: config.target,
            retry: config.retry.clone(),
            delays: config.delays.clone(),
            result_dir: config.site_result_dir(),
            collected: Timestamps::now(),
            items: Vec::new(),
            seen,
            first_sn: last_sn + 1,
        })
    }

    /// Pins the collection timestamps written to every row.
    pub fn with_timestamps(mut self, collected: Timestamps) -> Self {
        self.collected = collected;
        self
    }

    /// Runs the listing stage.
    ///
    /// # Errors
    ///
    /// Only a listing page that cannot be reached after the navigation retry
    /// budget is an error. Everything after that degrades to fewer items.
    pub async fn collect<P: PageDriver>(mut self, page: &mut P) -> Result<Vec<ListingItem>> {
        let url = self.listing_url.clone();
        if let Err(e) = goto_with_retry(page, &url, &self.retry).await {
            self.stats.increment_error(ErrorType::ListingNavigation);
            return Err(e).with_context(|| format!("could not open listing page {url}"));
        }
        page.pause(self.delays.settle).await;
        if let Some(ready) = self.profile.listing.ready {
            if !page.wait_for(ready, LISTING_READY_TIMEOUT).await {
                warn!("Listing not ready after {:?}: {}", LISTING_READY_TIMEOUT, ready);
                self.stats.increment_warning(WarningType::ReadinessTimeout);
            }
        }

        let labels = match self.profile.partitions {
            Some(filter) => self.read_partitions(page, &filter).await,
            None => Vec::new(),
        };

        match self.profile.partitions {
            Some(filter) if !labels.is_empty() => {
                let mut previous: Option<String> = None;
                for label in &labels {
                    if self.select_partition(page, &filter, &mut previous, label).await {
                        previous = Some(label.clone());
                        self.collect_partition(page, label).await;
                    } else {
                        warn!("Skipping partition {}: could not select it", label);
                        self.stats.increment_warning(WarningType::PartitionSkipped);
                    }
                }
            }
            _ => self.collect_partition(page, "").await,
        }

        info!(
            "list collection finished: {} items written to {}",
            self.items.len(),
            self.sink.path().display()
        );
        Ok(self.items)
    }

    /// Reads the partition labels and writes the partition list file.
    async fn read_partitions<P: PageDriver>(
        &self,
        page: &mut P,
        filter: &PartitionFilter,
    ) -> Vec<String> {
        let mut opened = false;
        if let Some(open) = filter.open {
            match page.click_text(open.selector, &open.text).await {
                Ok(true) => {
                    opened = true;
                    page.pause(self.delays.click).await;
                }
                Ok(false) => debug!("partition filter control not found"),
                Err(e) => warn!("Could not open partition filter: {}", e),
            }
        }
        let labels = match page.texts(filter.options).await {
            Ok(raw) => partition_labels(&raw, filter.canonical),
            Err(e) => {
                warn!("Could not read partition labels: {}", e);
                Vec::new()
            }
        };
        if opened {
            if let Err(e) = page.dismiss().await {
                debug!("dismiss failed: {}", e);
            }
            page.pause(self.delays.click).await;
        }

        if labels.is_empty() {
            info!("No partitions found; collecting the listing as a whole");
        } else {
            info!("Partitions: {}", labels.join(", "));
        }
        let rows: Vec<Row> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                Row::from([
                    ("car_type_sn".to_string(), (i + 1).to_string()),
                    ("car_type_name".to_string(), label.clone()),
                ])
            })
            .collect();
        let path = self.result_dir.join(filter.list_file);
        if let Err(e) = write_table(&path, &["car_type_sn", "car_type_name"], &rows, true) {
            error!("Failed to write partition list {}: {}", path.display(), e);
            self.stats.increment_error(ErrorType::SinkWrite);
        }
        labels
    }

    /// Selects `label`, clearing the previous selection first.
    ///
    /// `previous` is taken once it has been cleared, so a retried attempt does
    /// not toggle it back on.
    async fn select_partition<P: PageDriver>(
        &self,
        page: &mut P,
        filter: &PartitionFilter,
        previous: &mut Option<String>,
        label: &str,
    ) -> bool {
        for attempt in 1..=self.retry.partition_attempts.max(1) {
            match self.try_select(page, filter, previous, label).await {
                Ok(true) => {
                    info!("partition selected: {}", label);
                    return true;
                }
                Ok(false) => debug!("partition {} not selectable (attempt {})", label, attempt),
                Err(e) => warn!("Selecting partition {} failed (attempt {}): {}", label, attempt, e),
            }
            if let Err(e) = page.dismiss().await {
                debug!("dismiss failed: {}", e);
            }
            page.pause(self.delays.click).await;
        }
        false
    }

    async fn try_select<P: PageDriver>(
        &self,
        page: &mut P,
        filter: &PartitionFilter,
        previous: &mut Option<String>,
        label: &str,
    ) -> Result<bool, BrowserError> {
        if let Some(open) = filter.open {
            if !page.click_text(open.selector, &open.text).await? {
                return Ok(false);
            }
            page.pause(self.delays.click).await;
        }
        if let Some(prev) = previous.as_deref() {
            let cleared = match filter.clear {
                ClearMode::ToggleOption => click_label(page, filter.options, prev).await?,
                ClearMode::Click(selector) => page.click(selector).await?,
            };
            if !cleared {
                debug!("previous partition {} was not cleared", prev);
            }
            *previous = None;
            page.pause(self.delays.click).await;
        }
        if !click_label(page, filter.options, label).await? {
            return Ok(false);
        }
        page.pause(self.delays.click).await;
        if let Some(apply) = filter.apply {
            if !page.click_text(apply.selector, &apply.text).await? {
                page.dismiss().await?;
            }
        }
        page.pause(self.delays.settle).await;
        page.scroll_to(0).await?;
        Ok(true)
    }

    async fn snapshot<P: PageDriver>(&self, page: &mut P) -> Option<String> {
        match page.content().await {
            Ok(content) => Some(content),
            Err(e) => {
                warn!("Listing snapshot failed: {}", e);
                None
            }
        }
    }

    fn target_reached(&self, count: usize) -> bool {
        self.target.is_some_and(|t| count >= t)
    }

    /// Collects one partition (`""` for the whole listing).
    async fn collect_partition<P: PageDriver>(&mut self, page: &mut P, label: &str) {
        let shown = if label.is_empty() { ALL_PARTITIONS } else { label };
        let mut count = 0;
        let Some(mut content) = self.snapshot(page).await else {
            return;
        };
        self.harvest(&content, label, &mut count);

        let mut idle = 0;
        loop {
            if self.target_reached(count) {
                info!("[{}] target reached ({})", shown, count);
                break;
            }
            if idle >= self.retry.idle_rounds {
                info!("[{}] no new items after {} load triggers", shown, idle);
                break;
            }

            let exhausted = match self.profile.listing.mode {
                ListingMode::InfiniteScroll => {
                    let before = match page.scroll_height().await {
                        Ok(h) => h,
                        Err(e) => {
                            warn!("[{}] could not read page height: {}", shown, e);
                            break;
                        }
                    };
                    if let Err(e) = page.scroll_to_bottom().await {
                        warn!("[{}] scroll failed: {}", shown, e);
                        break;
                    }
                    page.pause(self.delays.load_trigger).await;
                    self.stats.increment_info(InfoType::LoadTrigger);
                    let Some(fresh) = self.snapshot(page).await else {
                        break;
                    };
                    content = fresh;
                    let added = self.harvest(&content, label, &mut count);
                    idle = if added > 0 { 0 } else { idle + 1 };
                    self.height_unchanged(page, before).await
                }
                ListingMode::Paginated { next, active } => {
                    let before = marker_text(&content, active);
                    let mut advanced = false;
                    for selector in next {
                        match page.click(selector).await {
                            Ok(true) => {
                                advanced = true;
                                break;
                            }
                            Ok(false) => {}
                            Err(e) => debug!("next-page control {} failed: {}", selector, e),
                        }
                    }
                    if !advanced {
                        info!("[{}] last page reached", shown);
                        break;
                    }
                    page.pause(self.delays.load_trigger).await;
                    self.stats.increment_info(InfoType::LoadTrigger);
                    let Some(fresh) = self.snapshot(page).await else {
                        break;
                    };
                    content = fresh;
                    let added = self.harvest(&content, label, &mut count);
                    idle = if added > 0 { 0 } else { idle + 1 };
                    before.is_some() && marker_text(&content, active) == before
                }
            };
            if exhausted {
                info!("[{}] listing exhausted", shown);
                break;
            }
        }
        log_list_progress(shown, count, self.target, self.items.len());
    }

    /// Height unchanged after a trigger, confirmed by one debounced recheck.
    async fn height_unchanged<P: PageDriver>(&self, page: &mut P, before: u64) -> bool {
        match page.scroll_height().await {
            Ok(after) if after == before => {
                page.pause(self.delays.height_recheck).await;
                matches!(page.scroll_height().await, Ok(h) if h == before)
            }
            Ok(_) => false,
            Err(e) => {
                debug!("height recheck failed: {}", e);
                false
            }
        }
    }

    /// Adds the new cards of a snapshot. Returns how many were new.
    fn harvest(&mut self, content: &str, label: &str, count: &mut usize) -> usize {
        let (cards, skipped) = harvest_cards(content, &self.profile.listing, &self.resolver);
        if skipped > 0 {
            debug!("{} anchors without an item link skipped", skipped);
        }
        let shown = if label.is_empty() { ALL_PARTITIONS } else { label };
        let columns = &self.profile.columns;
        let mut added = 0;
        for card in cards {
            if self.target_reached(*count) {
                break;
            }
            if !self.seen.insert(card.detail_url.clone()) {
                continue;
            }
            let brand = self
                .joiner
                .resolve(card.card.get(columns.model_name).map_or("", String::as_str));
            let item = ListingItem {
                sn: self.first_sn + self.items.len(),
                detail_url: card.detail_url,
                code: card.code,
                partition: label.to_string(),
                brand,
                card: card.card,
                collected: self.collected.clone(),
            };
            if let Err(e) = self.sink.append(&item.to_row(columns)) {
                error!("Failed to write list row {}: {}", item.sn, e);
                self.stats.increment_error(ErrorType::SinkWrite);
            }
            self.items.push(item);
            *count += 1;
            added += 1;
            log_list_progress(shown, *count, self.target, self.items.len());
        }
        added
    }
}
