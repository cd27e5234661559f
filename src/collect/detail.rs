//! Detail stage.
//!
//! Visits every listing item in order and writes exactly one detail row per
//! item, whatever happens on the page. A visit is retried (reload) until the
//! core-field threshold is met or the attempt budget runs out; the best pass
//! is kept, and blank cells are back-filled from the listing row.

use log::{debug, error, info, warn};

use super::rules::{count_filled, extract_detail};
use crate::app::{detail_success_summary, log_detail_progress};
use crate::browser::PageDriver;
use crate::config::{Config, Delays, RetryPolicy, MAX_SCROLL_STEPS};
use crate::error_handling::{BrowserError, ErrorType, InfoType, ProcessingStats, WarningType};
use crate::export::CsvAppendSink;
use crate::images::{ImageArchiver, ImageVisit};
use crate::models::{apply_sentinel, merge_fallback, DetailOutcome, DetailRecord, ListingItem, Row};
use crate::site::{ColumnKeys, SiteProfile};
use crate::utils::{AttemptOutcome, AttemptTracker};

/// Totals of one detail stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailSummary {
    /// Rows written (always the number of listing items)
    pub rows: usize,
    /// Rows whose page was actually read
    pub success: usize,
    pub images_saved: usize,
}

/// Columns copied verbatim from the listing row into the detail row.
fn identity_columns(keys: &ColumnKeys) -> Vec<&'static str> {
    let mut columns = vec![
        keys.sn,
        keys.code,
        keys.detail_url,
        keys.brand_name,
        keys.partition,
        keys.date,
        keys.minute,
    ];
    columns.extend(keys.brand_id);
    columns.extend(keys.model_group);
    columns
}

pub struct DetailExtractor<'a> {
    profile: &'a SiteProfile,
    sink: &'a CsvAppendSink,
    stats: &'a ProcessingStats,
    archiver: Option<&'a ImageArchiver>,
    retry: RetryPolicy,
    delays: Delays,
}

impl<'a> DetailExtractor<'a> {
    pub fn new(
        profile: &'a SiteProfile,
        config: &Config,
        sink: &'a CsvAppendSink,
        stats: &'a ProcessingStats,
    ) -> Self {
        Self {
            profile,
            sink,
            stats,
            archiver: None,
            retry: config.retry.clone(),
            delays: config.delays.clone(),
        }
    }

    /// Downloads images during each visit.
    pub fn with_archiver(mut self, archiver: &'a ImageArchiver) -> Self {
        self.archiver = Some(archiver);
        self
    }

    /// Visits every item and writes its row.
    pub async fn extract_all<P: PageDriver>(
        &self,
        page: &mut P,
        items: &[ListingItem],
    ) -> DetailSummary {
        let mut summary = DetailSummary::default();
        if items.is_empty() {
            info!("No listing items; writing an empty detail file");
            if let Err(e) = self.sink.write_header_only() {
                error!("Failed to write {}: {}", self.sink.path().display(), e);
                self.stats.increment_error(ErrorType::SinkWrite);
            }
            return summary;
        }

        for (i, item) in items.iter().enumerate() {
            log_detail_progress(i + 1, items.len(), &item.code);
            let record = self.visit(page, item).await;
            if let Err(e) = self.sink.append(&record.fields) {
                error!("Failed to write detail row {}: {}", record.sn, e);
                self.stats.increment_error(ErrorType::SinkWrite);
            }
            summary.rows += 1;
            if record.outcome.is_success() {
                summary.success += 1;
            }
            summary.images_saved += record.images_saved;
        }
        info!("{}", detail_success_summary(summary.success, summary.rows));
        summary
    }

    /// Produces the detail record for one item. Never fails.
    pub async fn visit<P: PageDriver>(&self, page: &mut P, item: &ListingItem) -> DetailRecord {
        let detail = &self.profile.detail;
        let listing_row = item.to_row(&self.profile.columns);

        if let Some(skip) = detail.skip {
            let value = item.field(skip.column);
            if skip.matches(value) {
                info!("({}) detail skipped: {}", item.code, value.trim());
                self.stats.increment_info(InfoType::DetailSkipped);
                return self.finish(item, &listing_row, Row::new(), DetailOutcome::Skipped, 0);
            }
        }

        let mut visit = self.archiver.map(|a| a.visit(&item.code));
        let mut tracker = AttemptTracker::new(self.retry.detail_attempts, self.retry.min_core_fields);
        let mut loaded = false;
        while let Some(attempt) = tracker.next_attempt() {
            if attempt > 1 {
                page.pause(self.delays.retry_interval).await;
            }
            match self.attempt(page, item, loaded, visit.as_mut()).await {
                Ok(fields) => {
                    loaded = true;
                    let score = count_filled(&fields, detail.core_fields);
                    debug!(
                        "({}) attempt {}: {}/{} core fields",
                        item.code,
                        attempt,
                        score,
                        detail.core_fields.len()
                    );
                    if tracker.record(fields, score) {
                        break;
                    }
                }
                Err(e) => {
                    loaded = false;
                    warn!("({}) detail attempt {} failed: {}", item.code, attempt, e);
                    self.stats.increment_error(ErrorType::DetailNavigation);
                }
            }
        }

        let (fields, outcome) = match tracker.finish() {
            AttemptOutcome::Filled { value, .. } => (value, DetailOutcome::Filled),
            AttemptOutcome::Underfilled {
                value,
                score,
                attempts,
            } => {
                warn!(
                    "({}) only {} core fields after {} attempts; keeping best pass",
                    item.code, score, attempts
                );
                self.stats.increment_warning(WarningType::DetailUnderfilled);
                (value, DetailOutcome::Underfilled)
            }
            AttemptOutcome::Exhausted { attempts } => {
                error!(
                    "({}) detail failed after {} attempts; writing listing data only",
                    item.code, attempts
                );
                self.stats.increment_error(ErrorType::DetailExhausted);
                (Row::new(), DetailOutcome::Exhausted)
            }
        };
        let images = visit.as_ref().map_or(0, ImageVisit::saved);
        self.finish(item, &listing_row, fields, outcome, images)
    }

    fn finish(
        &self,
        item: &ListingItem,
        listing_row: &Row,
        mut fields: Row,
        outcome: DetailOutcome,
        images_saved: usize,
    ) -> DetailRecord {
        for column in identity_columns(&self.profile.columns) {
            if let Some(value) = listing_row.get(column) {
                fields.insert(column.to_string(), value.clone());
            }
        }
        let filled = merge_fallback(&mut fields, listing_row, self.profile.detail_columns);
        for _ in 0..filled {
            self.stats.increment_info(InfoType::FallbackFill);
        }
        if let Some(sentinel) = self.profile.detail.blank_sentinel {
            apply_sentinel(&mut fields, self.profile.detail_columns, sentinel);
        }
        DetailRecord {
            sn: item.sn,
            code: item.code.clone(),
            fields,
            outcome,
            images_saved,
        }
    }

    /// One pass: load, wait, walk the page, extract, archive images.
    async fn attempt<P: PageDriver>(
        &self,
        page: &mut P,
        item: &ListingItem,
        reload: bool,
        visit: Option<&mut ImageVisit>,
    ) -> Result<Row, BrowserError> {
        let detail = &self.profile.detail;
        if reload {
            self.stats.increment_info(InfoType::DetailReload);
            page.reload().await?;
        } else {
            page.goto(&item.detail_url).await?;
        }
        page.pause(self.delays.settle).await;

        let mut ready = detail.ready.is_empty();
        for probe in detail.ready {
            if page.wait_for(probe.selector, probe.timeout).await {
                ready = true;
                break;
            }
        }
        if !ready {
            warn!("({}) detail page not ready; reading it anyway", item.code);
            self.stats.increment_warning(WarningType::ReadinessTimeout);
        }

        self.walk(page, detail.scroll_step).await?;
        let content = page.content().await?;
        let fields = extract_detail(&content, detail);

        if let (Some(archiver), Some(visit)) = (self.archiver, visit) {
            let page_url = page
                .current_url()
                .await
                .unwrap_or_else(|_| item.detail_url.clone());
            archiver
                .archive_page(
                    page,
                    &content,
                    &page_url,
                    &detail.images,
                    visit,
                    self.delays.settle,
                    self.stats,
                )
                .await;
        }
        Ok(fields)
    }

    /// Scrolls through the page in steps so lazy sections render, then back
    /// to the top.
    async fn walk<P: PageDriver>(&self, page: &mut P, step: u64) -> Result<(), BrowserError> {
        let height = page.scroll_height().await?;
        let mut y = 0;
        for _ in 0..MAX_SCROLL_STEPS {
            if y >= height || step == 0 {
                break;
            }
            y = (y + step).min(height);
            page.scroll_to(y).await?;
            page.pause(self.delays.scroll_step).await;
        }
        page.scroll_to(0).await
    }
}
