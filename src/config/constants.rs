//! Configuration constants.
//!
//! This module defines the constants used as defaults throughout the crawler:
//! directory roots, pacing, retry budgets and file-naming rules.

use std::time::Duration;

/// Default User-Agent string for the browser session and image downloads.
///
/// Users can override this via the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Default W3C WebDriver endpoint (chromedriver or a selenium node).
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

// Output roots (each one is further partitioned by site name)
pub const DEFAULT_RESULT_DIR: &str = "./result";
pub const DEFAULT_IMAGE_DIR: &str = "./imgs";
pub const DEFAULT_LOG_DIR: &str = "./logs";

// Retry budgets
/// Attempts to reach a listing page before the run is aborted.
pub const NAVIGATION_ATTEMPTS: usize = 3;
/// Fixed pause between navigation attempts.
pub const NAVIGATION_RETRY_INTERVAL: Duration = Duration::from_secs(3);
/// Attempts per detail page, reloads included.
pub const DETAIL_ATTEMPTS: usize = 3;
/// Core detail fields that must be filled before a pass counts as complete.
pub const MIN_CORE_FIELDS: usize = 2;
/// Consecutive load triggers with zero new items before the listing is considered exhausted.
pub const IDLE_ROUNDS: usize = 2;
/// Attempts to select one partition (car body type) before it is skipped.
pub const PARTITION_SELECT_ATTEMPTS: usize = 2;
/// Retries of a failed car-meta API request.
pub const API_RETRY_ATTEMPTS: usize = 2;

// Pacing
/// Wait after a scroll-to-bottom load trigger.
pub const LOAD_TRIGGER_WAIT: Duration = Duration::from_millis(2500);
/// Debounce before re-reading an unchanged page height.
pub const HEIGHT_RECHECK_WAIT: Duration = Duration::from_secs(2);
/// Settle time after a navigation completes.
pub const SETTLE_WAIT: Duration = Duration::from_millis(1500);
/// Pause between the incremental scroll steps on a detail page.
pub const SCROLL_STEP_WAIT: Duration = Duration::from_millis(150);
/// Pause between clicks while operating a filter overlay.
pub const CLICK_WAIT: Duration = Duration::from_millis(600);
/// Pause between detail attempts.
pub const RETRY_INTERVAL: Duration = Duration::from_secs(2);
/// How long the listing's ready selector is awaited.
pub const LISTING_READY_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound on incremental scroll steps while walking a detail page.
pub const MAX_SCROLL_STEPS: usize = 24;

// Image archiving
/// Per-image download timeout in seconds.
pub const IMAGE_DOWNLOAD_TIMEOUT_SECS: u64 = 15;
/// Extension used when the URL does not carry a plausible one.
pub const DEFAULT_IMAGE_EXTENSION: &str = "jpg";
/// Shortest accepted extension taken from an image URL.
pub const MIN_IMAGE_EXTENSION_LEN: usize = 2;
/// Longest accepted extension taken from an image URL.
pub const MAX_IMAGE_EXTENSION_LEN: usize = 4;
/// Source URLs longer than this pass the last-resort image sweep without a host hint.
pub const SWEEP_MIN_SRC_LEN: usize = 20;
/// Elements visited by the last-resort image sweep.
pub const SWEEP_SELECTOR: &str = "img[src], img[data-src]";

// Taxonomy API
/// Pause between brands while walking the car-meta API.
pub const TAXONOMY_BRAND_PAUSE: Duration = Duration::from_millis(100);
/// Default per-request timeout for the car-meta API in seconds.
pub const TAXONOMY_TIMEOUT_SECS: u64 = 10;
/// How long a filter panel's brand list is awaited before the walk starts.
pub const PANEL_READY_TIMEOUT: Duration = Duration::from_secs(10);

// Timestamps written to every row
/// Date-only collection timestamp (`YYYYMMDD`).
pub const DATE_FORMAT: &str = "%Y%m%d";
/// Minute-precision collection timestamp (`YYYYMMDDHHMM`).
pub const MINUTE_FORMAT: &str = "%Y%m%d%H%M";

/// Separator used when a free-text block is flattened onto one line.
pub const LINE_DELIMITER: &str = " | ";
