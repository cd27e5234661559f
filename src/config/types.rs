//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::constants::{
    CLICK_WAIT, DEFAULT_IMAGE_DIR, DEFAULT_LOG_DIR, DEFAULT_RESULT_DIR, DEFAULT_USER_AGENT,
    DEFAULT_WEBDRIVER_URL, DETAIL_ATTEMPTS, HEIGHT_RECHECK_WAIT, IDLE_ROUNDS, LOAD_TRIGGER_WAIT,
    MIN_CORE_FIELDS, NAVIGATION_ATTEMPTS, NAVIGATION_RETRY_INTERVAL, PARTITION_SELECT_ATTEMPTS,
    RETRY_INTERVAL, SCROLL_STEP_WAIT, SETTLE_WAIT, TAXONOMY_TIMEOUT_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Marketplace to crawl.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Site {
    /// heydealer.com (infinite-scroll market listing)
    Heydealer,
    /// reborncar.co.kr (paginated smartbuy listing)
    Reborncar,
}

impl Site {
    /// Directory and file-name prefix used for this site's outputs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Site::Heydealer => "heydealer",
            Site::Reborncar => "reborncar",
        }
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounded retry counts used by the listing and detail stages.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts to reach the listing page (fatal when exhausted)
    pub navigation_attempts: usize,
    /// Fixed pause between navigation attempts
    pub navigation_interval: Duration,
    /// Attempts per detail page, reloads included
    pub detail_attempts: usize,
    /// Core fields required for a detail pass to count as filled
    pub min_core_fields: usize,
    /// Consecutive zero-new load triggers that end listing collection
    pub idle_rounds: usize,
    /// Attempts to select a partition before skipping it
    pub partition_attempts: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            navigation_attempts: NAVIGATION_ATTEMPTS,
            navigation_interval: NAVIGATION_RETRY_INTERVAL,
            detail_attempts: DETAIL_ATTEMPTS,
            min_core_fields: MIN_CORE_FIELDS,
            idle_rounds: IDLE_ROUNDS,
            partition_attempts: PARTITION_SELECT_ATTEMPTS,
        }
    }
}

/// Fixed waits inserted to let client-side rendering settle.
#[derive(Debug, Clone)]
pub struct Delays {
    /// After a navigation or reload
    pub settle: Duration,
    /// After a scroll-to-bottom (or next page) trigger
    pub load_trigger: Duration,
    /// Debounce before confirming an unchanged page height
    pub height_recheck: Duration,
    /// Between incremental scroll steps on a detail page
    pub scroll_step: Duration,
    /// Between clicks on filter controls
    pub click: Duration,
    /// Between detail attempts
    pub retry_interval: Duration,
}

impl Delays {
    /// Zero waits everywhere. Used by tests driving a scripted page.
    pub fn none() -> Self {
        Self {
            settle: Duration::ZERO,
            load_trigger: Duration::ZERO,
            height_recheck: Duration::ZERO,
            scroll_step: Duration::ZERO,
            click: Duration::ZERO,
            retry_interval: Duration::ZERO,
        }
    }
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            settle: SETTLE_WAIT,
            load_trigger: LOAD_TRIGGER_WAIT,
            height_recheck: HEIGHT_RECHECK_WAIT,
            scroll_step: SCROLL_STEP_WAIT,
            click: CLICK_WAIT,
            retry_interval: RETRY_INTERVAL,
        }
    }
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without any CLI dependencies.
///
/// # Examples
///
/// ```no_run
/// use used_car_crawler::{Config, Site};
///
/// let config = Config {
///     site: Site::Reborncar,
///     target: Some(20),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Marketplace to crawl
    pub site: Site,

    /// Items to collect per partition (`None` = until the listing is exhausted)
    pub target: Option<usize>,

    /// Listing URL override (defaults to the site profile's listing page)
    pub listing_url: Option<String>,

    /// Root directory for CSV results
    pub result_dir: PathBuf,

    /// Root directory for downloaded images
    pub image_dir: PathBuf,

    /// Root directory for run logs
    pub log_dir: PathBuf,

    /// W3C WebDriver endpoint
    pub webdriver_url: String,

    /// Run the browser without a window
    pub headless: bool,

    /// Append to existing list/detail CSVs instead of starting fresh
    pub keep_existing: bool,

    /// Download detail-page images
    pub download_images: bool,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Retry budgets
    pub retry: RetryPolicy,

    /// Rendering waits
    pub delays: Delays,
}

impl Config {
    /// `<result_dir>/<site>`
    pub fn site_result_dir(&self) -> PathBuf {
        self.result_dir.join(self.site.as_str())
    }

    /// `<image_dir>/<site>`
    pub fn site_image_dir(&self) -> PathBuf {
        self.image_dir.join(self.site.as_str())
    }

    /// `<log_dir>/<site>/<site>_list_detail.log`
    pub fn log_file(&self) -> PathBuf {
        self.log_dir
            .join(self.site.as_str())
            .join(format!("{}_list_detail.log", self.site.as_str()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: Site::Heydealer,
            target: None,
            listing_url: None,
            result_dir: PathBuf::from(DEFAULT_RESULT_DIR),
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            headless: false,
            keep_existing: false,
            download_images: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            retry: RetryPolicy::default(),
            delays: Delays::default(),
        }
    }
}

/// Command-line interface.
#[derive(Debug, Parser)]
#[command(
    name = "used_car_crawler",
    version,
    about = "Collects used-car listings, details and photos into CSV files"
)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Collect listing and detail rows for one site
    #[command(name = "crawl")]
    Crawl(CrawlArgs),
    /// Download the heydealer brand/model taxonomy used for brand joins
    #[command(name = "taxonomy")]
    Taxonomy(TaxonomyArgs),
}

/// Options for `crawl`.
#[derive(Debug, Args)]
pub struct CrawlArgs {
    /// Site to crawl
    #[arg(value_enum)]
    pub site: Site,

    /// Items per partition; omit to scroll until the listing is exhausted
    #[arg(long)]
    pub target: Option<usize>,

    /// Override the listing page URL
    #[arg(long)]
    pub listing_url: Option<String>,

    /// Root directory for CSV results
    #[arg(long, default_value = DEFAULT_RESULT_DIR)]
    pub result_dir: PathBuf,

    /// Root directory for downloaded images
    #[arg(long, default_value = DEFAULT_IMAGE_DIR)]
    pub image_dir: PathBuf,

    /// Root directory for run logs
    #[arg(long, default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,

    /// WebDriver endpoint (chromedriver --port=4444)
    #[arg(long, env = "WEBDRIVER_URL", default_value = DEFAULT_WEBDRIVER_URL)]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Keep previous list/detail CSVs and append to them
    #[arg(long)]
    pub keep_existing: bool,

    /// Skip image downloads
    #[arg(long)]
    pub no_images: bool,

    /// User-Agent for the browser and image downloads
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Attempts per detail page, reloads included
    #[arg(long, default_value_t = DETAIL_ATTEMPTS)]
    pub detail_attempts: usize,

    /// Core detail fields required before a pass is accepted
    #[arg(long, default_value_t = MIN_CORE_FIELDS)]
    pub min_core_fields: usize,

    /// Consecutive load triggers without new items before stopping
    #[arg(long, default_value_t = IDLE_ROUNDS)]
    pub idle_rounds: usize,
}

/// Options for `taxonomy`.
#[derive(Debug, Args)]
pub struct TaxonomyArgs {
    /// Site whose taxonomy to collect
    #[arg(value_enum, default_value_t = Site::Heydealer)]
    pub site: Site,

    /// Root directory for CSV results
    #[arg(long, default_value = DEFAULT_RESULT_DIR)]
    pub result_dir: PathBuf,

    /// Root directory for run logs
    #[arg(long, default_value = DEFAULT_LOG_DIR)]
    pub log_dir: PathBuf,

    /// Base URL of the car-meta API
    #[arg(long, default_value = crate::taxonomy::HEYDEALER_CAR_META_API)]
    pub api_base: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = TAXONOMY_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// WebDriver endpoint, for sites walked in the browser
    #[arg(long, env = "WEBDRIVER_URL", default_value = DEFAULT_WEBDRIVER_URL)]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// User-Agent for the browser and image downloads
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl From<CrawlArgs> for Config {
    fn from(args: CrawlArgs) -> Self {
        Self {
            site: args.site,
            target: args.target,
            listing_url: args.listing_url,
            result_dir: args.result_dir,
            image_dir: args.image_dir,
            log_dir: args.log_dir,
            webdriver_url: args.webdriver_url,
            headless: args.headless,
            keep_existing: args.keep_existing,
            download_images: !args.no_images,
            user_agent: args.user_agent,
            log_level: args.log_level,
            log_format: args.log_format,
            retry: RetryPolicy {
                detail_attempts: args.detail_attempts.max(1),
                min_core_fields: args.min_core_fields,
                idle_rounds: args.idle_rounds.max(1),
                ..RetryPolicy::default()
            },
            delays: Delays::default(),
        }
    }
}
