//! used_car_crawler library: used-car listing, detail and photo collection
//!
//! This library drives a browser over a used-car marketplace listing,
//! collects every unique car into a list CSV, visits each car's detail page
//! for a detail CSV, and archives its photos. Marketplaces are described by
//! declarative [`site::SiteProfile`]s; heydealer and reborncar are built in.
//!
//! # Example
//!
//! ```no_run
//! use used_car_crawler::{run_crawl, Config, Site};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     site: Site::Heydealer,
//!     target: Some(50),
//!     headless: true,
//!     ..Default::default()
//! };
//!
//! let report = run_crawl(config).await?;
//! println!("Listed {} cars, {} detail pages read",
//!          report.listed, report.detail_success);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime and, for [`run_crawl`], a running
//! WebDriver server (e.g. `chromedriver --port=4444`).

mod app;
pub mod brand;
pub mod browser;
pub mod collect;
pub mod config;
pub mod error_handling;
pub mod export;
pub mod images;
pub mod initialization;
pub mod models;
pub mod site;
pub mod taxonomy;
mod utils;

// Re-export public API
pub use browser::{PageDriver, WebDriverPage};
pub use config::{Config, LogFormat, LogLevel, Site};
pub use run::{crawl_with_driver, run_crawl, CrawlReport};
pub use taxonomy::{
    collect_panel_taxonomy, collect_taxonomy, TaxonomyReport, HEYDEALER_CAR_META_API,
};

// Internal run module (contains the crawl orchestration)
mod run {
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    use anyhow::{Context, Result};
    use log::{info, warn};

    use crate::app::{print_error_statistics, print_run_summary};
    use crate::brand::{load_index_or_empty, BrandJoiner};
    use crate::browser::{PageDriver, WebDriverPage};
    use crate::collect::{DetailExtractor, ListingCollector};
    use crate::config::{Config, IMAGE_DOWNLOAD_TIMEOUT_SECS};
    use crate::error_handling::ProcessingStats;
    use crate::export::CsvAppendSink;
    use crate::images::ImageArchiver;
    use crate::initialization::init_client;
    use crate::site::{profile, SiteProfile};

    /// Results of a crawl run.
    #[derive(Debug, Clone)]
    pub struct CrawlReport {
        /// Listing items collected (rows in the list CSV)
        pub listed: usize,
        /// Rows written to the detail CSV
        pub detail_rows: usize,
        /// Detail pages that were actually read
        pub detail_success: usize,
        /// Image files written
        pub images_saved: usize,
        pub list_path: PathBuf,
        pub detail_path: PathBuf,
        /// Dated directory images were written to
        pub image_dir: PathBuf,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// Runs a crawl with the provided configuration.
    ///
    /// Opens a WebDriver session, runs [`crawl_with_driver`] with the built-in
    /// profile for `config.site`, and closes the session whatever the outcome.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The WebDriver session cannot be opened
    /// - The result directory cannot be prepared
    /// - The listing page cannot be reached after its retries
    pub async fn run_crawl(config: Config) -> Result<CrawlReport> {
        let mut page =
            WebDriverPage::connect(&config.webdriver_url, config.headless, &config.user_agent)
                .await
                .context("Failed to open WebDriver session")?;
        let result = crawl_with_driver(&mut page, profile(config.site), &config).await;
        if let Err(e) = page.close().await {
            warn!("Failed to close WebDriver session: {}", e);
        }
        result
    }

    /// Runs the listing and detail stages on an existing page.
    ///
    /// Per-item failures are absorbed into degraded rows; the detail CSV
    /// always ends up with one row per listed item.
    ///
    /// # Arguments
    ///
    /// * `page` - Page to drive (a WebDriver session, or a scripted page in tests)
    /// * `profile` - Site description
    /// * `config` - Run configuration
    pub async fn crawl_with_driver<P: PageDriver>(
        page: &mut P,
        profile: &SiteProfile,
        config: &Config,
    ) -> Result<CrawlReport> {
        let start_time = Instant::now();
        let result_dir = config.site_result_dir();
        std::fs::create_dir_all(&result_dir)
            .with_context(|| format!("Failed to create {}", result_dir.display()))?;

        let list_sink = CsvAppendSink::new(result_dir.join(profile.list_file), profile.list_columns);
        let detail_sink =
            CsvAppendSink::new(result_dir.join(profile.detail_file), profile.detail_columns);
        if config.keep_existing {
            info!("Appending to existing outputs in {}", result_dir.display());
        } else {
            list_sink.reset().context("Failed to remove previous list CSV")?;
            detail_sink
                .reset()
                .context("Failed to remove previous detail CSV")?;
        }

        let stats = ProcessingStats::new();
        let taxonomy_path = result_dir.join(profile.taxonomy.file_name);
        let index = load_index_or_empty(&taxonomy_path, &profile.taxonomy, &stats);
        let joiner = if index.is_empty() {
            BrandJoiner::disabled()
        } else {
            BrandJoiner::new(index, profile.taxonomy.strategies)
        };

        info!("Starting {} crawl", profile.site);
        let items = ListingCollector::new(profile, config, &joiner, &list_sink, &stats)?
            .collect(page)
            .await?;

        let archiver = if config.download_images {
            let client = init_client(
                &config.user_agent,
                Duration::from_secs(IMAGE_DOWNLOAD_TIMEOUT_SECS),
            )
            .context("Failed to initialize HTTP client")?;
            Some(ImageArchiver::new(
                client,
                config.site_image_dir(),
                profile.base_url,
            ))
        } else {
            None
        };
        let mut extractor = DetailExtractor::new(profile, config, &detail_sink, &stats);
        if let Some(archiver) = archiver.as_ref() {
            extractor = extractor.with_archiver(archiver);
        }
        let summary = extractor.extract_all(page, &items).await;

        let elapsed_seconds = start_time.elapsed().as_secs_f64();
        print_error_statistics(&stats);
        print_run_summary(
            items.len(),
            summary.rows,
            summary.images_saved,
            elapsed_seconds,
        );

        Ok(CrawlReport {
            listed: items.len(),
            detail_rows: summary.rows,
            detail_success: summary.success,
            images_saved: summary.images_saved,
            list_path: list_sink.path().to_path_buf(),
            detail_path: detail_sink.path().to_path_buf(),
            image_dir: archiver
                .as_ref()
                .map_or_else(|| config.site_image_dir(), ImageArchiver::dated_dir),
            elapsed_seconds,
        })
    }
}
