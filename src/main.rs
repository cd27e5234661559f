//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `used_car_crawler` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization (console plus run log)
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use std::path::Path;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use used_car_crawler::config::{Cli, Command, Delays, RetryPolicy, TaxonomyArgs};
use used_car_crawler::initialization::{init_client, init_logger_to_file};
use used_car_crawler::site::{profile, FilterPanelTaxonomy, SiteProfile, TaxonomySource};
use used_car_crawler::{
    collect_panel_taxonomy, collect_taxonomy, run_crawl, Config, TaxonomyReport, WebDriverPage,
};

async fn crawl(config: Config) -> Result<()> {
    init_logger_to_file(
        config.log_level.clone().into(),
        config.log_format.clone(),
        &config.log_file(),
    )
    .context("Failed to initialize logger")?;

    let report = run_crawl(config).await?;
    println!(
        "✅ Listed {} car{}, read {}/{} detail pages, saved {} image{} in {:.1}s",
        report.listed,
        if report.listed == 1 { "" } else { "s" },
        report.detail_success,
        report.detail_rows,
        report.images_saved,
        if report.images_saved == 1 { "" } else { "s" },
        report.elapsed_seconds
    );
    println!("List:   {}", report.list_path.display());
    println!("Detail: {}", report.detail_path.display());
    println!("Images: {}", report.image_dir.display());
    Ok(())
}

async fn panel_taxonomy(
    args: &TaxonomyArgs,
    profile: &SiteProfile,
    panel: &FilterPanelTaxonomy,
    path: &Path,
) -> Result<TaxonomyReport> {
    let mut page = WebDriverPage::connect(&args.webdriver_url, args.headless, &args.user_agent)
        .await
        .context("Failed to open WebDriver session")?;
    let result = collect_panel_taxonomy(
        &mut page,
        profile.listing_url,
        panel,
        &RetryPolicy::default(),
        &Delays::default(),
        path,
    )
    .await;
    if let Err(e) = page.close().await {
        log::warn!("Failed to close WebDriver session: {}", e);
    }
    result
}

async fn taxonomy(args: TaxonomyArgs) -> Result<()> {
    let site = args.site;
    let profile = profile(site);
    let log_file = args
        .log_dir
        .join(site.as_str())
        .join(format!("{}_brand_hierarchy.log", site.as_str()));
    init_logger_to_file(args.log_level.clone().into(), args.log_format.clone(), &log_file)
        .context("Failed to initialize logger")?;

    let site_dir = args.result_dir.join(site.as_str());
    std::fs::create_dir_all(&site_dir)
        .with_context(|| format!("Failed to create {}", site_dir.display()))?;
    let path = site_dir.join(profile.taxonomy.file_name);
    let report = match profile.taxonomy.source {
        TaxonomySource::CarMetaApi => {
            let client = init_client(&args.user_agent, Duration::from_secs(args.timeout_seconds))
                .context("Failed to initialize HTTP client")?;
            collect_taxonomy(&client, &args.api_base, &path).await?
        }
        TaxonomySource::FilterPanel(panel) => {
            panel_taxonomy(&args, profile, &panel, &path).await?
        }
    };
    println!(
        "✅ Collected {} model{} from {} brand{} ({} skipped)",
        report.models,
        if report.models == 1 { "" } else { "s" },
        report.brands,
        if report.brands == 1 { "" } else { "s" },
        report.skipped_requests,
    );
    println!("Results saved in {}", report.path.display());
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if it exists)
    // Try loading from current directory first, then from the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Crawl(args) => crawl(Config::from(args)).await,
        Command::Taxonomy(args) => taxonomy(args).await,
    };

    if let Err(e) = result {
        eprintln!("used_car_crawler error: {:#}", e);
        process::exit(1);
    }
}
