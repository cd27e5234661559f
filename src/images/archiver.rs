//! Image downloads.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use futures::StreamExt;
use log::{debug, info, warn};
use reqwest::header::REFERER;
use reqwest::Client;
use tokio::io::AsyncWriteExt;

use super::discover::{fallback_sources, region_sources, sweep_sources};
use crate::app::resolve_src;
use crate::browser::PageDriver;
use crate::config::{
    DATE_FORMAT, DEFAULT_IMAGE_EXTENSION, IMAGE_DOWNLOAD_TIMEOUT_SECS, MAX_IMAGE_EXTENSION_LEN,
    MIN_IMAGE_EXTENSION_LEN,
};
use crate::error_handling::{ImageError, InfoType, ProcessingStats, WarningType};
use crate::site::ImageSpec;

/// File extension for an image URL.
///
/// Takes the text after the last `.` and before any `?`, lowercased. Anything
/// that is not 2 to 4 ASCII alphanumerics (a query fragment, a path segment)
/// falls back to `jpg`.
pub fn image_extension(url: &str) -> String {
    let candidate = url
        .rsplit('.')
        .next()
        .and_then(|tail| tail.split('?').next())
        .unwrap_or("")
        .to_ascii_lowercase();
    let plausible = (MIN_IMAGE_EXTENSION_LEN..=MAX_IMAGE_EXTENSION_LEN).contains(&candidate.len())
        && candidate.chars().all(|c| c.is_ascii_alphanumeric());
    if url.contains('.') && plausible {
        candidate
    } else {
        DEFAULT_IMAGE_EXTENSION.to_string()
    }
}

/// Per-visit download state: the URLs already settled (saved, or failed for
/// good) and the next file index. Shared across reload attempts of the same
/// detail page.
#[derive(Debug)]
pub struct ImageVisit {
    code: String,
    seen: HashSet<String>,
    next_index: usize,
    saved: usize,
    failed: usize,
}

impl ImageVisit {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            seen: HashSet::new(),
            next_index: 1,
            saved: 0,
            failed: 0,
        }
    }

    pub fn saved(&self) -> usize {
        self.saved
    }

    pub fn failed(&self) -> usize {
        self.failed
    }
}

/// Downloads images for one site into `<root>/<YYYY>년/<YYYYMMDD>/`.
#[derive(Debug, Clone)]
pub struct ImageArchiver {
    client: Client,
    root: PathBuf,
    referer: String,
    timeout: Duration,
    collected: DateTime<Local>,
}

impl ImageArchiver {
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `site_root` - `<image_dir>/<site>`
    /// * `referer` - Sent with every request (the site base URL)
    pub fn new(client: Client, site_root: impl Into<PathBuf>, referer: &str) -> Self {
        Self {
            client,
            root: site_root.into(),
            referer: referer.to_string(),
            timeout: Duration::from_secs(IMAGE_DOWNLOAD_TIMEOUT_SECS),
            collected: Local::now(),
        }
    }

    /// Pins the date used for the directory partition.
    pub fn with_date(mut self, collected: DateTime<Local>) -> Self {
        self.collected = collected;
        self
    }

    /// `<root>/<YYYY>년/<YYYYMMDD>`
    pub fn dated_dir(&self) -> PathBuf {
        self.root
            .join(format!("{}년", self.collected.format("%Y")))
            .join(self.collected.format(DATE_FORMAT).to_string())
    }

    /// Starts a visit for item `code`.
    pub fn visit(&self, code: &str) -> ImageVisit {
        ImageVisit::new(code)
    }

    /// Saves one image.
    ///
    /// Vector assets and URLs already settled in this visit are skipped
    /// (`Ok(None)`). The file index advances only when a file is written. A
    /// URL that failed with a retryable error stays eligible for the next
    /// attempt.
    ///
    /// # Errors
    ///
    /// Returns `ImageError` when the request fails, the status is not a
    /// success, or the file cannot be written. Partial files are removed.
    pub async fn save(
        &self,
        visit: &mut ImageVisit,
        url: &str,
    ) -> Result<Option<PathBuf>, ImageError> {
        if url.to_ascii_lowercase().contains("svg") || visit.seen.contains(url) {
            return Ok(None);
        }
        let dir = self.dated_dir();
        let path = dir.join(format!(
            "{}_{}.{}",
            visit.code,
            visit.next_index,
            image_extension(url)
        ));
        match self.download(url, &dir, &path).await {
            Ok(()) => {
                visit.seen.insert(url.to_string());
                visit.next_index += 1;
                visit.saved += 1;
                debug!("Saved image {}", path.display());
                Ok(Some(path))
            }
            Err(e) => {
                visit.failed += 1;
                if !e.is_retryable() {
                    visit.seen.insert(url.to_string());
                }
                if let Err(rm) = tokio::fs::remove_file(&path).await {
                    if rm.kind() != std::io::ErrorKind::NotFound {
                        debug!("Could not remove partial image {}: {}", path.display(), rm);
                    }
                }
                Err(e)
            }
        }
    }

    async fn download(&self, url: &str, dir: &Path, path: &Path) -> Result<(), ImageError> {
        let response = self
            .client
            .get(url)
            .header(REFERER, &self.referer)
            .timeout(self.timeout)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ImageError::Status(response.status().as_u16()));
        }
        tokio::fs::create_dir_all(dir).await?;
        let mut file = tokio::fs::File::create(path).await?;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        Ok(())
    }

    async fn save_all(
        &self,
        visit: &mut ImageVisit,
        page_url: &str,
        sources: Vec<String>,
        stats: &ProcessingStats,
    ) -> usize {
        let mut saved = 0;
        for src in sources {
            let Some(url) = resolve_src(page_url, &src) else {
                continue;
            };
            match self.save(visit, &url).await {
                Ok(Some(_)) => {
                    saved += 1;
                    stats.increment_info(InfoType::ImageSaved);
                }
                Ok(None) => {}
                Err(e) => {
                    debug!("Image download failed for {}: {}", url, e);
                    stats.increment_warning(WarningType::ImageDownload);
                }
            }
        }
        saved
    }

    /// Archives the images of the detail page currently loaded in `page`.
    ///
    /// Regions are tried first. The fallback selectors and the sweep run only
    /// while the visit has saved nothing; the sweep scrolls to the bottom and
    /// takes a fresh snapshot so lazy images have a chance to load.
    ///
    /// # Returns
    ///
    /// Number of files written by this call.
    #[allow(clippy::too_many_arguments)]
    pub async fn archive_page<P: PageDriver>(
        &self,
        page: &mut P,
        content: &str,
        page_url: &str,
        spec: &ImageSpec,
        visit: &mut ImageVisit,
        settle: Duration,
        stats: &ProcessingStats,
    ) -> usize {
        let mut saved = self
            .save_all(visit, page_url, region_sources(content, spec), stats)
            .await;

        if visit.saved == 0 && !spec.fallback.is_empty() {
            saved += self
                .save_all(visit, page_url, fallback_sources(content, spec.fallback), stats)
                .await;
        }

        if visit.saved == 0 && !spec.sweep_hints.is_empty() {
            if let Err(e) = page.scroll_to_bottom().await {
                debug!("sweep scroll failed: {}", e);
            }
            page.pause(settle).await;
            match page.content().await {
                Ok(fresh) => {
                    saved += self
                        .save_all(visit, page_url, sweep_sources(&fresh, spec.sweep_hints), stats)
                        .await;
                }
                Err(e) => warn!("Image sweep snapshot failed: {}", e),
            }
        }

        if saved > 0 {
            info!("images saved for {}: {}", visit.code, saved);
        }
        saved
    }
}
