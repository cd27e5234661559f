// Shared test helpers: a scripted page and fixture builders.
//
// `FakePage` implements `PageDriver` over canned HTML so the listing and
// detail stages can be driven without a browser.

#![allow(dead_code)] // Each test file uses a different subset

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use scraper::{Html, Selector};
use used_car_crawler::config::{Config, Delays, RetryPolicy, Site};
use used_car_crawler::error_handling::BrowserError;
use used_car_crawler::PageDriver;

pub const LISTING_URL: &str = "https://www.heydealer.com/market/cars";

/// A page that serves scripted listing frames and detail documents.
///
/// - Listing: `frames[frame]` is the current DOM. Each scroll-to-bottom (or a
///   click on one of `next_selectors`) advances one frame until the last.
/// - Detail: `details[url][n]` is the DOM after the n-th load of `url`
///   (the last entry repeats). URLs in `broken` fail to load.
#[derive(Debug, Default)]
pub struct FakePage {
    pub listing_url: String,
    pub frames: Vec<String>,
    pub frame: usize,
    /// Report a taller page after every trigger even when no frame is left
    pub growing_height: bool,
    pub next_selectors: Vec<String>,
    pub details: HashMap<String, Vec<String>>,
    pub broken: HashSet<String>,
    pub on_listing: bool,
    pub current: String,
    pub loads: HashMap<String, usize>,
    pub triggers: usize,
    pub gotos: Vec<String>,
    pub reloads: usize,
    pub clicks: Vec<String>,
}

impl FakePage {
    pub fn listing(frames: Vec<String>) -> Self {
        Self {
            listing_url: LISTING_URL.to_string(),
            frames,
            ..Default::default()
        }
    }

    pub fn with_detail(mut self, url: &str, loads: Vec<String>) -> Self {
        self.details.insert(url.to_string(), loads);
        self
    }

    pub fn with_broken(mut self, url: &str) -> Self {
        self.broken.insert(url.to_string());
        self
    }

    fn advance(&mut self) -> bool {
        self.triggers += 1;
        if self.frame + 1 < self.frames.len() {
            self.frame += 1;
            true
        } else {
            false
        }
    }

    fn html(&self) -> String {
        if self.on_listing {
            return self.frames.get(self.frame).cloned().unwrap_or_default();
        }
        let loads = self.loads.get(&self.current).copied().unwrap_or(1);
        self.details
            .get(&self.current)
            .and_then(|pages| pages.get(loads.saturating_sub(1).min(pages.len() - 1)))
            .cloned()
            .unwrap_or_else(|| "<html><body></body></html>".to_string())
    }

    fn count(&self, selector: &str) -> usize {
        let html = Html::parse_document(&self.html());
        Selector::parse(selector)
            .map(|s| html.select(&s).count())
            .unwrap_or(0)
    }
}

impl PageDriver for FakePage {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.gotos.push(url.to_string());
        if self.broken.contains(url) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_RESET".to_string(),
            });
        }
        self.on_listing = url == self.listing_url;
        self.current = url.to_string();
        *self.loads.entry(url.to_string()).or_insert(0) += 1;
        Ok(())
    }

    async fn reload(&mut self) -> Result<(), BrowserError> {
        self.reloads += 1;
        if self.broken.contains(&self.current) {
            return Err(BrowserError::Command("reload failed".to_string()));
        }
        *self.loads.entry(self.current.clone()).or_insert(0) += 1;
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> bool {
        self.count(selector) > 0
    }

    async fn scroll_to(&mut self, _y: u64) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), BrowserError> {
        if self.on_listing {
            self.advance();
        }
        Ok(())
    }

    async fn scroll_height(&mut self) -> Result<u64, BrowserError> {
        if !self.on_listing {
            return Ok(2400);
        }
        let step = if self.growing_height {
            self.triggers
        } else {
            self.frame
        };
        Ok(1000 * (step as u64 + 1))
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        Ok(self.html())
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        Ok(self.current.clone())
    }

    async fn click_nth(&mut self, selector: &str, index: usize) -> Result<bool, BrowserError> {
        self.clicks.push(format!("{selector}#{index}"));
        if self.on_listing && self.next_selectors.iter().any(|s| s == selector) {
            return Ok(self.advance());
        }
        Ok(index < self.count(selector))
    }

    async fn dismiss(&mut self) -> Result<(), BrowserError> {
        Ok(())
    }
}

/// A heydealer-style card.
pub fn heydealer_card(code: &str, model_name: &str, year_km: &str) -> String {
    format!(
        r#"<a href="/market/cars/{code}?from=list">
             <div class="css-9j6363">
               <span class="css-jk6asd">{model_name}</span>
               <span class="css-jk6asd">2.0 디젤</span>
               <span class="css-13wylk3">프레스티지</span>
             </div>
             <div class="css-6bza35">{year_km}</div>
             <div class="css-105xtr1"><div class="css-1066lcq"><div class="css-dbu2tk">2,990만원</div></div></div>
           </a>"#
    )
}

/// A listing document holding the given cards.
pub fn listing_page(cards: &[String]) -> String {
    format!(
        "<html><body><a href=\"/market/cars\">전체</a><div class=\"list\">{}</div></body></html>",
        cards.concat()
    )
}

/// Canonical heydealer detail URL for a code.
pub fn heydealer_url(code: &str) -> String {
    format!("https://www.heydealer.com/market/cars/{code}")
}

/// A heydealer detail document with the given label/value rows.
pub fn heydealer_detail(rows: &[(&str, &str)]) -> String {
    let rows: String = rows
        .iter()
        .map(|(label, value)| {
            format!(
                r#"<div class="css-113wzqa"><span class="css-1b7o1k1">{label}</span><span class="v">{value}</span></div>"#
            )
        })
        .collect();
    format!("<html><body><div class=\"css-12qft46\">{rows}</div></body></html>")
}

/// A configuration with zero waits writing under `root`.
pub fn test_config(site: Site, root: &Path) -> Config {
    Config {
        site,
        result_dir: root.join("result"),
        image_dir: root.join("imgs"),
        log_dir: root.join("logs"),
        download_images: false,
        retry: RetryPolicy {
            navigation_interval: Duration::ZERO,
            ..RetryPolicy::default()
        },
        delays: Delays::none(),
        ..Default::default()
    }
}

/// Reads a CSV written by the crate (BOM tolerated) into header + records.
pub fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let text = std::fs::read_to_string(path).expect("read csv");
    let text = text.trim_start_matches('\u{feff}');
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .expect("headers")
        .iter()
        .map(str::to_string)
        .collect();
    let records = reader
        .records()
        .map(|r| r.expect("record").iter().map(str::to_string).collect())
        .collect();
    (headers, records)
}

/// Value of `column` in `record`.
pub fn cell<'a>(headers: &[String], record: &'a [String], column: &str) -> &'a str {
    let i = headers
        .iter()
        .position(|h| h == column)
        .unwrap_or_else(|| panic!("no column {column}"));
    &record[i]
}
