//! Browser seam.
//!
//! The collectors drive a page through [`PageDriver`] and read the DOM only
//! from HTML snapshots (`content`), which are parsed with `scraper`. The
//! production implementation is [`WebDriverPage`]; tests script a fake page.

mod webdriver;

use std::time::Duration;

use log::warn;
use scraper::Html;

pub use webdriver::WebDriverPage;

use crate::config::RetryPolicy;
use crate::error_handling::{navigation_retry_strategy, BrowserError};
use crate::site::TextMatch;
use crate::utils::select_texts;

/// Operations the crawler needs from a rendered page.
#[allow(async_fn_in_trait)]
pub trait PageDriver {
    /// Navigates to `url` and waits for the document to load.
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Reloads the current page.
    async fn reload(&mut self) -> Result<(), BrowserError>;

    /// Waits up to `timeout` for `selector` to match. Returns whether it did.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> bool;

    async fn scroll_to(&mut self, y: u64) -> Result<(), BrowserError>;

    async fn scroll_to_bottom(&mut self) -> Result<(), BrowserError>;

    /// Current document scroll height in pixels.
    async fn scroll_height(&mut self) -> Result<u64, BrowserError>;

    /// Snapshot of the current DOM as HTML.
    async fn content(&mut self) -> Result<String, BrowserError>;

    async fn current_url(&mut self) -> Result<String, BrowserError>;

    /// Clicks the `index`-th element matching `selector`. Returns `false` when
    /// there is no such element.
    async fn click_nth(&mut self, selector: &str, index: usize) -> Result<bool, BrowserError>;

    /// Closes overlays (Escape key).
    async fn dismiss(&mut self) -> Result<(), BrowserError>;

    async fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    /// Clicks the first element matching `selector`.
    async fn click(&mut self, selector: &str) -> Result<bool, BrowserError> {
        self.click_nth(selector, 0).await
    }

    /// Texts of every element matching `selector`.
    async fn texts(&mut self, selector: &str) -> Result<Vec<String>, BrowserError> {
        let html = self.content().await?;
        Ok(select_texts(&Html::parse_document(&html), selector))
    }

    /// Clicks the first element matching `selector` whose text matches.
    async fn click_text(&mut self, selector: &str, text: &TextMatch) -> Result<bool, BrowserError> {
        let texts = self.texts(selector).await?;
        match texts.iter().position(|t| text.matches(t)) {
            Some(index) => self.click_nth(selector, index).await,
            None => Ok(false),
        }
    }
}

/// Navigates with a bounded number of attempts on a fixed interval.
///
/// # Errors
///
/// Returns the last navigation error once every attempt has failed.
pub async fn goto_with_retry<P: PageDriver>(
    page: &mut P,
    url: &str,
    policy: &RetryPolicy,
) -> Result<(), BrowserError> {
    let mut delays = navigation_retry_strategy(policy);
    let mut attempt = 1;
    loop {
        match page.goto(url).await {
            Ok(()) => return Ok(()),
            Err(e) => match delays.next() {
                Some(delay) => {
                    warn!("Navigation attempt {} to {} failed: {}", attempt, url, e);
                    attempt += 1;
                    page.pause(delay).await;
                }
                None => return Err(e),
            },
        }
    }
}
