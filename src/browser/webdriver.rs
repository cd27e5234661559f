//! `fantoccini` implementation of [`PageDriver`].

use std::time::Duration;

use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use log::{debug, info};
use serde_json::{json, Map, Value};

use super::PageDriver;
use crate::error_handling::{BrowserError, InitializationError};

const HIDE_WEBDRIVER: &str =
    "Object.defineProperty(navigator, 'webdriver', { get: () => undefined });";

/// W3C "Escape" key code.
const ESCAPE: &str = "\u{e00c}";

impl From<CmdError> for BrowserError {
    fn from(e: CmdError) -> Self {
        let message = e.to_string();
        if message.contains("invalid session id") {
            return BrowserError::SessionClosed;
        }
        BrowserError::Command(message)
    }
}

/// A Chrome session over a W3C WebDriver endpoint.
pub struct WebDriverPage {
    client: Client,
}

fn chrome_capabilities(headless: bool, user_agent: &str) -> Map<String, Value> {
    let mut args = vec![
        "--window-size=1920,1080".to_string(),
        "--lang=ko-KR".to_string(),
        "--disable-blink-features=AutomationControlled".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        format!("--user-agent={user_agent}"),
    ];
    if headless {
        args.push("--headless=new".to_string());
    }
    let mut caps = Map::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": args, "excludeSwitches": ["enable-automation"] }),
    );
    caps
}

impl WebDriverPage {
    /// Opens a browser session.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::WebDriverError` if the endpoint refuses a
    /// new session (driver not running, browser missing).
    pub async fn connect(
        webdriver_url: &str,
        headless: bool,
        user_agent: &str,
    ) -> Result<Self, InitializationError> {
        let client = ClientBuilder::native()
            .capabilities(chrome_capabilities(headless, user_agent))
            .connect(webdriver_url)
            .await
            .map_err(|e| InitializationError::WebDriverError(e.to_string()))?;
        info!("WebDriver session opened at {}", webdriver_url);
        Ok(Self { client })
    }

    /// Ends the session and closes the browser.
    pub async fn close(self) -> Result<(), BrowserError> {
        self.client.close().await?;
        Ok(())
    }

    async fn mask_automation(&mut self) {
        if let Err(e) = self.client.execute(HIDE_WEBDRIVER, vec![]).await {
            debug!("webdriver mask script failed: {}", e);
        }
    }
}

impl PageDriver for WebDriverPage {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.client
            .goto(url)
            .await
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        self.mask_automation().await;
        Ok(())
    }

    async fn reload(&mut self) -> Result<(), BrowserError> {
        self.client.refresh().await?;
        self.mask_automation().await;
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> bool {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
            .is_ok()
    }

    async fn scroll_to(&mut self, y: u64) -> Result<(), BrowserError> {
        self.client
            .execute("window.scrollTo(0, arguments[0]);", vec![json!(y)])
            .await?;
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), BrowserError> {
        self.client
            .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
            .await?;
        Ok(())
    }

    async fn scroll_height(&mut self) -> Result<u64, BrowserError> {
        let value = self
            .client
            .execute("return document.body.scrollHeight;", vec![])
            .await?;
        Ok(value
            .as_u64()
            .or_else(|| value.as_f64().map(|h| h.max(0.0) as u64))
            .unwrap_or(0))
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        Ok(self.client.source().await?)
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn click_nth(&mut self, selector: &str, index: usize) -> Result<bool, BrowserError> {
        let elements = self.client.find_all(Locator::Css(selector)).await?;
        let Some(element) = elements.into_iter().nth(index) else {
            return Ok(false);
        };
        if let Err(e) = element.click().await {
            // covered or off-screen elements still take a script click
            debug!("native click on {} failed ({}), using script click", selector, e);
            let arg = serde_json::to_value(&element)
                .map_err(|e| BrowserError::Command(e.to_string()))?;
            self.client
                .execute("arguments[0].click();", vec![arg])
                .await?;
        }
        Ok(true)
    }

    async fn dismiss(&mut self) -> Result<(), BrowserError> {
        let body = self.client.find(Locator::Css("body")).await?;
        body.send_keys(ESCAPE).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_capabilities() {
        let caps = chrome_capabilities(true, "UA/1.0");
        let args = caps["goog:chromeOptions"]["args"]
            .as_array()
            .expect("args array");
        assert!(args.contains(&json!("--headless=new")));
        assert!(args.contains(&json!("--user-agent=UA/1.0")));
        assert!(args.contains(&json!("--window-size=1920,1080")));

        let caps = chrome_capabilities(false, "UA/1.0");
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(!args.contains(&json!("--headless=new")));
    }
}
