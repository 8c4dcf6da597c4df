//! Rendered-page access for the listing crawl, article pages and search results.
//!
//! A run holds exactly one [`Browser`] session and threads it through every
//! component that needs rendered markup. Extraction itself always happens on
//! the returned HTML, so components never touch the driver directly.

use async_trait::async_trait;
use bl_core::config::DEFAULT_NAVIGATION_TIMEOUT;
use bl_core::{Error, Result};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";
pub const DESKTOP_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[async_trait]
pub trait Browser: Send + Sync {
    /// Navigate the session to `url`
    async fn goto(&self, url: &str) -> Result<()>;

    /// Wait until at least one element matches `selector`
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Rendered markup of the current page
    async fn html(&self) -> Result<String>;

    /// URL of the current page, after redirects
    async fn current_url(&self) -> Result<String>;

    /// End the session
    async fn close(&self) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub user_agent: Option<String>,
    pub navigation_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            headless: true,
            user_agent: Some(DESKTOP_USER_AGENT.to_string()),
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
        }
    }
}

impl BrowserConfig {
    fn chrome_args(&self) -> Vec<String> {
        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        }
        if let Some(user_agent) = &self.user_agent {
            args.push(format!("--user-agent={}", user_agent));
        }
        args
    }
}

/// Headless Chrome driven through a WebDriver endpoint.
pub struct WebDriverBrowser {
    client: Client,
    navigation_timeout: Duration,
}

impl fmt::Debug for WebDriverBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDriverBrowser")
            .field("client", &"<fantoccini::Client>")
            .field("navigation_timeout", &self.navigation_timeout)
            .finish()
    }
}

impl WebDriverBrowser {
    pub async fn connect(config: &BrowserConfig) -> Result<Self> {
        let mut capabilities = serde_json::Map::new();
        capabilities.insert("browserName".to_string(), json!("chrome"));
        capabilities.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": config.chrome_args() }),
        );

        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| {
                Error::Browser(format!(
                    "Failed to open a session on {}: {}",
                    config.webdriver_url, e
                ))
            })?;
        info!("🌐 Browser session opened on {}", config.webdriver_url);

        Ok(Self {
            client,
            navigation_timeout: config.navigation_timeout,
        })
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        match tokio::time::timeout(self.navigation_timeout, self.client.goto(url)).await {
            Ok(result) => result.map_err(|e| Error::Browser(format!("Navigation to {} failed: {}", url, e))),
            Err(_) => Err(Error::Timeout(format!(
                "after {}s navigating to {}",
                self.navigation_timeout.as_secs(),
                url
            ))),
        }
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
            .map(|_| ())
            .map_err(|e| Error::Timeout(format!("waiting for '{}': {}", selector, e)))
    }

    async fn html(&self) -> Result<String> {
        self.client
            .source()
            .await
            .map_err(|e| Error::Browser(format!("Failed to read page source: {}", e)))
    }

    async fn current_url(&self) -> Result<String> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(|e| Error::Browser(format!("Failed to read current URL: {}", e)))
    }

    async fn close(&self) -> Result<()> {
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| Error::Browser(format!("Failed to close session: {}", e)))?;
        info!("🌐 Browser session closed");
        Ok(())
    }
}
