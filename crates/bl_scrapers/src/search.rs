use bl_core::{Limits, Result};
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{info, warn};
use url::Url;

use crate::browser::Browser;
use crate::selectors::parse_selector;

pub const DEFAULT_SEARCH_URL: &str = "https://www.google.com/search";
pub const DEFAULT_QUERY_SUFFIX: &str = " blog article";
pub const RESULT_CONTAINERS: &[&str] = &["div[data-sokoban-container]", ".g"];
pub const EXCLUDED_DOMAINS: &[&str] = &[
    "youtube.com",
    "facebook.com",
    "twitter.com",
    "linkedin.com",
    "instagram.com",
];

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub search_url: String,
    pub query_suffix: String,
    pub result_containers: Vec<String>,
    pub excluded_domains: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            query_suffix: DEFAULT_QUERY_SUFFIX.to_string(),
            result_containers: RESULT_CONTAINERS.iter().map(|s| s.to_string()).collect(),
            excluded_domains: EXCLUDED_DOMAINS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// True when `host` is `domain` or one of its subdomains.
fn host_matches(host: &str, domain: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let domain = domain.trim_start_matches("www.").to_ascii_lowercase();
    host == domain || host.ends_with(&format!(".{}", domain))
}

/// Finds competing pages for an article title by scraping a rendered
/// search-results page.
pub struct ReferenceSearcher {
    search_url: Url,
    engine_domain: String,
    query_suffix: String,
    result_links: Selector,
    excluded_domains: Vec<String>,
    max_results: usize,
}

impl ReferenceSearcher {
    pub fn new(config: SearchConfig, limits: &Limits) -> Result<Self> {
        let search_url = Url::parse(&config.search_url)?;
        let engine_domain = search_url
            .host_str()
            .map(|host| host.trim_start_matches("www.").to_string())
            .unwrap_or_default();
        let result_links = config
            .result_containers
            .iter()
            .map(|container| format!("{} a[href]", container))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(Self {
            search_url,
            engine_domain,
            query_suffix: config.query_suffix,
            result_links: parse_selector(&result_links)?,
            excluded_domains: config.excluded_domains,
            max_results: limits.max_references,
        })
    }

    pub fn query_url(&self, title: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", &format!("{}{}", title, self.query_suffix));
        url
    }

    fn is_excluded(&self, url: &Url) -> bool {
        url.host_str().map_or(true, |host| {
            self.excluded_domains.iter().any(|domain| host_matches(host, domain))
        })
    }

    /// Outbound result links in discovery order: absolute http(s), off the
    /// search engine's domain, inside a result container, deduplicated, minus
    /// excluded domains, capped.
    pub fn extract_links(&self, html: &str, page_url: &Url) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for anchor in document.select(&self.result_links) {
            let Some(url) = anchor
                .value()
                .attr("href")
                .and_then(|href| page_url.join(href.trim()).ok())
            else {
                continue;
            };
            if !matches!(url.scheme(), "http" | "https") {
                continue;
            }
            let Some(host) = url.host_str() else {
                continue;
            };
            if !self.engine_domain.is_empty() && host_matches(host, &self.engine_domain) {
                continue;
            }
            if seen.insert(url.to_string()) {
                links.push(url);
            }
        }

        links
            .into_iter()
            .filter(|url| !self.is_excluded(url))
            .map(String::from)
            .take(self.max_results)
            .collect()
    }

    async fn try_search(&self, browser: &dyn Browser, title: &str) -> Result<Vec<String>> {
        let query_url = self.query_url(title);
        browser.goto(query_url.as_str()).await?;
        let html = browser.html().await?;
        let page_url = browser
            .current_url()
            .await
            .ok()
            .and_then(|url| Url::parse(&url).ok())
            .unwrap_or(query_url);
        Ok(self.extract_links(&html, &page_url))
    }

    /// Best effort: any failure yields an empty list.
    pub async fn search(&self, browser: &dyn Browser, title: &str) -> Vec<String> {
        info!("🔍 Searching for: {}{}", title, self.query_suffix);
        match self.try_search(browser, title).await {
            Ok(links) => {
                info!("✨ Found {} top links", links.len());
                links
            }
            Err(e) => {
                warn!("⚠️ Search for '{}' failed: {}", title, e);
                Vec::new()
            }
        }
    }
}
