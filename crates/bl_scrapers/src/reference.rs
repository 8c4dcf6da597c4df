use bl_core::text::{collapse_whitespace, truncate_chars};
use bl_core::{Limits, ReferenceDocument, Result};
use reqwest::Client;
use scraper::{ElementRef, Html, Node};
use tracing::{info, warn};

use crate::browser::DESKTOP_USER_AGENT;
use crate::selectors::{parse_selector, SelectorCascade};

pub const STRIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "iframe", "noscript",
];

pub const REFERENCE_SELECTORS: &[&str] = &[
    "article",
    ".post-content",
    ".entry-content",
    ".content",
    "main",
    ".article-content",
];

fn is_stripped(element: &ElementRef<'_>) -> bool {
    STRIPPED_ELEMENTS.contains(&element.value().name())
}

fn inside_stripped(element: &ElementRef<'_>) -> bool {
    is_stripped(element) || element.ancestors().filter_map(ElementRef::wrap).any(|a| is_stripped(&a))
}

/// Text content of `element`, skipping every stripped subtree.
fn visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    if !is_stripped(&child) {
                        visible_text(child, out);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Plain HTTP fetch of a reference page, no rendering.
pub struct ReferenceContentFetcher {
    client: Client,
    cascade: SelectorCascade,
    limits: Limits,
}

impl ReferenceContentFetcher {
    pub fn new(limits: Limits) -> Result<Self> {
        let client = Client::builder()
            .timeout(limits.reference_timeout)
            .user_agent(DESKTOP_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            cascade: SelectorCascade::parse(REFERENCE_SELECTORS)?,
            limits,
        })
    }

    /// Readable text of a page: the first matching content selector, else the
    /// whole body, with whitespace collapsed and truncated.
    pub fn extract(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let mut text = String::new();

        if let Some((_, elements)) = self.cascade.first_match(&document, |el| !inside_stripped(el)) {
            for element in elements {
                visible_text(element, &mut text);
            }
        }

        if text.trim().is_empty() {
            text.clear();
            if let Ok(body) = parse_selector("body") {
                if let Some(body) = document.select(&body).next() {
                    visible_text(body, &mut text);
                }
            }
        }

        truncate_chars(&collapse_whitespace(&text), self.limits.reference_chars)
    }

    async fn try_fetch(&self, url: &str) -> Result<String> {
        let html = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(self.extract(&html))
    }

    /// Extracted text, or an empty string on any failure.
    pub async fn fetch(&self, url: &str) -> String {
        info!("📥 Scraping: {}", url);
        match self.try_fetch(url).await {
            Ok(text) => text,
            Err(e) => {
                warn!("⚠️ Error scraping {}: {}", url, e);
                String::new()
            }
        }
    }

    /// A usable reference, or `None` when nothing could be extracted.
    pub async fn fetch_document(&self, url: &str) -> Option<ReferenceDocument> {
        let content = self.fetch(url).await;
        if content.is_empty() {
            return None;
        }
        Some(ReferenceDocument {
            url: url.to_string(),
            content,
        })
    }
}
