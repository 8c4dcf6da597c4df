use bl_core::text::truncate_chars;
use bl_core::{ArticleStub, Error, Limits, NewArticle, Result};
use scraper::Html;
use tracing::{info, warn};

use crate::browser::Browser;
use crate::selectors::SelectorCascade;

/// Most specific first.
pub const CONTENT_SELECTORS: &[&str] = &[
    ".entry-content",
    "article .content",
    ".post-content",
    "article p",
];

/// Loads each article page in the browser and pulls its body text.
pub struct ArticleContentFetcher {
    cascade: SelectorCascade,
    limits: Limits,
}

impl ArticleContentFetcher {
    pub fn new(limits: Limits) -> Result<Self> {
        Ok(Self {
            cascade: SelectorCascade::parse(CONTENT_SELECTORS)?,
            limits,
        })
    }

    /// Body text from the first content selector that matches, truncated.
    /// `None` when nothing matches or the match has no text.
    pub fn extract(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let (_, elements) = self.cascade.first_match(&document, |_| true)?;
        let text = elements.first()?.text().collect::<String>();
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(truncate_chars(text, self.limits.content_chars))
    }

    async fn try_fetch(&self, browser: &dyn Browser, url: &str) -> Result<String> {
        browser.goto(url).await?;
        let html = browser.html().await?;
        self.extract(&html)
            .ok_or_else(|| Error::Scraping(format!("No content selector matched on {}", url)))
    }

    /// Content for one stub. Never fails: any problem falls back to the excerpt.
    pub async fn fetch(&self, browser: &dyn Browser, stub: &ArticleStub) -> String {
        match self.try_fetch(browser, &stub.url).await {
            Ok(content) => {
                info!("📝 Scraped content for: {}", stub.title);
                content
            }
            Err(e) => {
                warn!("⚠️ Error scraping content for {}: {}", stub.title, e);
                stub.excerpt.clone()
            }
        }
    }

    /// Fetches content for every stub in order and builds creation payloads.
    pub async fn fetch_all(&self, browser: &dyn Browser, stubs: Vec<ArticleStub>) -> Vec<NewArticle> {
        let mut articles = Vec::with_capacity(stubs.len());
        for stub in stubs {
            let content = self.fetch(browser, &stub).await;
            articles.push(NewArticle::from_stub(stub, content));
        }
        articles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::FakeBrowser;
    use chrono::Utc;

    fn fetcher() -> ArticleContentFetcher {
        ArticleContentFetcher::new(Limits::default()).unwrap()
    }

    fn stub(title: &str, url: &str, excerpt: &str) -> ArticleStub {
        ArticleStub {
            title: title.to_string(),
            url: url.to_string(),
            excerpt: excerpt.to_string(),
            image: String::new(),
            date: String::new(),
            scraped_at: Utc::now(),
        }
    }

    #[test]
    fn test_most_specific_selector_wins() {
        let html = r#"<article>
            <p>Lead paragraph</p>
            <div class="post-content">Post content</div>
            <div class="entry-content">  Entry content  </div>
        </article>"#;
        assert_eq!(fetcher().extract(html).as_deref(), Some("Entry content"));
    }

    #[test]
    fn test_falls_through_to_article_paragraph() {
        let html = "<article><p>First</p><p>Second</p></article>";
        assert_eq!(fetcher().extract(html).as_deref(), Some("First"));
    }

    #[test]
    fn test_content_is_truncated() {
        let html = format!(r#"<div class="entry-content">{}</div>"#, "é".repeat(6000));
        let content = fetcher().extract(&html).unwrap();
        assert_eq!(content.chars().count(), 5000);
    }

    #[tokio::test]
    async fn test_no_match_falls_back_to_excerpt() {
        let browser = FakeBrowser::new().with_page("http://x/a", "<div>Nothing useful</div>");
        let stub = stub("A", "http://x/a", "The excerpt");
        let articles = fetcher().fetch_all(&browser, vec![stub]).await;
        assert_eq!(articles[0].content, "The excerpt");
        assert_eq!(articles[0].original_content, "The excerpt");
    }

    #[tokio::test]
    async fn test_navigation_failure_does_not_abort_batch() {
        let browser = FakeBrowser::new()
            .with_page("http://x/b", r#"<div class="entry-content">Body B</div>"#);
        let stubs = vec![
            stub("A", "http://x/unreachable", "Excerpt A"),
            stub("B", "http://x/b", "Excerpt B"),
        ];
        let articles = fetcher().fetch_all(&browser, stubs).await;
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].content, "Excerpt A");
        assert_eq!(articles[1].content, "Body B");
        assert_eq!(articles[1].original_content, "Body B");
    }

    #[tokio::test]
    async fn test_empty_match_falls_back_to_excerpt() {
        let browser = FakeBrowser::new().with_page("http://x/c", r#"<div class="entry-content">   </div>"#);
        let content = fetcher().fetch(&browser, &stub("C", "http://x/c", "Excerpt C")).await;
        assert_eq!(content, "Excerpt C");
    }
}
