use bl_core::text::truncate_chars;
use bl_core::{ArticleStub, Limits, Result};
use chrono::Utc;
use scraper::{Html, Selector};
use tracing::info;
use url::Url;

use crate::browser::Browser;
use crate::selectors::{first_text, parse_selector};

pub const DEFAULT_BLOG_URL: &str = "https://beyondchats.com/blogs/";

const ARTICLE_SELECTOR: &str = "article";
const PAGER_SELECTOR: &str = ".page-numbers";
const TITLE_SELECTOR: &str = "h3 a, h2 a, .entry-title a";
const LINK_SELECTOR: &str = "a";
const EXCERPT_SELECTOR: &str = ".entry-summary, .entry-content, p";
const IMAGE_SELECTOR: &str = "img";
const DATE_SELECTOR: &str = ".entry-date, time, .published";

struct ListingSelectors {
    article: Selector,
    pager: Selector,
    title: Selector,
    link: Selector,
    excerpt: Selector,
    image: Selector,
    date: Selector,
}

impl ListingSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            article: parse_selector(ARTICLE_SELECTOR)?,
            pager: parse_selector(PAGER_SELECTOR)?,
            title: parse_selector(TITLE_SELECTOR)?,
            link: parse_selector(LINK_SELECTOR)?,
            excerpt: parse_selector(EXCERPT_SELECTOR)?,
            image: parse_selector(IMAGE_SELECTOR)?,
            date: parse_selector(DATE_SELECTOR)?,
        })
    }
}

/// Walks the trailing pages of the blog index and collects article stubs.
pub struct ListPageCrawler {
    base_url: Url,
    limits: Limits,
    selectors: ListingSelectors,
}

impl ListPageCrawler {
    pub fn new(base_url: &str, limits: Limits) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            limits,
            selectors: ListingSelectors::new()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn page_url(&self, page: u32) -> Result<Url> {
        Ok(self.base_url.join(&format!("page/{}/", page))?)
    }

    /// Inclusive range of pages to visit given the highest page index.
    pub fn page_window(&self, last_page: u32) -> std::ops::RangeInclusive<u32> {
        let last_page = last_page.max(1);
        let first_page = last_page
            .saturating_sub(self.limits.page_window.saturating_sub(1))
            .max(1);
        first_page..=last_page
    }

    /// Highest numeric label among the pager controls, if any.
    pub fn last_page_number(&self, html: &str) -> Option<u32> {
        let document = Html::parse_document(html);
        document
            .select(&self.selectors.pager)
            .filter_map(|el| el.text().collect::<String>().trim().parse::<u32>().ok())
            .max()
    }

    /// Extracts up to `stubs_per_page` stubs from one listing page, in DOM order.
    pub fn extract_stubs(&self, html: &str, page_url: &Url) -> Vec<ArticleStub> {
        let document = Html::parse_document(html);
        let selectors = &self.selectors;

        document
            .select(&selectors.article)
            .filter_map(|article| {
                let title = first_text(article, &selectors.title).filter(|t| !t.is_empty())?;
                let url = article
                    .select(&selectors.link)
                    .next()
                    .and_then(|link| link.value().attr("href"))
                    .and_then(|href| page_url.join(href.trim()).ok())?;
                let excerpt = first_text(article, &selectors.excerpt)
                    .map(|text| truncate_chars(&text, self.limits.excerpt_chars))
                    .unwrap_or_default();
                let image = article
                    .select(&selectors.image)
                    .next()
                    .and_then(|img| img.value().attr("src"))
                    .and_then(|src| page_url.join(src.trim()).ok())
                    .map(String::from)
                    .unwrap_or_default();
                let date = first_text(article, &selectors.date).unwrap_or_default();

                Some(ArticleStub {
                    title,
                    url: url.to_string(),
                    excerpt,
                    image,
                    date,
                    scraped_at: Utc::now(),
                })
            })
            .take(self.limits.stubs_per_page)
            .collect()
    }

    /// Crawls the trailing page window. Any navigation or wait failure aborts
    /// the whole crawl.
    pub async fn crawl(&self, browser: &dyn Browser) -> Result<Vec<ArticleStub>> {
        browser.goto(self.base_url.as_str()).await?;
        let index = browser.html().await?;
        let last_page = self.last_page_number(&index).unwrap_or(1);
        info!("📚 Last page number: {}", last_page);

        let mut stubs = Vec::new();
        for page in self.page_window(last_page) {
            let page_url = self.page_url(page)?;
            info!("📄 Scraping page {}...", page);
            browser.goto(page_url.as_str()).await?;
            browser.wait_for(ARTICLE_SELECTOR, self.limits.element_timeout).await?;
            let html = browser.html().await?;

            let page_stubs = self.extract_stubs(&html, &page_url);
            info!("✨ Scraped {} articles from page {}", page_stubs.len(), page);
            stubs.extend(page_stubs);
        }

        info!("📰 Total scraped {} article stubs", stubs.len());
        Ok(stubs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::FakeBrowser;

    const BASE: &str = "https://blog.test/blogs/";

    fn crawler() -> ListPageCrawler {
        ListPageCrawler::new(BASE, Limits::default()).unwrap()
    }

    fn index_page(last: u32) -> String {
        let mut pager = String::new();
        for n in 1..=last {
            pager.push_str(&format!(r#"<a class="page-numbers" href="/blogs/page/{n}/">{n}</a>"#));
        }
        format!(
            r#"<html><body><article><h2><a href="/x">x</a></h2></article>
            <nav>{pager}<a class="page-numbers next" href="/blogs/page/2/">Next »</a></nav></body></html>"#
        )
    }

    fn listing_page(page: u32, count: usize) -> String {
        let mut body = String::new();
        for i in 0..count {
            body.push_str(&format!(
                r#"<article>
                    <img src="/img/{page}-{i}.png">
                    <h3><a href="/blogs/p{page}-{i}/">Post {page}-{i}</a></h3>
                    <div class="entry-summary"> Summary {page}-{i} </div>
                    <time>March {i}, 2024</time>
                </article>"#
            ));
        }
        format!("<html><body>{body}</body></html>")
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let crawler = ListPageCrawler::new("https://blog.test/blogs", Limits::default()).unwrap();
        assert_eq!(crawler.page_url(7).unwrap().as_str(), "https://blog.test/blogs/page/7/");
    }

    #[test]
    fn test_page_window() {
        let crawler = crawler();
        assert_eq!(crawler.page_window(15), 13..=15);
        assert_eq!(crawler.page_window(2), 1..=2);
        assert_eq!(crawler.page_window(0), 1..=1);

        let wide = ListPageCrawler::new(BASE, Limits::default().with_page_window(5)).unwrap();
        assert_eq!(wide.page_window(15), 11..=15);
    }

    #[test]
    fn test_last_page_number_ignores_non_numeric_labels() {
        assert_eq!(crawler().last_page_number(&index_page(15)), Some(15));
        assert_eq!(crawler().last_page_number("<p>no pager</p>"), None);
    }

    #[test]
    fn test_extract_stubs() {
        let page_url = Url::parse("https://blog.test/blogs/page/3/").unwrap();
        let stubs = crawler().extract_stubs(&listing_page(3, 2), &page_url);
        assert_eq!(stubs.len(), 2);
        assert_eq!(stubs[0].title, "Post 3-0");
        assert_eq!(stubs[0].url, "https://blog.test/blogs/p3-0/");
        assert_eq!(stubs[0].excerpt, "Summary 3-0");
        assert_eq!(stubs[0].image, "https://blog.test/img/3-0.png");
        assert_eq!(stubs[0].date, "March 0, 2024");
    }

    #[test]
    fn test_elements_without_title_or_link_are_dropped() {
        let html = r#"
            <article><p>No title and no link</p></article>
            <article><h2>Plain heading</h2><p>No link either</p></article>
            <article><h2><a href="/kept/">Kept</a></h2></article>
        "#;
        let page_url = Url::parse(BASE).unwrap();
        let stubs = crawler().extract_stubs(html, &page_url);
        assert_eq!(stubs.len(), 1);
        assert_eq!(stubs[0].title, "Kept");
        assert_eq!(stubs[0].excerpt, "");
        assert_eq!(stubs[0].image, "");
    }

    #[test]
    fn test_extract_caps_stubs_and_excerpt() {
        let long = "a".repeat(300);
        let mut html = String::new();
        for i in 0..8 {
            html.push_str(&format!(r#"<article><h2><a href="/p{i}">T{i}</a></h2><p>{long}</p></article>"#));
        }
        let page_url = Url::parse(BASE).unwrap();
        let stubs = crawler().extract_stubs(&html, &page_url);
        assert_eq!(stubs.len(), 5);
        assert_eq!(stubs[4].title, "T4");
        assert!(stubs.iter().all(|s| s.excerpt.chars().count() == 200));
    }

    #[tokio::test]
    async fn test_crawl_visits_trailing_window_in_order() {
        let browser = FakeBrowser::new()
            .with_page("https://blog.test/blogs/page/4/", listing_page(4, 1))
            .with_page("https://blog.test/blogs/page/5/", listing_page(5, 2))
            .with_page("https://blog.test/blogs/page/6/", listing_page(6, 1))
            .with_page(BASE, index_page(6));

        let stubs = crawler().crawl(&browser).await.unwrap();
        let titles: Vec<_> = stubs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Post 4-0", "Post 5-0", "Post 5-1", "Post 6-0"]);
        assert_eq!(
            browser.visits(),
            vec![
                BASE.to_string(),
                "https://blog.test/blogs/page/4/".to_string(),
                "https://blog.test/blogs/page/5/".to_string(),
                "https://blog.test/blogs/page/6/".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_crawl_aborts_when_a_page_has_no_articles() {
        let browser = FakeBrowser::new()
            .with_page("https://blog.test/blogs/page/1/", listing_page(1, 2))
            .with_page("https://blog.test/blogs/page/2/", "<html><body>maintenance</body></html>")
            .with_page(BASE, index_page(2));

        let result = crawler().crawl(&browser).await;
        assert!(matches!(result, Err(bl_core::Error::Timeout(_))));
    }

    #[tokio::test]
    async fn test_crawl_aborts_on_navigation_failure() {
        let browser = FakeBrowser::new().with_page(BASE, index_page(3));
        assert!(crawler().crawl(&browser).await.is_err());
    }
}
