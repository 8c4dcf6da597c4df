use bl_core::{Article, ArticleStore, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};

use crate::browser::Browser;
use crate::content::ArticleContentFetcher;
use crate::listing::ListPageCrawler;

/// One acquisition pass: listing crawl, content fetch, then creation of every
/// article the store does not already hold.
pub struct CrawlRun {
    crawler: ListPageCrawler,
    fetcher: ArticleContentFetcher,
    store: Arc<dyn ArticleStore>,
}

impl CrawlRun {
    pub fn new(crawler: ListPageCrawler, fetcher: ArticleContentFetcher, store: Arc<dyn ArticleStore>) -> Self {
        Self {
            crawler,
            fetcher,
            store,
        }
    }

    pub async fn run(&self, browser: &dyn Browser) -> Result<Vec<Article>> {
        info!("🚀 Starting crawl of {}", self.crawler.base_url());
        let stubs = self.crawler.crawl(browser).await?;

        let mut known: HashSet<String> = self
            .store
            .get_all()
            .await?
            .into_iter()
            .map(|article| article.url)
            .collect();

        let mut fresh = Vec::with_capacity(stubs.len());
        for stub in stubs {
            if known.insert(stub.url.clone()) {
                fresh.push(stub);
            } else {
                info!("⏭️ Already have: {}", stub.title);
            }
        }

        let mut created = Vec::with_capacity(fresh.len());
        for article in self.fetcher.fetch_all(browser, fresh).await {
            let title = article.title.clone();
            match self.store.create(article).await {
                Ok(article) => {
                    info!("💾 Saved: {}", article.title);
                    created.push(article);
                }
                Err(e) => error!("❌ Failed to save {}: {}", title, e),
            }
        }

        info!("✅ Crawl finished, {} new article(s)", created.len());
        Ok(created)
    }
}
