//! Entry points used by the `bl` binary. Each one owns a single browser
//! session for the whole run and closes it on every exit path.

use bl_core::{Article, ArticleStore, Limits, Result};
use bl_inference::Rewriter;
use std::sync::Arc;
use tracing::{info, warn};

use crate::browser::{Browser, BrowserConfig, WebDriverBrowser};
use crate::content::ArticleContentFetcher;
use crate::crawl::CrawlRun;
use crate::enricher::{Enricher, EnrichmentReport};
use crate::listing::ListPageCrawler;
use crate::reference::ReferenceContentFetcher;
use crate::search::{ReferenceSearcher, SearchConfig};

/// Session settings for one run; navigation follows the run's limits.
fn session_config(config: &BrowserConfig, limits: &Limits) -> BrowserConfig {
    BrowserConfig {
        navigation_timeout: limits.navigation_timeout,
        ..config.clone()
    }
}

async fn close_browser(browser: &dyn Browser) {
    if let Err(e) = browser.close().await {
        warn!("⚠️ {}", e);
    }
}

/// Crawls the blog listing and stores every new article.
pub async fn run_crawl(
    store: Arc<dyn ArticleStore>,
    base_url: &str,
    browser_config: &BrowserConfig,
    limits: Limits,
) -> Result<Vec<Article>> {
    let browser_config = session_config(browser_config, &limits);
    let run = CrawlRun::new(
        ListPageCrawler::new(base_url, limits.clone())?,
        ArticleContentFetcher::new(limits)?,
        store,
    );

    let browser = WebDriverBrowser::connect(&browser_config).await?;
    let result = run.run(&browser).await;
    close_browser(&browser).await;
    result
}

/// Enriches every stored article that has not been updated yet.
pub async fn run_enrichment(
    store: Arc<dyn ArticleStore>,
    rewriter: Rewriter,
    browser_config: &BrowserConfig,
    search_config: SearchConfig,
    limits: Limits,
) -> Result<EnrichmentReport> {
    info!("🤖 Rewriting with {}", rewriter.model_name());
    let browser_config = session_config(browser_config, &limits);
    let enricher = Enricher::new(
        store,
        ReferenceSearcher::new(search_config, &limits)?,
        ReferenceContentFetcher::new(limits.clone())?,
        rewriter,
        limits,
    );

    let browser = WebDriverBrowser::connect(&browser_config).await?;
    let result = enricher.run(&browser).await;
    close_browser(&browser).await;
    result
}

/// Prints one line per stored article with its enrichment state.
pub async fn list_articles(store: Arc<dyn ArticleStore>) -> Result<()> {
    let articles = store.get_all().await?;
    if articles.is_empty() {
        println!("No articles stored");
        return Ok(());
    }
    for article in articles {
        let emoji = if article.is_updated { "✨" } else { "📄" };
        println!("{} {} [{}] {} - {}", emoji, article.id, article.state(), article.title, article.url);
        for (i, reference) in article.references.iter().enumerate() {
            println!("    [{}] {}", i + 1, reference);
        }
    }
    Ok(())
}
