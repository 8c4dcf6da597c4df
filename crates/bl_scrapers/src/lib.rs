pub mod browser;
pub mod cli;
pub mod content;
pub mod crawl;
pub mod enricher;
pub mod listing;
pub mod logging;
pub mod reference;
pub mod search;
pub mod selectors;

pub use browser::{Browser, BrowserConfig, WebDriverBrowser};
pub use cli::{list_articles, run_crawl, run_enrichment};
pub use content::ArticleContentFetcher;
pub use crawl::CrawlRun;
pub use enricher::{citation_block, Enricher, EnrichmentOutcome, EnrichmentReport};
pub use listing::{ListPageCrawler, DEFAULT_BLOG_URL};
pub use logging::init_logging;
pub use reference::ReferenceContentFetcher;
pub use search::{ReferenceSearcher, SearchConfig};
pub use selectors::SelectorCascade;

pub mod prelude {
    pub use super::browser::Browser;
    pub use super::enricher::{Enricher, EnrichmentReport};
    pub use bl_core::{Article, Error, Result};
}
