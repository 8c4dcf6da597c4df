use bl_core::{
    Article, ArticleId, ArticleStore, ArticleUpdate, EnrichmentState, Error, Limits, ReferenceDocument, Result,
};
use bl_inference::Rewriter;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::browser::Browser;
use crate::reference::ReferenceContentFetcher;
use crate::search::ReferenceSearcher;

/// Markdown-ish footer listing the sources an article was rewritten from.
pub fn citation_block(urls: &[String]) -> String {
    let mut block = String::from("\n\n---\n\nReferences:");
    for (i, url) in urls.iter().enumerate() {
        block.push_str(&format!("\n[{}] {}", i + 1, url));
    }
    block
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentOutcome {
    /// Rewritten and persisted.
    Updated(Article),
    /// Already enriched by an earlier run.
    AlreadyUpdated,
    /// No usable reference could be fetched; nothing was written.
    NoReferences,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub updated: Vec<ArticleId>,
    pub skipped: Vec<ArticleId>,
    pub failed: Vec<ArticleId>,
    pub without_references: Vec<ArticleId>,
}

impl EnrichmentReport {
    pub fn processed(&self) -> usize {
        self.updated.len() + self.failed.len() + self.without_references.len()
    }
}

/// Drives each stored article through search, reference fetch, rewrite and
/// write-back, one article at a time.
pub struct Enricher {
    store: Arc<dyn ArticleStore>,
    searcher: ReferenceSearcher,
    fetcher: ReferenceContentFetcher,
    rewriter: Rewriter,
    limits: Limits,
}

impl Enricher {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        searcher: ReferenceSearcher,
        fetcher: ReferenceContentFetcher,
        rewriter: Rewriter,
        limits: Limits,
    ) -> Self {
        Self {
            store,
            searcher,
            fetcher,
            rewriter,
            limits,
        }
    }

    fn enter(article: &Article, state: EnrichmentState) {
        debug!("'{}' -> {}", article.title, state);
    }

    /// Enriches a single article. Re-reads it first so an article updated in
    /// the meantime is left alone.
    pub async fn enrich_article(&self, browser: &dyn Browser, id: ArticleId) -> Result<EnrichmentOutcome> {
        let article = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Article {}", id)))?;
        if article.is_updated {
            info!("⏭️ Skipping already updated article: {}", article.title);
            return Ok(EnrichmentOutcome::AlreadyUpdated);
        }
        info!("📰 Processing: {}", article.title);

        Self::enter(&article, EnrichmentState::Searching);
        let links = self.searcher.search(browser, &article.title).await;

        Self::enter(&article, EnrichmentState::FetchingReferences);
        let mut references: Vec<ReferenceDocument> = Vec::with_capacity(links.len());
        for link in &links {
            if let Some(document) = self.fetcher.fetch_document(link).await {
                references.push(document);
            }
        }
        info!("📚 Fetched {} of {} reference(s)", references.len(), links.len());

        Self::enter(&article, EnrichmentState::Rewriting);
        let outcome = self.rewriter.rewrite(&article, references).await;

        if outcome.references.is_empty() {
            info!("🚫 No references for '{}', leaving it untouched", article.title);
            return Ok(EnrichmentOutcome::NoReferences);
        }

        Self::enter(&article, EnrichmentState::Persisting);
        let urls: Vec<String> = outcome.references.into_iter().map(|doc| doc.url).collect();
        let content = format!("{}{}", outcome.content, citation_block(&urls));
        let updated = self
            .store
            .update(id, ArticleUpdate::enriched(content, urls))
            .await?
            .ok_or_else(|| Error::NotFound(format!("Article {}", id)))?;

        Self::enter(&updated, EnrichmentState::Updated);
        info!("✅ Successfully updated: {}", updated.title);
        Ok(EnrichmentOutcome::Updated(updated))
    }

    /// Enriches every article that is not yet updated, pausing between
    /// processed articles. Per-article failures are logged and recorded;
    /// only a failure to list the store aborts the run.
    pub async fn run(&self, browser: &dyn Browser) -> Result<EnrichmentReport> {
        let articles = self.store.get_all().await?;
        info!("📊 Found {} articles", articles.len());

        let mut report = EnrichmentReport::default();
        for article in articles {
            if article.is_updated {
                info!("⏭️ Skipping already updated article: {}", article.title);
                report.skipped.push(article.id);
                continue;
            }

            if report.processed() > 0 && !self.limits.pacing.is_zero() {
                tokio::time::sleep(self.limits.pacing).await;
            }

            match self.enrich_article(browser, article.id).await {
                Ok(EnrichmentOutcome::Updated(_)) => report.updated.push(article.id),
                Ok(EnrichmentOutcome::AlreadyUpdated) => report.skipped.push(article.id),
                Ok(EnrichmentOutcome::NoReferences) => report.without_references.push(article.id),
                Err(e) => {
                    error!("❌ Error processing article {}: {}", article.title, e);
                    report.failed.push(article.id);
                }
            }
        }

        info!(
            "🎉 Enrichment finished: {} updated, {} skipped, {} without references, {} failed",
            report.updated.len(),
            report.skipped.len(),
            report.without_references.len(),
            report.failed.len()
        );
        Ok(report)
    }
}
