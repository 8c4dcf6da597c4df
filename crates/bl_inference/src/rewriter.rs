use bl_core::{Article, ReferenceDocument, RewriteModel};
use std::sync::Arc;
use tracing::{info, warn};

/// Rewritten content together with the references it was based on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub content: String,
    pub references: Vec<ReferenceDocument>,
}

/// Runs a [`RewriteModel`] and falls back to the original content when the
/// model fails. A rewrite failure never surfaces as an error.
#[derive(Clone)]
pub struct Rewriter {
    model: Arc<dyn RewriteModel>,
}

impl Rewriter {
    pub fn new(model: Arc<dyn RewriteModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub async fn rewrite(&self, article: &Article, references: Vec<ReferenceDocument>) -> RewriteOutcome {
        let content = match self.model.rewrite(article, &references).await {
            Ok(content) => {
                info!("✍️ Rewrote '{}' with {} reference(s)", article.title, references.len());
                content
            }
            Err(e) => {
                warn!("⚠️ Rewrite of '{}' failed, keeping original content: {}", article.title, e);
                article.content.clone()
            }
        };
        RewriteOutcome { content, references }
    }
}
