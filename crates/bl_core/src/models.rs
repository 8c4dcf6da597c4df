use async_trait::async_trait;
use crate::types::{Article, ReferenceDocument};
use crate::Result;

#[async_trait]
pub trait RewriteModel: Send + Sync {
    fn name(&self) -> &str;

    /// Rewrite an article using the given references as style material
    async fn rewrite(&self, article: &Article, references: &[ReferenceDocument]) -> Result<String>;
}
