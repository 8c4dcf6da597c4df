use async_trait::async_trait;
use bl_core::{Article, ReferenceDocument, Result, RewriteModel};
use std::fmt;

/// Returns the article content untouched, without any network call.
#[derive(Default)]
pub struct PassthroughModel;

impl fmt::Debug for PassthroughModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassthroughModel").finish()
    }
}

impl PassthroughModel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RewriteModel for PassthroughModel {
    fn name(&self) -> &str {
        "passthrough"
    }

    async fn rewrite(&self, article: &Article, _references: &[ReferenceDocument]) -> Result<String> {
        Ok(article.content.clone())
    }
}
