use async_trait::async_trait;
use crate::types::{Article, ArticleId, ArticleUpdate, NewArticle};
use crate::Result;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Get every stored article
    async fn get_all(&self) -> Result<Vec<Article>>;

    /// Get a single article, `None` if the id is unknown
    async fn get_by_id(&self, id: ArticleId) -> Result<Option<Article>>;

    /// Store a new article, assigning its id and creation time
    async fn create(&self, article: NewArticle) -> Result<Article>;

    /// Merge a partial update, `None` if the id is unknown
    async fn update(&self, id: ArticleId, update: ArticleUpdate) -> Result<Option<Article>>;

    /// Remove an article, returning whether it existed
    async fn delete(&self, id: ArticleId) -> Result<bool>;
}
