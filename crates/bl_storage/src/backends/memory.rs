use async_trait::async_trait;
use bl_core::{Article, ArticleId, ArticleStore, ArticleUpdate, NewArticle, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryStore {
    articles: Vec<Article>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(articles: Vec<Article>) -> Self {
        Self { articles }
    }

    pub fn all(&self) -> Vec<Article> {
        self.articles.clone()
    }

    pub fn find(&self, id: ArticleId) -> Option<Article> {
        self.articles.iter().find(|a| a.id == id).cloned()
    }

    pub fn insert(&mut self, new: NewArticle) -> Article {
        let article = Article::create(Uuid::new_v4(), new);
        self.articles.push(article.clone());
        article
    }

    pub fn update(&mut self, id: ArticleId, update: ArticleUpdate) -> Option<Article> {
        let existing = self.articles.iter_mut().find(|a| a.id == id)?;
        existing.apply(update);
        Some(existing.clone())
    }

    pub fn remove(&mut self, id: ArticleId) -> bool {
        let before = self.articles.len();
        self.articles.retain(|a| a.id != id);
        self.articles.len() != before
    }

    pub fn into_articles(self) -> Vec<Article> {
        self.articles
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStore for MemoryStorage {
    async fn get_all(&self) -> Result<Vec<Article>> {
        Ok(self.store.read().await.all())
    }

    async fn get_by_id(&self, id: ArticleId) -> Result<Option<Article>> {
        Ok(self.store.read().await.find(id))
    }

    async fn create(&self, article: NewArticle) -> Result<Article> {
        Ok(self.store.write().await.insert(article))
    }

    async fn update(&self, id: ArticleId, update: ArticleUpdate) -> Result<Option<Article>> {
        Ok(self.store.write().await.update(id, update))
    }

    async fn delete(&self, id: ArticleId) -> Result<bool> {
        Ok(self.store.write().await.remove(id))
    }
}
