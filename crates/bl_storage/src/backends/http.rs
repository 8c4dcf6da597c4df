use async_trait::async_trait;
use bl_core::{Article, ArticleId, ArticleStore, ArticleUpdate, Error, NewArticle, Result};
use reqwest::{Client, StatusCode};
use std::fmt;
use tracing::debug;
use url::Url;

/// Client for the article CRUD API (`/api/articles`).
pub struct HttpStorage {
    client: Client,
    base_url: Url,
}

impl fmt::Debug for HttpStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpStorage")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl HttpStorage {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn collection_url(&self) -> Result<Url> {
        Ok(self.base_url.join("api/articles")?)
    }

    fn article_url(&self, id: ArticleId) -> Result<Url> {
        Ok(self.base_url.join(&format!("api/articles/{}", id))?)
    }
}

#[async_trait]
impl ArticleStore for HttpStorage {
    async fn get_all(&self) -> Result<Vec<Article>> {
        let url = self.collection_url()?;
        debug!("GET {}", url);
        let articles = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Article>>()
            .await?;
        Ok(articles)
    }

    async fn get_by_id(&self, id: ArticleId) -> Result<Option<Article>> {
        let url = self.article_url(id)?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(response.error_for_status()?.json::<Article>().await?))
    }

    async fn create(&self, article: NewArticle) -> Result<Article> {
        let url = self.collection_url()?;
        debug!("POST {}", url);
        let created = self
            .client
            .post(url)
            .json(&article)
            .send()
            .await?
            .error_for_status()?
            .json::<Article>()
            .await?;
        Ok(created)
    }

    async fn update(&self, id: ArticleId, update: ArticleUpdate) -> Result<Option<Article>> {
        let url = self.article_url(id)?;
        debug!("PUT {}", url);
        let response = self.client.put(url).json(&update).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(response.error_for_status()?.json::<Article>().await?))
    }

    async fn delete(&self, id: ArticleId) -> Result<bool> {
        let url = self.article_url(id)?;
        debug!("DELETE {}", url);
        let response = self.client.delete(url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(Error::Storage(format!("Unexpected status deleting {}: {}", id, status))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn article(id: ArticleId) -> Article {
        Article {
            id,
            title: "Remote".to_string(),
            url: "https://blog.test/remote".to_string(),
            excerpt: String::new(),
            image: String::new(),
            date: String::new(),
            scraped_at: Utc::now(),
            content: "Body".to_string(),
            original_content: "Body".to_string(),
            is_updated: false,
            references: vec![],
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_all_and_missing_article() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![article(id)]))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/api/articles/{}", id)))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "Article not found"})))
            .mount(&server)
            .await;

        let storage = HttpStorage::new(&server.uri()).unwrap();
        let all = storage.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert!(storage.get_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_sends_camel_case_payload() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        let mut updated = article(id);
        updated.is_updated = true;
        updated.references = vec!["https://d1.com/post".to_string()];
        Mock::given(method("PUT"))
            .and(path(format!("/api/articles/{}", id)))
            .and(body_partial_json(serde_json::json!({
                "isUpdated": true,
                "references": ["https://d1.com/post"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&updated))
            .expect(1)
            .mount(&server)
            .await;

        let storage = HttpStorage::new(&server.uri()).unwrap();
        let result = storage
            .update(id, ArticleUpdate::enriched("Body".into(), vec!["https://d1.com/post".into()]))
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_updated);
    }

    #[tokio::test]
    async fn test_server_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let storage = HttpStorage::new(&server.uri()).unwrap();
        assert!(matches!(storage.get_all().await, Err(Error::Http(_))));
    }
}
