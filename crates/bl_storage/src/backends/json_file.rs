use async_trait::async_trait;
use bl_core::{Article, ArticleId, ArticleStore, ArticleUpdate, Error, NewArticle, Result};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use super::memory::MemoryStore;

/// Articles kept as one pretty-printed JSON array on disk.
///
/// Each call loads its own snapshot of the file and writes it back when it
/// mutates; the lock only serialises those read-modify-write cycles.
pub struct JsonFileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Sibling file the next snapshot is written to before it replaces the
    /// real one.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "articles.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn load(&self) -> Result<MemoryStore> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(MemoryStore::new()),
            Ok(bytes) => {
                let articles: Vec<Article> = serde_json::from_slice(&bytes)?;
                Ok(MemoryStore::with_articles(articles))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No article file at {}, starting empty", self.path.display());
                Ok(MemoryStore::new())
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn save(&self, store: MemoryStore) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(&store.into_articles())?;

        // Whole snapshot goes beside the file first, then replaces it.
        let temp_path = self.temp_path();
        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(&json).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ArticleStore for JsonFileStorage {
    async fn get_all(&self) -> Result<Vec<Article>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.all())
    }

    async fn get_by_id(&self, id: ArticleId) -> Result<Option<Article>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.find(id))
    }

    async fn create(&self, article: NewArticle) -> Result<Article> {
        let _guard = self.lock.lock().await;
        let mut store = self.load().await?;
        let created = store.insert(article);
        self.save(store).await?;
        Ok(created)
    }

    async fn update(&self, id: ArticleId, update: ArticleUpdate) -> Result<Option<Article>> {
        let _guard = self.lock.lock().await;
        let mut store = self.load().await?;
        let updated = store.update(id, update);
        if updated.is_some() {
            self.save(store).await?;
        }
        Ok(updated)
    }

    async fn delete(&self, id: ArticleId) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut store = self.load().await?;
        let removed = store.remove(id);
        if removed {
            self.save(store).await?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn new_article(url: &str) -> NewArticle {
        NewArticle {
            title: "Stored".to_string(),
            url: url.to_string(),
            excerpt: String::new(),
            image: String::new(),
            date: String::new(),
            scraped_at: Utc::now(),
            content: "Body".to_string(),
            original_content: "Body".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("articles.json"));
        assert!(storage.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_changes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("articles.json");

        let storage = JsonFileStorage::new(&path);
        let a = storage.create(new_article("https://blog.test/a")).await.unwrap();
        let b = storage.create(new_article("https://blog.test/b")).await.unwrap();
        storage
            .update(a.id, ArticleUpdate::enriched("Rewritten".into(), vec!["https://r.com".into()]))
            .await
            .unwrap();
        assert!(storage.delete(b.id).await.unwrap());

        let reopened = JsonFileStorage::new(&path);
        let articles = reopened.get_all().await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, a.id);
        assert!(articles[0].is_updated);
        assert_eq!(articles[0].content, "Rewritten");
        assert_eq!(articles[0].original_content, "Body");

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"isUpdated\": true"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_snapshot_replaces_file_instead_of_rewriting_it() {
        use std::os::unix::fs::MetadataExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        let storage = JsonFileStorage::new(&path);
        let article = storage.create(new_article("https://blog.test/a")).await.unwrap();
        let before = std::fs::metadata(&path).unwrap().ino();

        // A reader holding the old file keeps seeing a complete document.
        let old_handle = std::fs::File::open(&path).unwrap();
        storage
            .update(article.id, ArticleUpdate::enriched("Rewritten".into(), vec!["https://r.com".into()]))
            .await
            .unwrap();
        let after = std::fs::metadata(&path).unwrap().ino();
        assert_ne!(before, after);

        let old: Vec<Article> = serde_json::from_reader(old_handle).unwrap();
        assert!(!old[0].is_updated);
        assert!(!dir.path().join("articles.json.tmp").exists());
        assert!(storage.get_all().await.unwrap()[0].is_updated);
    }

    #[tokio::test]
    async fn test_leftover_temp_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        let storage = JsonFileStorage::new(&path);
        storage.create(new_article("https://blog.test/a")).await.unwrap();
        std::fs::write(dir.path().join("articles.json.tmp"), "[{\"id\": ").unwrap();

        assert_eq!(storage.get_all().await.unwrap().len(), 1);
        storage.create(new_article("https://blog.test/b")).await.unwrap();
        assert_eq!(JsonFileStorage::new(&path).get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reads_files_with_numeric_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        std::fs::write(
            &path,
            r#"[{
                "id": 1712345678901,
                "title": "Legacy",
                "url": "https://blog.test/legacy/",
                "excerpt": "",
                "image": "",
                "date": "",
                "scrapedAt": "2024-04-05T10:00:00.000Z",
                "content": "Body",
                "isUpdated": false,
                "originalContent": "Body",
                "references": [],
                "createdAt": "2024-04-05T10:00:01.000Z"
            }]"#,
        )
        .unwrap();

        let storage = JsonFileStorage::new(&path);
        let id = bl_core::parse_article_id("1712345678901").unwrap();
        assert_eq!(storage.get_by_id(id).await.unwrap().unwrap().title, "Legacy");

        let updated = storage
            .update(id, ArticleUpdate::enriched("Rewritten".into(), vec!["https://r.com".into()]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, id);
        assert!(JsonFileStorage::new(&path).get_by_id(id).await.unwrap().unwrap().is_updated);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        std::fs::write(&path, "{not json").unwrap();
        let storage = JsonFileStorage::new(&path);
        assert!(matches!(storage.get_all().await, Err(Error::Serialization(_))));
    }
}
