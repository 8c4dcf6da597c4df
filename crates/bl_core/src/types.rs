use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

pub type ArticleId = Uuid;

/// Parses an article id. Numeric ids from older article files map onto a
/// fixed UUID so they stay addressable.
pub fn parse_article_id(raw: &str) -> Option<ArticleId> {
    let raw = raw.trim();
    Uuid::parse_str(raw)
        .ok()
        .or_else(|| raw.parse::<u64>().ok().map(legacy_id))
}

fn legacy_id(id: u64) -> ArticleId {
    Uuid::from_u128(u128::from(id))
}

fn deserialize_article_id<'de, D>(deserializer: D) -> std::result::Result<ArticleId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(legacy_id(id)),
        RawId::Text(text) => parse_article_id(&text)
            .ok_or_else(|| de::Error::custom(format!("invalid article id: {}", text))),
    }
}

/// Minimal record captured from a listing page, before the full content is fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleStub {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub date: String,
    pub scraped_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(deserialize_with = "deserialize_article_id")]
    pub id: ArticleId,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub date: String,
    pub scraped_at: DateTime<Utc>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub original_content: String,
    #[serde(default)]
    pub is_updated: bool,
    #[serde(default)]
    pub references: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Builds a stored record from a creation payload.
    pub fn create(id: ArticleId, new: NewArticle) -> Self {
        Self {
            id,
            title: new.title,
            url: new.url,
            excerpt: new.excerpt,
            image: new.image,
            date: new.date,
            scraped_at: new.scraped_at,
            content: new.content,
            original_content: new.original_content,
            is_updated: false,
            references: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn state(&self) -> EnrichmentState {
        if self.is_updated {
            EnrichmentState::Updated
        } else {
            EnrichmentState::NotUpdated
        }
    }

    /// Merges a partial update into the record.
    ///
    /// `is_updated` can only be raised, never cleared, and `original_content`
    /// is not reachable through an update at all.
    pub fn apply(&mut self, update: ArticleUpdate) {
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(references) = update.references {
            self.references = references;
        }
        if update.is_updated == Some(true) {
            self.is_updated = true;
        }
        self.updated_at = Some(update.updated_at.unwrap_or_else(Utc::now));
    }
}

/// Creation payload: the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub date: String,
    pub scraped_at: DateTime<Utc>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub original_content: String,
}

impl NewArticle {
    pub fn from_stub(stub: ArticleStub, content: String) -> Self {
        Self {
            title: stub.title,
            url: stub.url,
            excerpt: stub.excerpt,
            image: stub.image,
            date: stub.date,
            scraped_at: stub.scraped_at,
            original_content: content.clone(),
            content,
        }
    }
}

/// Partial update sent to the store. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_updated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ArticleUpdate {
    /// The write-back issued once an article has been enriched.
    pub fn enriched(content: String, references: Vec<String>) -> Self {
        Self {
            content: Some(content),
            is_updated: Some(true),
            references: Some(references),
            updated_at: Some(Utc::now()),
        }
    }
}

/// A competing page fetched as rewriting material. Only its URL is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDocument {
    pub url: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentState {
    NotUpdated,
    Searching,
    FetchingReferences,
    Rewriting,
    Persisting,
    Updated,
}

impl fmt::Display for EnrichmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EnrichmentState::NotUpdated => "not updated",
            EnrichmentState::Searching => "searching",
            EnrichmentState::FetchingReferences => "fetching references",
            EnrichmentState::Rewriting => "rewriting",
            EnrichmentState::Persisting => "persisting",
            EnrichmentState::Updated => "updated",
        };
        f.write_str(label)
    }
}
