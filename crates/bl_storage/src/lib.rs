use bl_core::{ArticleStore, Error, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub mod backends;

pub use backends::*;

pub const DEFAULT_JSON_PATH: &str = "data/articles.json";
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    Json,
    Http,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "json" | "file" => Ok(Self::Json),
            "http" | "api" => Ok(Self::Http),
            other => Err(Error::Config(format!(
                "Unknown storage backend: {} (expected memory, json or http)",
                other
            ))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::Json => "json",
            Self::Http => "http",
        })
    }
}

/// Builds a store backend. `location` is the file path for `json` and the
/// API base URL for `http`; `memory` ignores it.
pub fn create_storage(kind: StorageKind, location: Option<&str>) -> Result<Arc<dyn ArticleStore>> {
    let storage: Arc<dyn ArticleStore> = match kind {
        StorageKind::Memory => Arc::new(MemoryStorage::new()),
        StorageKind::Json => Arc::new(JsonFileStorage::new(location.unwrap_or(DEFAULT_JSON_PATH))),
        StorageKind::Http => Arc::new(HttpStorage::new(location.unwrap_or(DEFAULT_API_URL))?),
    };
    tracing::debug!("Created {} storage backend", kind);
    Ok(storage)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageKind};
}
