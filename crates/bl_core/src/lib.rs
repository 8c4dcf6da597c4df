pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod text;
pub mod types;

pub use config::Limits;
pub use error::{Error, Result};
pub use models::RewriteModel;
pub use storage::ArticleStore;
pub use types::{
    parse_article_id, Article, ArticleId, ArticleStub, ArticleUpdate, EnrichmentState, NewArticle,
    ReferenceDocument,
};
