use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bl_core::{Article, ArticleId, ArticleUpdate, NewArticle};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::AppState;

/// JSON error body `{ "error": ... }` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: "Article not found",
        }
    }

    fn internal(message: &'static str, cause: bl_core::Error) -> Self {
        error!("❌ {}: {}", message, cause);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Ids that do not parse cannot exist in any store.
fn parse_id(id: &str) -> ApiResult<ArticleId> {
    bl_core::parse_article_id(id).ok_or_else(ApiError::not_found)
}

pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Blog API Server Running" }))
}

pub async fn list_articles(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Article>>> {
    state
        .store
        .get_all()
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("Failed to fetch articles", e))
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Article>> {
    let id = parse_id(&id)?;
    state
        .store
        .get_by_id(id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch article", e))?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

pub async fn create_article(
    State(state): State<Arc<AppState>>,
    Json(article): Json<NewArticle>,
) -> ApiResult<(StatusCode, Json<Article>)> {
    let article = state
        .store
        .create(article)
        .await
        .map_err(|e| ApiError::internal("Failed to create article", e))?;
    Ok((StatusCode::CREATED, Json(article)))
}

pub async fn update_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<ArticleUpdate>,
) -> ApiResult<Json<Article>> {
    let id = parse_id(&id)?;
    state
        .store
        .update(id, update)
        .await
        .map_err(|e| ApiError::internal("Failed to update article", e))?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let deleted = state
        .store
        .delete(id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete article", e))?;
    if !deleted {
        return Err(ApiError::not_found());
    }
    Ok(Json(json!({ "message": "Article deleted successfully" })))
}
