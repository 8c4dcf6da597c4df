use axum::{routing::get, Router};
use bl_core::{ArticleStore, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub const DEFAULT_ADDR: &str = "0.0.0.0:5000";

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(handlers::root))
        .route(
            "/api/articles",
            get(handlers::list_articles).post(handlers::create_article),
        )
        .route(
            "/api/articles/:id",
            get(handlers::get_article)
                .put(handlers::update_article)
                .delete(handlers::delete_article),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Serves the CRUD API over `store` until the process is stopped.
pub async fn serve(addr: SocketAddr, store: Arc<dyn ArticleStore>) -> Result<()> {
    let app = create_app(AppState::new(store));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🚀 Server running on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use bl_core::{Article, Error, Result};
}
