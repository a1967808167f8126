pub mod comments;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::service::CommentService;

pub use comments::comments_routes;

#[derive(Clone)]
pub struct AppState {
    pub comments: Arc<dyn CommentService>,
    pub default_page_size: i64,
    pub static_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(
        comments: Arc<dyn CommentService>,
        default_page_size: i64,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            comments,
            default_page_size,
            static_dir: Arc::new(static_dir.into()),
        }
    }
}

/// The whole HTTP surface: comment API, health probe, static front end.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(comments_routes())
        .route("/api/health", get(health_check))
        .nest_service("/static", ServeDir::new(state.static_dir.as_path()))
        .fallback(serve_index)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({"status": "healthy"}))
}

async fn serve_index(State(state): State<AppState>) -> Response {
    let index_path = state.static_dir.join("index.html");

    match tokio::fs::read_to_string(&index_path).await {
        Ok(html) => Html(html).into_response(),
        Err(_) => Json(serde_json::json!({
            "message": "Welcome to the comment tree API",
            "endpoints": [
                "POST /comments",
                "GET /comments?parent={id}&page={n}&limit={n}",
                "GET /comments/all",
                "POST /comments/search",
                "DELETE /comments/{id}"
            ]
        }))
        .into_response(),
    }
}
