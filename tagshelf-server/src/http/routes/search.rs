//! Search endpoints
//!
//! Query parameters: `tags` (comma-separated), `lookslike`, `orderby`,
//! `reverse`, `limit`, `offset`. Article search requires every listed tag;
//! tag search selects the listed names.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::db::{Article, ArticleRepo, Tag, TagRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::SearchParams;

/// GET /api/search/article
async fn search_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let search = params.into_article_search()?;
    let articles = ArticleRepo::new(&state.pool).search(&search).await?;
    Ok(Json(articles))
}

/// GET /api/search/tag
async fn search_tags(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Tag>>, ApiError> {
    let search = params.into_tag_search()?;
    let tags = TagRepo::new(&state.pool).search(&search).await?;
    Ok(Json(tags))
}

/// Search routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/search/article", get(search_articles))
        .route("/api/search/tag", get(search_tags))
}
