//! Article endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::db::{Article, ArticleRepo, Tag, UnknownTagPolicy};
use crate::http::error::ApiError;
use crate::http::extractors::ValidId;
use crate::http::server::AppState;
use crate::models::{ArticleInput, NewArticle};

/// GET /api/article/{id}
async fn get_article(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<Article>, ApiError> {
    let article = ArticleRepo::new(&state.pool).get(id).await?;
    Ok(Json(article))
}

/// PUT /api/article/{id} - replace fields and tag set
async fn replace_article(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
    Json(input): Json<ArticleInput>,
) -> Result<Json<Article>, ApiError> {
    let article = NewArticle::try_from(input)?;
    let repo = ArticleRepo::new(&state.pool);
    repo.replace(id, &article, UnknownTagPolicy::Reject).await?;

    Ok(Json(repo.get(id).await?))
}

/// DELETE /api/article/{id} - remove the article and its links
async fn delete_article(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    ArticleRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/article/{id}/tags
async fn article_tags(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<Vec<Tag>>, ApiError> {
    let tags = ArticleRepo::new(&state.pool).tags(id).await?;
    Ok(Json(tags))
}

/// Article routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/article/{id}",
            get(get_article).put(replace_article).delete(delete_article),
        )
        .route("/api/article/{id}/tags", get(article_tags))
}
