//! Upload endpoints
//!
//! JSON submissions are strict: an article naming a tag that does not
//! exist is rejected with 422. CSV uploads are best-effort and answer with
//! an import summary.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};

use super::CreatedResponse;
use crate::db::{ArticleRepo, TagRepo, UnknownTagPolicy};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::import::{import_articles, import_tags, ImportSummary};
use crate::models::{ArticleInput, NewArticle, NewTag, TagInput};

/// POST /api/upload/article
async fn upload_article(
    State(state): State<Arc<AppState>>,
    Json(input): Json<ArticleInput>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let article = NewArticle::try_from(input)?;
    let id = ArticleRepo::new(&state.pool)
        .create(&article, UnknownTagPolicy::Reject)
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// POST /api/upload/tag
async fn upload_tag(
    State(state): State<Arc<AppState>>,
    Json(input): Json<TagInput>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let tag = NewTag::try_from(input)?;
    let id = TagRepo::new(&state.pool).create(&tag).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// POST /api/upload/article/csv - rows of `name,url,description,tags`
async fn upload_article_csv(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ImportSummary>, ApiError> {
    let summary = import_articles(&state.pool, &body[..]).await?;
    Ok(Json(summary))
}

/// POST /api/upload/tag/csv - rows of `name,description`
async fn upload_tag_csv(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ImportSummary>, ApiError> {
    let summary = import_tags(&state.pool, &body[..]).await?;
    Ok(Json(summary))
}

/// Upload routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/upload/article", post(upload_article))
        .route("/api/upload/tag", post(upload_tag))
        .route("/api/upload/article/csv", post(upload_article_csv))
        .route("/api/upload/tag/csv", post(upload_tag_csv))
}
