//! Tag endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::db::{Tag, TagRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ValidId;
use crate::http::server::AppState;
use crate::models::{NewTag, TagInput};

/// GET /api/tag/{id}
async fn get_tag(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<Tag>, ApiError> {
    let tag = TagRepo::new(&state.pool).get(id).await?;
    Ok(Json(tag))
}

/// PUT /api/tag/{id} - replace name and description
async fn update_tag(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
    Json(input): Json<TagInput>,
) -> Result<Json<Tag>, ApiError> {
    let tag = NewTag::try_from(input)?;
    let repo = TagRepo::new(&state.pool);
    repo.update(id, &tag).await?;

    Ok(Json(repo.get(id).await?))
}

/// DELETE /api/tag/{id} - remove the tag and unlink it from every article
async fn delete_tag(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<StatusCode, ApiError> {
    TagRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Tag routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/tag/{id}",
        get(get_tag).put(update_tag).delete(delete_tag),
    )
}
