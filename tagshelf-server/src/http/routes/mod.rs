//! Route handlers organized by resource

pub mod articles;
pub mod health;
pub mod search;
pub mod tags;
pub mod upload;

use serde::Serialize;

/// Body returned when a record is created
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use sqlx::SqlitePool;
    use tower::ServiceExt;

    use crate::db::{create_memory_pool, schema};
    use crate::http::server::{build_router, ServerConfig};

    /// Router over a fresh in-memory catalog
    pub async fn test_app() -> (Router, SqlitePool) {
        let pool = create_memory_pool().await.unwrap();
        schema::init(&pool).await.unwrap();
        let app = build_router(pool.clone(), &ServerConfig::default());
        (app, pool)
    }

    /// Send a request, return status and JSON body (`Null` when empty).
    pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    pub fn delete(uri: &str) -> Request<Body> {
        Request::delete(uri).body(Body::empty()).unwrap()
    }

    pub fn json(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn csv(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "text/csv")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }
}
