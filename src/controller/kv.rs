// Key-value API controller: maps HTTP requests onto the storage contract.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::db::{ErrorKind, Storage, StoreError};
use crate::http::Controller;
use crate::metrics;

pub const KV_ITEM_PATH: &str = "/api/:key";
pub const KV_COLLECTION_PATH: &str = "/api/";

/// Request body for storing a key.
#[derive(Deserialize)]
struct StoreRequest {
    key: String,
    #[serde(default)]
    value: serde_json::Value,
}

/// KvController serves GET/POST/DELETE on `/api/`.
///
/// `GET /api/` and `DELETE /api/` address the empty key, which POST accepts.
pub struct KvController {
    db: Arc<dyn Storage>,
}

impl KvController {
    /// Creates a new key-value controller.
    pub fn new(db: Arc<dyn Storage>) -> Self {
        Self { db }
    }

    /// Handles `GET /api/:key`.
    async fn get(State(controller): State<Arc<Self>>, Path(key): Path<String>) -> Response {
        controller.get_key(key)
    }

    /// Handles `GET /api/`, which addresses the empty key.
    async fn get_empty(State(controller): State<Arc<Self>>) -> Response {
        controller.get_key(String::new())
    }

    fn get_key(&self, key: String) -> Response {
        metrics::add_total(1);

        match self.db.get(&key) {
            Ok(value) => {
                metrics::add_hits(1);
                debug!(component = "kv", event = "get", key = %key, "key served");
                let mut body = serde_json::Map::with_capacity(1);
                body.insert(key, value.as_ref().clone());
                (StatusCode::OK, Json(serde_json::Value::Object(body))).into_response()
            }
            Err(err) => {
                if err.kind() == ErrorKind::NotFound {
                    metrics::add_misses(1);
                }
                error_response(&err)
            }
        }
    }

    /// Handles `POST /api/` with a `{"key": ..., "value": ...}` body.
    async fn store(State(controller): State<Arc<Self>>, body: Bytes) -> Response {
        metrics::add_total(1);

        let req: StoreRequest = match serde_json::from_slice(&body) {
            Ok(req) => req,
            Err(e) => {
                metrics::add_errors(1);
                return reply(
                    StatusCode::BAD_REQUEST,
                    format!("error decoding request body: {}", e),
                );
            }
        };

        match controller.db.store(&req.key, Arc::new(req.value)) {
            Ok(()) => {
                metrics::add_stored(1);
                debug!(component = "kv", event = "store", key = %req.key, "key stored");
                (
                    StatusCode::OK,
                    Json(json!({ "key": req.key, "stored": true })),
                )
                    .into_response()
            }
            Err(err) => {
                if err.kind() == ErrorKind::AlreadyExists {
                    metrics::add_store_conflicts(1);
                }
                error_response(&err)
            }
        }
    }

    /// Handles `DELETE /api/:key`.
    async fn delete(State(controller): State<Arc<Self>>, Path(key): Path<String>) -> Response {
        controller.delete_key(key)
    }

    /// Handles `DELETE /api/`, which addresses the empty key.
    async fn delete_empty(State(controller): State<Arc<Self>>) -> Response {
        controller.delete_key(String::new())
    }

    fn delete_key(&self, key: String) -> Response {
        metrics::add_total(1);

        match self.db.delete(&key) {
            Ok(()) => {
                metrics::add_deleted(1);
                debug!(component = "kv", event = "delete", key = %key, "key deleted");
                (
                    StatusCode::OK,
                    Json(json!({ "key": key, "deleted": true })),
                )
                    .into_response()
            }
            Err(err) => error_response(&err),
        }
    }
}

/// Maps a storage error onto its HTTP status.
pub fn status_of(err: &StoreError) -> StatusCode {
    match err.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::AlreadyExists => StatusCode::CONFLICT,
        ErrorKind::InvalidConfiguration | ErrorKind::HashFailure => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: &StoreError) -> Response {
    let status = status_of(err);
    if status.is_server_error() {
        metrics::add_errors(1);
        warn!(
            component = "kv",
            event = "storage_failed",
            error = %err,
            "storage operation failed"
        );
    }
    reply(status, err.to_string())
}

fn reply(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(json!({ "status": status.as_u16(), "error": message })),
    )
        .into_response()
}

impl Controller for KvController {
    fn add_route(&self, router: Router) -> Router {
        let controller = Arc::new(self.clone());
        let routes = Router::new()
            .route(KV_ITEM_PATH, get(Self::get).delete(Self::delete))
            .route(
                KV_COLLECTION_PATH,
                get(Self::get_empty)
                    .post(Self::store)
                    .delete(Self::delete_empty),
            )
            .route(
                "/api",
                get(Self::get_empty)
                    .post(Self::store)
                    .delete(Self::delete_empty),
            )
            .with_state(controller);
        router.merge(routes)
    }
}

impl Clone for KvController {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::storage::HashError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (StoreError::NotFound { key: "k".into() }, StatusCode::NOT_FOUND),
            (StoreError::AlreadyExists { key: "k".into() }, StatusCode::CONFLICT),
            (
                StoreError::HashFailure {
                    key: "k".into(),
                    source: HashError::new("boom"),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                StoreError::InvalidConfiguration("zero shards".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(status_of(&err), status, "{}", err);
        }
    }
}
