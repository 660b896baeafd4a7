//! HTTP surface for the user and chat stores.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /api/health`
//! - `GET /api/users?cursor&limit`, `POST /api/users`, `DELETE /api/users/:id`,
//!   `POST /api/users/deleteMany`
//! - `GET /api/chats?cursor&limit`, `POST /api/chats`, `DELETE /api/chats/:id`,
//!   `POST /api/chats/deleteMany`
//! - `GET /api/chats/:id/messages`, `POST /api/chats/:id/messages`
//!
//! Every response uses the `{ success, data?, error? }` envelope.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use entity_store::{http, InMemoryKv};
//!
//! let state = http::AppState::new(Arc::new(InMemoryKv::new()));
//! let app = http::router(state.clone());
//! http::serve(state, "0.0.0.0:3000").await?;
//! ```

mod chats;
mod error;
mod response;
mod users;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::kv::SharedKv;
use crate::models::{ChatStore, UserStore};

pub use error::ApiError;
pub use response::ApiResponse;

/// Stores shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub chats: ChatStore,
}

impl AppState {
    pub fn new(kv: SharedKv) -> Self {
        AppState {
            users: UserStore::new(kv.clone()),
            chats: ChatStore::new(kv),
        }
    }
}

/// Build the axum `Router` for the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/users/deleteMany", post(users::delete_many))
        .route("/api/users/:id", delete(users::delete))
        .route("/api/chats", get(chats::list).post(chats::create))
        .route("/api/chats/deleteMany", post(chats::delete_many))
        .route("/api/chats/:id", delete(chats::delete))
        .route(
            "/api/chats/:id/messages",
            get(chats::list_messages).post(chats::send_message),
        )
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API over HTTP at the given address (e.g. `"0.0.0.0:3000"`).
pub async fn serve(state: AppState, addr: &str) -> Result<(), std::io::Error> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

/// `GET /api/health`
async fn health_handler() -> impl IntoResponse {
    Json(ApiResponse::ok(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("route not found")),
    )
}

/// `?cursor=..&limit=..` on list routes. `limit` stays a string so a
/// non-numeric value gets the envelope error instead of axum's rejection.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    pub cursor: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    /// Non-numeric limits are rejected; numeric ones below 1 are raised to 1.
    pub(crate) fn limit(&self) -> Result<Option<usize>, ApiError> {
        let Some(raw) = self.limit.as_deref().map(str::trim) else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }
        let n: i64 = raw
            .parse()
            .map_err(|_| ApiError::BadRequest("limit must be an integer".into()))?;
        Ok(Some(usize::try_from(n.max(1)).unwrap_or(usize::MAX)))
    }

    pub(crate) fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref().filter(|c| !c.is_empty())
    }
}

/// Body of the `deleteMany` routes. Non-string and blank ids are dropped.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct DeleteManyBody {
    #[serde(default)]
    pub ids: Option<Vec<serde_json::Value>>,
}

impl DeleteManyBody {
    pub(crate) fn into_ids(self) -> Result<Vec<String>, ApiError> {
        let ids: Vec<String> = self
            .ids
            .unwrap_or_default()
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect();
        if ids.is_empty() {
            return Err(ApiError::BadRequest("ids required".into()));
        }
        Ok(ids)
    }
}

/// `{ id, deleted }` answer of the single delete routes.
#[derive(Debug, Serialize)]
pub(crate) struct Deleted {
    id: String,
    deleted: bool,
}

impl Deleted {
    pub(crate) fn new(id: String, deleted: bool) -> Self {
        Deleted { id, deleted }
    }
}

/// `{ deletedCount, ids }` answer of the `deleteMany` routes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeletedMany {
    deleted_count: usize,
    ids: Vec<String>,
}

impl DeletedMany {
    pub(crate) fn new(deleted_count: usize, ids: Vec<String>) -> Self {
        DeletedMany { deleted_count, ids }
    }
}
