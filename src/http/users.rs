use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::models::User;
use crate::store::Page;

use super::{ApiError, ApiResponse, AppState, DeleteManyBody, Deleted, DeletedMany, ListQuery};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Deserialize)]
pub(crate) struct CreateUserBody {
    #[serde(default)]
    name: Option<String>,
}

/// `GET /api/users` - seeds the default users on first call.
pub(crate) async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Page<User>> {
    let Query(query) = query?;
    let limit = query.limit()?;
    state.users.ensure_seed().await?;
    let page = state.users.list(query.cursor(), limit).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// `POST /api/users` `{ name }`
pub(crate) async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateUserBody>, JsonRejection>,
) -> ApiResult<User> {
    let Json(body) = body?;
    let user = User::new(body.name.as_deref().unwrap_or_default());
    let created = state.users.create(user).await?;
    Ok(Json(ApiResponse::ok(created)))
}

/// `DELETE /api/users/:id`
pub(crate) async fn delete(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Deleted> {
    let Path(id) = id?;
    let deleted = state.users.delete(&id).await?;
    Ok(Json(ApiResponse::ok(Deleted::new(id, deleted))))
}

/// `POST /api/users/deleteMany` `{ ids: [...] }`
pub(crate) async fn delete_many(
    State(state): State<AppState>,
    body: Result<Json<DeleteManyBody>, JsonRejection>,
) -> ApiResult<DeletedMany> {
    let Json(body) = body?;
    let ids = body.into_ids()?;
    let deleted_count = state.users.delete_many(&ids).await?;
    Ok(Json(ApiResponse::ok(DeletedMany::new(deleted_count, ids))))
}
