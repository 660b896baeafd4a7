use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::models::{Chat, ChatMessage};
use crate::store::Page;

use super::{ApiError, ApiResponse, AppState, DeleteManyBody, Deleted, DeletedMany, ListQuery};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Deserialize)]
pub(crate) struct CreateChatBody {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendMessageBody {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatSummary {
    id: String,
    title: String,
}

/// `GET /api/chats` - seeds the default chats on first call.
pub(crate) async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Page<Chat>> {
    let Query(query) = query?;
    let limit = query.limit()?;
    state.chats.ensure_seed().await?;
    let page = state.chats.list(query.cursor(), limit).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// `POST /api/chats` `{ title }`
pub(crate) async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateChatBody>, JsonRejection>,
) -> ApiResult<ChatSummary> {
    let Json(body) = body?;
    let chat = state
        .chats
        .create_chat(body.title.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(ApiResponse::ok(ChatSummary {
        id: chat.id,
        title: chat.title,
    })))
}

/// `DELETE /api/chats/:id`
pub(crate) async fn delete(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Deleted> {
    let Path(id) = id?;
    let deleted = state.chats.delete(&id).await?;
    Ok(Json(ApiResponse::ok(Deleted::new(id, deleted))))
}

/// `POST /api/chats/deleteMany` `{ ids: [...] }`
pub(crate) async fn delete_many(
    State(state): State<AppState>,
    body: Result<Json<DeleteManyBody>, JsonRejection>,
) -> ApiResult<DeletedMany> {
    let Json(body) = body?;
    let ids = body.into_ids()?;
    let deleted_count = state.chats.delete_many(&ids).await?;
    Ok(Json(ApiResponse::ok(DeletedMany::new(deleted_count, ids))))
}

/// `GET /api/chats/:id/messages`
pub(crate) async fn list_messages(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Vec<ChatMessage>> {
    let Path(id) = id?;
    let messages = state.chats.list_messages(&id).await?;
    Ok(Json(ApiResponse::ok(messages)))
}

/// `POST /api/chats/:id/messages` `{ userId, text }`
pub(crate) async fn send_message(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<SendMessageBody>, JsonRejection>,
) -> ApiResult<ChatMessage> {
    let Path(id) = id?;
    let Json(body) = body?;
    let message = state
        .chats
        .send_message(
            &id,
            body.user_id.as_deref().unwrap_or_default(),
            body.text.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(ApiResponse::ok(message)))
}
