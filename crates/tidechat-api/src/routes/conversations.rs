use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use tidechat_ledger::ConversationSummary;

use crate::{
    error::{ApiError, ApiResult},
    sanitize,
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ConversationSummaryResponse {
    pub id: String,
    pub title: String,
    pub date: String,
    pub messages: u32,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ListConversationsResponse {
    pub conversations: Vec<ConversationSummaryResponse>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ConversationContentResponse {
    pub content: String,
}

/// List all saved conversations
#[utoipa::path(
    get,
    path = "/conversations",
    responses(
        (status = 200, description = "Saved conversations", body = ListConversationsResponse)
    ),
    tag = "conversations"
)]
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ListConversationsResponse>> {
    let conversations = state.ledger.list().await?;
    tracing::info!(count = conversations.len(), "conversations listed");

    Ok(Json(ListConversationsResponse {
        conversations: conversations.into_iter().map(summary_to_response).collect(),
    }))
}

/// Get the full content of one conversation
#[utoipa::path(
    get,
    path = "/conversations/{id}",
    params(
        ("id" = String, Path, description = "Conversation identifier")
    ),
    responses(
        (status = 200, description = "Conversation content", body = ConversationContentResponse),
        (status = 404, description = "Conversation not found")
    ),
    tag = "conversations"
)]
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ConversationContentResponse>> {
    let safe_id = sanitize::sanitize_filename(&id)?;

    let content = state
        .ledger
        .get(&safe_id)
        .await?
        .ok_or_else(|| ApiError::ConversationNotFound(safe_id.clone()))?;

    tracing::info!(id = %safe_id, "conversation retrieved");
    Ok(Json(ConversationContentResponse { content }))
}

/// Delete a conversation
#[utoipa::path(
    delete,
    path = "/conversations/{id}",
    params(
        ("id" = String, Path, description = "Conversation identifier")
    ),
    responses(
        (status = 200, description = "Conversation deleted"),
        (status = 404, description = "Conversation not found")
    ),
    tag = "conversations"
)]
pub async fn remove_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let safe_id = sanitize::sanitize_filename(&id)?;

    if !state.ledger.delete(&safe_id).await? {
        return Err(ApiError::ConversationNotFound(safe_id));
    }

    tracing::info!(id = %safe_id, "conversation deleted");
    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}

fn summary_to_response(summary: ConversationSummary) -> ConversationSummaryResponse {
    ConversationSummaryResponse {
        id: summary.id,
        title: summary.title,
        date: summary.date,
        messages: summary.messages,
    }
}
