//! `/conversations` handlers that operate on whole conversations.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use chatas_shared::{
    parse_id, CheckOrCreateRequest, CheckOrCreateResponse, ConversationSummary, SuccessResponse,
};

use crate::api::{with_db, AppState};
use crate::error::ServerError;
use crate::extract::ApiJson;

/// 201 when a conversation was created, 200 when the pair already had one.
pub async fn check_or_create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CheckOrCreateRequest>,
) -> Result<(StatusCode, Json<CheckOrCreateResponse>), ServerError> {
    let user_a = parse_id(&req.user1_id)?;
    let user_b = parse_id(&req.user2_id)?;

    let (conversation, created) =
        with_db(&state, move |db| db.check_or_create_conversation(user_a, user_b))
            .await
            .map_err(|e| e.not_found_as("User"))?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(CheckOrCreateResponse {
            conversation_id: conversation.id,
        }),
    ))
}

/// Conversations of a user with their unread flag. Empty when there are none.
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ConversationSummary>>, ServerError> {
    let user_id = parse_id(&user_id)?;
    let summaries = with_db(&state, move |db| db.list_conversations_with_unread(user_id)).await?;
    Ok(Json(summaries))
}

pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<SuccessResponse>, ServerError> {
    let conversation_id = parse_id(&conversation_id)?;
    with_db(&state, move |db| db.delete_conversation(conversation_id))
        .await
        .map_err(|e| e.not_found_as("Conversation"))?;

    Ok(Json(SuccessResponse {
        success: "Conversation deleted".to_string(),
    }))
}
