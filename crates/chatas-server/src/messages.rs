//! Message handlers: history, sending, read receipts and likes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use chatas_shared::validation::validate_message_content;
use chatas_shared::{
    parse_id, ActorRequest, LikeResponse, Message, MessageResponse, SendMessageRequest,
};

use crate::api::{with_db, AppState};
use crate::error::ServerError;
use crate::extract::ApiJson;

pub async fn list_messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<Vec<Message>>, ServerError> {
    let conversation_id = parse_id(&conversation_id)?;
    let messages = with_db(&state, move |db| {
        db.get_conversation(conversation_id)?;
        db.list_messages(conversation_id)
    })
    .await
    .map_err(|e| e.not_found_as("Conversation"))?;

    Ok(Json(messages))
}

pub async fn send_message(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    ApiJson(req): ApiJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), ServerError> {
    let conversation_id =
        parse_id(&conversation_id).map_err(|_| ServerError::InvalidConversation)?;
    let sender_id = parse_id(&req.sender_id)?;
    validate_message_content(&req.content)?;

    let message = with_db(&state, move |db| {
        db.append_message(conversation_id, sender_id, &req.content)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn mark_as_read(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    ApiJson(req): ApiJson<ActorRequest>,
) -> Result<Json<MessageResponse>, ServerError> {
    let conversation_id = parse_id(&conversation_id)?;
    let viewer_id = parse_id(&req.user_id)?;

    let count = with_db(&state, move |db| {
        db.mark_all_read_except(conversation_id, viewer_id)
    })
    .await?;

    Ok(Json(MessageResponse {
        message: format!("{count} message(s) marked as read"),
    }))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
    ApiJson(req): ApiJson<ActorRequest>,
) -> Result<Json<LikeResponse>, ServerError> {
    let message_id = parse_id(&message_id)?;
    let caller_id = parse_id(&req.user_id)?;

    let liked = with_db(&state, move |db| db.toggle_liked(message_id, caller_id))
        .await
        .map_err(|e| e.not_found_as("Message"))?;

    Ok(Json(LikeResponse {
        success: if liked { "Message liked" } else { "Like removed" }.to_string(),
        liked,
    }))
}
