//! `/users` handlers: registration, login, directory listing, profile edits.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use chatas_shared::validation::{validate_new_user, validate_user_update};
use chatas_shared::{parse_id, LoginRequest, NewUser, SuccessResponse, User, UserUpdate};

use crate::api::{with_db, AppState};
use crate::error::ServerError;
use crate::extract::ApiJson;

pub async fn register(
    State(state): State<AppState>,
    ApiJson(candidate): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<User>), ServerError> {
    validate_new_user(&candidate)?;

    let default_image = state.config.default_profile_image.clone();
    let user = with_db(&state, move |db| db.register_user(&candidate, &default_image)).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<User>, ServerError> {
    let username = req.username.clone();
    let user = with_db(&state, move |db| db.login(&req.username, &req.password)).await;

    match user {
        Ok(user) => {
            info!(user_id = %user.id, "user logged in");
            Ok(Json(user))
        }
        Err(e) => {
            if matches!(e, ServerError::InvalidCredentials) {
                info!(username = %username, "login rejected");
            }
            Err(e)
        }
    }
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ServerError> {
    let users = with_db(&state, |db| db.list_users()).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ServerError> {
    let id = parse_id(&id)?;
    let user = with_db(&state, move |db| db.get_user(id))
        .await
        .map_err(|e| e.not_found_as("User"))?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> Result<Json<User>, ServerError> {
    let id = parse_id(&id)?;
    validate_user_update(&update)?;

    let user = with_db(&state, move |db| db.update_user(id, &update))
        .await
        .map_err(|e| e.not_found_as("User"))?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ServerError> {
    let id = parse_id(&id)?;
    let deleted = with_db(&state, move |db| db.delete_user(id)).await?;
    if !deleted {
        return Err(ServerError::NotFound("User"));
    }

    Ok(Json(SuccessResponse {
        success: "User deleted".to_string(),
    }))
}
