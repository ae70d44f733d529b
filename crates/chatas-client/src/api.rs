//! Thin `reqwest` wrapper with one method per `/api` endpoint.
//!
//! Non-2xx responses are decoded as [`ErrorBody`] and turned into
//! [`ClientError::Api`]. Nothing here holds state beyond the base URL.

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use chatas_shared::{
    ActorRequest, CheckOrCreateRequest, CheckOrCreateResponse, ConversationSummary, ErrorBody,
    LikeResponse, LoginRequest, Message, MessageResponse, NewUser, SendMessageRequest,
    SuccessResponse, User, UserUpdate,
};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        decode(response).await
    }

    // -- users --------------------------------------------------------------

    pub async fn register(&self, user: &NewUser) -> Result<User> {
        self.send(self.http.post(self.url("/users")).json(user)).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.send(self.http.post(self.url("/users/login")).json(&body))
            .await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.send(self.http.get(self.url("/users"))).await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        self.send(self.http.get(self.url(&format!("/users/{id}"))))
            .await
    }

    pub async fn update_user(&self, id: Uuid, update: &UserUpdate) -> Result<User> {
        self.send(self.http.patch(self.url(&format!("/users/{id}"))).json(update))
            .await
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<SuccessResponse> {
        self.send(self.http.delete(self.url(&format!("/users/{id}"))))
            .await
    }

    // -- conversations ------------------------------------------------------

    /// Returns the conversation id and whether it was newly created.
    pub async fn check_or_create(&self, user_a: Uuid, user_b: Uuid) -> Result<(Uuid, bool)> {
        let body = CheckOrCreateRequest {
            user1_id: user_a.to_string(),
            user2_id: user_b.to_string(),
        };
        let response = self
            .http
            .post(self.url("/conversations/check-or-create"))
            .json(&body)
            .send()
            .await?;
        let created = response.status() == reqwest::StatusCode::CREATED;
        let decoded: CheckOrCreateResponse = decode(response).await?;
        Ok((decoded.conversation_id, created))
    }

    pub async fn conversations_for(&self, user_id: Uuid) -> Result<Vec<ConversationSummary>> {
        self.send(self.http.get(self.url(&format!("/conversations/{user_id}"))))
            .await
    }

    pub async fn delete_conversation(&self, conversation_id: Uuid) -> Result<SuccessResponse> {
        self.send(
            self.http
                .delete(self.url(&format!("/conversations/{conversation_id}"))),
        )
        .await
    }

    // -- messages -----------------------------------------------------------

    pub async fn messages(&self, conversation_id: Uuid) -> Result<Vec<Message>> {
        self.send(
            self.http
                .get(self.url(&format!("/conversations/{conversation_id}/messages"))),
        )
        .await
    }

    pub async fn send_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> Result<Message> {
        let body = SendMessageRequest {
            sender_id: sender_id.to_string(),
            content: content.to_string(),
        };
        self.send(
            self.http
                .post(self.url(&format!("/conversations/{conversation_id}/messages")))
                .json(&body),
        )
        .await
    }

    pub async fn mark_as_read(&self, conversation_id: Uuid, viewer_id: Uuid) -> Result<MessageResponse> {
        let body = ActorRequest {
            user_id: viewer_id.to_string(),
        };
        self.send(
            self.http
                .patch(self.url(&format!("/conversations/{conversation_id}/markAsRead")))
                .json(&body),
        )
        .await
    }

    pub async fn toggle_like(&self, message_id: Uuid, caller_id: Uuid) -> Result<LikeResponse> {
        let body = ActorRequest {
            user_id: caller_id.to_string(),
        };
        self.send(
            self.http
                .post(self.url(&format!("/messages/{message_id}/like")))
                .json(&body),
        )
        .await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.text().map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    debug!(status = status.as_u16(), error = %message, "API request failed");
    Err(ClientError::Api { status, message })
}
