use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use chatas_shared::constants::API_BASE_PATH;
use chatas_store::Database;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::{conversations, messages, users};

/// Largest accepted JSON body.
const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Run a store operation on a connection opened for this call only.
///
/// The connection lives on a blocking thread and is dropped when `op`
/// returns, whether it succeeded or not.
pub(crate) async fn with_db<T, F>(state: &AppState, op: F) -> Result<T, ServerError>
where
    T: Send + 'static,
    F: FnOnce(&Database) -> chatas_store::Result<T> + Send + 'static,
{
    let path = state.config.database_path.clone();
    tokio::task::spawn_blocking(move || {
        let db = Database::open_at(&path)?;
        op(&db)
    })
    .await
    .map_err(|e| ServerError::Internal(format!("store task failed: {e}")))?
    .map_err(ServerError::from)
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_origin.as_deref());

    let api = Router::new()
        .route("/health", get(health_check))
        .route("/users", get(users::list_users).post(users::register))
        .route("/users/login", post(users::login))
        .route(
            "/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/conversations/check-or-create",
            post(conversations::check_or_create),
        )
        // `:id` is a user id for GET and a conversation id for DELETE
        .route(
            "/conversations/:id",
            get(conversations::list_for_user).delete(conversations::delete_conversation),
        )
        .route(
            "/conversations/:id/messages",
            get(messages::list_messages).post(messages::send_message),
        )
        .route("/conversations/:id/markAsRead", patch(messages::mark_as_read))
        .route("/messages/:id/like", post(messages::toggle_like));

    Router::new()
        .route("/", get(root))
        .nest(API_BASE_PATH, api)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    match origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => layer.allow_origin(AllowOrigin::exact(value)),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Invalid CORS_ORIGIN, allowing any origin");
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn root() -> &'static str {
    "Server is running and ready!"
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
