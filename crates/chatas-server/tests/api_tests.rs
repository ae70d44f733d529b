use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::oneshot;
use uuid::Uuid;

use chatas_server::{build_router, AppState, ServerConfig};

struct TestServer {
    base: String,
    client: reqwest::Client,
    _dir: TempDir,
    _shutdown: oneshot::Sender<()>,
}

async fn start_server() -> TestServer {
    let dir = TempDir::new().expect("tempdir");
    let config = ServerConfig {
        database_path: dir.path().join("api.db"),
        ..Default::default()
    };
    let app = build_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind api");
    let addr = listener.local_addr().expect("api addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        let _ = shutdown_rx.await;
    });
    tokio::spawn(async move {
        let _ = server.await;
    });

    TestServer {
        base: format!("http://{}/api", addr),
        client: reqwest::Client::new(),
        _dir: dir,
        _shutdown: shutdown_tx,
    }
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn register(&self, email: &str, username: &str) -> Value {
        let res = self
            .client
            .post(self.url("/users"))
            .json(&json!({ "email": email, "username": username, "password": "Slaptas1!" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        res.json().await.unwrap()
    }

    async fn conversation(&self, a: &Value, b: &Value) -> (StatusCode, String) {
        let res = self
            .client
            .post(self.url("/conversations/check-or-create"))
            .json(&json!({ "user1Id": a["id"], "user2Id": b["id"] }))
            .send()
            .await
            .unwrap();
        let status = res.status();
        let body: Value = res.json().await.unwrap();
        (status, body["conversationId"].as_str().unwrap().to_string())
    }

    async fn send(&self, conversation_id: &str, sender: &Value, content: &str) -> Value {
        let res = self
            .client
            .post(self.url(&format!("/conversations/{conversation_id}/messages")))
            .json(&json!({ "senderId": sender["id"], "content": content }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        res.json().await.unwrap()
    }

    async fn unread_list(&self, user: &Value) -> Vec<Value> {
        let id = user["id"].as_str().unwrap();
        self.client
            .get(self.url(&format!("/conversations/{id}")))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_register_returns_user_without_password() {
    let server = start_server().await;
    let user = server.register("ona@pastas.lt", "onute").await;

    assert_eq!(user["username"], "onute");
    assert_eq!(user["profileImage"], "default-profile.png");
    assert!(user.get("password").is_none());
    assert!(user.get("password_visible").is_none());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let server = start_server().await;
    server.register("ona@pastas.lt", "onute").await;

    let res = server
        .client
        .post(server.url("/users"))
        .json(&json!({ "email": "ona@pastas.lt", "username": "kitas_vardas", "password": "Slaptas1!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert!(body["errorMessage"].as_str().unwrap().contains("email"));

    let res = server
        .client
        .post(server.url("/users"))
        .json(&json!({ "email": "kita@pastas.lt", "username": "onute", "password": "Slaptas1!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert!(body["errorMessage"].as_str().unwrap().contains("username"));
}

#[tokio::test]
async fn test_invalid_registration_is_rejected() {
    let server = start_server().await;
    let res = server
        .client
        .post(server.url("/users"))
        .json(&json!({ "email": "ona@pastas.lt", "username": "onute", "password": "silpnas" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_answers_with_error_json() {
    let server = start_server().await;
    let res = server
        .client
        .post(server.url("/users"))
        .json(&json!({ "email": "ona@pastas.lt", "username": "onute" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("password"));

    let res = server
        .client
        .post(server.url("/users/login"))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let server = start_server().await;
    server.register("ona@pastas.lt", "onute").await;

    let wrong_password = server
        .client
        .post(server.url("/users/login"))
        .json(&json!({ "username": "onute", "password": "Neteisingas1!" }))
        .send()
        .await
        .unwrap();
    let unknown_user = server
        .client
        .post(server.url("/users/login"))
        .json(&json!({ "username": "niekas", "password": "Slaptas1!" }))
        .send()
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_user.json().await.unwrap();
    assert_eq!(a, b);

    let ok = server
        .client
        .post(server.url("/users/login"))
        .json(&json!({ "username": "onute", "password": "Slaptas1!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_user_errors() {
    let server = start_server().await;

    let malformed = server.client.get(server.url("/users/null")).send().await.unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

    let missing = server
        .client
        .get(server.url(&format!("/users/{}", Uuid::new_v4())))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_profile_update_keeps_password_when_blank() {
    let server = start_server().await;
    let user = server.register("ona@pastas.lt", "onute").await;
    let id = user["id"].as_str().unwrap();

    let res = server
        .client
        .patch(server.url(&format!("/users/{id}")))
        .json(&json!({ "username": "ona_nauja", "password": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["username"], "ona_nauja");
    assert_eq!(updated["email"], "ona@pastas.lt");

    let login = server
        .client
        .post(server.url("/users/login"))
        .json(&json!({ "username": "ona_nauja", "password": "Slaptas1!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_check_or_create_reuses_conversation() {
    let server = start_server().await;
    let a = server.register("a@pastas.lt", "aldona").await;
    let b = server.register("b@pastas.lt", "bronius").await;

    let (status, first) = server.conversation(&a, &b).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, again) = server.conversation(&a, &b).await;
    assert_eq!(status, StatusCode::OK);
    let (_, reversed) = server.conversation(&b, &a).await;

    assert_eq!(first, again);
    assert_eq!(first, reversed);
}

#[tokio::test]
async fn test_conversation_list_empty_for_new_user() {
    let server = start_server().await;
    let a = server.register("a@pastas.lt", "aldona").await;
    assert!(server.unread_list(&a).await.is_empty());
}

#[tokio::test]
async fn test_send_to_bad_conversation() {
    let server = start_server().await;
    let a = server.register("a@pastas.lt", "aldona").await;

    for conversation_id in ["null".to_string(), Uuid::new_v4().to_string()] {
        let res = server
            .client
            .post(server.url(&format!("/conversations/{conversation_id}/messages")))
            .json(&json!({ "senderId": a["id"], "content": "labas" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_like_rules() {
    let server = start_server().await;
    let a = server.register("a@pastas.lt", "aldona").await;
    let b = server.register("b@pastas.lt", "bronius").await;
    let (_, conv) = server.conversation(&a, &b).await;
    let msg = server.send(&conv, &a, "labas").await;
    let msg_id = msg["id"].as_str().unwrap();

    let own = server
        .client
        .post(server.url(&format!("/messages/{msg_id}/like")))
        .json(&json!({ "userId": a["id"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(own.status(), StatusCode::FORBIDDEN);

    for expected in [true, false] {
        let res = server
            .client
            .post(server.url(&format!("/messages/{msg_id}/like")))
            .json(&json!({ "userId": b["id"] }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["liked"], expected);
    }

    let missing = server
        .client
        .post(server.url(&format!("/messages/{}/like", Uuid::new_v4())))
        .json(&json!({ "userId": b["id"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_conversation() {
    let server = start_server().await;
    let a = server.register("a@pastas.lt", "aldona").await;
    let b = server.register("b@pastas.lt", "bronius").await;
    let (_, conv) = server.conversation(&a, &b).await;

    let res = server
        .client
        .delete(server.url(&format!("/conversations/{conv}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let again = server
        .client
        .delete(server.url(&format!("/conversations/{conv}")))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);

    let history = server
        .client
        .get(server.url(&format!("/conversations/{conv}/messages")))
        .send()
        .await
        .unwrap();
    assert_eq!(history.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unread_round_trip() {
    let server = start_server().await;
    let a = server.register("a@pastas.lt", "aldona").await;
    let b = server.register("b@pastas.lt", "bronius").await;
    let (_, conv) = server.conversation(&a, &b).await;

    server.send(&conv, &a, "hi").await;

    let for_b = server.unread_list(&b).await;
    assert_eq!(for_b.len(), 1);
    assert_eq!(for_b[0]["id"], conv.as_str());
    assert_eq!(for_b[0]["hasUnreadMessages"], true);
    assert!(for_b[0].get("messages").is_none());

    let history: Vec<Value> = server
        .client
        .get(server.url(&format!("/conversations/{conv}/messages")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["content"], "hi");
    assert_eq!(history[0]["isRead"], false);

    let res = server
        .client
        .patch(server.url(&format!("/conversations/{conv}/markAsRead")))
        .json(&json!({ "userId": b["id"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let for_b = server.unread_list(&b).await;
    assert_eq!(for_b[0]["hasUnreadMessages"], false);
}

#[tokio::test]
async fn test_health_endpoints() {
    let server = start_server().await;
    let res = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}
