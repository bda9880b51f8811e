//! HTTP server for Streamify.
//!
//! Exposes the friendship service over JSON endpoints. Each handler parses
//! ids and query parameters, resolves the acting user from a bearer token,
//! and wraps the result in a named JSON envelope (`{"user": ...}`,
//! `{"friend_request": ...}`, `{"users": [...], "metadata": {...}}`).

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{AuthProvider, Credentials, CurrentUser, TokenAuth};
pub use config::{AuthConfig, Environment, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::StreamifyServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use streamify_store::InMemoryDocumentStore;
    use streamify_types::User;
    use tower::util::ServiceExt;

    struct Harness {
        app: axum::Router,
        ana: User,
        ben: User,
    }

    fn harness() -> Harness {
        let ana = User::new("Ana").with_languages("english", "spanish");
        let ben = User::new("Ben").with_languages("spanish", "english");
        let store = InMemoryDocumentStore::from_users([ana.clone(), ben.clone()]).unwrap();

        let mut config = ServerConfig::default();
        config.auth.tokens.insert("t-ana".into(), ana.id.to_string());
        config.auth.tokens.insert("t-ben".into(), ben.id.to_string());

        let server = StreamifyServer::with_store(config, Arc::new(store)).unwrap();
        Harness {
            app: server.router(),
            ana,
            ben,
        }
    }

    async fn call(app: &axum::Router, method: &str, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let response = app
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn health_endpoint() {
        let h = harness();
        let (status, body) = call(&h.app, "GET", "/v1/health", None).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn protected_endpoints_require_token() {
        let h = harness();
        let (status, body) = call(&h.app, "GET", "/v1/friends", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());

        let (status, _) = call(&h.app, "GET", "/v1/friends", Some("bogus")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn get_user_by_id() {
        let h = harness();
        let uri = format!("/v1/users/{}", h.ben.id);
        let (status, body) = call(&h.app, "GET", &uri, Some("t-ana")).await;
        assert_eq!(status, 200);
        assert_eq!(body["user"]["full_name"], "Ben");

        let (status, _) = call(&h.app, "GET", "/v1/users/not-an-id", Some("t-ana")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let uri = format!("/v1/users/{}", streamify_types::UserId::new());
        let (status, _) = call(&h.app, "GET", &uri, Some("t-ana")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn request_accept_and_list_friends() {
        let h = harness();

        let uri = format!("/v1/users/{}/friend-request", h.ben.id);
        let (status, body) = call(&h.app, "POST", &uri, Some("t-ana")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["friend_request"]["status"], "Pending");
        let request_id = body["friend_request"]["id"].as_str().unwrap().to_string();

        // Same pair again, either direction.
        let (status, _) = call(&h.app, "POST", &uri, Some("t-ana")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(&h.app, "GET", "/v1/incoming-requests?status=Pending", Some("t-ben")).await;
        assert_eq!(status, 200);
        assert_eq!(body["friend_requests"][0]["sender"]["full_name"], "Ana");
        assert_eq!(body["metadata"]["total_records"], 1);

        let (status, body) = call(&h.app, "GET", "/v1/outgoing-requests", Some("t-ana")).await;
        assert_eq!(status, 200);
        assert_eq!(body["friend_requests"][0]["recipient"]["full_name"], "Ben");

        // The sender cannot accept their own request.
        let accept = format!("/v1/incoming-requests/{request_id}/accept");
        let (status, _) = call(&h.app, "POST", &accept, Some("t-ana")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(&h.app, "POST", &accept, Some("t-ben")).await;
        assert_eq!(status, 200);
        assert_eq!(body["friend_request"]["status"], "Accepted");

        let (status, body) = call(&h.app, "GET", "/v1/friends", Some("t-ana")).await;
        assert_eq!(status, 200);
        assert_eq!(body["users"][0]["id"], Value::String(h.ben.id.to_string()));

        let (status, body) = call(&h.app, "GET", "/v1/recommended", Some("t-ana")).await;
        assert_eq!(status, 200);
        assert_eq!(body["users"], Value::Array(vec![]));
    }

    #[tokio::test]
    async fn accept_unknown_request_is_not_found() {
        let h = harness();
        let uri = format!(
            "/v1/incoming-requests/{}/accept",
            streamify_types::FriendRequestId::new()
        );
        let (status, _) = call(&h.app, "POST", &uri, Some("t-ben")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listing_rejects_bad_query() {
        let h = harness();
        let (status, body) = call(&h.app, "GET", "/v1/recommended?page=abc", Some("t-ana")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "page, must be an integer value");

        let (status, _) = call(&h.app, "GET", "/v1/recommended?page_size=1000", Some("t-ana")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&h.app, "GET", "/v1/incoming-requests?status=Rejected", Some("t-ana")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn recommended_search() {
        let h = harness();
        let (status, body) = call(&h.app, "GET", "/v1/recommended?query=BEN", Some("t-ana")).await;
        assert_eq!(status, 200);
        assert_eq!(body["users"][0]["full_name"], "Ben");
        assert_eq!(body["metadata"]["current_page"], 1);

        let (_, body) = call(&h.app, "GET", "/v1/recommended?query=nobody", Some("t-ana")).await;
        assert_eq!(body["metadata"]["total_records"], 0);

        // The caller never shows up in their own recommendations.
        let uri = format!("/v1/recommended?query={}", h.ana.full_name);
        let (_, body) = call(&h.app, "GET", &uri, Some("t-ana")).await;
        assert_eq!(body["users"], Value::Array(vec![]));
    }
}
