use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

use streamify_social::FriendshipService;
use streamify_store::InMemoryDocumentStore;

use crate::auth::TokenAuth;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Streamify HTTP server over the in-memory document store.
pub struct StreamifyServer {
    config: ServerConfig,
    store: Arc<InMemoryDocumentStore>,
    state: AppState,
}

impl StreamifyServer {
    /// Build the server, seeding the store from `config.seed_users` if set.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = match &config.seed_users {
            Some(path) => InMemoryDocumentStore::load_users_json(path)?,
            None => InMemoryDocumentStore::new(),
        };
        Self::with_store(config, Arc::new(store))
    }

    pub fn with_store(config: ServerConfig, store: Arc<InMemoryDocumentStore>) -> ServerResult<Self> {
        let service = Arc::new(FriendshipService::new(store.clone(), config.social.clone()));
        let auth = Arc::new(TokenAuth::from_config(&config.auth, service.clone())?);
        let state = AppState::new(service, auth);
        Ok(Self {
            config,
            store,
            state,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<InMemoryDocumentStore> {
        &self.store
    }

    pub fn service(&self) -> &Arc<FriendshipService> {
        &self.state.service
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        let router = build_router(self.state.clone());
        match self.cors_layer() {
            Some(cors) => router.layer(cors),
            None => router,
        }
    }

    fn cors_layer(&self) -> Option<CorsLayer> {
        if self.config.cors_origins.is_empty() {
            return None;
        }
        let origins: Vec<HeaderValue> = self
            .config
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("skipping cors origin {origin}: {e}");
                    None
                }
            })
            .collect();
        Some(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE]),
        )
    }

    /// Start serving requests until ctrl-c.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            environment = %self.config.environment,
            transactions = self.state.service.uses_transactions(),
            "Streamify server listening on {}",
            self.config.bind_addr
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamify_types::User;

    #[test]
    fn server_construction() {
        let server = StreamifyServer::new(ServerConfig::default()).unwrap();
        assert_eq!(server.config().bind_addr, "127.0.0.1:4000".parse::<std::net::SocketAddr>().unwrap());
        assert_eq!(server.store().user_count().unwrap(), 0);
        assert!(server.service().uses_transactions());
    }

    #[test]
    fn router_builds_with_cors() {
        let config = ServerConfig {
            cors_origins: vec!["https://app.example.com".into()],
            ..Default::default()
        };
        let server = StreamifyServer::new(config).unwrap();
        assert!(server.cors_layer().is_some());
        let _router = server.router();
    }

    #[test]
    fn seeds_users_from_file() {
        let users = vec![User::new("ana")];
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), serde_json::to_vec(&users).unwrap()).unwrap();

        let config = ServerConfig {
            seed_users: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let server = StreamifyServer::new(config).unwrap();
        assert_eq!(server.store().user_count().unwrap(), 1);
    }
}
