use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use streamify_social::{FriendshipService, SocialError};
use streamify_types::{User, UserId};

use crate::config::AuthConfig;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    Anonymous,
}

impl Credentials {
    pub fn from_headers(headers: &HeaderMap) -> ServerResult<Self> {
        let Some(value) = headers.get(AUTHORIZATION) else {
            return Ok(Self::Anonymous);
        };
        let value = value
            .to_str()
            .map_err(|_| ServerError::Unauthorized("malformed authorization header".into()))?;
        match value.split_once(' ') {
            Some(("Bearer", token)) if !token.trim().is_empty() => {
                Ok(Self::Bearer(token.trim().to_string()))
            }
            _ => Err(ServerError::Unauthorized(
                "authorization header must be a bearer token".into(),
            )),
        }
    }
}

/// Resolves request credentials to the acting user's current document.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<User>;
}

/// Static bearer tokens mapped to user ids.
///
/// The user document is re-read on every request so the friend set the
/// handlers see is current. The read goes through the service and shares
/// its store deadline.
pub struct TokenAuth {
    tokens: HashMap<String, UserId>,
    service: Arc<FriendshipService>,
}

impl TokenAuth {
    pub fn new(tokens: HashMap<String, UserId>, service: Arc<FriendshipService>) -> Self {
        Self { tokens, service }
    }

    pub fn from_config(config: &AuthConfig, service: Arc<FriendshipService>) -> ServerResult<Self> {
        let tokens = config
            .tokens
            .iter()
            .map(|(token, id)| {
                UserId::parse(id)
                    .map(|id| (token.clone(), id))
                    .map_err(|e| ServerError::Config(format!("auth.tokens: {e}")))
            })
            .collect::<ServerResult<HashMap<_, _>>>()?;
        Ok(Self::new(tokens, service))
    }
}

#[async_trait]
impl AuthProvider for TokenAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<User> {
        let token = match credentials {
            Credentials::Bearer(token) => token,
            Credentials::Anonymous => {
                return Err(ServerError::Unauthorized("missing bearer token".into()))
            }
        };
        let id = self
            .tokens
            .get(token)
            .ok_or_else(|| ServerError::Unauthorized("invalid or expired token".into()))?;
        match self.service.get_user(id).await {
            Ok(user) => Ok(user),
            Err(SocialError::NotFound(_)) => {
                Err(ServerError::Unauthorized("invalid or expired token".into()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// The authenticated user making the request.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let credentials = Credentials::from_headers(&parts.headers)?;
        let user = state.auth.authenticate(&credentials).await?;
        Ok(Self(user))
    }
}
