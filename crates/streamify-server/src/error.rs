use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use streamify_social::SocialError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("authentication failed: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Social(#[from] SocialError),

    #[error("store error: {0}")]
    Store(#[from] streamify_store::StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Social(err) => match err {
                SocialError::InvalidInput(_) | SocialError::Conflict(_) => StatusCode::BAD_REQUEST,
                SocialError::Forbidden(_) => StatusCode::FORBIDDEN,
                SocialError::NotFound(_) => StatusCode::NOT_FOUND,
                SocialError::Internal(_) | SocialError::InconsistentState { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Store(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Social(SocialError::NotFound(_)) => {
                "the requested resource could not be found".to_string()
            }
            Self::Social(SocialError::Forbidden(_)) => {
                "your user account doesn't have the necessary permissions to access this resource"
                    .to_string()
            }
            _ if status.is_server_error() => {
                tracing::error!(error = %self, "request failed");
                "the server encountered a problem and could not process your request".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamify_store::StoreError;
    use streamify_types::FriendRequestId;

    #[test]
    fn social_errors_map_to_status_codes() {
        let cases = [
            (SocialError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (SocialError::Conflict("x".into()), StatusCode::BAD_REQUEST),
            (SocialError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (SocialError::NotFound("user"), StatusCode::NOT_FOUND),
            (
                SocialError::Internal(StoreError::Backend("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                SocialError::InconsistentState {
                    request_id: FriendRequestId::new(),
                    source: StoreError::Backend("down".into()),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ServerError::from(err).status(), status);
        }
    }

    #[test]
    fn unauthorized_is_401() {
        let response = ServerError::Unauthorized("missing token".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
