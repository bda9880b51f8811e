use thiserror::Error;

use streamify_store::StoreError;
use streamify_types::{FriendRequestId, TypeError};

/// Errors returned by the friendship service.
///
/// Everything except `Internal` and `InconsistentState` is an expected,
/// caller-correctable condition and is never retried.
#[derive(Debug, Error)]
pub enum SocialError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    #[error("not permitted: {0}")]
    Forbidden(String),

    #[error("internal error: {0}")]
    Internal(#[from] StoreError),

    /// The request was marked accepted but at least one friend edge could
    /// not be written. Needs [`repair_acceptance`](crate::FriendshipService::repair_acceptance).
    #[error("friend request {request_id} accepted with incomplete friend edges: {source}")]
    InconsistentState {
        request_id: FriendRequestId,
        #[source]
        source: StoreError,
    },
}

impl From<TypeError> for SocialError {
    fn from(err: TypeError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl SocialError {
    /// `true` for failures the caller caused and can correct.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::InvalidInput(_) | Self::Conflict(_) | Self::Forbidden(_)
        )
    }
}

pub type SocialResult<T> = Result<T, SocialError>;
