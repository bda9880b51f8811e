use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::{FriendRequestId, UserId};
use crate::user::UserSummary;

/// Lifecycle state of a friend request.
///
/// `Pending -> Accepted` is the only transition. `Accepted` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
}

impl FriendRequestStatus {
    /// Returns `true` if a document in state `self` may be persisted in
    /// state `next`. Rewriting the same state is allowed.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, _) | (Self::Accepted, Self::Accepted)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
        }
    }
}

impl fmt::Display for FriendRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status filter for request listings. `All` disables filtering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(FriendRequestStatus),
}

impl StatusFilter {
    pub fn matches(self, status: FriendRequestStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "All" => Ok(Self::All),
            "Pending" => Ok(Self::Only(FriendRequestStatus::Pending)),
            "Accepted" => Ok(Self::Only(FriendRequestStatus::Accepted)),
            other => Err(TypeError::InvalidStatus(other.to_string())),
        }
    }
}

/// An unordered pair of users.
///
/// At most one friend request may exist per pair, whichever direction it
/// was sent in, so this is the uniqueness key for the request collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    low: UserId,
    high: UserId,
}

impl PairKey {
    pub fn new(a: UserId, b: UserId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }
}

/// A friend request document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRequest {
    pub id: FriendRequestId,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub status: FriendRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FriendRequest {
    /// Create a new pending request from `sender` to `recipient`.
    pub fn new(sender: UserId, recipient: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: FriendRequestId::new(),
            sender_id: sender,
            recipient_id: recipient,
            status: FriendRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn pair(&self) -> PairKey {
        PairKey::new(self.sender_id, self.recipient_id)
    }

    pub fn is_pending(&self) -> bool {
        self.status == FriendRequestStatus::Pending
    }

    /// Move a pending request to `Accepted`.
    pub fn accept(&mut self) -> Result<(), TypeError> {
        if !self.is_pending() {
            return Err(TypeError::IllegalTransition {
                from: self.status.to_string(),
                to: FriendRequestStatus::Accepted.to_string(),
            });
        }
        self.status = FriendRequestStatus::Accepted;
        Ok(())
    }
}

/// A request listed in its recipient's inbox, with the sender's profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingFriendRequest {
    #[serde(flatten)]
    pub request: FriendRequest,
    pub sender: UserSummary,
}

/// A request listed in its sender's outbox, with the recipient's profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingFriendRequest {
    #[serde(flatten)]
    pub request: FriendRequest,
    pub recipient: UserSummary,
}
